//! Node payloads and their slots.
//!
//! A slot is an attribute holding references to other nodes: either a collection
//! ([`SlotRef::Many`]) or a single optional reference ([`SlotRef::One`]). Each node type declares
//! which of its slots are *edges*: the references that make another node part of the observed
//! document. Focus pointers like `CurrentLayer` are slots, but never edges.
//!
//! Edges are enumerated by one visitor, [`Node::edges`], which is the only source both
//! subscription and unsubscription walk.

use super::{shape::Shape, style::StyleNode, Attr, NodeID};
use crate::color::ArgbColor;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotRef<'a> {
    Many(&'a [NodeID]),
    One(Option<NodeID>),
}
impl SlotRef<'_> {
    /// The ids currently held by this slot, in order.
    #[must_use]
    pub fn ids(&self) -> smallvec::SmallVec<[NodeID; 4]> {
        match self {
            Self::Many(ids) => ids.iter().copied().collect(),
            Self::One(id) => id.iter().copied().collect(),
        }
    }
}
pub(crate) enum SlotMut<'a> {
    Many(&'a mut Vec<NodeID>),
    One(&'a mut Option<NodeID>),
}

pub(crate) trait SlotField {
    fn as_slot(&self) -> SlotRef<'_>;
    fn as_slot_mut(&mut self) -> SlotMut<'_>;
}
impl SlotField for Vec<NodeID> {
    fn as_slot(&self) -> SlotRef<'_> {
        SlotRef::Many(self)
    }
    fn as_slot_mut(&mut self) -> SlotMut<'_> {
        SlotMut::Many(self)
    }
}
impl SlotField for Option<NodeID> {
    fn as_slot(&self) -> SlotRef<'_> {
        SlotRef::One(*self)
    }
    fn as_slot_mut(&mut self) -> SlotMut<'_> {
        SlotMut::One(self)
    }
}

pub(crate) trait Slots {
    fn slot(&self, attr: Attr) -> Option<SlotRef<'_>>;
    fn slot_mut(&mut self, attr: Attr) -> Option<SlotMut<'_>>;
    fn for_each_edge_attr(&self, f: &mut dyn FnMut(Attr));
}

/// Implement [`Slots`] from a single table, so the read and write paths can't disagree.
macro_rules! slots {
    ($ty:ty { edges: [$($edge:ident => $edge_field:ident),* $(,)?], focus: [$($focus:ident => $focus_field:ident),* $(,)?] $(,)? }) => {
        impl $crate::graph::node::Slots for $ty {
            fn slot(&self, attr: $crate::graph::Attr) -> Option<$crate::graph::node::SlotRef<'_>> {
                #[allow(unused_imports)]
                use $crate::graph::node::SlotField;
                match attr {
                    $($crate::graph::Attr::$edge => Some(self.$edge_field.as_slot()),)*
                    $($crate::graph::Attr::$focus => Some(self.$focus_field.as_slot()),)*
                    _ => None,
                }
            }
            fn slot_mut(&mut self, attr: $crate::graph::Attr) -> Option<$crate::graph::node::SlotMut<'_>> {
                #[allow(unused_imports)]
                use $crate::graph::node::SlotField;
                match attr {
                    $($crate::graph::Attr::$edge => Some(self.$edge_field.as_slot_mut()),)*
                    $($crate::graph::Attr::$focus => Some(self.$focus_field.as_slot_mut()),)*
                    _ => None,
                }
            }
            fn for_each_edge_attr(&self, _f: &mut dyn FnMut($crate::graph::Attr)) {
                $(_f($crate::graph::Attr::$edge);)*
            }
        }
    };
}
pub(crate) use slots;

#[derive(Clone, Debug, Default)]
pub struct Project {
    pub documents: Vec<NodeID>,
    pub templates: Vec<NodeID>,
    pub style_libraries: Vec<NodeID>,
    pub group_libraries: Vec<NodeID>,
    pub databases: Vec<NodeID>,
    pub current_document: Option<NodeID>,
    pub current_container: Option<NodeID>,
    pub current_template: Option<NodeID>,
    pub current_style_library: Option<NodeID>,
    pub current_group_library: Option<NodeID>,
    pub current_database: Option<NodeID>,
}
slots!(Project {
    edges: [
        Databases => databases,
        StyleLibraries => style_libraries,
        GroupLibraries => group_libraries,
        Templates => templates,
        Documents => documents,
    ],
    focus: [
        CurrentDocument => current_document,
        CurrentContainer => current_container,
        CurrentTemplate => current_template,
        CurrentStyleLibrary => current_style_library,
        CurrentGroupLibrary => current_group_library,
        CurrentDatabase => current_database,
    ],
});

#[derive(Clone, Debug, Default)]
pub struct Document {
    pub pages: Vec<NodeID>,
    pub is_expanded: bool,
}
slots!(Document { edges: [Pages => pages], focus: [] });

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Page,
    /// Shared backdrop for pages. Referenced by any number of pages through their `Template` slot.
    Template,
}

#[derive(Clone, Debug)]
pub struct Container {
    pub kind: ContainerKind,
    pub layers: Vec<NodeID>,
    pub data: Option<NodeID>,
    /// Always `None` on templates.
    pub template: Option<NodeID>,
    pub background: ArgbColor,
    pub width: f64,
    pub height: f64,
    pub current_layer: Option<NodeID>,
    pub current_shape: Option<NodeID>,
}
impl Container {
    #[must_use]
    pub fn new(kind: ContainerKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            layers: Vec::new(),
            data: None,
            template: None,
            background: ArgbColor::TRANSPARENT,
            width,
            height,
            current_layer: None,
            current_shape: None,
        }
    }
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.kind == ContainerKind::Template
    }
}
slots!(Container {
    edges: [Layers => layers, Data => data, Template => template],
    focus: [CurrentLayer => current_layer, CurrentShape => current_shape],
});

#[derive(Clone, Debug)]
pub struct Layer {
    pub shapes: Vec<NodeID>,
    pub is_visible: bool,
}
impl Default for Layer {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            is_visible: true,
        }
    }
}
slots!(Layer { edges: [Shapes => shapes], focus: [] });

/// An independently observable coordinate. Shapes own their points through slots,
/// and connectors may share them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
slots!(Point { edges: [], focus: [] });

/// Either a style library or a group library.
#[derive(Clone, Debug, Default)]
pub struct Library {
    pub items: Vec<NodeID>,
    pub selected: Option<NodeID>,
}
slots!(Library { edges: [Items => items], focus: [Selected => selected] });

#[derive(Clone, Debug, Default)]
pub struct Database {
    pub columns: Vec<NodeID>,
    pub records: Vec<NodeID>,
}
slots!(Database { edges: [Columns => columns, Records => records], focus: [] });

#[derive(Copy, Clone, Debug)]
pub struct Column {
    pub width: f64,
    pub is_visible: bool,
}
impl Default for Column {
    fn default() -> Self {
        Self {
            width: 100.0,
            is_visible: true,
        }
    }
}
slots!(Column { edges: [], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct Record {
    /// Shared with the owning database.
    pub columns: Vec<NodeID>,
    pub values: Vec<NodeID>,
}
slots!(Record { edges: [Columns => columns, Values => values], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct Value {
    pub content: String,
}
slots!(Value { edges: [], focus: [] });

/// User data attached to a shape or container.
#[derive(Clone, Debug, Default)]
pub struct Data {
    pub properties: Vec<NodeID>,
    /// A database record bound to the owner. Shared with the database.
    pub record: Option<NodeID>,
}
slots!(Data { edges: [Properties => properties, Record => record], focus: [] });

/// A named value. The name lives on the node.
#[derive(Clone, Debug, Default)]
pub struct Property {
    pub value: String,
}
slots!(Property { edges: [], focus: [] });

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u16 {
        const VISIBLE = 1 << 0;
        const PRINTABLE = 1 << 1;
        const LOCKED = 1 << 2;
        const CONNECTOR = 1 << 3;
        const STANDALONE = 1 << 4;
        const INPUT = 1 << 5;
        const OUTPUT = 1 << 6;
    }
}
impl Default for ShapeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PRINTABLE | Self::STANDALONE
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ShapeState {
    pub flags: ShapeFlags,
}
slots!(ShapeState { edges: [], focus: [] });

#[derive(Clone, Debug, strum::IntoStaticStr)]
pub enum NodeKind {
    Project(Project),
    Document(Document),
    Container(Container),
    Layer(Layer),
    Shape(Shape),
    Point(Point),
    Style(StyleNode),
    StyleLibrary(Library),
    GroupLibrary(Library),
    Database(Database),
    Column(Column),
    Record(Record),
    Value(Value),
    Data(Data),
    Property(Property),
    ShapeState(ShapeState),
}
impl NodeKind {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }
    pub(crate) fn as_slots(&self) -> &dyn Slots {
        match self {
            Self::Project(inner) => inner,
            Self::Document(inner) => inner,
            Self::Container(inner) => inner,
            Self::Layer(inner) => inner,
            Self::Shape(inner) => inner,
            Self::Point(inner) => inner,
            Self::Style(inner) => inner,
            Self::StyleLibrary(inner) | Self::GroupLibrary(inner) => inner,
            Self::Database(inner) => inner,
            Self::Column(inner) => inner,
            Self::Record(inner) => inner,
            Self::Value(inner) => inner,
            Self::Data(inner) => inner,
            Self::Property(inner) => inner,
            Self::ShapeState(inner) => inner,
        }
    }
    pub(crate) fn as_slots_mut(&mut self) -> &mut dyn Slots {
        match self {
            Self::Project(inner) => inner,
            Self::Document(inner) => inner,
            Self::Container(inner) => inner,
            Self::Layer(inner) => inner,
            Self::Shape(inner) => inner,
            Self::Point(inner) => inner,
            Self::Style(inner) => inner,
            Self::StyleLibrary(inner) | Self::GroupLibrary(inner) => inner,
            Self::Database(inner) => inner,
            Self::Column(inner) => inner,
            Self::Record(inner) => inner,
            Self::Value(inner) => inner,
            Self::Data(inner) => inner,
            Self::Property(inner) => inner,
            Self::ShapeState(inner) => inner,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}
impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
    #[must_use]
    pub fn slot(&self, attr: Attr) -> Option<SlotRef<'_>> {
        self.kind.as_slots().slot(attr)
    }
    pub(crate) fn slot_mut(&mut self, attr: Attr) -> Option<SlotMut<'_>> {
        self.kind.as_slots_mut().slot_mut(attr)
    }
    /// Whether changing `attr` re-shapes the observed document.
    #[must_use]
    pub fn is_edge(&self, attr: Attr) -> bool {
        let mut found = false;
        self.kind
            .as_slots()
            .for_each_edge_attr(&mut |edge| found |= edge == attr);
        found
    }
    /// Every node this one references through an edge, in slot order. A node referenced twice
    /// appears twice.
    #[must_use]
    pub fn edges(&self) -> smallvec::SmallVec<[NodeID; 8]> {
        let slots = self.kind.as_slots();
        let mut edges = smallvec::SmallVec::new();
        slots.for_each_edge_attr(&mut |attr| match slots.slot(attr) {
            Some(SlotRef::Many(ids)) => edges.extend_from_slice(ids),
            Some(SlotRef::One(Some(id))) => edges.push(id),
            Some(SlotRef::One(None)) => (),
            None => log::error!("edge {attr} has no slot on {}", self.kind.kind_name()),
        });
        edges
    }
}
