//! # Graph
//!
//! The document graph: projects own documents and templates, documents own pages, pages own layers,
//! layers own shapes, and shapes reference styles, data and points. Some references are shared,
//! like a style in a library used by many shapes, or a template used by many pages.
//!
//! Nodes live in an arena keyed by [`NodeID`]. Detaching a node from its parent does *not* free it,
//! so an undo can attach it again. Every mutator emits a [`Change`] to the listeners subscribed to
//! the mutated node before returning.

mod attr;
mod node;
pub mod shape;
mod signal;
pub mod style;

use std::rc::Rc;

pub use attr::Attr;
pub use node::{
    Column, Container, ContainerKind, Data, Database, Document, Layer, Library, Node, NodeKind,
    Point, Project, Property, Record, ShapeFlags, ShapeState, SlotRef, Value,
};
pub use shape::{Shape, ShapeKind};
pub use signal::{Change, ChangeListener, ListenerID, Swap};
pub use style::{FontFlags, StyleNode};

use crate::color::ArgbColor;
use node::SlotMut;

pub type NodeID = crate::id::StableID<Node>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} not found")]
    UnknownNode(NodeID),
    #[error("node {node} is not a {expected}")]
    WrongKind {
        node: NodeID,
        expected: &'static str,
    },
    #[error("node {node} has no {attr} attribute")]
    NoSuchAttr { node: NodeID, attr: Attr },
    #[error("{child} is not in {attr} of {parent}")]
    NotAChild {
        parent: NodeID,
        attr: Attr,
        child: NodeID,
    },
    #[error("putting {node} into {destination} would create a cycle")]
    WouldCycle { node: NodeID, destination: NodeID },
    #[error("listener {0} not registered")]
    UnknownListener(ListenerID),
    #[error("listener {listener} is not subscribed to {node}")]
    NotSubscribed { node: NodeID, listener: ListenerID },
    #[error("listener {listener} is already subscribed to {node}")]
    AlreadySubscribed { node: NodeID, listener: ListenerID },
    #[error("no nodes given")]
    EmptySelection,
}

/// Generates typed accessors, `Err(WrongKind)` if the node is of another kind.
macro_rules! accessors {
    ($($name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        $(
            pub fn $name(&self, id: NodeID) -> Result<&$ty, GraphError> {
                match &self.node(id)?.kind {
                    NodeKind::$variant(inner) => Ok(inner),
                    _ => Err(GraphError::WrongKind {
                        node: id,
                        expected: stringify!($variant),
                    }),
                }
            }
        )*
    };
}

#[derive(Default)]
pub struct DocumentGraph {
    nodes: hashbrown::HashMap<NodeID, Node>,
    signal: signal::Signal,
}
// Reading.
impl DocumentGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    #[must_use]
    pub fn get(&self, id: NodeID) -> Option<&Node> {
        self.nodes.get(&id)
    }
    pub fn node(&self, id: NodeID) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }
    #[must_use]
    pub fn contains(&self, id: NodeID) -> bool {
        self.nodes.contains_key(&id)
    }
    accessors!(
        project => Project(Project),
        document => Document(Document),
        container => Container(Container),
        layer => Layer(Layer),
        shape => Shape(Shape),
        point => Point(Point),
        style => Style(StyleNode),
        style_library => StyleLibrary(Library),
        group_library => GroupLibrary(Library),
        database => Database(Database),
        column => Column(Column),
        record => Record(Record),
        value => Value(Value),
        data => Data(Data),
        property => Property(Property),
        shape_state => ShapeState(ShapeState),
    );
    /// Contents of a collection slot.
    pub fn children(&self, id: NodeID, attr: Attr) -> Result<&[NodeID], GraphError> {
        match self.node(id)?.slot(attr) {
            Some(SlotRef::Many(ids)) => Ok(ids),
            _ => Err(GraphError::NoSuchAttr { node: id, attr }),
        }
    }
    /// Contents of a single reference slot.
    pub fn reference(&self, id: NodeID, attr: Attr) -> Result<Option<NodeID>, GraphError> {
        match self.node(id)?.slot(attr) {
            Some(SlotRef::One(reference)) => Ok(reference),
            _ => Err(GraphError::NoSuchAttr { node: id, attr }),
        }
    }
    /// See [`Node::edges`].
    pub fn edges(&self, id: NodeID) -> Result<smallvec::SmallVec<[NodeID; 8]>, GraphError> {
        Ok(self.node(id)?.edges())
    }
    /// Whether `target` is `group` itself or anywhere inside its `Shapes` or `Connectors`.
    #[must_use]
    pub fn group_contains(&self, group: NodeID, target: NodeID) -> bool {
        let mut stack = vec![group];
        let mut seen = hashbrown::HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Ok(Shape {
                kind: ShapeKind::Group(group),
                ..
            }) = self.shape(id)
            {
                stack.extend(group.shapes.iter().chain(&group.connectors).copied());
            }
        }
        false
    }
}
// Structure.
impl DocumentGraph {
    /// Add a detached node. Not announced to anyone, as nothing can be subscribed to it yet.
    pub fn insert(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeID {
        let id = NodeID::default();
        self.nodes.insert(id, Node::new(name, kind));
        id
    }
    /// Replace a collection slot wholesale.
    pub fn set_children(
        &mut self,
        id: NodeID,
        attr: Attr,
        children: Vec<NodeID>,
    ) -> Result<(), GraphError> {
        if let Some(unknown) = children.iter().find(|child| !self.contains(**child)) {
            return Err(GraphError::UnknownNode(*unknown));
        }
        // Group membership must stay acyclic.
        let is_group = matches!(attr, Attr::Shapes | Attr::Connectors)
            && self.shape(id).is_ok_and(|shape| shape.kind.group().is_some());
        if is_group {
            if let Some(child) = children.iter().find(|child| self.group_contains(**child, id)) {
                return Err(GraphError::WouldCycle {
                    node: *child,
                    destination: id,
                });
            }
        }
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        let is_edge = node.is_edge(attr);
        let Some(SlotMut::Many(slot)) = node.slot_mut(attr) else {
            return Err(GraphError::NoSuchAttr { node: id, attr });
        };
        let previous = std::mem::replace(slot, children);
        let swap = is_edge.then(|| Swap {
            removed: previous.into_iter().collect(),
            added: slot.iter().copied().collect(),
        });
        self.emit(&Change {
            node: id,
            attr,
            swap,
        });
        Ok(())
    }
    /// Replace a single reference slot.
    pub fn set_reference(
        &mut self,
        id: NodeID,
        attr: Attr,
        reference: Option<NodeID>,
    ) -> Result<(), GraphError> {
        if let Some(unknown) = reference.filter(|reference| !self.contains(*reference)) {
            return Err(GraphError::UnknownNode(unknown));
        }
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        let is_edge = node.is_edge(attr);
        let Some(SlotMut::One(slot)) = node.slot_mut(attr) else {
            return Err(GraphError::NoSuchAttr { node: id, attr });
        };
        let previous = std::mem::replace(slot, reference);
        let swap = is_edge.then(|| Swap {
            removed: previous.into_iter().collect(),
            added: reference.into_iter().collect(),
        });
        self.emit(&Change {
            node: id,
            attr,
            swap,
        });
        Ok(())
    }
}
// Scalar attributes.
impl DocumentGraph {
    /// Mutate a scalar attribute in place and announce it. `f` returns `None` if the node has
    /// no such attribute.
    fn modify(
        &mut self,
        id: NodeID,
        attr: Attr,
        f: impl FnOnce(&mut NodeKind) -> Option<()>,
    ) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        f(&mut node.kind).ok_or(GraphError::NoSuchAttr { node: id, attr })?;
        self.emit(&Change {
            node: id,
            attr,
            swap: None,
        });
        Ok(())
    }
    pub fn set_name(&mut self, id: NodeID, name: String) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.name = name;
        self.emit(&Change {
            node: id,
            attr: Attr::Name,
            swap: None,
        });
        Ok(())
    }
    pub fn set_position(&mut self, id: NodeID, x: f64, y: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::Position, |kind| match kind {
            NodeKind::Point(point) => {
                point.x = x;
                point.y = y;
                Some(())
            }
            _ => None,
        })
    }
    pub fn translate(&mut self, id: NodeID, dx: f64, dy: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::Position, |kind| match kind {
            NodeKind::Point(point) => {
                point.x += dx;
                point.y += dy;
                Some(())
            }
            _ => None,
        })
    }
    /// Color of a stroke or fill sub-style.
    pub fn set_paint_color(&mut self, id: NodeID, color: ArgbColor) -> Result<(), GraphError> {
        self.modify(id, Attr::Color, |kind| match kind {
            NodeKind::Style(style) => {
                style.paint_mut()?.color = color;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_thickness(&mut self, id: NodeID, thickness: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::Thickness, |kind| match kind {
            NodeKind::Style(StyleNode::Shape(style)) => {
                style.thickness = thickness;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_curvature(&mut self, id: NodeID, curvature: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::Curvature, |kind| match kind {
            NodeKind::Style(StyleNode::Line(line)) => {
                line.curvature = curvature;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_font_size(&mut self, id: NodeID, font_size: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::FontSize, |kind| match kind {
            NodeKind::Style(StyleNode::Text(text)) => {
                text.font_size = font_size;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_font_flags(&mut self, id: NodeID, flags: FontFlags) -> Result<(), GraphError> {
        self.modify(id, Attr::FontFlags, |kind| match kind {
            NodeKind::Style(StyleNode::Font(font)) => {
                font.flags = flags;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_text(&mut self, id: NodeID, text: String) -> Result<(), GraphError> {
        self.modify(id, Attr::Text, |kind| match kind {
            NodeKind::Shape(Shape {
                kind: ShapeKind::Text(shape),
                ..
            }) => {
                shape.text = text;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_shape_flags(&mut self, id: NodeID, flags: ShapeFlags) -> Result<(), GraphError> {
        self.modify(id, Attr::Flags, |kind| match kind {
            NodeKind::ShapeState(state) => {
                state.flags = flags;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_content(&mut self, id: NodeID, content: String) -> Result<(), GraphError> {
        self.modify(id, Attr::Content, |kind| match kind {
            NodeKind::Value(value) => {
                value.content = content;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_property_value(&mut self, id: NodeID, value: String) -> Result<(), GraphError> {
        self.modify(id, Attr::Value, |kind| match kind {
            NodeKind::Property(property) => {
                property.value = value;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_background(&mut self, id: NodeID, color: ArgbColor) -> Result<(), GraphError> {
        self.modify(id, Attr::Background, |kind| match kind {
            NodeKind::Container(container) => {
                container.background = color;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_size(&mut self, id: NodeID, width: f64, height: f64) -> Result<(), GraphError> {
        self.modify(id, Attr::Size, |kind| match kind {
            NodeKind::Container(container) => {
                container.width = width;
                container.height = height;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_visible(&mut self, id: NodeID, visible: bool) -> Result<(), GraphError> {
        self.modify(id, Attr::IsVisible, |kind| match kind {
            NodeKind::Layer(layer) => {
                layer.is_visible = visible;
                Some(())
            }
            NodeKind::Column(column) => {
                column.is_visible = visible;
                Some(())
            }
            _ => None,
        })
    }
    pub fn set_expanded(&mut self, id: NodeID, expanded: bool) -> Result<(), GraphError> {
        self.modify(id, Attr::IsExpanded, |kind| match kind {
            NodeKind::Document(document) => {
                document.is_expanded = expanded;
                Some(())
            }
            _ => None,
        })
    }
}
// Notification.
impl DocumentGraph {
    pub fn register(&self, listener: Rc<dyn ChangeListener>) -> ListenerID {
        self.signal.register(listener)
    }
    /// Drop a listener along with any subscriptions it still holds.
    /// Returns how many subscriptions were left behind.
    pub fn unregister(&self, listener: ListenerID) -> Result<usize, GraphError> {
        self.signal.unregister(listener)
    }
    pub fn subscribe(&self, id: NodeID, listener: ListenerID) -> Result<(), GraphError> {
        self.signal.subscribe(id, listener)
    }
    pub fn unsubscribe(&self, id: NodeID, listener: ListenerID) -> Result<(), GraphError> {
        self.signal.unsubscribe(id, listener)
    }
    #[must_use]
    pub fn subscriber_count(&self, id: NodeID) -> usize {
        self.signal.subscriber_count(id)
    }
    /// Total node/listener subscription pairs.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.signal.subscription_count()
    }
    /// Announce a non-structural change of `attr` without mutating anything.
    pub fn notify(&self, id: NodeID, attr: Attr) {
        self.emit(&Change {
            node: id,
            attr,
            swap: None,
        });
    }
    fn emit(&self, change: &Change) {
        let targets = self.signal.targets(change.node);
        if targets.is_empty() {
            return;
        }
        log::trace!("{} {} -> {} listeners", change.node, change.attr, targets.len());
        for listener in targets {
            listener.changed(self, change);
        }
    }
}
