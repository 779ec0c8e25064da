//! Shapes are a closed set of variants. Each variant's point sub-objects are separate
//! [`Point`](super::Point) nodes held in slots, so moving one end of a line is a change on that point
//! alone.

use super::node::{slots, SlotMut, SlotRef, Slots};
use super::{Attr, NodeID};

#[derive(Clone, Debug, Default)]
pub struct PointShape {
    pub location: Option<NodeID>,
}
slots!(PointShape { edges: [Location => location], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct Line {
    pub start: Option<NodeID>,
    pub end: Option<NodeID>,
}
slots!(Line { edges: [Start => start, End => end], focus: [] });

/// Rectangles and ellipses, spanned by two corners.
#[derive(Clone, Debug, Default)]
pub struct Boxed {
    pub top_left: Option<NodeID>,
    pub bottom_right: Option<NodeID>,
}
slots!(Boxed { edges: [TopLeft => top_left, BottomRight => bottom_right], focus: [] });

/// Arcs and cubic beziers, defined by four points.
#[derive(Clone, Debug, Default)]
pub struct FourPoint {
    pub point1: Option<NodeID>,
    pub point2: Option<NodeID>,
    pub point3: Option<NodeID>,
    pub point4: Option<NodeID>,
}
slots!(FourPoint {
    edges: [Point1 => point1, Point2 => point2, Point3 => point3, Point4 => point4],
    focus: [],
});

#[derive(Clone, Debug, Default)]
pub struct QuadraticBezier {
    pub point1: Option<NodeID>,
    pub point2: Option<NodeID>,
    pub point3: Option<NodeID>,
}
slots!(QuadraticBezier {
    edges: [Point1 => point1, Point2 => point2, Point3 => point3],
    focus: [],
});

#[derive(Clone, Debug, Default)]
pub struct Text {
    pub top_left: Option<NodeID>,
    pub bottom_right: Option<NodeID>,
    pub text: String,
}
slots!(Text { edges: [TopLeft => top_left, BottomRight => bottom_right], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct Image {
    pub top_left: Option<NodeID>,
    pub bottom_right: Option<NodeID>,
    /// Key into the image cache owned by the renderer.
    pub key: String,
}
slots!(Image { edges: [TopLeft => top_left, BottomRight => bottom_right], focus: [] });

/// Path geometry is opaque here; its figures are interpreted by the geometry collaborator.
#[derive(Clone, Debug, Default)]
pub struct Path {
    pub geometry: String,
}
slots!(Path { edges: [], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub shapes: Vec<NodeID>,
    /// Connectors may reference points owned by the group's shapes.
    pub connectors: Vec<NodeID>,
}
slots!(Group { edges: [Shapes => shapes, Connectors => connectors], focus: [] });

#[derive(Clone, Debug, strum::IntoStaticStr)]
pub enum ShapeKind {
    Point(PointShape),
    Line(Line),
    Rectangle(Boxed),
    Ellipse(Boxed),
    Arc(FourPoint),
    CubicBezier(FourPoint),
    QuadraticBezier(QuadraticBezier),
    Text(Text),
    Image(Image),
    Path(Path),
    Group(Group),
}
impl ShapeKind {
    fn as_slots(&self) -> &dyn Slots {
        match self {
            Self::Point(inner) => inner,
            Self::Line(inner) => inner,
            Self::Rectangle(inner) | Self::Ellipse(inner) => inner,
            Self::Arc(inner) | Self::CubicBezier(inner) => inner,
            Self::QuadraticBezier(inner) => inner,
            Self::Text(inner) => inner,
            Self::Image(inner) => inner,
            Self::Path(inner) => inner,
            Self::Group(inner) => inner,
        }
    }
    fn as_slots_mut(&mut self) -> &mut dyn Slots {
        match self {
            Self::Point(inner) => inner,
            Self::Line(inner) => inner,
            Self::Rectangle(inner) | Self::Ellipse(inner) => inner,
            Self::Arc(inner) | Self::CubicBezier(inner) => inner,
            Self::QuadraticBezier(inner) => inner,
            Self::Text(inner) => inner,
            Self::Image(inner) => inner,
            Self::Path(inner) => inner,
            Self::Group(inner) => inner,
        }
    }
    #[must_use]
    pub fn group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Shape {
    /// Usually shared with other shapes through a style library.
    pub style: Option<NodeID>,
    pub data: Option<NodeID>,
    pub state: Option<NodeID>,
    pub kind: ShapeKind,
}
impl Shape {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            style: None,
            data: None,
            state: None,
            kind,
        }
    }
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_))
    }
}
impl Slots for Shape {
    fn slot(&self, attr: Attr) -> Option<SlotRef<'_>> {
        match attr {
            Attr::Style => Some(SlotRef::One(self.style)),
            Attr::Data => Some(SlotRef::One(self.data)),
            Attr::State => Some(SlotRef::One(self.state)),
            _ => self.kind.as_slots().slot(attr),
        }
    }
    fn slot_mut(&mut self, attr: Attr) -> Option<SlotMut<'_>> {
        match attr {
            Attr::Style => Some(SlotMut::One(&mut self.style)),
            Attr::Data => Some(SlotMut::One(&mut self.data)),
            Attr::State => Some(SlotMut::One(&mut self.state)),
            _ => self.kind.as_slots_mut().slot_mut(attr),
        }
    }
    fn for_each_edge_attr(&self, f: &mut dyn FnMut(Attr)) {
        f(Attr::Style);
        f(Attr::Data);
        f(Attr::State);
        self.kind.as_slots().for_each_edge_attr(f);
    }
}
