//! # Styles
//!
//! A shape style is a small tree of sub-style nodes. Renderers key their cached pens, brushes and
//! dash patterns off this content, so any change anywhere in the tree clears that cache.
//! A missing sub-style simply isn't drawn.

use super::node::{slots, SlotMut, SlotRef, Slots};
use super::{Attr, NodeID};
use crate::color::ArgbColor;

#[derive(Clone, Debug, Default)]
pub struct ShapeStyle {
    pub stroke: Option<NodeID>,
    pub fill: Option<NodeID>,
    pub line_style: Option<NodeID>,
    pub start_arrow: Option<NodeID>,
    pub end_arrow: Option<NodeID>,
    pub text_style: Option<NodeID>,
    pub thickness: f64,
}
slots!(ShapeStyle {
    edges: [
        Stroke => stroke,
        Fill => fill,
        LineStyle => line_style,
        StartArrow => start_arrow,
        EndArrow => end_arrow,
        TextStyle => text_style,
    ],
    focus: [],
});

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Paint {
    pub color: ArgbColor,
}
slots!(Paint { edges: [], focus: [] });

#[derive(Clone, Debug, Default)]
pub struct LineStyle {
    pub curvature: f64,
    pub fixed_length: Option<NodeID>,
}
slots!(LineStyle { edges: [FixedLength => fixed_length], focus: [] });

#[derive(Copy, Clone, Debug, Default)]
pub struct FixedLength {
    /// Zero disables the constraint.
    pub length: f64,
}
slots!(FixedLength { edges: [], focus: [] });

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ArrowKind {
    #[default]
    None,
    Rectangle,
    Ellipse,
    Arrow,
}

#[derive(Clone, Debug, Default)]
pub struct ArrowStyle {
    pub kind: ArrowKind,
    pub radius_x: f64,
    pub radius_y: f64,
    pub stroke: Option<NodeID>,
    pub fill: Option<NodeID>,
}
slots!(ArrowStyle { edges: [Stroke => stroke, Fill => fill], focus: [] });

#[derive(Clone, Debug)]
pub struct TextStyle {
    pub font_name: String,
    pub font_size: f64,
    pub font_style: Option<NodeID>,
}
impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: "Calibri".into(),
            font_size: 12.0,
            font_style: None,
        }
    }
}
slots!(TextStyle { edges: [FontStyle => font_style], focus: [] });

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FontFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKEOUT = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct FontStyle {
    pub flags: FontFlags,
}
slots!(FontStyle { edges: [], focus: [] });

#[derive(Clone, Debug, strum::IntoStaticStr)]
pub enum StyleNode {
    Shape(ShapeStyle),
    Stroke(Paint),
    Fill(Paint),
    Line(LineStyle),
    FixedLength(FixedLength),
    Arrow(ArrowStyle),
    Text(TextStyle),
    Font(FontStyle),
}
impl StyleNode {
    fn inner(&self) -> &dyn Slots {
        match self {
            Self::Shape(inner) => inner,
            Self::Stroke(inner) | Self::Fill(inner) => inner,
            Self::Line(inner) => inner,
            Self::FixedLength(inner) => inner,
            Self::Arrow(inner) => inner,
            Self::Text(inner) => inner,
            Self::Font(inner) => inner,
        }
    }
    fn inner_mut(&mut self) -> &mut dyn Slots {
        match self {
            Self::Shape(inner) => inner,
            Self::Stroke(inner) | Self::Fill(inner) => inner,
            Self::Line(inner) => inner,
            Self::FixedLength(inner) => inner,
            Self::Arrow(inner) => inner,
            Self::Text(inner) => inner,
            Self::Font(inner) => inner,
        }
    }
    /// The paint of a stroke or fill sub-style.
    #[must_use]
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::Stroke(paint) | Self::Fill(paint) => Some(paint),
            _ => None,
        }
    }
    pub fn paint_mut(&mut self) -> Option<&mut Paint> {
        match self {
            Self::Stroke(paint) | Self::Fill(paint) => Some(paint),
            _ => None,
        }
    }
    #[must_use]
    pub fn shape(&self) -> Option<&ShapeStyle> {
        match self {
            Self::Shape(style) => Some(style),
            _ => None,
        }
    }
}
impl Slots for StyleNode {
    fn slot(&self, attr: Attr) -> Option<SlotRef<'_>> {
        self.inner().slot(attr)
    }
    fn slot_mut(&mut self, attr: Attr) -> Option<SlotMut<'_>> {
        self.inner_mut().slot_mut(attr)
    }
    fn for_each_edge_attr(&self, f: &mut dyn FnMut(Attr)) {
        self.inner().for_each_edge_attr(f);
    }
}
