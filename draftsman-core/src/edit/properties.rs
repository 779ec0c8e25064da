//! Edits to scalar attributes and the style, data and state references of shapes.

use super::EditWriter;
use crate::color::ArgbColor;
use crate::graph::{
    Attr, DocumentGraph, FontFlags, GraphError, NodeID, ShapeFlags, ShapeKind, StyleNode,
};

/// Payload of a [`EditWriter::move_shapes`] edit. Each point is translated once, however many of
/// the moved shapes share it.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    pub dx: f64,
    pub dy: f64,
    pub points: std::rc::Rc<[NodeID]>,
}
impl Move {
    fn apply(graph: &mut DocumentGraph, delta: Self) -> Result<(), GraphError> {
        for point in delta.points.iter() {
            graph.translate(*point, delta.dx, delta.dy)?;
        }
        Ok(())
    }
}

impl EditWriter<'_> {
    pub fn rename(&mut self, id: NodeID, name: String) -> Result<(), GraphError> {
        let previous = self.node(id)?.name.clone();
        self.record_edit(previous, name, move |graph, name| graph.set_name(id, name))
    }
    /// Point a shape at a style, usually one from a style library. `None` leaves it unstyled.
    pub fn set_shape_style(
        &mut self,
        shape: NodeID,
        style: Option<NodeID>,
    ) -> Result<(), GraphError> {
        self.shape(shape)?;
        if let Some(style) = style {
            match self.style(style)? {
                StyleNode::Shape(_) => (),
                _ => {
                    return Err(GraphError::WrongKind {
                        node: style,
                        expected: "ShapeStyle",
                    })
                }
            }
        }
        self.set_reference(shape, Attr::Style, style)
    }
    pub fn set_paint_color(&mut self, paint: NodeID, color: ArgbColor) -> Result<(), GraphError> {
        let previous = self
            .style(paint)?
            .paint()
            .ok_or(GraphError::NoSuchAttr {
                node: paint,
                attr: Attr::Color,
            })?
            .color;
        self.record_edit(previous, color, move |graph, color| {
            graph.set_paint_color(paint, color)
        })
    }
    pub fn set_thickness(&mut self, style: NodeID, thickness: f64) -> Result<(), GraphError> {
        let previous = self
            .style(style)?
            .shape()
            .ok_or(GraphError::NoSuchAttr {
                node: style,
                attr: Attr::Thickness,
            })?
            .thickness;
        self.record_edit(previous, thickness, move |graph, thickness| {
            graph.set_thickness(style, thickness)
        })
    }
    pub fn set_font_flags(&mut self, font: NodeID, flags: FontFlags) -> Result<(), GraphError> {
        let previous = match self.style(font)? {
            StyleNode::Font(font) => font.flags,
            _ => {
                return Err(GraphError::NoSuchAttr {
                    node: font,
                    attr: Attr::FontFlags,
                })
            }
        };
        self.record_edit(previous, flags, move |graph, flags| {
            graph.set_font_flags(font, flags)
        })
    }
    pub fn set_text(&mut self, shape: NodeID, text: String) -> Result<(), GraphError> {
        let previous = match &self.shape(shape)?.kind {
            ShapeKind::Text(inner) => inner.text.clone(),
            _ => {
                return Err(GraphError::NoSuchAttr {
                    node: shape,
                    attr: Attr::Text,
                })
            }
        };
        self.record_edit(previous, text, move |graph, text| graph.set_text(shape, text))
    }
    /// Flags live on the shape's state node.
    pub fn set_shape_flags(&mut self, shape: NodeID, flags: ShapeFlags) -> Result<(), GraphError> {
        let state = self.shape(shape)?.state.ok_or(GraphError::NoSuchAttr {
            node: shape,
            attr: Attr::State,
        })?;
        let previous = self.shape_state(state)?.flags;
        self.record_edit(previous, flags, move |graph, flags| {
            graph.set_shape_flags(state, flags)
        })
    }
    pub fn set_point_position(&mut self, point: NodeID, x: f64, y: f64) -> Result<(), GraphError> {
        let previous = *self.point(point)?;
        self.record_edit(
            (previous.x, previous.y),
            (x, y),
            move |graph, (x, y)| graph.set_position(point, x, y),
        )
    }
    /// Translate every point of `shapes`, descending into groups, as one edit.
    pub fn move_shapes(&mut self, shapes: &[NodeID], dx: f64, dy: f64) -> Result<(), GraphError> {
        if shapes.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        let mut points = Vec::new();
        let mut seen = hashbrown::HashSet::new();
        let mut stack = shapes.to_vec();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let shape = self.shape(id)?;
            match shape.kind.group() {
                Some(group) => stack.extend(group.shapes.iter().chain(&group.connectors)),
                None => {
                    for edge in self.edges(id)? {
                        if self.point(edge).is_ok() && seen.insert(edge) {
                            points.push(edge);
                        }
                    }
                }
            }
        }
        let points: std::rc::Rc<[NodeID]> = points.into();
        log::trace!("moving {} points by ({dx}, {dy})", points.len());
        self.record_edit(
            Move {
                dx: -dx,
                dy: -dy,
                points: points.clone(),
            },
            Move { dx, dy, points },
            Move::apply,
        )
    }
    pub fn set_value_content(&mut self, value: NodeID, content: String) -> Result<(), GraphError> {
        let previous = self.value(value)?.content.clone();
        self.record_edit(previous, content, move |graph, content| {
            graph.set_content(value, content)
        })
    }
    pub fn set_property_value(
        &mut self,
        property: NodeID,
        value: String,
    ) -> Result<(), GraphError> {
        let previous = self.property(property)?.value.clone();
        self.record_edit(previous, value, move |graph, value| {
            graph.set_property_value(property, value)
        })
    }
    pub fn set_background(&mut self, container: NodeID, color: ArgbColor) -> Result<(), GraphError> {
        let previous = self.container(container)?.background;
        self.record_edit(previous, color, move |graph, color| {
            graph.set_background(container, color)
        })
    }
    pub fn set_layer_visible(&mut self, layer: NodeID, visible: bool) -> Result<(), GraphError> {
        let previous = self.layer(layer)?.is_visible;
        self.record_edit(previous, visible, move |graph, visible| {
            graph.set_visible(layer, visible)
        })
    }
}
