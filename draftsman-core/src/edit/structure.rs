//! Edits that re-shape the document: adding, removing, reordering and regrouping nodes.

use super::EditWriter;
use crate::graph::{Attr, ContainerKind, GraphError, NodeID, NodeKind, ShapeKind, Value};

impl EditWriter<'_> {
    fn expect_container(&self, id: NodeID, kind: ContainerKind) -> Result<(), GraphError> {
        if self.container(id)?.kind == kind {
            Ok(())
        } else {
            Err(GraphError::WrongKind {
                node: id,
                expected: match kind {
                    ContainerKind::Page => "Page",
                    ContainerKind::Template => "Template",
                },
            })
        }
    }

    pub fn add_document(&mut self, project: NodeID, document: NodeID) -> Result<(), GraphError> {
        self.document(document)?;
        self.insert_child(project, Attr::Documents, document, None)
    }
    pub fn remove_document(&mut self, project: NodeID, document: NodeID) -> Result<(), GraphError> {
        self.remove_child(project, Attr::Documents, document)
    }
    pub fn add_page(
        &mut self,
        document: NodeID,
        page: NodeID,
        index: Option<usize>,
    ) -> Result<(), GraphError> {
        self.expect_container(page, ContainerKind::Page)?;
        self.insert_child(document, Attr::Pages, page, index)
    }
    pub fn remove_page(&mut self, document: NodeID, page: NodeID) -> Result<(), GraphError> {
        self.remove_child(document, Attr::Pages, page)
    }
    pub fn add_template(&mut self, project: NodeID, template: NodeID) -> Result<(), GraphError> {
        self.expect_container(template, ContainerKind::Template)?;
        self.insert_child(project, Attr::Templates, template, None)
    }
    pub fn remove_template(&mut self, project: NodeID, template: NodeID) -> Result<(), GraphError> {
        self.remove_child(project, Attr::Templates, template)
    }
    /// Swap the backdrop of a page. `None` leaves the page without one.
    pub fn set_page_template(
        &mut self,
        page: NodeID,
        template: Option<NodeID>,
    ) -> Result<(), GraphError> {
        self.expect_container(page, ContainerKind::Page)?;
        if let Some(template) = template {
            self.expect_container(template, ContainerKind::Template)?;
        }
        self.set_reference(page, Attr::Template, template)
    }
    pub fn add_layer(&mut self, container: NodeID, layer: NodeID) -> Result<(), GraphError> {
        self.layer(layer)?;
        self.insert_child(container, Attr::Layers, layer, None)
    }
    pub fn remove_layer(&mut self, container: NodeID, layer: NodeID) -> Result<(), GraphError> {
        self.remove_child(container, Attr::Layers, layer)
    }

    pub fn add_shape(&mut self, layer: NodeID, shape: NodeID) -> Result<(), GraphError> {
        self.add_shapes(layer, &[shape])
    }
    /// Append several shapes to a layer as one edit.
    pub fn add_shapes(&mut self, layer: NodeID, shapes: &[NodeID]) -> Result<(), GraphError> {
        if shapes.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        for shape in shapes {
            self.shape(*shape)?;
        }
        let mut next = self.layer(layer)?.shapes.clone();
        next.extend_from_slice(shapes);
        self.set_children(layer, Attr::Shapes, next)
    }
    pub fn remove_shape(&mut self, layer: NodeID, shape: NodeID) -> Result<(), GraphError> {
        self.remove_children(layer, Attr::Shapes, &[shape])
    }
    pub fn remove_shapes(&mut self, layer: NodeID, shapes: &[NodeID]) -> Result<(), GraphError> {
        self.remove_children(layer, Attr::Shapes, shapes)
    }
    /// Move `shape` to `index` in its layer's z-order. Indices past the end move it to the top.
    pub fn reorder_shape(
        &mut self,
        layer: NodeID,
        shape: NodeID,
        index: usize,
    ) -> Result<(), GraphError> {
        let mut next = self.layer(layer)?.shapes.clone();
        let from = next
            .iter()
            .position(|id| *id == shape)
            .ok_or(GraphError::NotAChild {
                parent: layer,
                attr: Attr::Shapes,
                child: shape,
            })?;
        next.remove(from);
        next.insert(index.min(next.len()), shape);
        self.set_children(layer, Attr::Shapes, next)
    }
    /// Replace `shapes` in `layer` with a new group holding them, placed where the lowest of them
    /// was. Returns the group.
    pub fn group_shapes(&mut self, layer: NodeID, shapes: &[NodeID]) -> Result<NodeID, GraphError> {
        if shapes.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        let current = self.layer(layer)?.shapes.clone();
        let mut index = current.len();
        for shape in shapes {
            let position = current
                .iter()
                .position(|id| id == shape)
                .ok_or(GraphError::NotAChild {
                    parent: layer,
                    attr: Attr::Shapes,
                    child: *shape,
                })?;
            index = index.min(position);
        }
        // Keep z-order within the group.
        let members: Vec<NodeID> = current
            .iter()
            .copied()
            .filter(|id| shapes.contains(id))
            .collect();
        let group = self.factory().group(members, Vec::new());
        let mut next: Vec<NodeID> = current
            .iter()
            .copied()
            .filter(|id| !shapes.contains(id))
            .collect();
        next.insert(index.min(next.len()), group);
        self.set_children(layer, Attr::Shapes, next)?;
        log::debug!("grouped {} shapes into {group}", shapes.len());
        Ok(group)
    }
    /// Move `shape` out of `layer` into an existing `group`, as one edit.
    pub fn add_to_group(
        &mut self,
        layer: NodeID,
        shape: NodeID,
        group: NodeID,
    ) -> Result<(), GraphError> {
        let members = match &self.shape(group)?.kind {
            ShapeKind::Group(inner) => inner.shapes.clone(),
            _ => {
                return Err(GraphError::WrongKind {
                    node: group,
                    expected: "Group",
                })
            }
        };
        if self.group_contains(shape, group) {
            return Err(GraphError::WouldCycle {
                node: shape,
                destination: group,
            });
        }
        let current = &self.layer(layer)?.shapes;
        if !current.contains(&shape) {
            return Err(GraphError::NotAChild {
                parent: layer,
                attr: Attr::Shapes,
                child: shape,
            });
        }
        let remaining = current.iter().copied().filter(|id| *id != shape).collect();
        let mut members = members;
        members.push(shape);
        self.set_children_batch(vec![
            (layer, Attr::Shapes, remaining),
            (group, Attr::Shapes, members),
        ])
    }
    /// Replace `group` in `layer` with its shapes and connectors. The group node is left intact,
    /// so undo can put it back as it was.
    pub fn ungroup(&mut self, layer: NodeID, group: NodeID) -> Result<(), GraphError> {
        let members: Vec<NodeID> = match &self.shape(group)?.kind {
            ShapeKind::Group(inner) => inner
                .shapes
                .iter()
                .chain(&inner.connectors)
                .copied()
                .collect(),
            _ => {
                return Err(GraphError::WrongKind {
                    node: group,
                    expected: "Group",
                })
            }
        };
        let current = &self.layer(layer)?.shapes;
        let index = current
            .iter()
            .position(|id| *id == group)
            .ok_or(GraphError::NotAChild {
                parent: layer,
                attr: Attr::Shapes,
                child: group,
            })?;
        let mut next = current.clone();
        next.splice(index..=index, members);
        self.set_children(layer, Attr::Shapes, next)
    }

    pub fn add_database(&mut self, project: NodeID, database: NodeID) -> Result<(), GraphError> {
        self.database(database)?;
        self.insert_child(project, Attr::Databases, database, None)
    }
    pub fn remove_database(&mut self, project: NodeID, database: NodeID) -> Result<(), GraphError> {
        self.remove_child(project, Attr::Databases, database)
    }
    /// Add a column to a database, and an empty value for it to every record, as one edit.
    pub fn add_column(&mut self, database: NodeID, name: &str) -> Result<NodeID, GraphError> {
        let db = self.database(database)?;
        let mut columns = db.columns.clone();
        let records = db.records.clone();

        let column = self.factory().column(name);
        columns.push(column);
        let mut batch = vec![(database, Attr::Columns, columns.clone())];
        for record in records {
            let mut values = self.record(record)?.values.clone();
            let value = self.graph_mut().insert("", NodeKind::Value(Value::default()));
            values.push(value);
            batch.push((record, Attr::Columns, columns.clone()));
            batch.push((record, Attr::Values, values));
        }
        self.set_children_batch(batch)?;
        Ok(column)
    }
    /// Add a record to a database, with one value per column. Missing values are left empty.
    pub fn add_record(&mut self, database: NodeID, values: &[&str]) -> Result<NodeID, GraphError> {
        let columns = self.database(database)?.columns.clone();
        let mut contents: Vec<&str> = values.iter().copied().take(columns.len()).collect();
        contents.resize(columns.len(), "");
        let record = self.factory().record(columns, &contents);
        self.insert_child(database, Attr::Records, record, None)?;
        Ok(record)
    }
    pub fn remove_record(&mut self, database: NodeID, record: NodeID) -> Result<(), GraphError> {
        self.remove_child(database, Attr::Records, record)
    }
    /// Bind a database record to a data node, or unbind with `None`.
    pub fn set_data_record(
        &mut self,
        data: NodeID,
        record: Option<NodeID>,
    ) -> Result<(), GraphError> {
        if let Some(record) = record {
            self.record(record)?;
        }
        self.set_reference(data, Attr::Record, record)
    }
    pub fn add_property(
        &mut self,
        data: NodeID,
        name: &str,
        value: &str,
    ) -> Result<NodeID, GraphError> {
        self.data(data)?;
        let property = self.factory().property(name, value);
        self.insert_child(data, Attr::Properties, property, None)?;
        Ok(property)
    }
    pub fn remove_property(&mut self, data: NodeID, property: NodeID) -> Result<(), GraphError> {
        self.remove_child(data, Attr::Properties, property)
    }

    /// Add a style to a style library, or a group to a group library.
    pub fn add_library_item(&mut self, library: NodeID, item: NodeID) -> Result<(), GraphError> {
        match &self.node(library)?.kind {
            NodeKind::StyleLibrary(_) => {
                self.style(item)?;
            }
            NodeKind::GroupLibrary(_) => {
                if !self.shape(item)?.is_group() {
                    return Err(GraphError::WrongKind {
                        node: item,
                        expected: "Group",
                    });
                }
            }
            _ => {
                return Err(GraphError::WrongKind {
                    node: library,
                    expected: "Library",
                })
            }
        }
        self.insert_child(library, Attr::Items, item, None)
    }
    pub fn remove_library_item(&mut self, library: NodeID, item: NodeID) -> Result<(), GraphError> {
        self.remove_child(library, Attr::Items, item)
    }
    pub fn add_style_library(&mut self, project: NodeID, library: NodeID) -> Result<(), GraphError> {
        self.style_library(library)?;
        self.insert_child(project, Attr::StyleLibraries, library, None)
    }
    pub fn add_group_library(&mut self, project: NodeID, library: NodeID) -> Result<(), GraphError> {
        self.group_library(library)?;
        self.insert_child(project, Attr::GroupLibraries, library, None)
    }
}
