//! # Edit
//!
//! Every recorded mutation of a document goes through an [`EditWriter`]. Each operation reads the
//! current value, records `(previous, next, setter)` in the history, then applies `next` through
//! that same setter, so undo and redo take exactly the path the original edit did.

mod properties;
mod structure;

pub use properties::Move;

use crate::factory::Factory;
use crate::graph::{Attr, DocumentGraph, GraphError, NodeID};
use crate::history::History;

pub type DocumentHistory = History<DocumentGraph, GraphError>;

/// Contents of several collection slots, applied together as one edit.
pub type SlotBatch = Vec<(NodeID, Attr, Vec<NodeID>)>;

pub struct EditWriter<'a> {
    history: &'a mut DocumentHistory,
    graph: &'a mut DocumentGraph,
}
impl std::ops::Deref for EditWriter<'_> {
    type Target = DocumentGraph;
    fn deref(&self) -> &Self::Target {
        self.graph
    }
}
impl<'a> EditWriter<'a> {
    pub fn new(history: &'a mut DocumentHistory, graph: &'a mut DocumentGraph) -> Self {
        Self { history, graph }
    }
    /// Build detached nodes, to be attached by a later edit.
    pub fn factory(&mut self) -> Factory<'_> {
        Factory::new(&mut *self.graph)
    }
    /// Unrecorded graph access, only for building detached nodes.
    pub(crate) fn graph_mut(&mut self) -> &mut DocumentGraph {
        &mut *self.graph
    }
    /// Record an edit, then apply `next`. If applying fails, the record is taken back and the
    /// history is left as it was.
    pub fn record_edit<V, F>(&mut self, previous: V, next: V, setter: F) -> Result<(), GraphError>
    where
        V: Clone + 'static,
        F: Fn(&mut DocumentGraph, V) -> Result<(), GraphError> + Clone + 'static,
    {
        self.history
            .snapshot(previous, next.clone(), setter.clone());
        if let Err(err) = setter(&mut *self.graph, next) {
            log::warn!("edit not applied: {err}");
            self.history.retract();
            return Err(err);
        }
        self.history.commit();
        Ok(())
    }
    /// Replace the contents of a collection slot.
    pub fn set_children(
        &mut self,
        id: NodeID,
        attr: Attr,
        next: Vec<NodeID>,
    ) -> Result<(), GraphError> {
        let previous = self.graph.children(id, attr)?.to_vec();
        self.record_edit(previous, next, move |graph, children| {
            graph.set_children(id, attr, children)
        })
    }
    /// Replace the contents of several collection slots in one edit. Applied in order, and
    /// restored in order.
    pub fn set_children_batch(&mut self, next: SlotBatch) -> Result<(), GraphError> {
        let previous = next
            .iter()
            .map(|(id, attr, _)| Ok((*id, *attr, self.graph.children(*id, *attr)?.to_vec())))
            .collect::<Result<SlotBatch, GraphError>>()?;
        self.record_edit(previous, next, |graph, batch: SlotBatch| {
            batch
                .into_iter()
                .try_for_each(|(id, attr, children)| graph.set_children(id, attr, children))
        })
    }
    /// Replace a single reference slot.
    pub fn set_reference(
        &mut self,
        id: NodeID,
        attr: Attr,
        next: Option<NodeID>,
    ) -> Result<(), GraphError> {
        let previous = self.graph.reference(id, attr)?;
        self.record_edit(previous, next, move |graph, reference| {
            graph.set_reference(id, attr, reference)
        })
    }
    /// Put `child` into a collection slot at `index`, or at the end if `None`.
    pub fn insert_child(
        &mut self,
        id: NodeID,
        attr: Attr,
        child: NodeID,
        index: Option<usize>,
    ) -> Result<(), GraphError> {
        let mut next = self.graph.children(id, attr)?.to_vec();
        let index = index.map_or(next.len(), |index| index.min(next.len()));
        next.insert(index, child);
        self.set_children(id, attr, next)
    }
    /// Take `child` out of a collection slot. The child stays in the graph.
    pub fn remove_child(
        &mut self,
        id: NodeID,
        attr: Attr,
        child: NodeID,
    ) -> Result<(), GraphError> {
        self.remove_children(id, attr, &[child])
    }
    /// Take every one of `children` out of a collection slot, as one edit.
    pub fn remove_children(
        &mut self,
        id: NodeID,
        attr: Attr,
        children: &[NodeID],
    ) -> Result<(), GraphError> {
        if children.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        let current = self.graph.children(id, attr)?;
        if let Some(missing) = children.iter().find(|child| !current.contains(child)) {
            return Err(GraphError::NotAChild {
                parent: id,
                attr,
                child: *missing,
            });
        }
        let next = current
            .iter()
            .copied()
            .filter(|child| !children.contains(child))
            .collect();
        self.set_children(id, attr, next)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::factory::DefaultProject;
    use crate::history::HistoryError;

    pub(crate) struct Session {
        pub graph: DocumentGraph,
        pub history: DocumentHistory,
        pub built: DefaultProject,
    }
    impl Session {
        pub fn new() -> Self {
            let mut graph = DocumentGraph::new();
            let built = Factory::new(&mut graph).default_project("Project1");
            Self {
                graph,
                history: DocumentHistory::new(),
                built,
            }
        }
        pub fn writer(&mut self) -> EditWriter<'_> {
            EditWriter::new(&mut self.history, &mut self.graph)
        }
        pub fn factory(&mut self) -> Factory<'_> {
            Factory::new(&mut self.graph)
        }
        pub fn undo(&mut self) {
            self.history.undo(&mut self.graph).unwrap();
        }
        pub fn redo(&mut self) {
            self.history.redo(&mut self.graph).unwrap();
        }
        pub fn undo_all(&mut self) {
            while self.history.can_undo() {
                self.undo();
            }
        }
        pub fn shapes(&self) -> Vec<NodeID> {
            self.graph.layer(self.built.layer).unwrap().shapes.clone()
        }
    }

    #[test]
    fn records_then_applies() {
        let mut session = Session::new();
        let shape = session.factory().line(0.0, 0.0, 1.0, 1.0, None);
        let layer = session.built.layer;
        session
            .writer()
            .insert_child(layer, Attr::Shapes, shape, None)
            .unwrap();
        assert_eq!(session.shapes(), vec![shape]);
        assert_eq!(session.history.cursor(), 1);

        session.undo();
        assert!(session.shapes().is_empty());
        session.redo();
        assert_eq!(session.shapes(), vec![shape]);
    }
    #[test]
    fn failed_apply_is_retracted() {
        let mut session = Session::new();
        let layer = session.built.layer;
        let ghost = NodeID::default();
        assert_eq!(
            session.writer().insert_child(layer, Attr::Shapes, ghost, None),
            Err(GraphError::UnknownNode(ghost))
        );
        assert!(session.history.is_empty());
        assert!(session.shapes().is_empty());
        assert_eq!(
            session.history.undo(&mut session.graph),
            Err(HistoryError::NothingToUndo)
        );
    }
    #[test]
    fn rejected_edit_at_limit_keeps_history() {
        let mut session = Session::new();
        session.history = DocumentHistory::with_limit(Some(2));
        let layer = session.built.layer;
        let original = session.graph.node(layer).unwrap().name.clone();
        let mut writer = session.writer();
        writer.rename(layer, "a".into()).unwrap();
        writer.rename(layer, "b".into()).unwrap();
        let ghost = NodeID::default();
        assert_eq!(
            writer.insert_child(layer, Attr::Shapes, ghost, None),
            Err(GraphError::UnknownNode(ghost))
        );
        assert_eq!(session.history.len(), 2);

        session.undo_all();
        assert_eq!(session.graph.node(layer).unwrap().name, original);
    }
    #[test]
    fn removal_requires_membership() {
        let mut session = Session::new();
        let shape = session.factory().line(0.0, 0.0, 1.0, 1.0, None);
        let layer = session.built.layer;
        assert_eq!(
            session.writer().remove_child(layer, Attr::Shapes, shape),
            Err(GraphError::NotAChild {
                parent: layer,
                attr: Attr::Shapes,
                child: shape
            })
        );
        assert_eq!(
            session.writer().remove_children(layer, Attr::Shapes, &[]),
            Err(GraphError::EmptySelection)
        );
        assert!(session.history.is_empty());
    }
    #[test]
    fn batch_is_one_step() {
        let mut session = Session::new();
        let mut factory = session.factory();
        let first = factory.line(0.0, 0.0, 1.0, 1.0, None);
        let second = factory.layer("Layer2");
        let (layer, page) = (session.built.layer, session.built.page);
        session
            .writer()
            .set_children_batch(vec![
                (layer, Attr::Shapes, vec![first]),
                (page, Attr::Layers, vec![layer, second]),
            ])
            .unwrap();
        assert_eq!(session.history.len(), 1);
        session.undo();
        assert!(session.shapes().is_empty());
        assert_eq!(session.graph.container(page).unwrap().layers, vec![layer]);
    }
}
