//! An editing session over one open project: its graph, its undo history, the observer keeping
//! the renderer and dirty flag informed, and the user's focus.

use std::rc::Rc;

use draftsman_core::{
    history::HistoryError,
    invalidate::{DirtyFlag, InvalidationSink},
    Attr, ChangeObserver, DocumentGraph, DocumentHistory, EditWriter, GraphError, NodeID,
    ObserverHandle,
};

use crate::settings::Settings;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EditorError {
    #[error("no project is open")]
    NoProject,
    #[error(transparent)]
    Graph(#[from] GraphError),
}

struct OpenProject {
    graph: DocumentGraph,
    project: NodeID,
    observer: ObserverHandle,
}

pub struct Editor {
    sink: Rc<dyn InvalidationSink>,
    history: DocumentHistory,
    dirty: DirtyFlag,
    open: Option<OpenProject>,
}
impl Editor {
    #[must_use]
    pub fn new(sink: Rc<dyn InvalidationSink>, settings: &Settings) -> Self {
        Self {
            sink,
            history: DocumentHistory::with_limit(settings.history_limit),
            dirty: DirtyFlag::new(),
            open: None,
        }
    }
    /// Open `project` of `graph`, closing whatever was open before.
    pub fn load(&mut self, graph: DocumentGraph, project: NodeID) -> Result<(), EditorError> {
        self.close();
        let observer = ChangeObserver::attach(&graph, project, self.sink.clone(), self.dirty.clone())?;
        log::debug!(
            "loaded {project} ({} nodes, {} observed)",
            graph.len(),
            observer.tracked()
        );
        self.open = Some(OpenProject {
            graph,
            project,
            observer,
        });
        self.dirty.set(false);
        Ok(())
    }
    /// Stop observing and forget the history. Returns the graph that was open, if any.
    pub fn close(&mut self) -> Option<DocumentGraph> {
        let open = self.open.take()?;
        open.observer.detach(&open.graph);
        self.history.reset();
        self.dirty.set(false);
        log::debug!("closed {}", open.project);
        Some(open.graph)
    }
    #[must_use]
    pub fn graph(&self) -> Option<&DocumentGraph> {
        self.open.as_ref().map(|open| &open.graph)
    }
    #[must_use]
    pub fn project(&self) -> Option<NodeID> {
        self.open.as_ref().map(|open| open.project)
    }
    /// Run recorded mutations against the open project.
    pub fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut EditWriter<'_>) -> Result<R, GraphError>,
    ) -> Result<R, EditorError> {
        let open = self.open.as_mut().ok_or(EditorError::NoProject)?;
        let mut writer = EditWriter::new(&mut self.history, &mut open.graph);
        Ok(f(&mut writer)?)
    }
    /// Returns whether anything was undone. Failures are logged, and leave the history as it was.
    pub fn undo(&mut self) -> bool {
        let Some(open) = self.open.as_mut() else {
            return false;
        };
        match self.history.undo(&mut open.graph) {
            Ok(()) => true,
            Err(HistoryError::NothingToUndo) => false,
            Err(e) => {
                log::error!("undo failed: {e:#}");
                false
            }
        }
    }
    /// Returns whether anything was redone. Failures are logged, and leave the history as it was.
    pub fn redo(&mut self) -> bool {
        let Some(open) = self.open.as_mut() else {
            return false;
        };
        match self.history.redo(&mut open.graph) {
            Ok(()) => true,
            Err(HistoryError::NothingToRedo) => false,
            Err(e) => {
                log::error!("redo failed: {e:#}");
                false
            }
        }
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
    #[must_use]
    pub fn history(&self) -> &DocumentHistory {
        &self.history
    }
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
    pub fn mark_saved(&self) {
        self.dirty.set(false);
    }

    // Focus. Not recorded, and never dirties the document.

    fn open_mut(&mut self) -> Result<&mut OpenProject, EditorError> {
        self.open.as_mut().ok_or(EditorError::NoProject)
    }
    /// Show a page or template.
    pub fn select_container(&mut self, container: NodeID) -> Result<(), EditorError> {
        let open = self.open_mut()?;
        open.graph.container(container)?;
        open.graph
            .set_reference(open.project, Attr::CurrentContainer, Some(container))?;
        Ok(())
    }
    /// Make `layer` the current layer of the current container.
    pub fn select_layer(&mut self, layer: NodeID) -> Result<(), EditorError> {
        let container = self.current_container()?;
        let open = self.open_mut()?;
        if !open.graph.container(container)?.layers.contains(&layer) {
            return Err(GraphError::NotAChild {
                parent: container,
                attr: Attr::Layers,
                child: layer,
            }
            .into());
        }
        open.graph
            .set_reference(container, Attr::CurrentLayer, Some(layer))?;
        Ok(())
    }
    /// Make `shape` the current shape of the current container, or clear it with `None`.
    /// The shape must be on one of the container's layers, possibly within a group.
    pub fn select_shape(&mut self, shape: Option<NodeID>) -> Result<(), EditorError> {
        let container = self.current_container()?;
        let open = self.open_mut()?;
        if let Some(shape) = shape {
            open.graph.shape(shape)?;
            let mut on_layers = false;
            for layer in &open.graph.container(container)?.layers {
                let shapes = &open.graph.layer(*layer)?.shapes;
                if shapes.iter().any(|top| open.graph.group_contains(*top, shape)) {
                    on_layers = true;
                    break;
                }
            }
            if !on_layers {
                return Err(GraphError::NotAChild {
                    parent: container,
                    attr: Attr::Shapes,
                    child: shape,
                }
                .into());
            }
        }
        open.graph
            .set_reference(container, Attr::CurrentShape, shape)?;
        Ok(())
    }
    /// Select an item of a style or group library, or clear the selection with `None`.
    pub fn select_library_item(
        &mut self,
        library: NodeID,
        item: Option<NodeID>,
    ) -> Result<(), EditorError> {
        let open = self.open_mut()?;
        if let Some(item) = item {
            if !open.graph.children(library, Attr::Items)?.contains(&item) {
                return Err(GraphError::NotAChild {
                    parent: library,
                    attr: Attr::Items,
                    child: item,
                }
                .into());
            }
        }
        open.graph.set_reference(library, Attr::Selected, item)?;
        Ok(())
    }
    fn current_container(&self) -> Result<NodeID, EditorError> {
        let open = self.open.as_ref().ok_or(EditorError::NoProject)?;
        let container = open.graph.project(open.project)?.current_container;
        container.ok_or(EditorError::Graph(GraphError::NoSuchAttr {
            node: open.project,
            attr: Attr::CurrentContainer,
        }))
    }
}
impl Drop for Editor {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};

    use draftsman_core::factory::{DefaultProject, Factory};
    use draftsman_core::graph::ShapeKind;

    use super::*;

    #[derive(Default)]
    struct Sink {
        redraws: RefCell<Vec<NodeID>>,
        cache_clears: Cell<usize>,
    }
    impl InvalidationSink for Sink {
        fn redraw(&self, container: NodeID) {
            self.redraws.borrow_mut().push(container);
        }
        fn clear_render_cache(&self, _: bool) {
            self.cache_clears.set(self.cache_clears.get() + 1);
        }
    }

    fn open(settings: &Settings) -> (Editor, Rc<Sink>, DefaultProject) {
        let mut graph = DocumentGraph::new();
        let built = Factory::new(&mut graph).default_project("Project1");
        let sink = Rc::new(Sink::default());
        let mut editor = Editor::new(sink.clone(), settings);
        editor.load(graph, built.project).unwrap();
        (editor, sink, built)
    }

    #[test]
    fn add_rectangle_then_undo() {
        let (mut editor, sink, built) = open(&Settings::default());
        assert!(!editor.is_dirty());

        let shape = editor
            .edit(|writer| {
                let shape = writer
                    .factory()
                    .rectangle(0.0, 0.0, 30.0, 20.0, Some(built.style));
                writer.add_shape(built.layer, shape)?;
                Ok(shape)
            })
            .unwrap();
        assert!(editor.is_dirty());
        assert!(editor.can_undo());
        assert_eq!(sink.redraws.borrow().as_slice(), &[built.page]);
        assert_eq!(sink.cache_clears.get(), 0);
        let graph = editor.graph().unwrap();
        assert_eq!(graph.subscriber_count(shape), 1);
        let top_left = match &graph.shape(shape).unwrap().kind {
            ShapeKind::Rectangle(boxed) => boxed.top_left.unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(graph.subscriber_count(top_left), 1);

        assert!(editor.undo());
        let graph = editor.graph().unwrap();
        assert!(graph.layer(built.layer).unwrap().shapes.is_empty());
        assert_eq!(graph.subscriber_count(shape), 0);
        assert_eq!(graph.subscriber_count(top_left), 0);
        assert_eq!(graph.subscriber_count(built.style), 1);
        assert!(!editor.undo());

        assert!(editor.redo());
        assert_eq!(editor.graph().unwrap().subscriber_count(top_left), 1);
        assert!(!editor.redo());
    }
    #[test]
    fn failed_undo_keeps_cursor() {
        let (mut editor, _, _) = open(&Settings::default());
        editor
            .edit(|writer| {
                writer.record_edit(false, true, |_, applied| {
                    if applied {
                        Ok(())
                    } else {
                        Err(GraphError::EmptySelection)
                    }
                })
            })
            .unwrap();
        assert!(!editor.undo());
        assert!(editor.can_undo());
        assert_eq!(editor.history().cursor(), 1);
    }
    #[test]
    fn focus_is_not_recorded() {
        let (mut editor, sink, built) = open(&Settings::default());
        let (template, style_library, style) = (built.template, built.style_library, built.style);
        editor.select_container(template).unwrap();
        let template_layer = editor.graph().unwrap().container(template).unwrap().layers[0];
        editor.select_layer(template_layer).unwrap();
        editor.select_shape(None).unwrap();
        editor.select_library_item(style_library, Some(style)).unwrap();
        assert!(!editor.is_dirty());
        assert!(!editor.can_undo());
        // Redraws follow the newly current container.
        assert_eq!(sink.redraws.borrow().last(), Some(&template));

        assert!(matches!(
            editor.select_layer(built.layer),
            Err(EditorError::Graph(GraphError::NotAChild { .. }))
        ));
        assert!(matches!(
            editor.select_container(built.layer),
            Err(EditorError::Graph(GraphError::WrongKind { .. }))
        ));
        editor
            .edit(|writer| writer.rename(built.layer, "Background".into()))
            .unwrap();
        assert!(editor.is_dirty());
        editor.mark_saved();
        assert!(!editor.is_dirty());
    }
    #[test]
    fn selected_shape_must_be_shown() {
        let (mut editor, _, built) = open(&Settings::default());
        let (loose, grouped, group) = editor
            .edit(|writer| {
                let mut factory = writer.factory();
                let loose = factory.line(0.0, 0.0, 1.0, 1.0, None);
                let grouped = factory.line(0.0, 0.0, 2.0, 2.0, None);
                let group = factory.group(vec![grouped], vec![]);
                writer.add_shape(built.layer, group)?;
                Ok((loose, grouped, group))
            })
            .unwrap();

        editor.select_shape(Some(group)).unwrap();
        editor.select_shape(Some(grouped)).unwrap();
        assert_eq!(
            editor.select_shape(Some(loose)),
            Err(EditorError::Graph(GraphError::NotAChild {
                parent: built.page,
                attr: Attr::Shapes,
                child: loose,
            }))
        );
        let current = editor
            .graph()
            .unwrap()
            .reference(built.page, Attr::CurrentShape)
            .unwrap();
        assert_eq!(current, Some(grouped));

        // Shapes of another container don't count.
        editor.select_container(built.template).unwrap();
        assert!(editor.select_shape(Some(group)).is_err());
        editor.select_shape(None).unwrap();
    }
    #[test]
    fn reload_starts_clean() {
        let (mut editor, _, built) = open(&Settings::default());
        editor
            .edit(|writer| writer.rename(built.page, "Cover".into()))
            .unwrap();
        assert!(editor.is_dirty());

        let graph = editor.close().unwrap();
        assert_eq!(graph.subscription_count(), 0);
        assert!(!editor.can_undo());
        assert_eq!(
            editor.edit(|writer| writer.rename(built.page, "x".into())),
            Err(EditorError::NoProject)
        );
        assert!(!editor.undo());

        editor.load(graph, built.project).unwrap();
        assert!(!editor.is_dirty());
        assert!(!editor.can_undo());
        assert_eq!(editor.graph().unwrap().node(built.page).unwrap().name, "Cover");
    }
    #[test]
    fn history_limit_from_settings() {
        let settings = Settings {
            history_limit: Some(2),
            ..Settings::default()
        };
        let (mut editor, _, built) = open(&settings);
        for name in ["a", "b", "c"] {
            editor
                .edit(|writer| writer.rename(built.layer, name.into()))
                .unwrap();
        }
        assert_eq!(editor.history().len(), 2);
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert_eq!(editor.graph().unwrap().node(built.layer).unwrap().name, "a");
    }
}
