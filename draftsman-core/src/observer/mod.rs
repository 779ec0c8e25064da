//! # Observer
//!
//! Keeps one subscription per reachable node of a project, following the graph as it is
//! re-shaped, and turns changes into redraws, render cache clears and the dirty flag.
//!
//! Nodes may be reachable along several paths (a style shared by many shapes, a template shared
//! by many pages, a point shared by connectors). Each tracked node carries a count of the edges
//! leading to it, and is only unsubscribed when the last of them goes away.

mod dispatch;

use std::{cell::Cell, cell::RefCell, rc::Rc};

use hashbrown::hash_map::Entry as MapEntry;
use smallvec::SmallVec;

use crate::graph::{Attr, Change, ChangeListener, DocumentGraph, GraphError, ListenerID, NodeID, Swap};
use crate::invalidate::{DirtyFlag, Effect, InvalidationSink};

struct Entry {
    /// Number of edges (plus one for the root) leading here. Never zero while in the table.
    count: usize,
    /// The node's edges as of its last structural change, which is what releasing it walks.
    edges: SmallVec<[NodeID; 8]>,
    /// False for ids that were dangling when first reached.
    subscribed: bool,
}

pub struct ChangeObserver {
    root: NodeID,
    table: RefCell<hashbrown::HashMap<NodeID, Entry>>,
    sink: Rc<dyn InvalidationSink>,
    dirty: DirtyFlag,
    /// `None` once detached.
    listener: Cell<Option<ListenerID>>,
}
impl ChangeObserver {
    /// Subscribe to `project` and everything reachable from it.
    pub fn attach(
        graph: &DocumentGraph,
        project: NodeID,
        sink: Rc<dyn InvalidationSink>,
        dirty: DirtyFlag,
    ) -> Result<ObserverHandle, GraphError> {
        graph.project(project)?;
        let observer = Rc::new(Self {
            root: project,
            table: RefCell::default(),
            sink,
            dirty,
            listener: Cell::new(None),
        });
        let listener = graph.register(observer.clone());
        observer.listener.set(Some(listener));
        observer.retain(graph, listener, [project]);
        log::debug!(
            "observing {project}: {} nodes",
            observer.table.borrow().len()
        );
        Ok(ObserverHandle { observer })
    }
    /// Count one more edge into each of `ids`, subscribing to any reached for the first time
    /// and, transitively, to their edges.
    fn retain(
        &self,
        graph: &DocumentGraph,
        listener: ListenerID,
        ids: impl IntoIterator<Item = NodeID>,
    ) {
        let mut stack: Vec<NodeID> = ids.into_iter().collect();
        let mut table = self.table.borrow_mut();
        while let Some(id) = stack.pop() {
            match table.entry(id) {
                MapEntry::Occupied(mut entry) => entry.get_mut().count += 1,
                MapEntry::Vacant(vacant) => {
                    let (edges, subscribed) = match graph.edges(id) {
                        Ok(edges) => (edges, true),
                        Err(err) => {
                            log::warn!("not observing {id}: {err}");
                            (SmallVec::new(), false)
                        }
                    };
                    if subscribed {
                        if let Err(err) = graph.subscribe(id, listener) {
                            log::error!("{err}");
                            debug_assert!(false, "{err}");
                        }
                    }
                    stack.extend(edges.iter().copied());
                    vacant.insert(Entry {
                        count: 1,
                        edges,
                        subscribed,
                    });
                }
            }
        }
    }
    /// Inverse of [`Self::retain`]. Nodes whose count reaches zero are unsubscribed and release
    /// the edges stored for them.
    fn release(
        &self,
        graph: &DocumentGraph,
        listener: ListenerID,
        ids: impl IntoIterator<Item = NodeID>,
    ) {
        let mut stack: Vec<NodeID> = ids.into_iter().collect();
        let mut table = self.table.borrow_mut();
        while let Some(id) = stack.pop() {
            let MapEntry::Occupied(mut entry) = table.entry(id) else {
                log::error!("released {id} more often than it was retained");
                debug_assert!(false, "unbalanced release of {id}");
                continue;
            };
            entry.get_mut().count -= 1;
            if entry.get().count > 0 {
                continue;
            }
            let entry = entry.remove();
            if entry.subscribed {
                if let Err(err) = graph.unsubscribe(id, listener) {
                    log::error!("{err}");
                    debug_assert!(false, "{err}");
                }
            }
            stack.extend(entry.edges);
        }
    }
    /// Follow a structural change of `node`. Ids on both sides of the swap keep their
    /// subscription throughout.
    fn follow(&self, graph: &DocumentGraph, listener: ListenerID, node: NodeID, swap: &Swap) {
        let mut removed: SmallVec<[NodeID; 4]> = SmallVec::new();
        let mut added = swap.added.clone();
        for id in &swap.removed {
            if let Some(position) = added.iter().position(|other| other == id) {
                added.swap_remove(position);
            } else {
                removed.push(*id);
            }
        }
        if removed.is_empty() && added.is_empty() {
            return;
        }
        {
            let mut table = self.table.borrow_mut();
            let Some(entry) = table.get_mut(&node) else {
                log::error!("swap on untracked {node}");
                debug_assert!(false, "swap on untracked {node}");
                return;
            };
            for id in &removed {
                if let Some(position) = entry.edges.iter().position(|edge| edge == id) {
                    entry.edges.remove(position);
                }
            }
            entry.edges.extend(added.iter().copied());
            #[cfg(debug_assertions)]
            if let Ok(mut actual) = graph.edges(node) {
                let mut stored = entry.edges.clone();
                stored.sort_unstable();
                actual.sort_unstable();
                if stored != actual {
                    log::error!("stored edges of {node} diverged from the graph");
                    debug_assert!(false, "stored edges of {node} diverged from the graph");
                }
            }
        }
        self.release(graph, listener, removed);
        self.retain(graph, listener, added);
    }
    fn current_container(&self, graph: &DocumentGraph) -> Option<NodeID> {
        graph
            .project(self.root)
            .ok()
            .and_then(|project| project.current_container)
    }
    fn apply(&self, graph: &DocumentGraph, change: &Change, effect: Effect) {
        if effect.contains(Effect::MARK_DIRTY) {
            self.dirty.set(true);
        }
        if effect.contains(Effect::CLEAR_CACHE) {
            self.sink.clear_render_cache(false);
        }
        let current = self.current_container(graph);
        if effect.contains(Effect::REDRAW) {
            match current {
                Some(container) => self.sink.redraw(container),
                None => log::trace!("no current container to redraw for {}", change.node),
            }
        }
        if effect.contains(Effect::RENOTIFY_BACKGROUND) {
            if let Some(container) = current.filter(|container| *container != change.node) {
                graph.notify(container, Attr::Background);
            }
        }
    }
}
impl ChangeListener for ChangeObserver {
    fn changed(&self, graph: &DocumentGraph, change: &Change) {
        let Some(listener) = self.listener.get() else {
            return;
        };
        if let Some(swap) = &change.swap {
            self.follow(graph, listener, change.node, swap);
        }
        let Ok(node) = graph.node(change.node) else {
            return;
        };
        let effect = dispatch::effect(&node.kind, change.attr);
        self.apply(graph, change, effect);
    }
}

/// Owns an attached [`ChangeObserver`]. Must be [detached](Self::detach) before the graph goes
/// away, as the graph keeps the observer alive otherwise.
pub struct ObserverHandle {
    observer: Rc<ChangeObserver>,
}
impl ObserverHandle {
    #[must_use]
    pub fn root(&self) -> NodeID {
        self.observer.root
    }
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.observer.listener.get().is_some()
    }
    /// How many distinct nodes are observed.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.observer.table.borrow().len()
    }
    /// How many edges (or the root) lead to `id`, zero if it is not observed.
    #[must_use]
    pub fn retain_count(&self, id: NodeID) -> usize {
        self.observer
            .table
            .borrow()
            .get(&id)
            .map_or(0, |entry| entry.count)
    }
    /// Unsubscribe from everything. Does nothing the second time.
    pub fn detach(&self, graph: &DocumentGraph) {
        let observer = &self.observer;
        let Some(listener) = observer.listener.take() else {
            return;
        };
        observer.release(graph, listener, [observer.root]);
        let leftovers: Vec<(NodeID, Entry)> = observer.table.borrow_mut().drain().collect();
        if !leftovers.is_empty() {
            // Only reachable through a cycle, which keeps counts above zero.
            log::warn!(
                "{} nodes still observed after releasing {}",
                leftovers.len(),
                observer.root
            );
            for (id, entry) in leftovers {
                if entry.subscribed {
                    if let Err(err) = graph.unsubscribe(id, listener) {
                        log::error!("{err}");
                    }
                }
            }
        }
        match graph.unregister(listener) {
            Ok(0) => (),
            Ok(dangling) => log::error!("{dangling} subscriptions outlived observer of {}", observer.root),
            Err(err) => log::error!("{err}"),
        }
        log::debug!("stopped observing {}", observer.root);
    }
}
impl Drop for ObserverHandle {
    fn drop(&mut self) {
        if self.is_attached() {
            log::warn!("observer of {} dropped while attached", self.observer.root);
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::color::ArgbColor;
    use crate::factory::{DefaultProject, Factory};
    use crate::graph::{NodeKind, Point, ShapeKind};

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
    impl Sink {
        fn take(&self) -> (usize, usize) {
            let redraws = self.redraws.borrow_mut().drain(..).count();
            (redraws, self.cache_clears.replace(0))
        }
    }

    struct Fixture {
        graph: DocumentGraph,
        built: DefaultProject,
        sink: Rc<Sink>,
        dirty: DirtyFlag,
        handle: ObserverHandle,
    }
    impl Fixture {
        fn new() -> Self {
            let mut graph = DocumentGraph::new();
            let built = Factory::new(&mut graph).default_project("Project1");
            let sink = Rc::new(Sink::default());
            let dirty = DirtyFlag::new();
            let handle =
                ChangeObserver::attach(&graph, built.project, sink.clone(), dirty.clone()).unwrap();
            Self {
                graph,
                built,
                sink,
                dirty,
                handle,
            }
        }
        fn add_to_layer(&mut self, shape: NodeID) {
            let mut shapes = self.graph.layer(self.built.layer).unwrap().shapes.clone();
            shapes.push(shape);
            self.graph
                .set_children(self.built.layer, Attr::Shapes, shapes)
                .unwrap();
        }
        fn reachable(&self) -> usize {
            let mut seen = hashbrown::HashSet::new();
            let mut stack = vec![self.built.project];
            while let Some(id) = stack.pop() {
                if seen.insert(id) {
                    stack.extend(self.graph.edges(id).unwrap());
                }
            }
            seen.len()
        }
    }
    impl Drop for Fixture {
        fn drop(&mut self) {
            self.handle.detach(&self.graph);
        }
    }

    #[test]
    fn subscribes_everything_reachable() {
        let fixture = Fixture::new();
        let reachable = fixture.reachable();
        assert_eq!(fixture.handle.tracked(), reachable);
        assert_eq!(fixture.graph.subscription_count(), reachable);
        // Styles live in the library, so the library is the only path to them.
        assert_eq!(fixture.handle.retain_count(fixture.built.style), 1);
        assert!(!fixture.dirty.get());
    }
    #[test]
    fn detach_leaves_nothing_behind() {
        let mut fixture = Fixture::new();
        let style = Some(fixture.built.style);
        let shape = Factory::new(&mut fixture.graph).rectangle(0.0, 0.0, 1.0, 1.0, style);
        fixture.add_to_layer(shape);
        fixture.sink.take();

        fixture.handle.detach(&fixture.graph);
        assert!(!fixture.handle.is_attached());
        assert_eq!(fixture.graph.subscription_count(), 0);
        assert_eq!(fixture.handle.tracked(), 0);

        let top_left = match &fixture.graph.shape(shape).unwrap().kind {
            ShapeKind::Rectangle(boxed) => boxed.top_left.unwrap(),
            _ => unreachable!(),
        };
        fixture.graph.set_position(top_left, 5.0, 5.0).unwrap();
        fixture.graph.set_thickness(fixture.built.style, 4.0).unwrap();
        assert_eq!(fixture.sink.take(), (0, 0));
        // Second detach is a no-op.
        fixture.handle.detach(&fixture.graph);
    }
    #[test]
    fn add_rectangle_scenario() {
        let mut fixture = Fixture::new();
        let style = Some(fixture.built.style);
        let shape = Factory::new(&mut fixture.graph).rectangle(0.0, 0.0, 10.0, 10.0, style);
        let before = fixture.handle.tracked();
        fixture.add_to_layer(shape);

        // The shape, its state, data and two points are new; the style was already observed.
        assert_eq!(fixture.handle.tracked(), before + 5);
        assert_eq!(fixture.handle.retain_count(fixture.built.style), 2);
        assert!(fixture.dirty.get());
        let redraws = fixture.sink.redraws.borrow().clone();
        assert_eq!(redraws, vec![fixture.built.page]);
        assert_eq!(fixture.sink.cache_clears.get(), 0);

        // Point changes redraw without touching the cache.
        fixture.sink.take();
        let bottom_right = match &fixture.graph.shape(shape).unwrap().kind {
            ShapeKind::Rectangle(boxed) => boxed.bottom_right.unwrap(),
            _ => unreachable!(),
        };
        fixture.graph.translate(bottom_right, 1.0, 1.0).unwrap();
        assert_eq!(fixture.sink.take(), (1, 0));
    }
    #[test]
    fn shared_style_survives_removal() {
        let mut fixture = Fixture::new();
        let style = Some(fixture.built.style);
        let mut factory = Factory::new(&mut fixture.graph);
        let first = factory.rectangle(0.0, 0.0, 1.0, 1.0, style);
        let second = factory.ellipse(0.0, 0.0, 1.0, 1.0, style);
        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![first, second])
            .unwrap();
        let style = fixture.built.style;
        assert_eq!(fixture.handle.retain_count(style), 3);

        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![second])
            .unwrap();
        assert_eq!(fixture.graph.subscriber_count(first), 0);
        assert_eq!(fixture.graph.subscriber_count(style), 1);
        assert_eq!(fixture.handle.retain_count(style), 2);

        // Pulling the style out of the library leaves the remaining shape's path.
        fixture
            .graph
            .set_children(fixture.built.style_library, Attr::Items, vec![])
            .unwrap();
        assert_eq!(fixture.graph.subscriber_count(style), 1);
        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![])
            .unwrap();
        assert_eq!(fixture.graph.subscriber_count(style), 0);
        assert_eq!(fixture.handle.tracked(), fixture.reachable());
    }
    #[test]
    fn swap_keeps_survivors_subscribed() {
        let mut fixture = Fixture::new();
        let mut factory = Factory::new(&mut fixture.graph);
        let first = factory.line(0.0, 0.0, 1.0, 1.0, None);
        let second = factory.line(0.0, 0.0, 1.0, 1.0, None);
        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![first, second])
            .unwrap();
        // Reorder: nothing is gained or lost.
        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![second, first])
            .unwrap();
        assert_eq!(fixture.handle.retain_count(first), 1);
        assert_eq!(fixture.handle.retain_count(second), 1);
        assert_eq!(fixture.graph.subscription_count(), fixture.reachable());
    }
    #[test]
    fn shared_points_are_counted() {
        let mut fixture = Fixture::new();
        let mut factory = Factory::new(&mut fixture.graph);
        let start = factory.point(0.0, 0.0);
        let end = factory.point(5.0, 5.0);
        let first = factory.connector(start, end, None);
        let second = factory.connector(end, start, None);
        let group = factory.group(vec![], vec![first, second]);
        fixture.add_to_layer(group);
        assert_eq!(fixture.handle.retain_count(start), 2);

        fixture
            .graph
            .set_children(group, Attr::Connectors, vec![second])
            .unwrap();
        assert_eq!(fixture.handle.retain_count(start), 1);
        assert_eq!(fixture.graph.subscriber_count(start), 1);
        assert_eq!(fixture.graph.subscription_count(), fixture.reachable());
    }
    #[test]
    fn focus_changes_are_not_dirty() {
        let mut fixture = Fixture::new();
        let (page, layer, project) = (
            fixture.built.page,
            fixture.built.layer,
            fixture.built.project,
        );
        fixture
            .graph
            .set_reference(page, Attr::CurrentLayer, Some(layer))
            .unwrap();
        fixture
            .graph
            .set_reference(project, Attr::CurrentDatabase, None)
            .unwrap();
        fixture
            .graph
            .set_reference(fixture.built.style_library, Attr::Selected, None)
            .unwrap();
        assert!(!fixture.dirty.get());
        assert_eq!(fixture.sink.take().0, 3);

        fixture.graph.set_name(layer, "Renamed".into()).unwrap();
        assert!(fixture.dirty.get());
    }
    #[test]
    fn only_style_changes_clear_cache() {
        let mut fixture = Fixture::new();
        let stroke = fixture
            .graph
            .style(fixture.built.style)
            .unwrap()
            .shape()
            .unwrap()
            .stroke
            .unwrap();
        fixture
            .graph
            .set_paint_color(stroke, ArgbColor::WHITE)
            .unwrap();
        assert_eq!(fixture.sink.take(), (1, 1));
        fixture.graph.set_thickness(fixture.built.style, 3.0).unwrap();
        assert_eq!(fixture.sink.take(), (1, 1));

        let point = fixture.graph.insert("", NodeKind::Point(Point::default()));
        fixture
            .graph
            .set_background(fixture.built.page, ArgbColor::BLACK)
            .unwrap();
        assert_eq!(fixture.sink.take(), (1, 0));
        // Unobserved nodes are silent.
        fixture.graph.set_position(point, 1.0, 1.0).unwrap();
        assert_eq!(fixture.sink.take(), (0, 0));
    }
    #[test]
    fn template_background_reaches_page() {
        struct Recorder(RefCell<Vec<(NodeID, Attr)>>);
        impl ChangeListener for Recorder {
            fn changed(&self, _: &DocumentGraph, change: &Change) {
                self.0.borrow_mut().push((change.node, change.attr));
            }
        }
        let mut fixture = Fixture::new();
        let recorder = Rc::new(Recorder(RefCell::default()));
        let listener = fixture.graph.register(recorder.clone());
        fixture.graph.subscribe(fixture.built.page, listener).unwrap();

        fixture
            .graph
            .set_background(fixture.built.template, ArgbColor::BLACK)
            .unwrap();
        assert_eq!(
            recorder.0.borrow().as_slice(),
            &[(fixture.built.page, Attr::Background)]
        );
        // Once for the template, once for the page re-notification.
        assert_eq!(fixture.sink.take(), (2, 0));
        assert_eq!(fixture.graph.unregister(listener), Ok(1));
    }
    #[test]
    fn no_current_container_skips_redraw() {
        let mut fixture = Fixture::new();
        fixture
            .graph
            .set_reference(fixture.built.project, Attr::CurrentContainer, None)
            .unwrap();
        fixture.graph.set_name(fixture.built.layer, "x".into()).unwrap();
        assert_eq!(fixture.sink.take(), (0, 0));
        assert!(fixture.dirty.get());
    }
    #[test]
    fn removed_group_stops_notifying() {
        let mut fixture = Fixture::new();
        let mut factory = Factory::new(&mut fixture.graph);
        let line = factory.line(0.0, 0.0, 1.0, 1.0, None);
        let group = factory.group(vec![line], vec![]);
        fixture.add_to_layer(group);
        assert_eq!(
            fixture
                .graph
                .set_children(group, Attr::Shapes, vec![line, group]),
            Err(GraphError::WouldCycle {
                node: group,
                destination: group
            })
        );
        assert_eq!(fixture.handle.retain_count(group), 1);

        fixture
            .graph
            .set_children(fixture.built.layer, Attr::Shapes, vec![])
            .unwrap();
        assert_eq!(fixture.handle.retain_count(group), 0);
        assert_eq!(fixture.graph.subscriber_count(group), 0);
        fixture.sink.take();
        fixture.graph.set_name(group, "detached".into()).unwrap();
        assert_eq!(fixture.sink.take(), (0, 0));
        assert_eq!(fixture.graph.subscription_count(), fixture.reachable());
    }
    #[test]
    fn attach_requires_project() {
        let mut graph = DocumentGraph::new();
        let layer = Factory::new(&mut graph).layer("Layer");
        let result = ChangeObserver::attach(
            &graph,
            layer,
            Rc::new(Sink::default()),
            DirtyFlag::new(),
        );
        assert!(matches!(result, Err(GraphError::WrongKind { .. })));
    }
}
