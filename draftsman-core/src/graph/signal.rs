//! Change notification.
//!
//! Listeners are registered with the graph once, then subscribed node by node. Dispatch happens on
//! the mutating call's own stack, after the mutation and before the mutator returns. Listeners are
//! free to subscribe, unsubscribe and re-notify while being dispatched to.

use std::{cell::RefCell, rc::Rc};

use super::{Attr, DocumentGraph, GraphError, NodeID};

pub struct ListenerMarker;
pub type ListenerID = crate::id::StableID<ListenerMarker>;

/// Contents of a structural slot before and after it was replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Swap {
    pub removed: smallvec::SmallVec<[NodeID; 4]>,
    pub added: smallvec::SmallVec<[NodeID; 4]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub node: NodeID,
    pub attr: Attr,
    /// Present when `attr` is an edge of `node`.
    pub swap: Option<Swap>,
}

pub trait ChangeListener {
    /// Called once per change of a node this listener is subscribed to.
    /// `graph` already reflects the change.
    fn changed(&self, graph: &DocumentGraph, change: &Change);
}

#[derive(Default)]
struct Registry {
    listeners: hashbrown::HashMap<ListenerID, Rc<dyn ChangeListener>>,
    subscriptions: hashbrown::HashMap<NodeID, smallvec::SmallVec<[ListenerID; 2]>>,
}

#[derive(Default)]
pub(super) struct Signal {
    registry: RefCell<Registry>,
}
impl Signal {
    pub fn register(&self, listener: Rc<dyn ChangeListener>) -> ListenerID {
        let id = ListenerID::default();
        self.registry.borrow_mut().listeners.insert(id, listener);
        id
    }
    /// Remove the listener and any subscriptions it still holds, returning how many were dropped.
    pub fn unregister(&self, listener: ListenerID) -> Result<usize, GraphError> {
        let mut registry = self.registry.borrow_mut();
        if registry.listeners.remove(&listener).is_none() {
            return Err(GraphError::UnknownListener(listener));
        }
        let mut dropped = 0;
        registry.subscriptions.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|id| *id != listener);
            dropped += before - listeners.len();
            !listeners.is_empty()
        });
        Ok(dropped)
    }
    pub fn subscribe(&self, node: NodeID, listener: ListenerID) -> Result<(), GraphError> {
        let mut registry = self.registry.borrow_mut();
        if !registry.listeners.contains_key(&listener) {
            return Err(GraphError::UnknownListener(listener));
        }
        let listeners = registry.subscriptions.entry(node).or_default();
        if listeners.contains(&listener) {
            return Err(GraphError::AlreadySubscribed { node, listener });
        }
        listeners.push(listener);
        Ok(())
    }
    pub fn unsubscribe(&self, node: NodeID, listener: ListenerID) -> Result<(), GraphError> {
        let mut registry = self.registry.borrow_mut();
        let hashbrown::hash_map::Entry::Occupied(mut entry) = registry.subscriptions.entry(node)
        else {
            return Err(GraphError::NotSubscribed { node, listener });
        };
        let listeners = entry.get_mut();
        let Some(position) = listeners.iter().position(|id| *id == listener) else {
            return Err(GraphError::NotSubscribed { node, listener });
        };
        listeners.remove(position);
        if listeners.is_empty() {
            entry.remove();
        }
        Ok(())
    }
    pub fn subscriber_count(&self, node: NodeID) -> usize {
        self.registry
            .borrow()
            .subscriptions
            .get(&node)
            .map_or(0, smallvec::SmallVec::len)
    }
    pub fn subscription_count(&self) -> usize {
        self.registry
            .borrow()
            .subscriptions
            .values()
            .map(smallvec::SmallVec::len)
            .sum()
    }
    /// Snapshot of the listeners of `node`. The registry borrow is released before returning,
    /// so the listeners may freely call back into the graph.
    pub fn targets(&self, node: NodeID) -> smallvec::SmallVec<[Rc<dyn ChangeListener>; 2]> {
        let registry = self.registry.borrow();
        let Some(ids) = registry.subscriptions.get(&node) else {
            return smallvec::SmallVec::new();
        };
        ids.iter()
            .filter_map(|id| registry.listeners.get(id).cloned())
            .collect()
    }
}
