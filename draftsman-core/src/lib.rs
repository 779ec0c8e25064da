//! Document graph, undo history and change observation for a vector drawing editor.

pub mod color;
pub mod edit;
pub mod factory;
pub mod graph;
pub mod history;
pub mod id;
pub mod invalidate;
pub mod observer;

pub use edit::{DocumentHistory, EditWriter};
pub use graph::{Attr, DocumentGraph, GraphError, NodeID};
pub use observer::{ChangeObserver, ObserverHandle};
