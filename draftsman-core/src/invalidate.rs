//! Collaborators notified by the [observer](crate::observer) when the document changes.

use std::{cell::Cell, rc::Rc};

use crate::graph::NodeID;

/// Where redraw and cache-clear requests go. Usually the renderer.
pub trait InvalidationSink {
    /// The container's visible contents are stale.
    fn redraw(&self, container: NodeID);
    /// Rendering resources derived from style content (pens, brushes, dash patterns) are stale.
    fn clear_render_cache(&self, is_zooming: bool);
}

/// Whether the open document has unsaved content changes.
///
/// A cheap handle, clones share the flag. Owned by the editor session and handed to the observer.
#[derive(Clone, Default, Debug)]
pub struct DirtyFlag(Rc<Cell<bool>>);
impl DirtyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(&self, dirty: bool) {
        self.0.set(dirty);
    }
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.get()
    }
}

bitflags::bitflags! {
    /// What a change calls for.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Effect: u8 {
        const REDRAW = 1 << 0;
        /// Only ever alongside `REDRAW`.
        const CLEAR_CACHE = 1 << 1;
        const MARK_DIRTY = 1 << 2;
        /// Re-announce `Background` on the current container.
        const RENOTIFY_BACKGROUND = 1 << 3;
    }
}
