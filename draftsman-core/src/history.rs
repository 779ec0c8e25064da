//! # History
//!
//! A linear undo/redo stack. Rather than one command type per kind of change, every edit is recorded
//! as a `(previous, next, setter)` triple over whatever value the change touched: a collection, a
//! scalar, or a composite of several. The recorded setter is all that's needed to travel in either
//! direction.
//!
//! Recording never applies anything. The caller applies `next` itself, right after recording, then
//! either [`commit`](History::commit)s the edit or [`retract`](History::retract)s it if applying failed.
//!
//! Edits before the cursor can be undone, edits at and after it can be redone. Recording while
//! there are edits to redo discards them.

/// A recorded, reversible change to some `T`.
pub trait Edit<T, E> {
    fn undo(&self, target: &mut T) -> Result<(), E>;
    fn redo(&self, target: &mut T) -> Result<(), E>;
}

/// The one [`Edit`] implementation: a setter and the two values it may be called with.
struct Snapshot<V, F> {
    previous: V,
    next: V,
    setter: F,
}
impl<T, E, V, F> Edit<T, E> for Snapshot<V, F>
where
    V: Clone,
    F: Fn(&mut T, V) -> Result<(), E>,
{
    fn undo(&self, target: &mut T) -> Result<(), E> {
        (self.setter)(target, self.previous.clone())
    }
    fn redo(&self, target: &mut T) -> Result<(), E> {
        (self.setter)(target, self.next.clone())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HistoryError<E: std::error::Error + 'static> {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    /// The edit's setter failed. The cursor did not move.
    #[error("failed to apply edit")]
    Setter(#[source] E),
}

pub struct History<T, E> {
    edits: Vec<Box<dyn Edit<T, E>>>,
    /// Count of edits currently applied.
    cursor: usize,
    /// Maximum edits retained, oldest are forgotten first.
    limit: Option<usize>,
}
impl<T, E> Default for History<T, E> {
    fn default() -> Self {
        Self {
            edits: Vec::new(),
            cursor: 0,
            limit: None,
        }
    }
}
impl<T, E: std::error::Error + 'static> History<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// A history retaining at most `limit` edits, or unbounded if `None`.
    #[must_use]
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
    /// Record an edit. Does *not* apply it: call `setter(next)` yourself right after, then
    /// [`commit`](Self::commit) or [`retract`](Self::retract).
    ///
    /// No checks are made on the values, an edit where `previous == next` is recorded all the same.
    /// Nothing is forgotten until the edit is committed.
    pub fn snapshot<V, F>(&mut self, previous: V, next: V, setter: F)
    where
        V: Clone + 'static,
        F: Fn(&mut T, V) -> Result<(), E> + 'static,
    {
        // Branching off - the old future is gone.
        self.edits.truncate(self.cursor);
        self.edits.push(Box::new(Snapshot {
            previous,
            next,
            setter,
        }));
        self.cursor += 1;
    }
    /// Accept the most recently recorded edit as applied, forgetting the oldest edits beyond the limit.
    pub fn commit(&mut self) {
        if let Some(limit) = self.limit {
            let excess = self.edits.len().saturating_sub(limit);
            if excess > 0 {
                self.edits.drain(..excess);
                self.cursor -= excess;
            }
        }
    }
    /// Forget the most recently recorded edit without running its setter, for when applying it failed.
    /// Returns `false` if there was nothing to forget.
    pub fn retract(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.edits.truncate(self.cursor);
        self.edits.pop();
        self.cursor -= 1;
        true
    }
    /// Restore the previous value of the edit before the cursor.
    /// On error the cursor stays put, and the edit may be retried.
    pub fn undo(&mut self, target: &mut T) -> Result<(), HistoryError<E>> {
        let index = self
            .cursor
            .checked_sub(1)
            .ok_or(HistoryError::NothingToUndo)?;
        self.edits[index]
            .undo(target)
            .map_err(HistoryError::Setter)?;
        self.cursor = index;
        Ok(())
    }
    /// Re-apply the next value of the edit at the cursor.
    /// On error the cursor stays put, and the edit may be retried.
    pub fn redo(&mut self, target: &mut T) -> Result<(), HistoryError<E>> {
        let edit = self
            .edits
            .get(self.cursor)
            .ok_or(HistoryError::NothingToRedo)?;
        edit.redo(target).map_err(HistoryError::Setter)?;
        self.cursor += 1;
        Ok(())
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.edits.len()
    }
    /// Forget everything. No setters are run.
    pub fn reset(&mut self) {
        self.edits.clear();
        self.cursor = 0;
    }
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    /// Number of recorded edits, on both sides of the cursor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
