//! Bounded undo/redo log of whole-set snapshots.

use chrono::{DateTime, Utc};

/// Default number of entries kept before the oldest is dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// What kind of edit an entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistoryAction {
    Create,
    Delete,
    Move,
    Resize,
    EditVertex,
    InsertVertex,
    Import,
    Clear,
}

/// One recorded edit: the full state before and after.
#[derive(Clone, Debug)]
pub struct HistoryEntry<T> {
    pub action: HistoryAction,
    pub previous_state: T,
    pub new_state: T,
    pub timestamp: DateTime<Utc>,
}

/// A linear, cursor-addressed history.
///
/// `cursor` counts the entries currently applied: entries before it can be
/// undone, entries at or after it can be redone. Pushing while entries are
/// waiting to be redone discards them.
#[derive(Clone, Debug)]
pub struct History<T> {
    entries: Vec<HistoryEntry<T>>,
    cursor: usize,
    max_entries: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T> History<T> {
    /// Creates an empty history holding at most `max_entries` (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Records an edit, truncating any redo branch and evicting the oldest
    /// entry once the cap is exceeded.
    pub fn push(&mut self, action: HistoryAction, previous_state: T, new_state: T) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry {
            action,
            previous_state,
            new_state,
            timestamp: Utc::now(),
        });
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len();
    }

    /// Steps back one entry and returns the state before it, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor].previous_state)
    }

    /// Re-applies one entry and returns the state after it, or `None` at the tail.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor - 1].new_state)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently applied.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_boundaries() {
        let mut history: History<u32> = History::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());

        history.push(HistoryAction::Create, 0, 1);
        history.push(HistoryAction::Move, 1, 2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut history: History<u32> = History::default();
        history.push(HistoryAction::Create, 0, 1);
        history.push(HistoryAction::Move, 1, 2);
        history.push(HistoryAction::Move, 2, 3);
        history.undo();
        history.undo();

        history.push(HistoryAction::Resize, 1, 10);
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&10));
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history: History<u32> = History::new(3);
        for i in 0..5 {
            history.push(HistoryAction::Move, i, i + 1);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.entries()[0].previous_state, 2);

        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_cap_after_undo() {
        let mut history: History<u32> = History::new(2);
        history.push(HistoryAction::Move, 0, 1);
        history.push(HistoryAction::Move, 1, 2);
        history.undo();
        history.push(HistoryAction::Move, 1, 5);
        history.push(HistoryAction::Move, 5, 6);
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.entries()[0].new_state, 5);
    }
}
