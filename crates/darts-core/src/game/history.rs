use std::collections::VecDeque;

pub const DEFAULT_DEPTH: usize = 200;

/// Snapshot based undo/redo. Undo restores a whole state, never a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoHistory<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    depth: usize,
}

impl<T: Clone> UndoHistory<T> {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Remember `state` before it is mutated. Invalidates the redo stack.
    pub fn record(&mut self, state: T) {
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(state);
        self.redo.clear();
    }

    /// Swap `current` for the last recorded state.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Swap `current` for the last undone state.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

impl<T: Clone> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::UndoHistory;

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = UndoHistory::new();
        history.record(1);
        history.record(2);
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), None);
        assert_eq!(history.redo(1), Some(2));
        assert_eq!(history.redo(2), Some(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_clears_redo() {
        let mut history = UndoHistory::new();
        history.record("a");
        assert_eq!(history.undo("b"), Some("a"));
        assert!(history.can_redo());
        history.record("a");
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_drops_oldest() {
        let mut history = UndoHistory::with_depth(2);
        history.record(1);
        history.record(2);
        history.record(3);
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), None);
    }
}
