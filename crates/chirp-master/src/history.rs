//! Undo/redo stacks of whole-buffer snapshots.

use std::sync::Arc;

use chirp_ir::SampleBuffer;

/// Undo/redo history for one sound.
///
/// Entries are shared buffers, so undo followed by redo hands back the very
/// allocation that was current before, not a copy.
#[derive(Default)]
pub struct History {
    undo: Vec<Arc<SampleBuffer>>,
    redo: Vec<Arc<SampleBuffer>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `buffer` as the state before a new edit. Any redo branch is
    /// discarded.
    pub fn record_before_edit(&mut self, buffer: Arc<SampleBuffer>) {
        self.undo.push(buffer);
        self.redo.clear();
    }

    /// Step back: `current` moves to the redo stack and the previous buffer
    /// is returned. `None` (and no change) when there is nothing to undo.
    pub fn undo(&mut self, current: Arc<SampleBuffer>) -> Option<Arc<SampleBuffer>> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward again; the mirror image of `undo`.
    pub fn redo(&mut self, current: Arc<SampleBuffer>) -> Option<Arc<SampleBuffer>> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    /// Forget everything, e.g. when a different sound is opened.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
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

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(v: f32) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::new(vec![v; 4], 1000))
    }

    #[test]
    fn undo_at_bottom_returns_none() {
        let mut history = History::new();
        let current = buf(0.0);
        assert!(history.undo(current).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn redo_at_top_returns_none() {
        let mut history = History::new();
        history.record_before_edit(buf(0.0));
        assert!(history.redo(buf(1.0)).is_none());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn undo_then_redo_returns_same_allocation() {
        let mut history = History::new();
        let b0 = buf(0.0);
        let b1 = buf(1.0);
        history.record_before_edit(b0.clone());

        let back = history.undo(b1.clone()).unwrap();
        assert!(Arc::ptr_eq(&back, &b0));
        let forward = history.redo(back).unwrap();
        assert!(Arc::ptr_eq(&forward, &b1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn identical_content_is_still_a_distinct_entry() {
        let mut history = History::new();
        let a = buf(0.5);
        let b = buf(0.5);
        history.record_before_edit(a.clone());
        let back = history.undo(b).unwrap();
        assert!(Arc::ptr_eq(&back, &a));
    }

    #[test]
    fn n_undos_then_n_redos_walk_the_chain() {
        let mut history = History::new();
        let buffers: Vec<_> = (0..5).map(|i| buf(i as f32)).collect();
        // buffers[i] was current before commit i + 1
        for b in &buffers[..4] {
            history.record_before_edit(b.clone());
        }

        let mut current = buffers[4].clone();
        for _ in 0..4 {
            current = history.undo(current).unwrap();
        }
        assert!(Arc::ptr_eq(&current, &buffers[0]));
        assert!(history.undo(current.clone()).is_none());

        for _ in 0..4 {
            current = history.redo(current).unwrap();
        }
        assert!(Arc::ptr_eq(&current, &buffers[4]));
    }

    #[test]
    fn new_edit_after_undo_truncates_redo() {
        let mut history = History::new();
        let b0 = buf(0.0);
        let b1 = buf(1.0);
        history.record_before_edit(b0.clone());

        let current = history.undo(b1).unwrap();
        assert!(history.can_redo());

        history.record_before_edit(current);
        assert!(!history.can_redo());
        assert!(history.redo(buf(2.0)).is_none());
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut history = History::new();
        history.record_before_edit(buf(0.0));
        history.record_before_edit(buf(1.0));
        let _ = history.undo(buf(2.0));
        history.clear();
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
    }
}
