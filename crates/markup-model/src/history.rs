//! Linear undo/redo over whole-state snapshots.

use crate::annotation::{PenStroke, TextAnnotation};
use std::sync::Arc;

/// Full annotation state at one point in time.
///
/// Collections are shared between snapshots; a mutation replaces only the collection it touches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    texts: Arc<Vec<TextAnnotation>>,
    strokes: Arc<Vec<PenStroke>>,
}

impl Snapshot {
    pub fn new(texts: Vec<TextAnnotation>, strokes: Vec<PenStroke>) -> Self {
        Self { texts: Arc::new(texts), strokes: Arc::new(strokes) }
    }

    pub fn texts(&self) -> &[TextAnnotation] {
        &self.texts
    }

    pub fn strokes(&self) -> &[PenStroke] {
        &self.strokes
    }

    pub fn with_texts(&self, texts: Vec<TextAnnotation>) -> Self {
        Self { texts: Arc::new(texts), strokes: Arc::clone(&self.strokes) }
    }

    pub fn with_strokes(&self, strokes: Vec<PenStroke>) -> Self {
        Self { texts: Arc::clone(&self.texts), strokes: Arc::new(strokes) }
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.strokes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn shares_strokes_with(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.strokes, &other.strokes)
    }
}

/// Snapshots plus a cursor. The snapshot under the cursor is the displayed state.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self { snapshots: vec![Snapshot::default()], cursor: 0 }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    /// Drops every redo state, then makes `snapshot` current.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }

        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }

        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: u32) -> TextAnnotation {
        TextAnnotation {
            id,
            page: 1,
            x: 0.0,
            y: 0.0,
            text: format!("t{id}"),
            font_size: 12.0,
            width: 100.0,
            height: 20.0,
        }
    }

    #[test]
    fn starts_with_single_empty_snapshot() {
        let history = History::new();

        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_are_noops_at_the_boundaries() {
        let mut history = History::new();
        assert!(!history.undo());
        assert_eq!(history.cursor(), 0);

        history.push(Snapshot::new(vec![text(1)], Vec::new()));
        assert!(!history.redo());
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut history = History::new();
        history.push(Snapshot::new(vec![text(1)], Vec::new()));
        history.push(Snapshot::new(vec![text(1), text(2)], Vec::new()));

        assert!(history.undo());
        assert!(history.undo());
        history.push(Snapshot::new(vec![text(3)], Vec::new()));

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().texts()[0].id, 3);
    }

    #[test]
    fn replacing_texts_shares_the_stroke_collection() {
        let base = Snapshot::default();
        let next = base.with_texts(vec![text(1)]);

        assert!(next.shares_strokes_with(&base));
        assert_eq!(next.texts().len(), 1);
    }
}
