//! Linear undo/redo history of snapshots
//!
//! `entries` is never empty and `entries[0]` is the empty starting state.
//! The cursor always points at a valid entry; that entry is what every
//! reader renders. Committing after an undo discards the redo branch.

use crate::model::Snapshot;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: vec![Snapshot::default()],
            cursor: 0,
        }
    }

    /// Push `snapshot` as the new current state, dropping anything after
    /// the cursor.
    pub fn commit(&mut self, snapshot: Snapshot) {
        let discarded = self.entries.len() - 1 - self.cursor;
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
        debug!(cursor = self.cursor, discarded, "committed snapshot");
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "undo");
        true
    }

    /// Step forward one entry. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "redo");
        true
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() - 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of entries, including the initial empty one.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(Snapshot::default());
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationKind, Item, Signature};
    use crate::mutation;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn text_on(page: u32, id: u64) -> Item {
        Item::Annotation(Annotation {
            id,
            kind: AnnotationKind::Text,
            text: format!("note on page {}", page),
            x: 120.0,
            y: 80.0,
            page,
            width: 200.0,
        })
    }

    fn signature_on(page: u32, id: u64) -> Item {
        Item::Signature(Signature {
            id,
            data_url: Arc::from("data:image/png;base64,AAAA"),
            x: 200.0,
            y: 500.0,
            page,
            width: 200.0,
        })
    }

    fn commit_add(history: &mut History, item: Item) {
        let (next, _) = mutation::add(history.current(), item);
        history.commit(next);
    }

    #[test]
    fn test_new_history_has_single_empty_entry() {
        let history = History::new();
        assert_eq!(history.depth(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_and_redo_saturate() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.cursor(), 0);

        commit_add(&mut history, text_on(1, 0));
        assert!(!history.redo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_commit_after_undo_discards_redo_branch() {
        let mut history = History::new();
        commit_add(&mut history, text_on(1, 0));
        commit_add(&mut history, text_on(1, 1));
        history.undo();
        assert!(history.can_redo());

        commit_add(&mut history, text_on(2, 2));
        assert!(!history.can_redo());
        assert_eq!(history.depth(), 3);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_walkthrough_scenario() {
        let mut history = History::new();

        commit_add(&mut history, text_on(1, 0));
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.current().annotations().len(), 1);
        let after_first = history.current().clone();

        history.undo();
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current().annotations().len(), 0);

        history.redo();
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.current(), &after_first);

        commit_add(&mut history, signature_on(1, 1));
        assert_eq!(history.cursor(), 2);

        history.undo();
        history.undo();
        assert_eq!(history.cursor(), 0);

        commit_add(&mut history, text_on(2, 2));
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.depth(), 2);
        assert!(history.current().signatures().is_empty());
        assert_eq!(history.current().annotations()[0].page, 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_reset_from_any_depth() {
        let mut history = History::new();
        for id in 0..5 {
            commit_add(&mut history, text_on(1, id));
        }
        history.undo();
        history.reset();
        assert_eq!(history.depth(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::{Annotation, AnnotationKind, Item};
    use crate::mutation;
    use proptest::prelude::*;

    fn note(id: u64, page: u32) -> Item {
        Item::Annotation(Annotation {
            id,
            kind: AnnotationKind::Text,
            text: String::from("x"),
            x: 0.0,
            y: 0.0,
            page,
            width: 10.0,
        })
    }

    proptest! {
        /// Property: a commit after undos drops exactly the undone entries
        #[test]
        fn commit_discards_only_the_redo_branch(
            pages in prop::collection::vec(1u32..5, 1..20),
            back in 0usize..20,
        ) {
            let mut history = History::new();
            for (id, page) in pages.iter().enumerate() {
                let (next, _) = mutation::add(history.current(), note(id as u64, *page));
                history.commit(next);
            }
            for _ in 0..back {
                history.undo();
            }
            let kept = history.cursor();
            let base = history.current().clone();

            let (next, _) = mutation::add(&base, note(1000, 1));
            history.commit(next);

            prop_assert_eq!(history.depth(), kept + 2);
            prop_assert!(!history.can_redo());
            prop_assert!(history.undo());
            prop_assert_eq!(history.current(), &base);
        }

        /// Property: undo followed by redo returns to the same snapshot
        #[test]
        fn undo_then_redo_is_identity(pages in prop::collection::vec(1u32..5, 1..20), back in 0usize..20) {
            let mut history = History::new();
            for (id, page) in pages.iter().enumerate() {
                let (next, _) = mutation::add(history.current(), note(id as u64, *page));
                history.commit(next);
            }
            for _ in 0..back {
                history.undo();
            }
            prop_assume!(history.can_undo());
            let before = history.current().clone();
            let cursor = history.cursor();
            history.undo();
            history.redo();
            prop_assert_eq!(history.current(), &before);
            prop_assert_eq!(history.cursor(), cursor);
        }
    }
}
