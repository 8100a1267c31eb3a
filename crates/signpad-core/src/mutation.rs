//! Pure snapshot transformations
//!
//! Every function takes the current snapshot by reference and returns a new
//! one; the input is never touched. Positional functions mirror how the
//! front end addresses items in a rendered list, the `*_by_id` variants
//! resolve a stable id to its current position first.

use crate::error::{Result, SignpadError};
use crate::model::{Item, ItemId, ItemKind, Snapshot};

/// Append `item` to its collection, returning the new snapshot and the
/// item's position in it.
///
/// The page is not checked against the document here.
pub fn add(snapshot: &Snapshot, item: Item) -> (Snapshot, usize) {
    let mut next = snapshot.clone();
    let index = match item {
        Item::Annotation(annotation) => {
            next.annotations.push(annotation);
            next.annotations.len() - 1
        }
        Item::Signature(signature) => {
            next.signatures.push(signature);
            next.signatures.len() - 1
        }
    };
    (next, index)
}

/// Replace the item at `index` of `item`'s collection wholesale.
pub fn update(snapshot: &Snapshot, index: usize, item: Item) -> Result<Snapshot> {
    check_index(snapshot, item.kind(), index)?;

    let mut next = snapshot.clone();
    match item {
        Item::Annotation(annotation) => next.annotations[index] = annotation,
        Item::Signature(signature) => next.signatures[index] = signature,
    }
    Ok(next)
}

/// Drop the item at `index`; later items shift down by one.
pub fn remove(snapshot: &Snapshot, kind: ItemKind, index: usize) -> Result<Snapshot> {
    check_index(snapshot, kind, index)?;

    let mut next = snapshot.clone();
    match kind {
        ItemKind::Annotation => {
            next.annotations.remove(index);
        }
        ItemKind::Signature => {
            next.signatures.remove(index);
        }
    }
    Ok(next)
}

/// Current position of the item with `id`, if it is in the snapshot.
pub fn position_of(snapshot: &Snapshot, kind: ItemKind, id: ItemId) -> Option<usize> {
    match kind {
        ItemKind::Annotation => snapshot.annotations.iter().position(|a| a.id == id),
        ItemKind::Signature => snapshot.signatures.iter().position(|s| s.id == id),
    }
}

/// Replace the item carrying the same id as `item`.
pub fn update_by_id(snapshot: &Snapshot, item: Item) -> Result<Snapshot> {
    let index = resolve(snapshot, item.kind(), item.id())?;
    update(snapshot, index, item)
}

pub fn remove_by_id(snapshot: &Snapshot, kind: ItemKind, id: ItemId) -> Result<Snapshot> {
    let index = resolve(snapshot, kind, id)?;
    remove(snapshot, kind, index)
}

fn resolve(snapshot: &Snapshot, kind: ItemKind, id: ItemId) -> Result<usize> {
    position_of(snapshot, kind, id).ok_or(SignpadError::UnknownItem { kind, id })
}

fn check_index(snapshot: &Snapshot, kind: ItemKind, index: usize) -> Result<()> {
    let len = snapshot.len_of(kind);
    if index >= len {
        return Err(SignpadError::IndexOutOfRange { kind, index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationKind, Signature};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn text(id: ItemId, body: &str) -> Item {
        Item::Annotation(Annotation {
            id,
            kind: AnnotationKind::Text,
            text: body.to_string(),
            x: 50.0,
            y: 60.0,
            page: 1,
            width: 200.0,
        })
    }

    fn signature(id: ItemId) -> Item {
        Item::Signature(Signature {
            id,
            data_url: Arc::from("data:image/png;base64,AAAA"),
            x: 300.0,
            y: 400.0,
            page: 1,
            width: 200.0,
        })
    }

    fn texts(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.annotations().iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn test_add_returns_last_index() {
        let (one, first) = add(&Snapshot::new(), text(0, "a"));
        let (two, second) = add(&one, text(1, "b"));
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(texts(&two), vec!["a", "b"]);
    }

    #[test]
    fn test_add_leaves_input_untouched() {
        let base = Snapshot::new();
        let (next, _) = add(&base, signature(0));
        assert!(base.is_empty());
        assert_eq!(next.signatures().len(), 1);
        assert!(next.annotations().is_empty());
    }

    #[test]
    fn test_update_replaces_whole_item() {
        let (base, index) = add(&Snapshot::new(), text(0, "draft"));
        let next = update(&base, index, text(0, "final")).unwrap();
        assert_eq!(texts(&next), vec!["final"]);
        assert_eq!(texts(&base), vec!["draft"]);
    }

    #[test]
    fn test_update_out_of_range() {
        let (base, _) = add(&Snapshot::new(), text(0, "only"));
        let err = update(&base, 1, text(0, "x")).unwrap_err();
        assert_eq!(
            err,
            SignpadError::IndexOutOfRange {
                kind: ItemKind::Annotation,
                index: 1,
                len: 1
            }
        );
    }

    #[test]
    fn test_update_checks_the_items_own_collection() {
        let (base, _) = add(&Snapshot::new(), text(0, "only"));
        let err = update(&base, 0, signature(1)).unwrap_err();
        assert!(matches!(
            err,
            SignpadError::IndexOutOfRange {
                kind: ItemKind::Signature,
                ..
            }
        ));
    }

    #[test]
    fn test_remove_shifts_later_items() {
        let (s, _) = add(&Snapshot::new(), text(0, "a"));
        let (s, _) = add(&s, text(1, "b"));
        let (s, _) = add(&s, text(2, "c"));
        let next = remove(&s, ItemKind::Annotation, 0).unwrap();
        assert_eq!(texts(&next), vec!["b", "c"]);
        assert_eq!(position_of(&next, ItemKind::Annotation, 2), Some(1));
    }

    #[test]
    fn test_remove_out_of_range_on_empty() {
        let err = remove(&Snapshot::new(), ItemKind::Signature, 0).unwrap_err();
        assert!(matches!(err, SignpadError::IndexOutOfRange { len: 0, .. }));
    }

    #[test]
    fn test_remove_then_add_does_not_resurrect() {
        let (s, _) = add(&Snapshot::new(), text(0, "gone"));
        let s = remove(&s, ItemKind::Annotation, 0).unwrap();
        let (s, index) = add(&s, text(1, "fresh"));
        assert_eq!(index, 0);
        assert_eq!(texts(&s), vec!["fresh"]);
        assert_eq!(position_of(&s, ItemKind::Annotation, 0), None);
    }

    #[test]
    fn test_update_by_id_follows_shifted_position() {
        let (s, _) = add(&Snapshot::new(), text(10, "a"));
        let (s, _) = add(&s, text(11, "b"));
        let s = remove_by_id(&s, ItemKind::Annotation, 10).unwrap();
        let s = update_by_id(&s, text(11, "b2")).unwrap();
        assert_eq!(texts(&s), vec!["b2"]);
    }

    #[test]
    fn test_by_id_unknown_item() {
        let err = remove_by_id(&Snapshot::new(), ItemKind::Signature, 42).unwrap_err();
        assert_eq!(
            err,
            SignpadError::UnknownItem {
                kind: ItemKind::Signature,
                id: 42
            }
        );
    }
}
