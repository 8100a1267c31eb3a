//! Annotation and signature records plus the snapshot that groups them
//!
//! Coordinates are stored in unscaled document space: `(x, y)` is the centre
//! of the item with a top-left origin, the way the page is laid out at
//! scale 1.0. Conversion to screen pixels happens in [`crate::coords`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable identifier assigned when an item is created.
pub type ItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Annotation,
    Signature,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Annotation => f.write_str("annotation"),
            ItemKind::Signature => f.write_str("signature"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[default]
    Text,
}

/// Free-text note placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: ItemId,
    #[serde(rename = "type", default)]
    pub kind: AnnotationKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: u32,
    pub width: f64,
}

/// Signature image placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: ItemId,
    /// `data:` URL of the image. Shared between snapshots, so committing a
    /// new snapshot never copies the image payload.
    pub data_url: Arc<str>,
    pub x: f64,
    pub y: f64,
    pub page: u32,
    pub width: f64,
}

/// Either kind of page item, so the kind always travels with the value
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Annotation(Annotation),
    Signature(Signature),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Annotation(_) => ItemKind::Annotation,
            Item::Signature(_) => ItemKind::Signature,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            Item::Annotation(a) => a.id,
            Item::Signature(s) => s.id,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            Item::Annotation(a) => a.page,
            Item::Signature(s) => s.page,
        }
    }
}

impl From<Annotation> for Item {
    fn from(annotation: Annotation) -> Self {
        Item::Annotation(annotation)
    }
}

impl From<Signature> for Item {
    fn from(signature: Signature) -> Self {
        Item::Signature(signature)
    }
}

/// One point in edit history.
///
/// Fields are only writable inside the crate; everything outside sees a
/// snapshot through a shared reference handed out by the history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) signatures: Vec<Signature>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn len_of(&self, kind: ItemKind) -> usize {
        match kind {
            ItemKind::Annotation => self.annotations.len(),
            ItemKind::Signature => self.signatures.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.signatures.is_empty()
    }

    pub fn annotation(&self, id: ItemId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn signature(&self, id: ItemId) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.id == id)
    }

    pub fn annotations_on_page(&self, page: u32) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.page == page).collect()
    }

    pub fn signatures_on_page(&self, page: u32) -> Vec<&Signature> {
        self.signatures.iter().filter(|s| s.page == page).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: ItemId, page: u32) -> Annotation {
        Annotation {
            id,
            kind: AnnotationKind::Text,
            text: format!("note {}", id),
            x: 100.0,
            y: 120.0,
            page,
            width: 200.0,
        }
    }

    #[test]
    fn test_new_snapshot_is_empty() {
        let snapshot = Snapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len_of(ItemKind::Annotation), 0);
        assert_eq!(snapshot.len_of(ItemKind::Signature), 0);
    }

    #[test]
    fn test_items_filtered_by_page() {
        let snapshot = Snapshot {
            annotations: vec![note(0, 1), note(1, 2), note(2, 1)],
            signatures: vec![],
        };
        let ids: Vec<ItemId> = snapshot.annotations_on_page(1).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(snapshot.signatures_on_page(1).is_empty());
    }

    #[test]
    fn test_annotation_json_uses_type_tag() {
        let json = serde_json::to_string(&note(7, 1)).unwrap();
        assert!(json.contains(r#""type":"text""#));
    }

    #[test]
    fn test_signature_json_uses_data_url_key() {
        let signature = Signature {
            id: 3,
            data_url: Arc::from("data:image/png;base64,AAAA"),
            x: 10.0,
            y: 20.0,
            page: 1,
            width: 200.0,
        };
        let json = serde_json::to_string(&signature).unwrap();
        assert!(json.contains(r#""dataUrl":"data:image/png;base64,AAAA""#));
    }

    #[test]
    fn test_item_reports_kind_and_page() {
        let item = Item::from(note(4, 3));
        assert_eq!(item.kind(), ItemKind::Annotation);
        assert_eq!(item.id(), 4);
        assert_eq!(item.page(), 3);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = Snapshot {
            annotations: vec![note(0, 1)],
            signatures: vec![],
        };
        let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(snapshot, restored);
    }
}
