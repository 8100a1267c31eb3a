//! PDF annotation and signing engine
//!
//! Loads a PDF, places text annotations and signature images on its pages,
//! keeps a linear undo/redo history of those edits and writes them back into
//! the document with lopdf.
//!
//! [`EditorSession`] is the entry point. It checks every request, turns it
//! into a pure [`mutation`] of the current [`Snapshot`] and commits the
//! result to the [`History`].

pub mod config;
pub mod coords;
pub mod document;
pub mod error;
pub mod export;
pub mod guard;
pub mod history;
pub mod image;
pub mod model;
pub mod mutation;
pub mod render;
pub mod session;

pub use config::EditorConfig;
pub use document::{DocumentState, Mode};
pub use error::{Result, SignpadError};
pub use export::{apply_snapshot, ExportOptions};
pub use guard::{ActionGuard, ActionToken};
pub use history::History;
pub use model::{Annotation, AnnotationKind, Item, ItemId, ItemKind, Signature, Snapshot};
pub use render::{DocumentInfo, LoadedDocument, PageSurface, RenderBackend};
pub use session::{AnnotationDraft, EditorSession, SignatureDraft};
