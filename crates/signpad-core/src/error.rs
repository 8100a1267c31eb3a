use crate::document::Mode;
use crate::model::{ItemId, ItemKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignpadError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        kind: ItemKind,
        index: usize,
        len: usize,
    },

    #[error("No {kind} with id {id}")]
    UnknownItem { kind: ItemKind, id: ItemId },

    #[error("Page {page} is out of range (1-{total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("No document loaded")]
    NoDocument,

    #[error("Operation requires {required} mode, session is in {current} mode")]
    ModeMismatch { required: Mode, current: Mode },

    #[error("Previous action has not settled yet")]
    Busy,

    #[error("Failed to render PDF: {0}")]
    Render(String),

    #[error("Invalid signature image: {0}")]
    Image(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SignpadError>;
