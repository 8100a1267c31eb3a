//! Editor session
//!
//! One session per open document. It owns the document state, the edit
//! history, the action guard and the id allocator, and is the only way the
//! interaction layer changes any of them.
//!
//! Every mutating call follows the same order: check preconditions (mode,
//! document, page, draft contents), acquire the guard, compute the next
//! snapshot, commit. A call that fails at any step leaves history as it was
//! and does not keep the guard.

use crate::config::EditorConfig;
use crate::document::{DocumentState, Mode};
use crate::error::{Result, SignpadError};
use crate::export::{apply_snapshot, ExportOptions};
use crate::guard::{ActionGuard, ActionToken};
use crate::history::History;
use crate::image::decode_data_url;
use crate::model::{Annotation, AnnotationKind, Item, ItemId, ItemKind, Signature, Snapshot};
use crate::mutation;
use crate::render::{DocumentInfo, LoadedDocument, PageSurface, RenderBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Contents of a text annotation as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDraft {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: u32,
    /// Falls back to the configured width on add and to the current width
    /// on update
    #[serde(default)]
    pub width: Option<f64>,
}

/// Signature image and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDraft {
    pub data_url: String,
    pub x: f64,
    pub y: f64,
    pub page: u32,
    #[serde(default)]
    pub width: Option<f64>,
}

impl AnnotationDraft {
    fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(SignpadError::Validation(
                "Annotation text is empty".to_string(),
            ));
        }
        validate_placement(self.x, self.y, self.width)
    }

    fn into_item(self, id: ItemId, width: f64) -> Item {
        Item::Annotation(Annotation {
            id,
            kind: AnnotationKind::Text,
            text: self.text,
            x: self.x,
            y: self.y,
            page: self.page,
            width,
        })
    }
}

impl SignatureDraft {
    fn validate(&self) -> Result<()> {
        decode_data_url(&self.data_url).map_err(|e| SignpadError::Validation(e.to_string()))?;
        validate_placement(self.x, self.y, self.width)
    }

    fn into_item(self, id: ItemId, width: f64) -> Item {
        Item::Signature(Signature {
            id,
            data_url: Arc::from(self.data_url),
            x: self.x,
            y: self.y,
            page: self.page,
            width,
        })
    }
}

fn validate_placement(x: f64, y: f64, width: Option<f64>) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(SignpadError::Validation(format!(
            "Position ({}, {}) is not finite",
            x, y
        )));
    }
    if let Some(width) = width {
        if !width.is_finite() || width <= 0.0 {
            return Err(SignpadError::Validation(format!(
                "Width must be positive, got {}",
                width
            )));
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct EditorSession {
    state: DocumentState,
    history: History,
    guard: ActionGuard,
    next_id: ItemId,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: DocumentState::new(config),
            history: History::new(),
            guard: ActionGuard::new(),
            next_id: 0,
        }
    }

    /// Start a session on an uploaded file.
    pub fn open(name: &str, bytes: &[u8], config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(config);
        session.load(name, bytes)?;
        Ok(session)
    }

    /// Replace the document. History starts over; ids keep counting.
    ///
    /// On failure the previous document and history are kept.
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<&DocumentInfo> {
        let loaded = LoadedDocument::load(name, bytes).inspect_err(|e| {
            warn!(file = name, error = %e, "rejected document");
        })?;
        info!(
            file = name,
            pages = loaded.page_count(),
            size = bytes.len(),
            "loaded document"
        );

        self.state.set_document(loaded);
        self.history.reset();
        self.guard.settle();
        self.document_info().ok_or(SignpadError::NoDocument)
    }

    /// Drop the document and all edits.
    pub fn reset(&mut self) {
        self.state.reset();
        self.history.reset();
        self.guard.settle();
        debug!("session reset");
    }

    // ---------------------------------------------------------------
    // Annotations
    // ---------------------------------------------------------------

    pub fn add_annotation(&mut self, draft: AnnotationDraft) -> Result<ItemId> {
        draft.validate()?;
        let id = self.next_id;
        let width = draft.width.unwrap_or(self.config().annotation_width);
        let page = draft.page;
        let item = draft.into_item(id, width);

        self.apply(Mode::Edit, Some(page), |current| {
            Ok(mutation::add(current, item).0)
        })?;
        self.next_id += 1;
        Ok(id)
    }

    pub fn update_annotation(&mut self, id: ItemId, draft: AnnotationDraft) -> Result<()> {
        draft.validate()?;
        let fallback = self.config().annotation_width;
        let page = draft.page;

        self.apply(Mode::Edit, Some(page), |current| {
            let width = draft
                .width
                .or_else(|| current.annotation(id).map(|a| a.width))
                .unwrap_or(fallback);
            mutation::update_by_id(current, draft.into_item(id, width))
        })
    }

    pub fn remove_annotation(&mut self, id: ItemId) -> Result<()> {
        self.apply(Mode::Edit, None, |current| {
            mutation::remove_by_id(current, ItemKind::Annotation, id)
        })
    }

    /// Update the annotation at a list position, keeping its id.
    pub fn update_annotation_at(&mut self, index: usize, draft: AnnotationDraft) -> Result<()> {
        draft.validate()?;
        let page = draft.page;

        self.apply(Mode::Edit, Some(page), |current| {
            let existing = item_at(current, ItemKind::Annotation, index)?;
            let width = draft
                .width
                .unwrap_or(current.annotations()[index].width);
            mutation::update(current, index, draft.into_item(existing, width))
        })
    }

    pub fn remove_annotation_at(&mut self, index: usize) -> Result<()> {
        self.apply(Mode::Edit, None, |current| {
            mutation::remove(current, ItemKind::Annotation, index)
        })
    }

    // ---------------------------------------------------------------
    // Signatures
    // ---------------------------------------------------------------

    pub fn add_signature(&mut self, draft: SignatureDraft) -> Result<ItemId> {
        draft.validate()?;
        let id = self.next_id;
        let width = draft.width.unwrap_or(self.config().signature_width);
        let page = draft.page;
        let item = draft.into_item(id, width);

        self.apply(Mode::Sign, Some(page), |current| {
            Ok(mutation::add(current, item).0)
        })?;
        self.next_id += 1;
        Ok(id)
    }

    pub fn update_signature(&mut self, id: ItemId, draft: SignatureDraft) -> Result<()> {
        draft.validate()?;
        let fallback = self.config().signature_width;
        let page = draft.page;

        self.apply(Mode::Sign, Some(page), |current| {
            let width = draft
                .width
                .or_else(|| current.signature(id).map(|s| s.width))
                .unwrap_or(fallback);
            mutation::update_by_id(current, draft.into_item(id, width))
        })
    }

    pub fn remove_signature(&mut self, id: ItemId) -> Result<()> {
        self.apply(Mode::Sign, None, |current| {
            mutation::remove_by_id(current, ItemKind::Signature, id)
        })
    }

    pub fn update_signature_at(&mut self, index: usize, draft: SignatureDraft) -> Result<()> {
        draft.validate()?;
        let page = draft.page;

        self.apply(Mode::Sign, Some(page), |current| {
            let existing = item_at(current, ItemKind::Signature, index)?;
            let width = draft.width.unwrap_or(current.signatures()[index].width);
            mutation::update(current, index, draft.into_item(existing, width))
        })
    }

    pub fn remove_signature_at(&mut self, index: usize) -> Result<()> {
        self.apply(Mode::Sign, None, |current| {
            mutation::remove(current, ItemKind::Signature, index)
        })
    }

    // ---------------------------------------------------------------
    // History
    // ---------------------------------------------------------------

    /// Step back one edit. `Ok(false)` when already at the start.
    pub fn undo(&mut self) -> Result<bool> {
        let token = self.acquire()?;
        let moved = self.history.undo();
        if !moved {
            self.guard.release(token);
        }
        Ok(moved)
    }

    /// Step forward one edit. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let token = self.acquire()?;
        let moved = self.history.redo();
        if !moved {
            self.guard.release(token);
        }
        Ok(moved)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The snapshot every view renders.
    pub fn current(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn annotations_on_page(&self, page: u32) -> Vec<&Annotation> {
        self.current().annotations_on_page(page)
    }

    pub fn signatures_on_page(&self, page: u32) -> Vec<&Signature> {
        self.current().signatures_on_page(page)
    }

    /// Report that the front end re-rendered after the last action.
    pub fn settle(&mut self) -> bool {
        self.guard.settle()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    // ---------------------------------------------------------------
    // Document, navigation and zoom
    // ---------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        self.state.config()
    }

    pub fn document_info(&self) -> Option<&DocumentInfo> {
        self.state.loaded().map(RenderBackend::info)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.state.file_name()
    }

    pub fn total_pages(&self) -> u32 {
        self.state.total_pages()
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page()
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        self.state.set_current_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.state.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.state.previous_page()
    }

    pub fn scale(&self) -> f64 {
        self.state.scale()
    }

    pub fn set_scale(&mut self, scale: f64) -> f64 {
        self.state.set_scale(scale)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.state.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.state.zoom_out()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state.set_mode(mode);
    }

    /// Display surface of `page` at the current zoom
    pub fn render_page(&self, page: u32) -> Result<PageSurface> {
        let loaded = self.state.loaded().ok_or(SignpadError::NoDocument)?;
        loaded.render_page(page, self.state.scale())
    }

    // ---------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------

    /// The loaded document with the current snapshot written into it
    pub fn export(&self) -> Result<Vec<u8>> {
        let bytes = self.state.bytes().ok_or(SignpadError::NoDocument)?;
        let options = ExportOptions {
            font_size: self.config().font_size,
        };
        apply_snapshot(bytes, self.history.current(), options)
    }

    /// Download name for the exported file
    pub fn export_file_name(&self) -> Option<String> {
        self.state.file_name().map(|name| format!("edited_{}", name))
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn acquire(&mut self) -> Result<ActionToken> {
        self.guard.try_acquire().inspect_err(|_| {
            warn!("action dropped while previous action is unsettled");
        })
    }

    fn check_preconditions(&self, required: Mode, page: Option<u32>) -> Result<()> {
        let current = self.state.mode();
        if current != required {
            return Err(SignpadError::ModeMismatch { required, current });
        }
        let total = self.state.total_pages();
        if total == 0 {
            return Err(SignpadError::NoDocument);
        }
        if let Some(page) = page {
            let out_of_range = page == 0 || (self.config().validate_pages && page > total);
            if out_of_range {
                return Err(SignpadError::PageOutOfRange { page, total });
            }
        }
        Ok(())
    }

    /// Run one mutating action against the current snapshot and commit the
    /// result. The guard stays held after a commit until `settle`.
    fn apply<F>(&mut self, required: Mode, page: Option<u32>, change: F) -> Result<()>
    where
        F: FnOnce(&Snapshot) -> Result<Snapshot>,
    {
        self.check_preconditions(required, page)
            .inspect_err(|e| warn!(error = %e, "action rejected"))?;
        let token = self.acquire()?;

        match change(self.history.current()) {
            Ok(next) => {
                self.history.commit(next);
                Ok(())
            }
            Err(e) => {
                self.guard.release(token);
                warn!(error = %e, "action failed");
                Err(e)
            }
        }
    }
}

/// Id of the item at `index`, or the out-of-range error for it
fn item_at(snapshot: &Snapshot, kind: ItemKind, index: usize) -> Result<ItemId> {
    let id = match kind {
        ItemKind::Annotation => snapshot.annotations().get(index).map(|a| a.id),
        ItemKind::Signature => snapshot.signatures().get(index).map(|s| s.id),
    };
    id.ok_or(SignpadError::IndexOutOfRange {
        kind,
        index,
        len: snapshot.len_of(kind),
    })
}
