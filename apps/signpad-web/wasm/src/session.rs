//! JavaScript-facing editor session
//!
//! Wraps [`EditorSession`] so the page only deals with plain values: item
//! lists cross the boundary as JSON strings, geometry as JS objects, and
//! every error as a string `JsValue`.

use signpad_core::{
    AnnotationDraft, EditorConfig, EditorSession, Mode, SignatureDraft, SignpadError,
};
use wasm_bindgen::prelude::*;

fn to_js(err: SignpadError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Editing session for one uploaded PDF
#[wasm_bindgen]
pub struct SignpadSession {
    inner: EditorSession,
}

#[wasm_bindgen]
impl SignpadSession {
    /// Create an empty session. `config_json` overrides individual
    /// settings, e.g. `{"max_scale": 4.0}`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SignpadSession, JsValue> {
        Self::new_internal(config_json.as_deref()).map_err(to_js)
    }

    /// Load a PDF, replacing any current document and clearing history.
    /// Returns the document info object.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let info = self.inner.load(name, bytes).map_err(to_js)?;
        serde_wasm_bindgen::to_value(info)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Drop the document and every edit
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    // ---------------------------------------------------------------
    // Annotations
    // ---------------------------------------------------------------

    #[wasm_bindgen(js_name = addAnnotation)]
    pub fn add_annotation(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<u64, JsValue> {
        self.inner
            .add_annotation(annotation_draft(text, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = updateAnnotation)]
    pub fn update_annotation(
        &mut self,
        id: u64,
        text: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<(), JsValue> {
        self.inner
            .update_annotation(id, annotation_draft(text, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeAnnotation)]
    pub fn remove_annotation(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner.remove_annotation(id).map_err(to_js)
    }

    /// Update by list position, for callers that still address items by index
    #[wasm_bindgen(js_name = updateAnnotationAt)]
    pub fn update_annotation_at(
        &mut self,
        index: usize,
        text: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<(), JsValue> {
        self.inner
            .update_annotation_at(index, annotation_draft(text, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeAnnotationAt)]
    pub fn remove_annotation_at(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.remove_annotation_at(index).map_err(to_js)
    }

    // ---------------------------------------------------------------
    // Signatures
    // ---------------------------------------------------------------

    /// Place a signature image given as a PNG or JPEG `data:` URL
    #[wasm_bindgen(js_name = addSignature)]
    pub fn add_signature(
        &mut self,
        data_url: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<u64, JsValue> {
        self.inner
            .add_signature(signature_draft(data_url, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = updateSignature)]
    pub fn update_signature(
        &mut self,
        id: u64,
        data_url: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<(), JsValue> {
        self.inner
            .update_signature(id, signature_draft(data_url, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeSignature)]
    pub fn remove_signature(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner.remove_signature(id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = updateSignatureAt)]
    pub fn update_signature_at(
        &mut self,
        index: usize,
        data_url: &str,
        x: f64,
        y: f64,
        page: u32,
        width: Option<f64>,
    ) -> Result<(), JsValue> {
        self.inner
            .update_signature_at(index, signature_draft(data_url, x, y, page, width))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeSignatureAt)]
    pub fn remove_signature_at(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.remove_signature_at(index).map_err(to_js)
    }

    // ---------------------------------------------------------------
    // History
    // ---------------------------------------------------------------

    /// Returns false when there was nothing to undo
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(to_js)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(to_js)
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// Call after re-rendering from the latest snapshot. Until then new
    /// edits are rejected.
    pub fn settle(&mut self) -> bool {
        self.inner.settle()
    }

    #[wasm_bindgen(getter, js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// Current snapshot as `{"annotations": [...], "signatures": [...]}`
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<String, JsValue> {
        self.snapshot_json().map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = getAnnotationsOnPage)]
    pub fn get_annotations_on_page(&self, page: u32) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.annotations_on_page(page))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = getSignaturesOnPage)]
    pub fn get_signatures_on_page(&self, page: u32) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.signatures_on_page(page))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    // ---------------------------------------------------------------
    // Navigation, zoom and mode
    // ---------------------------------------------------------------

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.inner.total_pages()
    }

    #[wasm_bindgen(getter, js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.inner.current_page()
    }

    #[wasm_bindgen(js_name = setCurrentPage)]
    pub fn set_current_page(&mut self, page: u32) -> Result<(), JsValue> {
        self.inner.set_current_page(page).map_err(to_js)
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> bool {
        self.inner.next_page()
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> bool {
        self.inner.previous_page()
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale()
    }

    /// Returns the scale actually applied after clamping
    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        self.inner.set_scale(scale)
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f64 {
        self.inner.zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f64 {
        self.inner.zoom_out()
    }

    /// "view", "edit" or "sign"
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: Mode = mode.parse().map_err(to_js)?;
        self.inner.set_mode(mode);
        Ok(())
    }

    /// Surface size for drawing `page` at the current zoom
    #[wasm_bindgen(js_name = renderPage)]
    pub fn render_page(&self, page: u32) -> Result<JsValue, JsValue> {
        let surface = self.inner.render_page(page).map_err(to_js)?;
        serde_wasm_bindgen::to_value(&surface)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    // ---------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------

    /// The edited PDF, ready to download
    pub fn export(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let bytes = self.inner.export().map_err(to_js)?;
        let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
        array.copy_from(&bytes);
        Ok(array)
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> Option<String> {
        self.inner.export_file_name()
    }
}

impl SignpadSession {
    /// Internal constructor (testable without JsValue)
    fn new_internal(config_json: Option<&str>) -> Result<Self, SignpadError> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(json)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            inner: EditorSession::new(config),
        })
    }

    /// Internal snapshot serialization (testable without JsValue)
    fn snapshot_json(&self) -> Result<String, String> {
        self.inner
            .current()
            .to_json()
            .map_err(|e| format!("Serialization error: {}", e))
    }
}

fn annotation_draft(text: &str, x: f64, y: f64, page: u32, width: Option<f64>) -> AnnotationDraft {
    AnnotationDraft {
        text: text.to_string(),
        x,
        y,
        page,
        width,
    }
}

fn signature_draft(data_url: &str, x: f64, y: f64, page: u32, width: Option<f64>) -> SignatureDraft {
    SignatureDraft {
        data_url: data_url.to_string(),
        x,
        y,
        page,
        width,
    }
}
