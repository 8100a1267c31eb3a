//! WASM bindings for the signpad editor
//!
//! The document, edit history and export all live in Rust behind
//! `SignpadSession`. JavaScript renders pages with PDF.js, captures
//! gestures and calls back into the session once per completed gesture.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { SignpadSession } from './pkg/signpad_wasm.js';
//!
//! await init();
//!
//! const session = new SignpadSession();
//! session.loadDocument(file.name, bytes);
//! session.setMode("edit");
//! const id = session.addAnnotation("Approved", 200, 120, 1);
//! render(JSON.parse(session.getSnapshot()));
//! session.settle();
//!
//! downloadBlob(session.export(), session.exportFileName());
//! ```

pub mod logging;
pub mod session;

use signpad_core::coords;
use wasm_bindgen::prelude::*;

pub use session::SignpadSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(logging::default_level());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for a PDF file
/// Returns Ok(()) if valid, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    signpad_core::render::quick_validate(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Document position `[x, y]` of an item dropped after dragging by a
/// screen-pixel delta at `scale`
#[wasm_bindgen(js_name = dragEndPosition)]
pub fn drag_end_position(x: f64, y: f64, dx: f64, dy: f64, scale: f64) -> Vec<f64> {
    let (x, y) = coords::drag_end_position((x, y), (dx, dy), scale);
    vec![x, y]
}

/// Convert a click position on the page surface to document coordinates
#[wasm_bindgen(js_name = screenToDocument)]
pub fn screen_to_document(x: f64, y: f64, scale: f64) -> Vec<f64> {
    let (x, y) = coords::screen_to_document(x, y, scale);
    vec![x, y]
}
