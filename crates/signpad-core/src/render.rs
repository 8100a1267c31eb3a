//! PDF loading and page geometry
//!
//! Validates uploaded bytes, parses them with lopdf and reports the page
//! surfaces the front end draws into. Rasterising page content stays with
//! the browser's renderer; this side only supplies page count and sizes.

use crate::error::{Result, SignpadError};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

/// Document information extracted during validation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// Display surface for one page at a zoom factor
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PageSurface {
    /// Page number (1-indexed)
    pub page: u32,
    /// Surface width in pixels
    pub width: f64,
    /// Surface height in pixels
    pub height: f64,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    pub scale: f64,
}

/// Source of page geometry for the display layer
pub trait RenderBackend {
    fn info(&self) -> &DocumentInfo;

    /// Display surface of `page` (1-indexed) at `scale`
    fn render_page(&self, page: u32, scale: f64) -> Result<PageSurface>;
}

/// A parsed document together with the bytes it came from
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    name: String,
    bytes: Vec<u8>,
    document: Document,
    info: DocumentInfo,
}

impl LoadedDocument {
    /// Validate and parse `bytes`.
    ///
    /// Header problems are `Validation` errors (not a PDF at all); anything
    /// lopdf cannot parse is a `Render` error.
    pub fn load(name: &str, bytes: &[u8]) -> Result<Self> {
        quick_validate(bytes)?;

        let document = Document::load_mem(bytes).map_err(|e| SignpadError::Render(e.to_string()))?;

        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(SignpadError::Validation("PDF has no pages".to_string()));
        }

        let (title, author) = extract_metadata(&document);
        let info = DocumentInfo {
            page_count,
            version: extract_version(bytes),
            encrypted: document.is_encrypted(),
            size_bytes: bytes.len(),
            title,
            author,
        };

        Ok(Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
            document,
            info,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.info.page_count
    }
}

impl RenderBackend for LoadedDocument {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Surface geometry accounting for page rotation.
    fn render_page(&self, page: u32, scale: f64) -> Result<PageSurface> {
        let page_id = page_object_id(&self.document, page)?;
        let page_dict = page_dictionary(&self.document, page_id)?;

        let [x1, y1, x2, y2] = media_box(&self.document, page_dict)?;
        let (mut width, mut height) = ((x2 - x1).abs(), (y2 - y1).abs());
        let rotation = rotation(&self.document, page_dict);
        if rotation == 90 || rotation == 270 {
            std::mem::swap(&mut width, &mut height);
        }

        Ok(PageSurface {
            page,
            width: width * scale,
            height: height * scale,
            rotation,
            scale,
        })
    }
}

/// Cheap header check before a full parse
pub fn quick_validate(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 8 {
        return Err(SignpadError::Validation(
            "File too small to be a valid PDF".to_string(),
        ));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(SignpadError::Validation(
            "Not a valid PDF file (missing %PDF- header)".to_string(),
        ));
    }

    Ok(())
}

pub(crate) fn page_object_id(document: &Document, page: u32) -> Result<ObjectId> {
    document
        .get_pages()
        .get(&page)
        .copied()
        .ok_or_else(|| SignpadError::Render(format!("Page {} not found", page)))
}

pub(crate) fn page_dictionary(document: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    document
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| SignpadError::Render(format!("Page object is not a dictionary: {}", e)))
}

/// MediaBox `[x1, y1, x2, y2]`, inherited from the page tree if the page
/// does not carry one. Falls back to US Letter.
pub(crate) fn media_box(document: &Document, page_dict: &Dictionary) -> Result<[f64; 4]> {
    if let Some(array) = inherited(document, page_dict, b"MediaBox").and_then(|o| o.as_array().ok()) {
        return parse_box_array(array);
    }
    Ok([0.0, 0.0, 612.0, 792.0])
}

fn rotation(document: &Document, page_dict: &Dictionary) -> i32 {
    inherited(document, page_dict, b"Rotate")
        .and_then(|o| o.as_i64().ok())
        .map(|angle| normalize_rotation(angle as i32))
        .unwrap_or(0)
}

/// Look up `key` on the page, then walk up the `Parent` chain.
fn inherited<'a>(document: &'a Document, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_dict;
    // Page trees are shallow; the bound stops reference cycles.
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return match value {
                Object::Reference(id) => document.get_object(*id).ok(),
                other => Some(other),
            };
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = document.get_object(parent_id).and_then(Object::as_dict).ok()?;
    }
    None
}

fn parse_box_array(array: &[Object]) -> Result<[f64; 4]> {
    if array.len() != 4 {
        return Err(SignpadError::Render(
            "MediaBox must have 4 elements".to_string(),
        ));
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(SignpadError::Render(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }

    Ok(result)
}

fn normalize_rotation(angle: i32) -> i32 {
    let normalized = angle % 360;
    if normalized < 0 {
        normalized + 360
    } else {
        normalized
    }
}

fn extract_version(bytes: &[u8]) -> String {
    // Header format: %PDF-1.7
    if bytes.len() >= 8 && bytes.starts_with(b"%PDF-") {
        if let Ok(version) = std::str::from_utf8(&bytes[5..8]) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let Some(info) = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .and_then(|id| document.get_object(id).ok())
        .and_then(|obj| obj.as_dict().ok())
    else {
        return (None, None);
    };

    let field = |key: &[u8]| {
        info.get(key)
            .and_then(Object::as_str)
            .ok()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .filter(|value| !value.is_empty())
    };

    (field(b"Title"), field(b"Author"))
}
