//! Write a snapshot into the PDF
//!
//! Text annotations become `/FreeText` annotations; signatures become
//! `/Stamp` annotations whose appearance stream paints the decoded image.
//! Stored positions are item centres in document space, see [`crate::coords`].

use crate::coords::document_to_pdf;
use crate::error::{Result, SignpadError};
use crate::image::{decode_data_url, DecodedImage, JpegImage, SignatureImage};
use crate::model::{Annotation, Signature, Snapshot};
use crate::render::{media_box, page_dictionary};
use flate2::{write::ZlibEncoder, Compression};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, warn};

const LINE_HEIGHT: f64 = 1.2;
const TEXT_PADDING: f64 = 4.0;
/// Average Helvetica glyph width relative to the font size
const AVG_GLYPH_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub font_size: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { font_size: 12.0 }
    }
}

/// Apply every item of `snapshot` to the document and serialize it
pub fn apply_snapshot(pdf_bytes: &[u8], snapshot: &Snapshot, options: ExportOptions) -> Result<Vec<u8>> {
    if snapshot.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut doc = Document::load_mem(pdf_bytes).map_err(|e| SignpadError::Render(e.to_string()))?;
    let pages: BTreeMap<u32, ObjectId> = doc.get_pages();

    for annotation in snapshot.annotations() {
        let Some(&page_id) = pages.get(&annotation.page) else {
            warn!(id = annotation.id, page = annotation.page, "skipping annotation on missing page");
            continue;
        };
        add_text_annotation(&mut doc, page_id, annotation, options)?;
    }

    for signature in snapshot.signatures() {
        let Some(&page_id) = pages.get(&signature.page) else {
            warn!(id = signature.id, page = signature.page, "skipping signature on missing page");
            continue;
        };
        add_signature_stamp(&mut doc, page_id, signature)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| SignpadError::Export(e.to_string()))?;

    debug!(
        annotations = snapshot.annotations().len(),
        signatures = snapshot.signatures().len(),
        bytes = output.len(),
        "exported document"
    );
    Ok(output)
}

/// Height of a text box of `width` holding `text`, wrapping at an
/// estimated glyph width.
fn text_box_height(text: &str, width: f64, font_size: f64) -> f64 {
    let usable = (width - 2.0 * TEXT_PADDING).max(font_size);
    let per_line = (usable / (font_size * AVG_GLYPH_WIDTH)).floor().max(1.0) as usize;
    let lines: usize = text
        .lines()
        .map(|line| line.chars().count().div_ceil(per_line).max(1))
        .sum::<usize>()
        .max(1);
    lines as f64 * font_size * LINE_HEIGHT + 2.0 * TEXT_PADDING
}

/// PDF rect `[llx, lly, urx, ury]` of a box centred on a document point
fn centred_rect(media_box: [f64; 4], x: f64, y: f64, width: f64, height: f64) -> [f64; 4] {
    let (left, top) = document_to_pdf(x - width / 2.0, y - height / 2.0, media_box);
    [left, top - height, left + width, top]
}

fn rect_object(rect: [f64; 4]) -> Object {
    Object::Array(rect.iter().map(|v| Object::Real(*v as f32)).collect())
}

/// PDF text string: ASCII as a literal, anything else as UTF-16BE with a
/// byte order mark.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn add_text_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annotation: &Annotation,
    options: ExportOptions,
) -> Result<()> {
    let media_box = media_box(doc, page_dictionary(doc, page_id)?)?;
    let height = text_box_height(&annotation.text, annotation.width, options.font_size);
    let rect = centred_rect(media_box, annotation.x, annotation.y, annotation.width, height);

    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"FreeText".to_vec()));
    annot.set("Rect", rect_object(rect));
    annot.set("Contents", text_string(&annotation.text));
    let da = format!("/Helv {} Tf 0 0 0 rg", options.font_size);
    annot.set("DA", Object::String(da.into_bytes(), StringFormat::Literal));
    // Print flag
    annot.set("F", Object::Integer(4));
    annot.set("P", Object::Reference(page_id));

    let annot_id = doc.add_object(Object::Dictionary(annot));
    add_annotation_to_page(doc, page_id, annot_id)
}

fn add_signature_stamp(doc: &mut Document, page_id: ObjectId, signature: &Signature) -> Result<()> {
    let image = decode_data_url(&signature.data_url)?;
    let media_box = media_box(doc, page_dictionary(doc, page_id)?)?;

    let width = signature.width;
    let height = width * image.aspect_ratio();
    let rect = centred_rect(media_box, signature.x, signature.y, width, height);

    let image_id = add_image_xobject(doc, &image)?;

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = format!("q\n{w} 0 0 {h} 0 0 cm\n/Im0 Do\nQ", w = width, h = height);

    let mut form = Dictionary::new();
    form.set("Type", Object::Name(b"XObject".to_vec()));
    form.set("Subtype", Object::Name(b"Form".to_vec()));
    form.set("BBox", rect_object([0.0, 0.0, width, height]));
    form.set("Resources", Object::Dictionary(resources));
    let form_id = doc.add_object(Stream::new(form, content.into_bytes()));

    let mut ap = Dictionary::new();
    ap.set("N", Object::Reference(form_id));

    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Stamp".to_vec()));
    annot.set("Rect", rect_object(rect));
    annot.set("F", Object::Integer(4));
    annot.set("AP", Object::Dictionary(ap));
    annot.set("P", Object::Reference(page_id));

    let annot_id = doc.add_object(Object::Dictionary(annot));
    add_annotation_to_page(doc, page_id, annot_id)
}

fn add_image_xobject(doc: &mut Document, image: &SignatureImage) -> Result<ObjectId> {
    match image {
        SignatureImage::Raster(raster) => add_raster_xobject(doc, raster),
        SignatureImage::Jpeg(jpeg) => Ok(doc.add_object(jpeg_stream(jpeg))),
    }
}

/// Image XObject for the RGB plane, with the alpha plane as its `/SMask`
fn add_raster_xobject(doc: &mut Document, image: &DecodedImage) -> Result<ObjectId> {
    let smask = match &image.alpha {
        Some(alpha) => Some(doc.add_object(image_stream(image, b"DeviceGray", alpha)?)),
        None => None,
    };

    let mut stream = image_stream(image, b"DeviceRGB", &image.rgb)?;
    if let Some(mask_id) = smask {
        stream.dict.set("SMask", Object::Reference(mask_id));
    }
    Ok(doc.add_object(stream))
}

fn image_stream(image: &DecodedImage, color_space: &[u8], samples: &[u8]) -> Result<Stream> {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(image.width as i64));
    dict.set("Height", Object::Integer(image.height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    let mut stream = Stream::new(dict, deflate(samples)?);
    // Already compressed with the filter above.
    stream.allows_compression = false;
    Ok(stream)
}

/// JPEG bytes embedded unchanged for the reader's DCT decoder
fn jpeg_stream(image: &JpegImage) -> Stream {
    let color_space: &[u8] = match image.components {
        1 => b"DeviceGray",
        4 => b"DeviceCMYK",
        _ => b"DeviceRGB",
    };

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(image.width as i64));
    dict.set("Height", Object::Integer(image.height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

    let mut stream = Stream::new(dict, image.data.clone());
    stream.allows_compression = false;
    stream
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SignpadError::Export(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| SignpadError::Export(e.to_string()))
}

/// Append `annot_id` to the page's `/Annots`, whether that array is inline
/// or an indirect object.
fn add_annotation_to_page(doc: &mut Document, page_id: ObjectId, annot_id: ObjectId) -> Result<()> {
    let annots_ref = page_dictionary(doc, page_id)?
        .get(b"Annots")
        .and_then(Object::as_reference)
        .ok();

    if let Some(annots_id) = annots_ref {
        if let Ok(Object::Array(arr)) = doc.get_object_mut(annots_id) {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| SignpadError::Export(e.to_string()))?;

    match page.get_mut(b"Annots") {
        Ok(Object::Array(arr)) => arr.push(Object::Reference(annot_id)),
        _ => page.set("Annots", Object::Array(vec![Object::Reference(annot_id)])),
    }
    Ok(())
}
