//! Fixtures shared by the integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::{dictionary, Document, Object};
use signpad_core::{AnnotationDraft, EditorConfig, EditorSession, SignatureDraft};

/// PDF with `num_pages` US Letter pages and nothing on them
pub fn blank_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..num_pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// 3x1 opaque black stroke as a PNG data URL
pub fn signature_png() -> String {
    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, 3, 1);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0; 9]).unwrap();
    }
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes))
}

pub fn session_with_pages(pages: u32) -> EditorSession {
    EditorSession::open("lease.pdf", &blank_pdf(pages), EditorConfig::default()).unwrap()
}

pub fn note(text: &str, page: u32) -> AnnotationDraft {
    AnnotationDraft {
        text: text.to_string(),
        x: 150.0,
        y: 200.0,
        page,
        width: None,
    }
}

pub fn signature(page: u32) -> SignatureDraft {
    SignatureDraft {
        data_url: signature_png(),
        x: 400.0,
        y: 650.0,
        page,
        width: None,
    }
}

/// Run one action and report the re-render right away
pub fn settled<T>(session: &mut EditorSession, action: impl FnOnce(&mut EditorSession) -> T) -> T {
    let result = action(session);
    session.settle();
    result
}

