//! Coordinate conversion between screen pixels, document space and PDF user space
//!
//! Document space is the page laid out at scale 1.0 with a top-left origin.
//! Screen space is document space multiplied by the current zoom. PDF user
//! space has a bottom-left origin and is offset by the page's MediaBox.

/// Screen pixels at `scale` to document coordinates
pub fn screen_to_document(x: f64, y: f64, scale: f64) -> (f64, f64) {
    (x / scale, y / scale)
}

/// Document coordinates to screen pixels at `scale`
pub fn document_to_screen(x: f64, y: f64, scale: f64) -> (f64, f64) {
    (x * scale, y * scale)
}

/// Final document position of an item dragged by a screen-space delta.
///
/// Only the drop position is committed; intermediate drag positions stay
/// in the front end.
pub fn drag_end_position(origin: (f64, f64), delta: (f64, f64), scale: f64) -> (f64, f64) {
    (origin.0 + delta.0 / scale, origin.1 + delta.1 / scale)
}

/// Document coordinates to PDF user space.
///
/// `media_box` is `[x1, y1, x2, y2]` as stored in the page dictionary.
pub fn document_to_pdf(x: f64, y: f64, media_box: [f64; 4]) -> (f64, f64) {
    let [x1, _y1, _x2, y2] = media_box;
    (x1 + x, y2 - y)
}

/// PDF user space to document coordinates
pub fn pdf_to_document(x: f64, y: f64, media_box: [f64; 4]) -> (f64, f64) {
    let [x1, _y1, _x2, y2] = media_box;
    (x - x1, y2 - y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

    #[test]
    fn test_screen_to_document_divides_by_scale() {
        assert_eq!(screen_to_document(300.0, 150.0, 1.5), (200.0, 100.0));
    }

    #[test]
    fn test_drag_end_position() {
        // 40px right and 20px up at 2x zoom moves 20 and -10 document units
        assert_eq!(
            drag_end_position((100.0, 100.0), (40.0, -20.0), 2.0),
            (120.0, 90.0)
        );
    }

    #[test]
    fn test_top_left_maps_to_page_top() {
        assert_eq!(document_to_pdf(0.0, 0.0, LETTER), (0.0, 792.0));
        assert_eq!(document_to_pdf(612.0, 792.0, LETTER), (612.0, 0.0));
    }

    #[test]
    fn test_offset_media_box() {
        let media_box = [10.0, 20.0, 622.0, 812.0];
        assert_eq!(document_to_pdf(0.0, 0.0, media_box), (10.0, 812.0));
    }
}
