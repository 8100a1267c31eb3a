//! Signature image decoding
//!
//! Signatures arrive as `data:` URLs produced by a drawing canvas or a file
//! upload. PNG is decoded and split into an 8-bit RGB plane and an optional
//! alpha plane, which is the layout PDF image XObjects want. JPEG is kept
//! compressed; only its frame header is read, since PDF readers decode the
//! original bytes themselves.

use crate::error::{Result, SignpadError};
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 3 bytes per pixel
    pub rgb: Vec<u8>,
    /// 1 byte per pixel, absent for opaque images
    pub alpha: Option<Vec<u8>>,
}

impl DecodedImage {
    /// Height divided by width
    pub fn aspect_ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }
}

/// Baseline or progressive JPEG, left as encoded
#[derive(Debug, Clone, PartialEq)]
pub struct JpegImage {
    pub width: u32,
    pub height: u32,
    /// 1 (gray), 3 (YCbCr/RGB) or 4 (CMYK)
    pub components: u8,
    pub data: Vec<u8>,
}

/// A signature image ready to be placed in a PDF
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureImage {
    Raster(DecodedImage),
    Jpeg(JpegImage),
}

impl SignatureImage {
    pub fn width(&self) -> u32 {
        match self {
            SignatureImage::Raster(image) => image.width,
            SignatureImage::Jpeg(image) => image.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            SignatureImage::Raster(image) => image.height,
            SignatureImage::Jpeg(image) => image.height,
        }
    }

    /// Height divided by width
    pub fn aspect_ratio(&self) -> f64 {
        self.height() as f64 / self.width() as f64
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into its mime type and bytes
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| SignpadError::Image("not a data: URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| SignpadError::Image("data: URL has no payload".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| SignpadError::Image("only base64 data: URLs are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| SignpadError::Image(format!("invalid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(SignpadError::Image("image payload is empty".to_string()));
    }

    Ok((mime.to_ascii_lowercase(), bytes))
}

pub fn decode_data_url(url: &str) -> Result<SignatureImage> {
    let (mime, bytes) = parse_data_url(url)?;
    match mime.as_str() {
        "image/png" => decode_png(&bytes).map(SignatureImage::Raster),
        "image/jpeg" | "image/jpg" => decode_jpeg(bytes).map(SignatureImage::Jpeg),
        other => Err(SignpadError::Image(format!(
            "unsupported image type {}",
            other
        ))),
    }
}

/// Read the frame header of a JPEG, keeping the bytes as they are.
pub fn decode_jpeg(data: Vec<u8>) -> Result<JpegImage> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return Err(SignpadError::Image("missing JPEG start marker".to_string()));
    }

    let mut pos = 2;
    loop {
        let marker = match data.get(pos..pos + 2) {
            Some([0xFF, 0xFF]) => {
                // Fill byte before a marker
                pos += 1;
                continue;
            }
            Some([0xFF, marker]) => *marker,
            Some(_) => return Err(SignpadError::Image("malformed JPEG marker".to_string())),
            None => return Err(SignpadError::Image("JPEG has no frame header".to_string())),
        };
        pos += 2;

        match marker {
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD8 => continue,
            0xD9 | 0xDA => {
                return Err(SignpadError::Image(
                    "JPEG scan starts before the frame header".to_string(),
                ))
            }
            _ => {}
        }

        let len = read_u16(&data, pos)? as usize;
        if len < 2 {
            return Err(SignpadError::Image("invalid JPEG segment length".to_string()));
        }

        if is_start_of_frame(marker) {
            let header = data
                .get(pos + 2..pos + 8)
                .ok_or_else(|| SignpadError::Image("truncated JPEG frame header".to_string()))?;
            let height = u16::from_be_bytes([header[1], header[2]]) as u32;
            let width = u16::from_be_bytes([header[3], header[4]]) as u32;
            let components = header[5];

            if width == 0 || height == 0 {
                return Err(SignpadError::Image("JPEG has zero size".to_string()));
            }
            if !matches!(components, 1 | 3 | 4) {
                return Err(SignpadError::Image(format!(
                    "unsupported JPEG component count {}",
                    components
                )));
            }
            return Ok(JpegImage {
                width,
                height,
                components,
                data,
            });
        }

        pos += len;
    }
}

/// SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16> {
    data.get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| SignpadError::Image("truncated JPEG segment".to_string()))
}

pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| SignpadError::Image(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| SignpadError::Image(e.to_string()))?;
    let data = &buf[..frame.buffer_size()];

    let pixels = (frame.width as usize) * (frame.height as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::new();

    match frame.color_type {
        png::ColorType::Rgb => rgb.extend_from_slice(data),
        png::ColorType::Rgba => {
            alpha.reserve(pixels);
            for px in data.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
        }
        png::ColorType::Grayscale => {
            for &g in data {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            alpha.reserve(pixels);
            for px in data.chunks_exact(2) {
                rgb.extend_from_slice(&[px[0], px[0], px[0]]);
                alpha.push(px[1]);
            }
        }
        png::ColorType::Indexed => {
            return Err(SignpadError::Image(
                "palette was not expanded".to_string(),
            ))
        }
    }

    // A fully opaque mask carries no information.
    let alpha = if alpha.is_empty() || alpha.iter().all(|&a| a == u8::MAX) {
        None
    } else {
        Some(alpha)
    };

    Ok(DecodedImage {
        width: frame.width,
        height: frame.height,
        rgb,
        alpha,
    })
}


#[cfg(test)]
mod tests {
    use super::test_images::{encode, jpeg_bytes, jpeg_data_url, signature_data_url};
    use super::*;

    #[test]
    fn test_parse_data_url() {
        let (mime, bytes) = parse_data_url("data:image/PNG;base64,AQID").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_rejects_plain_url() {
        assert!(matches!(
            parse_data_url("https://example.com/sig.png"),
            Err(SignpadError::Image(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_base64_encoding() {
        assert!(parse_data_url("data:image/svg+xml,<svg/>").is_err());
    }

    #[test]
    fn test_decode_rgba_keeps_alpha() {
        let SignatureImage::Raster(image) = decode_data_url(&signature_data_url()).unwrap() else {
            panic!("PNG should decode to pixels");
        };
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.aspect_ratio(), 0.5);
        assert_eq!(image.rgb.len(), 4 * 2 * 3);
        let alpha = image.alpha.as_ref().expect("transparent background");
        assert_eq!(alpha, &vec![255, 0, 0, 255, 0, 0, 255, 0]);
    }

    #[test]
    fn test_decode_opaque_rgb_has_no_alpha() {
        let png = encode(2, 2, png::ColorType::Rgb, &[255; 12]);
        let image = decode_png(&png).unwrap();
        assert!(image.alpha.is_none());
        assert_eq!(image.rgb, vec![255; 12]);
    }

    #[test]
    fn test_decode_grayscale_expands_to_rgb() {
        let png = encode(2, 1, png::ColorType::Grayscale, &[10, 200]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.rgb, vec![10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn test_jpeg_data_url_keeps_bytes() {
        let image = decode_data_url(&jpeg_data_url(40, 10)).unwrap();
        assert_eq!((image.width(), image.height()), (40, 10));
        assert_eq!(image.aspect_ratio(), 0.25);
        let SignatureImage::Jpeg(jpeg) = image else {
            panic!("JPEG should stay compressed");
        };
        assert_eq!(jpeg.components, 3);
        assert_eq!(jpeg.data, jpeg_bytes(40, 10));
    }

    #[test]
    fn test_jpeg_skips_fill_bytes_before_frame() {
        let mut data = jpeg_bytes(8, 8);
        // Extra 0xFF fill in front of the SOF0 marker
        let sof = data.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
        data.insert(sof, 0xFF);
        assert_eq!(decode_jpeg(data).unwrap().width, 8);
    }

    #[test]
    fn test_truncated_jpeg_is_rejected() {
        let err = decode_jpeg(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap_err();
        assert!(matches!(err, SignpadError::Image(_)));
        assert!(decode_data_url("data:image/jpeg;base64,/9j/4AAQ").is_err());
    }

    #[test]
    fn test_jpeg_without_frame_header_is_rejected() {
        assert!(decode_jpeg(vec![0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02]).is_err());
    }

    #[test]
    fn test_rejects_gif_data_url() {
        let err = decode_data_url("data:image/gif;base64,R0lGODlh").unwrap_err();
        assert!(matches!(err, SignpadError::Image(_)));
    }

    #[test]
    fn test_rejects_corrupt_png() {
        assert!(decode_png(b"\x89PNG\r\n\x1a\nnot really").is_err());
    }
}
