//! Image encoding: `DynamicImage` → PNG bytes for the OCR engine.
//!
//! PNG is lossless; JPEG artefacts around pen strokes hurt recognition.
//! Pages are converted to 8-bit grayscale first. Tesseract binarises its
//! input anyway, and a single channel makes the buffer a third of the size.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page as a grayscale PNG.
pub fn encode_page(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let gray = DynamicImage::ImageLuma8(img.to_luma8());

    let mut buf = Vec::new();
    gray.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        gray.width(),
        gray.height(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_page(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }
}
