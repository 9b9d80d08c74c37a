//! QR code rendering.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;
use vibe_core::{Result, VibeError};

/// Minimum edge length of the rendered code, in pixels.
pub const MIN_DIMENSION: u32 = 180;

/// Render `payload` as a PNG-encoded QR code.
///
/// The payload is encoded verbatim; for confirmations it is the reservation id.
///
/// # Errors
///
/// Returns `Notification` if the payload does not fit a QR code or PNG
/// encoding fails.
pub fn png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| VibeError::Notification(format!("QR encoding failed: {e}")))?;

    let pixels = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| VibeError::Notification(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_a_decodable_square() {
        let bytes = png("3f1c2a9e-8d4b-4c7a-9e21-5b6f0d8c1a77").unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), decoded.height());
        assert!(decoded.width() >= MIN_DIMENSION);
    }

    #[test]
    fn test_distinct_payloads_render_differently() {
        assert_ne!(png("reservation-a").unwrap(), png("reservation-b").unwrap());
    }
}
