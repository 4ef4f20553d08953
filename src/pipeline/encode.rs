//! Image encoding: `DynamicImage` → base64 JPEG wrapped in [`EncodedPayload`].
//!
//! Generative APIs accept images as base64 text embedded in the JSON
//! request body. A resume page is mostly flat colour and text, and JPEG
//! keeps it well under request-size limits at 200 DPI.

use crate::error::AtsError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MIME type of every payload this crate produces.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// A transport-safe page image: base64 text of the JPEG bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    pub mime_type: String,
    pub data: String,
}

impl EncodedPayload {
    /// Wrap raw JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self {
            mime_type: JPEG_MIME_TYPE.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode `data` back into the exact image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, AtsError> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| AtsError::Internal(format!("payload is not valid base64: {e}")))
    }

    /// Length of the encoded text.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Encode a rasterised page as a base64 JPEG.
///
/// The JPEG encoder has no alpha channel, so the page is flattened to RGB
/// first. pdfium renders onto an opaque white background, so nothing is lost.
pub fn encode_page(img: &DynamicImage, quality: u8) -> Result<EncodedPayload, AtsError> {
    let rgb = img.to_rgb8();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| AtsError::ImageEncodingFailed {
            detail: e.to_string(),
        })?;

    let payload = EncodedPayload::from_jpeg_bytes(&buf);
    debug!(
        "Encoded page → {} JPEG bytes, {} bytes base64",
        buf.len(),
        payload.byte_len()
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 60, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn encode_small_image() {
        let data = encode_page(&red_page(), 75).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/jpeg");
        assert!(!data.data.is_empty());

        let decoded = data.decode_bytes().expect("valid base64");
        // JPEG SOI marker
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_page(&red_page(), 75).unwrap();
        let b = encode_page(&red_page(), 75).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn base64_round_trip_is_byte_identical() {
        let payload = encode_page(&red_page(), 75).unwrap();
        let bytes = payload.decode_bytes().unwrap();
        let again = EncodedPayload::from_jpeg_bytes(&bytes);
        assert_eq!(again.data, payload.data);
    }

    #[test]
    fn decoded_jpeg_keeps_dimensions_and_colour() {
        let payload = encode_page(&red_page(), 90).unwrap();
        let img = image::load_from_memory(&payload.decode_bytes().unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (40, 60));
        let px = img.to_rgb8().get_pixel(20, 30).0;
        assert!(px[0] > 200 && px[1] < 60 && px[2] < 60, "got {px:?}");
    }

    #[test]
    fn invalid_base64_fails_to_decode() {
        let p = EncodedPayload {
            mime_type: JPEG_MIME_TYPE.into(),
            data: "not base64!!".into(),
        };
        assert!(p.decode_bytes().is_err());
    }
}
