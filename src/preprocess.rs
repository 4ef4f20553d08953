//! Document preprocessing: resume PDF → first-page JPEG → base64 payload.

use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use crate::pipeline::encode::{encode_page, EncodedPayload};
use crate::pipeline::input::{check_pdf_bytes, RawDocument};
use crate::pipeline::render::{bind_pdfium, render_first_page};
use std::time::Instant;
use tracing::{debug, info};

/// Rasterise the first page of `document` and encode it for the model.
///
/// Blocking: binds pdfium, parses the PDF and renders page 1. The input is
/// only borrowed. For a fixed input and config the output is identical on
/// every call.
///
/// # Errors
/// - [`AtsError::EmptyDocument`] for zero bytes or a PDF with no pages
/// - [`AtsError::UnparseableDocument`] for non-PDF, corrupt or encrypted input
/// - [`AtsError::PdfiumBindingFailed`] when no pdfium library can be loaded
pub fn rasterize_first_page(
    document: &RawDocument,
    config: &EvaluatorConfig,
) -> Result<EncodedPayload, AtsError> {
    let start = Instant::now();
    let bytes = document.as_bytes();
    check_pdf_bytes(bytes)?;

    let pdfium = bind_pdfium(config.pdfium_lib_path.as_deref())?;
    let image = render_first_page(&pdfium, bytes, config)?;
    let payload = encode_page(&image, config.jpeg_quality)?;

    debug!(
        "Preprocessed {} ({} bytes) in {}ms",
        document.name().unwrap_or("<upload>"),
        bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(payload)
}

/// Async entry point used by the evaluation flow.
///
/// Fails with [`AtsError::InputMissing`] when no document was supplied.
/// The presentation layer is expected to check this first; the error is a
/// backstop, not a recoverable case.
pub async fn prepare_payload(
    document: Option<&RawDocument>,
    config: &EvaluatorConfig,
) -> Result<EncodedPayload, AtsError> {
    let document = document.ok_or(AtsError::InputMissing)?.clone();
    let config = config.clone();

    info!(
        "Rasterising first page of {}",
        document.name().unwrap_or("uploaded resume")
    );

    tokio::task::spawn_blocking(move || rasterize_first_page(&document, &config))
        .await
        .map_err(|e| AtsError::Internal(format!("Render task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_document_is_input_missing() {
        let err = prepare_payload(None, &EvaluatorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::InputMissing));
    }

    #[test]
    fn empty_upload_fails_before_pdfium() {
        let doc = RawDocument::from_bytes(Vec::new());
        let err = rasterize_first_page(&doc, &EvaluatorConfig::default()).unwrap_err();
        assert!(matches!(err, AtsError::EmptyDocument));
    }

    #[test]
    fn non_pdf_upload_fails_before_pdfium() {
        let doc = RawDocument::from_bytes(b"Experienced Python developer".to_vec());
        let err = rasterize_first_page(&doc, &EvaluatorConfig::default()).unwrap_err();
        assert!(matches!(err, AtsError::UnparseableDocument { .. }));
    }
}
