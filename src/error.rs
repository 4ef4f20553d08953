//! Error type for the ats-resume-expert library.
//!
//! Every failure in the pipeline is fatal for the action that triggered it:
//! there is no partial result to salvage (one page, one model call). So a
//! single [`AtsError`] covers the whole crate and is returned as-is to the
//! presentation layer, which renders it and takes no corrective action.
//!
//! Variants are grouped by pipeline stage so the message a user sees points
//! at the stage that failed: the upload, the PDF, the model, or the session.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ats-resume-expert library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// An action was requested but no resume was supplied.
    #[error("No resume was supplied.\nUpload a PDF before requesting an evaluation.")]
    InputMissing,

    /// Resume file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes are not a PDF, or the PDF is corrupt or encrypted.
    #[error("Resume is not a readable PDF: {detail}")]
    UnparseableDocument { detail: String },

    /// The upload is zero bytes long, or the PDF has no pages.
    #[error("Resume PDF is empty (no pages to evaluate)")]
    EmptyDocument,

    /// pdfium-render returned an error while drawing the first page.
    #[error("Rasterisation of the first page failed: {detail}")]
    RasterisationFailed { detail: String },

    /// The rendered page could not be JPEG-encoded.
    #[error("JPEG encoding of the first page failed: {detail}")]
    ImageEncodingFailed { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium must be installed to read resumes. You can:\n\
  • Install libpdfium system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir/containing/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model endpoint could not be reached or answered with a failure.
    #[error("Generative model service unavailable: {detail}")]
    ServiceUnavailable { detail: String },

    /// The API key is missing or was rejected. `hint` names the variable
    /// the active backend reads its key from.
    #[error("Invalid or missing API credentials: {detail}\n{hint}")]
    InvalidCredentials { detail: String, hint: String },

    /// An `edgequake-llm` provider could not be set up (missing key, no
    /// local server configured, ...).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model answered but produced no text.
    #[error("The model returned an empty response")]
    EmptyResponse,

    // ── Session errors ────────────────────────────────────────────────────
    /// A chat message was sent before the conversation was started.
    #[error("Conversation has not been started for this session")]
    ConversationNotStarted,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtsError {
    /// True for failures raised while talking to the model.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            AtsError::ServiceUnavailable { .. }
                | AtsError::InvalidCredentials { .. }
                | AtsError::EmptyResponse
        )
    }
}
