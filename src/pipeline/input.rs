//! Input handling: the uploaded resume as an in-memory byte buffer.
//!
//! pdfium can load straight from a byte slice, so the upload never touches
//! the file system. The only checks made here are cheap ones (non-empty,
//! `%PDF` magic) so callers get a meaningful error before pdfium is bound.

use crate::error::AtsError;
use std::path::Path;
use tracing::debug;

/// An uploaded resume: raw PDF bytes plus an optional display name.
#[derive(Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Vec<u8>,
    name: Option<String>,
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl RawDocument {
    /// Wrap bytes received from an upload collaborator.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
        }
    }

    /// Attach a display name (usually the uploaded file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read a resume from a local path.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AtsError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AtsError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => AtsError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AtsError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        debug!("Loaded resume {} ({} bytes)", path.display(), bytes.len());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self { bytes, name })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How far into the file the `%PDF` header may start. pdfium and poppler
/// both tolerate leading junk (BOM, blank lines) up to this offset.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Check the bytes are non-empty and carry the PDF magic near the start.
pub fn check_pdf_bytes(bytes: &[u8]) -> Result<(), AtsError> {
    if bytes.is_empty() {
        return Err(AtsError::EmptyDocument);
    }
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if !window.windows(4).any(|w| w == b"%PDF") {
        let shown = &bytes[..bytes.len().min(4)];
        return Err(AtsError::UnparseableDocument {
            detail: format!("missing %PDF header (first bytes: {shown:?})"),
        });
    }
    Ok(())
}
