//! PDF rasterisation: render the first page to a `DynamicImage` via pdfium.
//!
//! Only page index 0 is ever touched. The page count is read so an empty
//! document can be reported, but no later page is loaded or drawn, so cost
//! stays constant however long the resume is.
//!
//! Everything here is blocking. Async callers go through
//! [`crate::preprocess::prepare_payload`], which moves the work onto
//! `spawn_blocking`.

use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Bind to a pdfium library.
///
/// `lib_path` may name the library file itself or the directory holding
/// it. Without a path, or if binding at the path fails, the system library
/// is tried.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, AtsError> {
    let bindings = match lib_path {
        Some(path) => {
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            };
            Pdfium::bind_to_library(&lib).or_else(|e| {
                debug!("Binding pdfium at {} failed ({:?}); trying system library", lib.display(), e);
                Pdfium::bind_to_system_library()
            })
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| AtsError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterise page 1 of an in-memory PDF.
///
/// The page is scaled to `config.dpi` and then capped at
/// `config.max_rendered_pixels` on either side.
pub fn render_first_page(
    pdfium: &Pdfium,
    bytes: &[u8],
    config: &EvaluatorConfig,
) -> Result<DynamicImage, AtsError> {
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                AtsError::UnparseableDocument {
                    detail: "PDF is encrypted and requires a password".to_string(),
                }
            } else {
                AtsError::UnparseableDocument { detail: err_str }
            }
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages, rendering page 1 only", total_pages);

    if total_pages == 0 {
        return Err(AtsError::EmptyDocument);
    }

    let max_pixels = i32::try_from(config.max_rendered_pixels).unwrap_or(i32::MAX);
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(config.dpi as f32 / 72.0)
        .set_maximum_width(max_pixels)
        .set_maximum_height(max_pixels);

    let page = pages.get(0).map_err(|e| AtsError::RasterisationFailed {
        detail: format!("{:?}", e),
    })?;

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| AtsError::RasterisationFailed {
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}
