//! Pipeline stages that turn an uploaded resume into a model payload.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (bytes)   (pdfium)   (JPEG + base64)
//! ```
//!
//! 1. [`input`]  — hold the uploaded bytes and check they look like a PDF
//! 2. [`render`] — rasterise page 1 only; blocking, pdfium is not async-safe
//! 3. [`encode`] — JPEG-encode and base64-wrap the page for the request body
//!
//! [`crate::preprocess`] composes the three.

pub mod encode;
pub mod input;
pub mod render;
