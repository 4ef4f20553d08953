//! Generative model backends.
//!
//! The evaluation flow only needs "a model that accepts an ordered list of
//! text and image parts and returns text". [`GenerativeModel`] is that seam:
//! production code plugs in [`gemini::GeminiModel`] or
//! [`provider::ProviderModel`], tests plug in a stub that counts calls.

use crate::error::AtsError;
use crate::pipeline::encode::EncodedPayload;
use async_trait::async_trait;

pub mod gemini;
pub mod provider;

pub use gemini::GeminiModel;
pub use provider::ProviderModel;

/// One element of a multi-part model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part<'a> {
    Text(&'a str),
    Image(&'a EncodedPayload),
}

/// A model that turns an ordered multi-part prompt into text.
///
/// Implementations make at most one network call per `generate` and must
/// not retry internally.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Short identifier used in logs, e.g. `gemini/gemini-1.5-flash`.
    fn name(&self) -> &str;

    /// Send `parts` in order and return the model's text verbatim.
    async fn generate(&self, parts: &[Part<'_>]) -> Result<String, AtsError>;
}
