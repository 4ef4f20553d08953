//! Configuration for resume evaluation.
//!
//! Everything the pipeline needs (credential, model, rendering knobs) lives
//! in [`EvaluatorConfig`], built via [`EvaluatorConfigBuilder`] or read from
//! the environment with [`EvaluatorConfig::from_env`]. The API key is read
//! exactly once, here, and then handed explicitly to the model backend; no
//! other module touches the environment.

use crate::error::AtsError;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default base URL of the Gemini REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bounds for [`EvaluatorConfig::max_rendered_pixels`].
pub const RENDERED_PIXELS_RANGE: std::ops::RangeInclusive<u32> = 100..=16_384;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Which client talks to the generative model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelBackend {
    /// Native Gemini `generateContent` REST client. (default)
    #[default]
    Gemini,
    /// Any provider known to `edgequake-llm` (e.g. "openai", "anthropic",
    /// "ollama"). That library reads its own credentials from the environment.
    Provider(String),
}

impl ModelBackend {
    /// Parse a backend name. `"gemini"` (any case) selects the native client;
    /// anything else is passed through as a provider name.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("gemini") {
            ModelBackend::Gemini
        } else {
            ModelBackend::Provider(name.to_lowercase())
        }
    }
}

/// Configuration for a resume evaluation.
///
/// # Example
/// ```rust
/// use ats_resume_expert::EvaluatorConfig;
///
/// let config = EvaluatorConfig::builder()
///     .api_key("test-key")
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct EvaluatorConfig {
    /// Gemini API key. `None` is allowed at construction time; the first
    /// model call then fails with [`AtsError::InvalidCredentials`].
    pub api_key: Option<String>,

    /// Model identifier. Default: `gemini-1.5-flash`.
    pub model: String,

    /// Model backend. Default: [`ModelBackend::Gemini`].
    pub backend: ModelBackend,

    /// Base URL of the Gemini REST API. Overridable for proxies and tests.
    pub api_base_url: String,

    /// Rendering DPI for the first page. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Cap on either rendered dimension, in pixels. Range: 100–16384.
    /// Default: 2200.
    ///
    /// A US Letter page at 200 DPI is 1700 × 2200, so the default never
    /// shrinks an ordinary resume.
    pub max_rendered_pixels: u32,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Optional timeout for the model HTTP call. Default: none.
    pub request_timeout_secs: Option<u64>,

    /// Optional sampling temperature forwarded to the model.
    pub temperature: Option<f32>,

    /// Optional cap on generated tokens.
    pub max_output_tokens: Option<u32>,

    /// Directory containing the pdfium shared library. When `None` the
    /// system library is used.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            backend: ModelBackend::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            dpi: 200,
            max_rendered_pixels: 2200,
            jpeg_quality: 75,
            request_timeout_secs: None,
            temperature: None,
            max_output_tokens: None,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for EvaluatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("backend", &self.backend)
            .field("api_base_url", &self.api_base_url)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl EvaluatorConfig {
    /// Create a new builder for `EvaluatorConfig`.
    pub fn builder() -> EvaluatorConfigBuilder {
        EvaluatorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Continue editing this configuration with a builder.
    pub fn into_builder(self) -> EvaluatorConfigBuilder {
        EvaluatorConfigBuilder { config: self }
    }

    /// Build a configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// if present; variables already set in the environment win.
    ///
    /// | Variable           | Field            |
    /// |--------------------|------------------|
    /// | `GOOGLE_API_KEY`   | `api_key`        |
    /// | `ATS_MODEL`        | `model`          |
    /// | `ATS_PROVIDER`     | `backend`        |
    /// | `ATS_API_BASE_URL` | `api_base_url`   |
    /// | `PDFIUM_LIB_PATH`  | `pdfium_lib_path`|
    pub fn from_env() -> Result<Self, AtsError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AtsError::InvalidConfig(format!(".env: {e}"))),
        }

        let mut builder = Self::builder();
        if let Some(key) = non_empty_var(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(model) = non_empty_var("ATS_MODEL") {
            builder = builder.model(model);
        }
        if let Some(provider) = non_empty_var("ATS_PROVIDER") {
            builder = builder.backend(ModelBackend::from_name(&provider));
        }
        if let Some(url) = non_empty_var("ATS_API_BASE_URL") {
            builder = builder.api_base_url(url);
        }
        if let Some(path) = non_empty_var("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(path);
        }
        builder.build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`EvaluatorConfig`].
#[derive(Debug)]
pub struct EvaluatorConfigBuilder {
    config: EvaluatorConfig,
}

impl EvaluatorConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn backend(mut self, backend: ModelBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels =
            px.clamp(*RENDERED_PIXELS_RANGE.start(), *RENDERED_PIXELS_RANGE.end());
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluatorConfig, AtsError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AtsError::InvalidConfig("model must not be empty".into()));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(AtsError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !RENDERED_PIXELS_RANGE.contains(&c.max_rendered_pixels) {
            return Err(AtsError::InvalidConfig(format!(
                "max rendered pixels must be {}–{}, got {}",
                RENDERED_PIXELS_RANGE.start(),
                RENDERED_PIXELS_RANGE.end(),
                c.max_rendered_pixels
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(AtsError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if !c.api_base_url.starts_with("http://") && !c.api_base_url.starts_with("https://") {
            return Err(AtsError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        Ok(self.config)
    }
}
