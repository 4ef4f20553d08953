//! Adapter from [`GenerativeModel`] to an `edgequake-llm` provider.
//!
//! This lets the evaluation run against any vision-capable provider that
//! library knows (OpenAI, Anthropic, Ollama, …). Provider credentials are
//! read by `edgequake-llm` itself from its usual environment variables.
//!
//! ## Message Layout
//!
//! Each [`Part`] becomes its own user message, in order:
//! 1. **User message** — the instruction (or chat question)
//! 2. **User message** — the resume page as a base64 image attachment (empty text)
//! 3. **User message** — the job description
//!
//! Folding everything into one message would put the image after both
//! texts, and the instruction refers to "the provided resume" before
//! "the job description".

use super::{GenerativeModel, Part};
use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A [`GenerativeModel`] backed by an `edgequake-llm` provider.
pub struct ProviderModel {
    handle: ProviderHandle,
    provider_name: String,
    label: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

/// A provider whose setup failed (typically a missing key) is kept so the
/// failure surfaces on the first call, like a missing Gemini key does.
enum ProviderHandle {
    Ready(Arc<dyn LLMProvider>),
    Unavailable(String),
}

impl ProviderModel {
    /// Wrap a pre-built provider.
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            handle: ProviderHandle::Ready(provider),
            provider_name: label.split('/').next().unwrap_or_default().to_string(),
            label,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Instantiate the named provider with `config.model`.
    ///
    /// An unknown provider name is a configuration error and fails here.
    /// Any other setup failure is deferred to [`GenerativeModel::generate`],
    /// which reports it as [`AtsError::ProviderNotConfigured`].
    pub fn from_config(provider_name: &str, config: &EvaluatorConfig) -> Result<Self, AtsError> {
        let handle = match ProviderFactory::create_llm_provider(provider_name, &config.model) {
            Ok(provider) => ProviderHandle::Ready(provider),
            Err(e) => {
                let hint = e.to_string();
                if is_unknown_provider(&hint) {
                    return Err(AtsError::InvalidConfig(format!(
                        "unknown model provider '{provider_name}': {hint}"
                    )));
                }
                warn!("Provider '{}' is not ready: {}", provider_name, hint);
                ProviderHandle::Unavailable(hint)
            }
        };

        Ok(Self {
            handle,
            provider_name: provider_name.to_string(),
            label: format!("{provider_name}/{}", config.model),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens.map(|n| n as usize),
        })
    }

    #[cfg(test)]
    pub(crate) fn unavailable(provider_name: &str, hint: &str) -> Self {
        Self {
            handle: ProviderHandle::Unavailable(hint.to_string()),
            provider_name: provider_name.to_string(),
            label: format!("{provider_name}/test"),
            temperature: None,
            max_tokens: None,
        }
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

#[async_trait]
impl GenerativeModel for ProviderModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, parts: &[Part<'_>]) -> Result<String, AtsError> {
        let provider = match &self.handle {
            ProviderHandle::Ready(provider) => provider,
            ProviderHandle::Unavailable(hint) => {
                return Err(AtsError::ProviderNotConfigured {
                    provider: self.provider_name.clone(),
                    hint: hint.clone(),
                })
            }
        };

        let messages = build_messages(parts);
        let options = self.build_options();
        let start = Instant::now();

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| {
                let err_msg = format!("{}", e);
                warn!("{}: call failed — {}", self.label, err_msg);
                classify_provider_error(&self.provider_name, err_msg)
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.label,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(AtsError::EmptyResponse);
        }
        Ok(response.content)
    }
}

fn build_messages(parts: &[Part<'_>]) -> Vec<ChatMessage> {
    parts
        .iter()
        .map(|part| match *part {
            Part::Text(text) => ChatMessage::user(text),
            Part::Image(payload) => ChatMessage::user_with_images(
                "",
                vec![ImageData::new(payload.data.clone(), payload.mime_type.clone())],
            ),
        })
        .collect()
}

fn is_unknown_provider(message: &str) -> bool {
    message.to_lowercase().contains("unknown llm provider")
}

/// Environment variable a hosted provider reads its key from.
fn provider_key_var(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "xai" => Some("XAI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        _ => None,
    }
}

/// `edgequake-llm` surfaces failures as display strings; pick out the
/// authentication ones.
fn classify_provider_error(provider_name: &str, message: String) -> AtsError {
    let lower = message.to_lowercase();
    let auth = ["401", "403", "unauthorized", "authentication", "api key", "api_key"]
        .iter()
        .any(|needle| lower.contains(needle));

    if auth {
        let hint = match provider_key_var(provider_name) {
            Some(var) => format!("Set {var} for the '{provider_name}' provider."),
            None => format!("Check the credentials of the '{provider_name}' provider."),
        };
        AtsError::InvalidCredentials {
            detail: message,
            hint,
        }
    } else {
        AtsError::ServiceUnavailable { detail: message }
    }
}
