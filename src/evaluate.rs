//! Evaluation entry points.
//!
//! [`EvaluationRequester`] sends one request to the injected model and
//! returns its text unchanged. [`evaluate`] and [`evaluate_sync`] are the
//! one-shot API: preprocess the resume, then request.

use crate::config::{EvaluatorConfig, ModelBackend};
use crate::error::AtsError;
use crate::model::{GeminiModel, GenerativeModel, ProviderModel};
use crate::pipeline::encode::EncodedPayload;
use crate::pipeline::input::RawDocument;
use crate::preprocess::prepare_payload;
use crate::prompts::InstructionTemplate;
use crate::request::{EvaluationRequest, Instruction};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sends evaluation requests to a generative model.
///
/// Exactly one model call per request; failures are returned, never
/// retried.
#[derive(Clone)]
pub struct EvaluationRequester {
    model: Arc<dyn GenerativeModel>,
}

impl std::fmt::Debug for EvaluationRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationRequester")
            .field("model", &self.model.name())
            .finish()
    }
}

impl EvaluationRequester {
    /// Use any model, e.g. a test stub.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Build the backend selected by `config.backend`.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, AtsError> {
        let model: Arc<dyn GenerativeModel> = match &config.backend {
            ModelBackend::Gemini => Arc::new(GeminiModel::from_config(config)?),
            ModelBackend::Provider(name) => Arc::new(ProviderModel::from_config(name, config)?),
        };
        debug!("Using model backend {}", model.name());
        Ok(Self::new(model))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Evaluate the resume image against `context` using a fixed template.
    pub async fn request_evaluation(
        &self,
        instruction: InstructionTemplate,
        payload: &EncodedPayload,
        context: &str,
    ) -> Result<String, AtsError> {
        self.send(EvaluationRequest::new(instruction, payload, context))
            .await
    }

    /// Ask a free-form question about the resume image.
    pub async fn ask(
        &self,
        question: &str,
        payload: &EncodedPayload,
        context: &str,
    ) -> Result<String, AtsError> {
        self.send(EvaluationRequest::new(
            Instruction::Question(question),
            payload,
            context,
        ))
        .await
    }

    async fn send(&self, request: EvaluationRequest<'_>) -> Result<String, AtsError> {
        let start = Instant::now();
        let mode = match request.instruction {
            Instruction::Template(t) => t.label(),
            Instruction::Question(_) => "chat",
        };
        info!(
            "Requesting '{}' from {} (image {} bytes, context {} chars)",
            mode,
            self.model.name(),
            request.payload.byte_len(),
            request.context.chars().count()
        );

        let result = self.model.generate(&request.parts()).await;
        match &result {
            Ok(text) => debug!(
                "{}: {} chars in {}ms",
                self.model.name(),
                text.len(),
                start.elapsed().as_millis()
            ),
            Err(e) => warn!("{}: {}", self.model.name(), e),
        }
        result
    }
}

/// Rasterise the resume and evaluate it with `template` in one call.
///
/// # Example
/// ```rust,no_run
/// use ats_resume_expert::{evaluate, EvaluatorConfig, InstructionTemplate, RawDocument};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EvaluatorConfig::from_env()?;
/// let resume = RawDocument::load("resume.pdf").await?;
/// let text = evaluate(
///     Some(&resume),
///     InstructionTemplate::PercentageMatch,
///     "Looking for a Python developer",
///     &config,
/// )
/// .await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub async fn evaluate(
    document: Option<&RawDocument>,
    template: InstructionTemplate,
    job_description: &str,
    config: &EvaluatorConfig,
) -> Result<String, AtsError> {
    let payload = prepare_payload(document, config).await?;
    let requester = EvaluationRequester::from_config(config)?;
    requester
        .request_evaluation(template, &payload, job_description)
        .await
}

/// Synchronous wrapper around [`evaluate`].
///
/// Creates a temporary tokio runtime internally.
pub fn evaluate_sync(
    document: Option<&RawDocument>,
    template: InstructionTemplate,
    job_description: &str,
    config: &EvaluatorConfig,
) -> Result<String, AtsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AtsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(evaluate(document, template, job_description, config))
}
