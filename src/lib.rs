//! # ats-resume-expert
//!
//! Evaluate a resume against a job description with a vision LLM.
//!
//! The first page of the resume PDF is rasterised, JPEG-encoded and sent to
//! a generative model (Google Gemini by default) together with one of two
//! fixed instructions and the job description. The model's answer is
//! returned as-is.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input    keep the upload in memory, check the %PDF magic
//!  ├─ 2. Render   rasterise page 1 only via pdfium (spawn_blocking)
//!  ├─ 3. Encode   RGB → JPEG → base64 EncodedPayload
//!  ├─ 4. Request  [instruction, image, job description] → one model call
//!  └─ 5. Output   the model's text, verbatim
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ats_resume_expert::{evaluate, EvaluatorConfig, InstructionTemplate, RawDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GOOGLE_API_KEY (and a .env file if present)
//!     let config = EvaluatorConfig::from_env()?;
//!     let resume = RawDocument::load("resume.pdf").await?;
//!     let text = evaluate(
//!         Some(&resume),
//!         InstructionTemplate::GeneralFit,
//!         "Senior Rust engineer, async networking",
//!         &config,
//!     )
//!     .await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod conversation;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod prompts;
pub mod request;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EvaluatorConfig, EvaluatorConfigBuilder, ModelBackend};
pub use conversation::{ConversationLog, ConversationTurn};
pub use error::AtsError;
pub use evaluate::{evaluate, evaluate_sync, EvaluationRequester};
pub use model::{GeminiModel, GenerativeModel, Part, ProviderModel};
pub use pipeline::encode::EncodedPayload;
pub use pipeline::input::RawDocument;
pub use preprocess::{prepare_payload, rasterize_first_page};
pub use prompts::InstructionTemplate;
pub use request::{EvaluationRequest, Instruction};
pub use session::{ActionOutcome, Session};
