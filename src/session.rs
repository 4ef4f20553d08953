//! Session state for an interactive front end.
//!
//! A [`Session`] is what a UI keeps between button presses: the uploaded
//! resume (if any), the job description text and, once started, the chat
//! transcript. It is also where the "no resume uploaded" precondition is
//! enforced, before the pipeline runs and before any network call.
//!
//! One session per user. Nothing here is shared or persisted.

use crate::config::EvaluatorConfig;
use crate::conversation::{ConversationLog, ConversationTurn};
use crate::error::AtsError;
use crate::evaluate::EvaluationRequester;
use crate::pipeline::encode::EncodedPayload;
use crate::pipeline::input::RawDocument;
use crate::preprocess::prepare_payload;
use crate::prompts::{InstructionTemplate, NO_RESUME_CHAT_REPLY, NO_RESUME_MESSAGE};
use tracing::info;

/// Result of pressing one of the two action buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The model's evaluation, verbatim.
    Response(String),
    /// No resume was uploaded; nothing was sent.
    MissingResume,
}

impl ActionOutcome {
    /// Text to show the user.
    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Response(text) => text,
            ActionOutcome::MissingResume => NO_RESUME_MESSAGE,
        }
    }
}

/// State of one user's interaction.
#[derive(Debug)]
pub struct Session {
    requester: EvaluationRequester,
    config: EvaluatorConfig,
    resume: Option<RawDocument>,
    /// Rasterised first page of `resume`, filled on first use.
    payload: Option<EncodedPayload>,
    job_description: String,
    conversation: Option<ConversationLog>,
}

impl Session {
    pub fn new(requester: EvaluationRequester, config: EvaluatorConfig) -> Self {
        Self {
            requester,
            config,
            resume: None,
            payload: None,
            job_description: String::new(),
            conversation: None,
        }
    }

    /// Replace the uploaded resume.
    pub fn upload_resume(&mut self, resume: RawDocument) {
        info!(
            "Resume uploaded: {} ({} bytes)",
            resume.name().unwrap_or("<unnamed>"),
            resume.len()
        );
        self.resume = Some(resume);
        self.payload = None;
    }

    pub fn has_resume(&self) -> bool {
        self.resume.is_some()
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Run one of the two evaluation actions.
    ///
    /// Without a resume this returns [`ActionOutcome::MissingResume`] and
    /// does nothing else.
    pub async fn run_action(
        &mut self,
        template: InstructionTemplate,
    ) -> Result<ActionOutcome, AtsError> {
        let Some(payload) = self.resume_payload().await? else {
            info!("'{}' requested without a resume", template.label());
            return Ok(ActionOutcome::MissingResume);
        };

        let text = self
            .requester
            .request_evaluation(template, &payload, &self.job_description)
            .await?;
        Ok(ActionOutcome::Response(text))
    }

    /// Start the chat transcript. Calling it again keeps the existing one.
    pub fn start_conversation(&mut self) -> &ConversationLog {
        self.conversation.get_or_insert_with(ConversationLog::new)
    }

    pub fn conversation(&self) -> Option<&ConversationLog> {
        self.conversation.as_ref()
    }

    /// Ask a free-form question about the uploaded resume.
    ///
    /// Returns `Ok(None)` for a blank question, which is not logged.
    /// Otherwise the question and the reply are appended to the transcript.
    /// If the model call fails the question stays logged without a reply.
    pub async fn chat(&mut self, question: &str) -> Result<Option<String>, AtsError> {
        if self.conversation.is_none() {
            return Err(AtsError::ConversationNotStarted);
        }
        if question.trim().is_empty() {
            return Ok(None);
        }

        self.push_turn(ConversationTurn::Human(question.to_string()));

        let reply = match self.resume_payload().await? {
            None => NO_RESUME_CHAT_REPLY.to_string(),
            Some(payload) => {
                self.requester
                    .ask(question, &payload, &self.job_description)
                    .await?
            }
        };

        self.push_turn(ConversationTurn::Ai(reply.clone()));
        Ok(Some(reply))
    }

    /// The encoded first page of the current resume, rendering it once per
    /// upload. `None` when no resume was uploaded.
    async fn resume_payload(&mut self) -> Result<Option<EncodedPayload>, AtsError> {
        let Some(resume) = self.resume.as_ref() else {
            return Ok(None);
        };
        if self.payload.is_none() {
            self.payload = Some(prepare_payload(Some(resume), &self.config).await?);
        }
        Ok(self.payload.clone())
    }

    fn push_turn(&mut self, turn: ConversationTurn) {
        if let Some(log) = self.conversation.as_mut() {
            log.append(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GenerativeModel, Part, ProviderModel};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _parts: &[Part<'_>]) -> Result<String, AtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Strong match".into())
        }
    }

    fn session() -> (Session, Arc<CountingModel>) {
        let model = Arc::new(CountingModel::default());
        let requester = EvaluationRequester::new(model.clone());
        (Session::new(requester, EvaluatorConfig::default()), model)
    }

    #[test]
    fn action_without_resume_short_circuits() {
        let (mut s, model) = session();
        s.set_job_description("Looking for a Python developer");

        let outcome = tokio_test::block_on(s.run_action(InstructionTemplate::GeneralFit)).unwrap();
        assert_eq!(outcome, ActionOutcome::MissingResume);
        assert_eq!(outcome.message(), "Please upload the resume");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn chat_requires_started_conversation() {
        let (mut s, _) = session();
        let err = tokio_test::block_on(s.chat("hello")).unwrap_err();
        assert!(matches!(err, AtsError::ConversationNotStarted));
        assert!(s.conversation().is_none());
    }

    #[test]
    fn blank_question_is_ignored() {
        let (mut s, model) = session();
        s.start_conversation();
        let reply = tokio_test::block_on(s.chat("   ")).unwrap();
        assert!(reply.is_none());
        assert!(s.conversation().unwrap().is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn chat_without_resume_logs_fixed_reply() {
        let (mut s, model) = session();
        s.start_conversation();

        let reply = tokio_test::block_on(s.chat("Is this candidate senior?")).unwrap();
        assert_eq!(reply.as_deref(), Some(NO_RESUME_CHAT_REPLY));
        assert_eq!(
            s.conversation().unwrap().all(),
            &[
                ConversationTurn::Human("Is this candidate senior?".into()),
                ConversationTurn::Ai(NO_RESUME_CHAT_REPLY.into()),
            ]
        );
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_conversation_is_idempotent() {
        let (mut s, _) = session();
        s.start_conversation();
        tokio_test::block_on(s.chat("q")).unwrap();
        s.start_conversation();
        assert_eq!(s.conversation().unwrap().len(), 2);
    }

    fn unconfigured_provider_session() -> Session {
        let model = ProviderModel::unavailable("openai", "OPENAI_API_KEY required");
        Session::new(
            EvaluationRequester::new(Arc::new(model)),
            EvaluatorConfig::default(),
        )
    }

    #[test]
    fn missing_resume_wins_over_unconfigured_provider() {
        let mut s = unconfigured_provider_session();
        let outcome = tokio_test::block_on(s.run_action(InstructionTemplate::GeneralFit)).unwrap();
        assert_eq!(outcome, ActionOutcome::MissingResume);

        s.start_conversation();
        let reply = tokio_test::block_on(s.chat("Any Python?")).unwrap();
        assert_eq!(reply.as_deref(), Some(NO_RESUME_CHAT_REPLY));
    }

    #[test]
    fn unconfigured_provider_fails_once_a_resume_is_present() {
        let mut s = unconfigured_provider_session();
        s.upload_resume(RawDocument::from_bytes(b"%PDF-1.4".to_vec()));
        s.payload = Some(EncodedPayload::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9]));

        let err = tokio_test::block_on(s.run_action(InstructionTemplate::GeneralFit)).unwrap_err();
        assert!(matches!(err, AtsError::ProviderNotConfigured { .. }), "got {err:?}");
    }

    #[test]
    fn rendered_page_is_reused_across_questions() {
        let (mut s, model) = session();
        // Not a renderable PDF: any attempt to rasterise it would fail.
        s.upload_resume(RawDocument::from_bytes(b"garbage".to_vec()));
        s.payload = Some(EncodedPayload::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9]));
        s.start_conversation();

        tokio_test::block_on(s.chat("First?")).unwrap();
        tokio_test::block_on(s.chat("Second?")).unwrap();
        tokio_test::block_on(s.run_action(InstructionTemplate::PercentageMatch)).unwrap();
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn new_upload_drops_the_rendered_page() {
        let (mut s, model) = session();
        s.upload_resume(RawDocument::from_bytes(b"garbage".to_vec()));
        s.payload = Some(EncodedPayload::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9]));

        s.upload_resume(RawDocument::from_bytes(b"still garbage".to_vec()));
        assert!(s.payload.is_none());
        let err = tokio_test::block_on(s.run_action(InstructionTemplate::GeneralFit)).unwrap_err();
        assert!(matches!(err, AtsError::UnparseableDocument { .. }));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn upload_sets_resume() {
        let (mut s, _) = session();
        assert!(!s.has_resume());
        s.upload_resume(RawDocument::from_bytes(b"%PDF-1.4".to_vec()));
        assert!(s.has_resume());
    }
}
