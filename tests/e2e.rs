//! Live end-to-end tests against the Gemini API.
//!
//! Gated behind `E2E_ENABLED` and a real `GOOGLE_API_KEY`, and skipped when
//! no pdfium library can be bound.
//!
//! Run with:
//!   E2E_ENABLED=1 GOOGLE_API_KEY=... PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture

mod common;

use ats_resume_expert::{
    evaluate, ActionOutcome, EvaluationRequester, EvaluatorConfig, InstructionTemplate,
    RawDocument, Session,
};
use common::{pdf_with_pages, text_line};

const JOB: &str = "Looking for a Python developer with data engineering experience";

/// Skip unless live calls are enabled, a key is set and pdfium binds.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let config = match EvaluatorConfig::from_env() {
            Ok(c) if c.api_key.is_some() => c,
            Ok(_) => {
                println!("SKIP — GOOGLE_API_KEY not set");
                return;
            }
            Err(e) => panic!("invalid environment: {e}"),
        };
        if !common::pdfium_available() {
            return;
        }
        config
    }};
}

fn resume() -> RawDocument {
    RawDocument::from_bytes(pdf_with_pages(&[text_line(
        "Jane Doe - Senior Python Developer - Pandas, Airflow, SQL",
    )]))
    .with_name("resume.pdf")
}

#[tokio::test]
async fn live_general_fit() {
    let config = e2e_skip_unless_ready!();

    let text = evaluate(Some(&resume()), InstructionTemplate::GeneralFit, JOB, &config)
        .await
        .expect("live evaluation");
    println!("{text}");
    assert!(!text.trim().is_empty());
}

#[tokio::test]
async fn live_percentage_match_mentions_a_percentage() {
    let config = e2e_skip_unless_ready!();

    let text = evaluate(
        Some(&resume()),
        InstructionTemplate::PercentageMatch,
        JOB,
        &config,
    )
    .await
    .expect("live evaluation");
    println!("{text}");
    assert!(text.contains('%'), "expected a percentage, got: {text}");
}

#[tokio::test]
async fn live_session_chat() {
    let config = e2e_skip_unless_ready!();

    let requester = EvaluationRequester::from_config(&config).unwrap();
    let mut session = Session::new(requester, config);
    session.upload_resume(resume());
    session.set_job_description(JOB);

    let outcome = session
        .run_action(InstructionTemplate::GeneralFit)
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Response(ref t) if !t.trim().is_empty()));

    session.start_conversation();
    let reply = session
        .chat("Which programming language does the candidate use?")
        .await
        .unwrap()
        .unwrap();
    println!("{reply}");
    assert_eq!(session.conversation().unwrap().len(), 2);
}
