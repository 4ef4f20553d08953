//! CLI binary for ats-resume-expert.
//!
//! A thin shim over the library crate: maps CLI flags to
//! `EvaluatorConfig`, drives a `Session` and prints what the model says.

use anyhow::{Context, Result};
use ats_resume_expert::{
    ActionOutcome, EvaluationRequester, EvaluatorConfig, InstructionTemplate, ModelBackend,
    RawDocument, Session,
};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # General fit assessment
  ats --resume cv.pdf --job-description "Senior Python developer" --action general-fit

  # Percentage match, job description from a file
  ats -r cv.pdf --job-description-file jd.txt --action percentage-match

  # Ask follow-up questions, print the transcript as JSON at the end
  ats -r cv.pdf -j "Data engineer" --chat --transcript

  # Use another provider through edgequake-llm
  ats -r cv.pdf -a general-fit --provider openai --model gpt-4.1-mini

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY      Gemini API key (also read from a .env file)
  ATS_MODEL           Override model ID (default: gemini-1.5-flash)
  ATS_PROVIDER        gemini (default) or an edgequake-llm provider name
  ATS_API_BASE_URL    Override the Gemini REST base URL
  PDFIUM_LIB_PATH     Path to libpdfium (file or containing directory)
"#;

/// Evaluate a resume PDF against a job description with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "ats",
    version,
    about = "Evaluate a resume PDF against a job description with a vision LLM",
    long_about = "Rasterises the first page of a resume PDF and asks a generative model \
(Google Gemini by default) either for a general fit assessment or for an ATS-style \
percentage match against the job description.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("mode").required(true).multiple(true).args(["action", "chat"]))
)]
struct Cli {
    /// Resume PDF to evaluate.
    #[arg(short, long, env = "ATS_RESUME")]
    resume: Option<PathBuf>,

    /// Job description text.
    #[arg(short, long, conflicts_with = "job_description_file")]
    job_description: Option<String>,

    /// Read the job description from a file.
    #[arg(long)]
    job_description_file: Option<PathBuf>,

    /// Evaluation to run.
    #[arg(short, long, value_enum)]
    action: Option<ActionArg>,

    /// Ask free-form questions about the resume after the action (reads stdin).
    #[arg(long)]
    chat: bool,

    /// Print the chat transcript as JSON when the chat ends.
    #[arg(long, requires = "chat")]
    transcript: bool,

    /// Gemini API key.
    #[arg(long, hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID (e.g. gemini-1.5-flash, gemini-2.0-flash).
    #[arg(long)]
    model: Option<String>,

    /// Model backend: gemini, or an edgequake-llm provider (openai, anthropic, ollama, …).
    #[arg(long)]
    provider: Option<String>,

    /// Rendering DPI for the first page (72–400).
    #[arg(long, value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: Option<u32>,

    /// JPEG quality (1–100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Timeout for the model call, in seconds. No timeout by default.
    #[arg(long)]
    timeout: Option<u64>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long)]
    temperature: Option<f32>,

    /// Cap on generated tokens.
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Path to libpdfium, or the directory containing it.
    #[arg(long)]
    pdfium_lib_path: Option<PathBuf>,

    /// Disable the spinner.
    #[arg(long, env = "ATS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ATS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the model's answer and errors.
    #[arg(short, long, env = "ATS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    /// Tell Me About the Resume.
    GeneralFit,
    /// Percentage match.
    PercentageMatch,
}

impl From<ActionArg> for InstructionTemplate {
    fn from(v: ActionArg) -> Self {
        match v {
            ActionArg::GeneralFit => InstructionTemplate::GeneralFit,
            ActionArg::PercentageMatch => InstructionTemplate::PercentageMatch,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads .env before clap reads `env = ...` fallbacks.
    let env_config = EvaluatorConfig::from_env().context("Invalid configuration in environment")?;
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the only feedback that matters while waiting on the
    // model, so library INFO logs are suppressed while it is active.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build session ────────────────────────────────────────────────────
    let config = build_config(&cli, env_config)?;
    let requester =
        EvaluationRequester::from_config(&config).context("Failed to set up the model backend")?;
    let mut session = Session::new(requester, config);

    if let Some(ref path) = cli.resume {
        let resume = RawDocument::load(path)
            .await
            .context("Failed to read resume")?;
        session.upload_resume(resume);
        if !cli.quiet {
            eprintln!("{} {}", cyan("◆"), dim("PDF Uploaded Successfully"));
        }
    }
    session.set_job_description(read_job_description(&cli).await?);

    // ── Run action ───────────────────────────────────────────────────────
    if let Some(action) = cli.action {
        let template = InstructionTemplate::from(action);
        let spinner = show_progress.then(|| spinner(template.label()));
        let outcome = session.run_action(template).await;
        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }

        match outcome.context("Evaluation failed")? {
            ActionOutcome::Response(text) => {
                if !cli.quiet {
                    println!("{}\n", bold("The Response is"));
                }
                print_text(&text)?;
            }
            missing @ ActionOutcome::MissingResume => {
                println!("{}", missing.message());
            }
        }
    }

    // ── Chat ─────────────────────────────────────────────────────────────
    if cli.chat {
        run_chat(&mut session, show_progress).await?;

        if cli.transcript {
            if let Some(log) = session.conversation() {
                println!(
                    "{}",
                    serde_json::to_string_pretty(log).context("Failed to serialise transcript")?
                );
            }
        }
    }

    Ok(())
}

/// Overlay CLI flags on the configuration read from the environment.
fn build_config(cli: &Cli, base: EvaluatorConfig) -> Result<EvaluatorConfig> {
    let mut builder = base.into_builder();

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.backend(ModelBackend::from_name(provider));
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    if let Some(q) = cli.jpeg_quality {
        builder = builder.jpeg_quality(q);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_output_tokens {
        builder = builder.max_output_tokens(n);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path.clone());
    }

    builder.build().context("Invalid configuration")
}

async fn read_job_description(cli: &Cli) -> Result<String> {
    if let Some(ref path) = cli.job_description_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {:?}", path));
    }
    Ok(cli.job_description.clone().unwrap_or_default())
}

fn spinner(label: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(label.to_string());
    bar.set_message("waiting for the model…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_text(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Read questions from stdin until EOF or `exit`.
///
/// Errors from a single question are shown and the loop continues; the
/// question stays in the transcript without an answer.
async fn run_chat(session: &mut Session, show_progress: bool) -> Result<()> {
    session.start_conversation();
    eprintln!(
        "{} {}",
        cyan("◆"),
        dim("Ask about the resume. Empty line skips, Ctrl-D or `exit` ends.")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", bold("Human>"));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        let spinner = (show_progress && !line.trim().is_empty()).then(|| spinner("Chat"));
        let result = session.chat(&line).await;
        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }

        match result {
            Ok(Some(reply)) => {
                println!("{} {}", bold("AI>"), reply.trim_end());
            }
            Ok(None) => {}
            Err(e) => eprintln!("{} {}", red("✘"), red(&e.to_string())),
        }
    }
    Ok(())
}
