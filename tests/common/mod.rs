//! Shared fixtures for integration tests.
#![allow(dead_code)]

use ats_resume_expert::pipeline::render::bind_pdfium;
use ats_resume_expert::{AtsError, EncodedPayload, EvaluatorConfig, GenerativeModel, Part};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// ── PDF fixtures ─────────────────────────────────────────────────────────────

/// Content stream filling a US Letter page with one RGB colour.
pub fn solid_fill(r: f32, g: f32, b: f32) -> String {
    format!("{r} {g} {b} rg 0 0 612 792 re f")
}

/// Content stream drawing one line of Helvetica text.
pub fn text_line(text: &str) -> String {
    format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET")
}

/// Build a minimal, valid PDF with one page per content stream.
///
/// Object layout: 1 catalog, 2 page tree, then a (page, content) pair per
/// page. Offsets in the xref table are exact.
pub fn pdf_with_pages(contents: &[String]) -> Vec<u8> {
    let n = contents.len();
    let kids = (0..n)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {n} >>"),
    ];
    for (i, content) in contents.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R \
             /Resources << /Font << /F1 << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> >> >> >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, obj).as_bytes());
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", off));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}

// ── pdfium ───────────────────────────────────────────────────────────────────

fn pdfium_lib_path() -> Option<PathBuf> {
    std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Route library logs to the test harness. `RUST_LOG=debug` shows them
/// with `--nocapture`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Low-DPI config so rendering stays fast in tests.
pub fn test_config() -> EvaluatorConfig {
    init_tracing();
    let mut builder = EvaluatorConfig::builder().dpi(72).api_key("test-key");
    if let Some(path) = pdfium_lib_path() {
        builder = builder.pdfium_lib_path(path);
    }
    builder.build().expect("valid test config")
}

/// `false` (with a SKIP note) when no pdfium library can be bound.
pub fn pdfium_available() -> bool {
    match bind_pdfium(pdfium_lib_path().as_deref()) {
        Ok(_) => true,
        Err(e) => {
            println!("SKIP — pdfium not available: {e}");
            false
        }
    }
}

/// Mean RGB of a decoded payload image.
pub fn mean_rgb(payload: &EncodedPayload) -> [f64; 3] {
    let bytes = payload.decode_bytes().expect("valid base64");
    let img = image::load_from_memory(&bytes)
        .expect("payload is a decodable image")
        .to_rgb8();
    let mut sum = [0f64; 3];
    for px in img.pixels() {
        for c in 0..3 {
            sum[c] += px.0[c] as f64;
        }
    }
    let n = (img.width() * img.height()) as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

// ── Stub model ───────────────────────────────────────────────────────────────

/// Owned copy of a request part, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedPart {
    Text(String),
    Image { mime_type: String, data: String },
}

type Reply = Box<dyn Fn() -> Result<String, AtsError> + Send + Sync>;

/// A model that records every request and answers from a closure.
pub struct StubModel {
    reply: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<RecordedPart>>>,
}

impl StubModel {
    pub fn replying(text: &'static str) -> Self {
        Self::with(move || Ok(text.to_string()))
    }

    pub fn with(reply: impl Fn() -> Result<String, AtsError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<RecordedPart>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, parts: &[Part<'_>]) -> Result<String, AtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let recorded = parts
            .iter()
            .map(|part| match *part {
                Part::Text(t) => RecordedPart::Text(t.to_string()),
                Part::Image(p) => RecordedPart::Image {
                    mime_type: p.mime_type.clone(),
                    data: p.data.clone(),
                },
            })
            .collect();
        self.requests.lock().unwrap().push(recorded);
        (self.reply)()
    }
}

/// A tiny but well-formed JPEG payload (SOI + EOI markers).
pub fn fake_payload() -> EncodedPayload {
    EncodedPayload::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9])
}
