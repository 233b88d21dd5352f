//! CLI binary for edgequake-grader.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GradingConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_grader::config::validate_max_marks;
use edgequake_grader::output::format_marks;
use edgequake_grader::pipeline::segment::segment_answers;
use edgequake_grader::{
    extract_document, grade_submission, DocumentRole, GradeError, GradingConfig,
    GradingProgressCallback, GradingReport, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the documents are read, then a
/// per-question bar. Questions may finish out of order when concurrency > 1.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Rendering and OCR of both documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl GradingProgressCallback for CliProgressCallback {
    fn on_document_extracted(&self, role: DocumentRole, pages: usize, chars: usize) {
        self.bar.println(format!(
            "  {} {:<13} {}",
            green("✓"),
            role.to_string(),
            dim(&format!("{pages} pages, {chars} chars")),
        ));
    }

    fn on_grading_start(&self, total_questions: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} questions  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_questions as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Grading");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Grading {total_questions} answers…"))
        ));
    }

    fn on_question_start(&self, question: usize, _total: usize) {
        self.bar.set_message(format!("question {question}"));
    }

    fn on_question_graded(&self, question: usize, total: usize, score: u32, max_marks: f64) {
        self.bar.println(format!(
            "  {} Question {:>3}/{:<3}  {}",
            green("✓"),
            question,
            total,
            dim(&format!("{score}/{}", format_marks(max_marks))),
        ));
        self.bar.inc(1);
    }

    fn on_grading_complete(&self, total_score: u32, max_total: f64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Total {} / {}",
            green("✔"),
            bold(&total_score.to_string()),
            format_marks(max_total)
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Grade with a Gemini API key (10 marks per question)
  GEMINI_API_KEY=... grade student.pdf model_answer.pdf

  # 5 marks per question, JSON report to a file
  grade --max-marks 5 --json -o report.json student.pdf model_answer.pdf

  # Use another provider through edgequake-llm
  grade --provider openai --ai-model gpt-4.1-mini student.pdf model_answer.pdf

  # Only show what OCR read and how it was split into answers
  grade --extract-only student.pdf model_answer.pdf

ANSWER MARKERS:
  Every answer in both documents must start with a marker such as
  "Answer 1]" or "Answer 2b]". Answers are paired by position, so both
  documents must contain the same number of answers.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY            Gemini API key (selects the built-in Gemini client)
  OPENAI_API_KEY            OpenAI key, used by --provider openai or auto-detection
  EDGEQUAKE_LLM_PROVIDER    Provider used when no key or --provider is given
  EDGEQUAKE_MODEL           Model used together with EDGEQUAKE_LLM_PROVIDER
  PDFIUM_LIB_PATH           Path to libpdfium when --pdf-renderer-path is not set
  RUST_LOG                  Overrides the log filter (e.g. edgequake_grader=debug)

SETUP:
  1. Install tesseract:    apt install tesseract-ocr   (or brew install tesseract)
  2. Install pdfium and point PDFIUM_LIB_PATH at it
  3. Set an API key:       export GEMINI_API_KEY=...
"#;

/// Grade handwritten exam answers against a model-answer key.
#[derive(Parser, Debug)]
#[command(
    name = "grade",
    version,
    about = "Grade handwritten exam answers from scanned PDFs",
    long_about = "Read a student's handwritten answer sheet and a model-answer key with OCR, \
split both into answers on \"Answer N]\" markers, and grade each answer by keyword coverage \
with short feedback from a language model.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// The student's answer sheet (PDF).
    student_pdf: PathBuf,

    /// The model-answer key (PDF).
    model_pdf: PathBuf,

    /// Marks available per question.
    #[arg(short, long, env = "GRADER_MAX_MARKS", default_value_t = 10.0)]
    max_marks: f64,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, env = "GRADER_OUTPUT")]
    output: Option<PathBuf>,

    /// Output the report as JSON.
    #[arg(long, env = "GRADER_JSON")]
    json: bool,

    /// Pages OCR'd and questions graded concurrently.
    #[arg(short, long, env = "GRADER_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Path to the tesseract binary.
    #[arg(long, env = "GRADER_OCR_ENGINE_PATH")]
    ocr_engine_path: Option<PathBuf>,

    /// Path to the pdfium shared library, or the directory containing it.
    #[arg(long, env = "GRADER_PDF_RENDERER_PATH")]
    pdf_renderer_path: Option<PathBuf>,

    /// Gemini API key. Selects the built-in Gemini client.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,

    /// Model ID (default: gemini-1.5-flash with an API key, gpt-4.1-nano otherwise).
    #[arg(long, env = "GRADER_AI_MODEL")]
    ai_model: Option<String>,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "GRADER_PROVIDER")]
    provider: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "GRADER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "GRADER_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "GRADER_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// HTTP timeout for the Gemini client, in seconds.
    #[arg(long, env = "GRADER_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// File with a custom keyword prompt ({model_answer} placeholder).
    #[arg(long, env = "GRADER_KEYWORD_PROMPT")]
    keyword_prompt: Option<PathBuf>,

    /// File with a custom feedback prompt.
    #[arg(long, env = "GRADER_FEEDBACK_PROMPT")]
    feedback_prompt: Option<PathBuf>,

    /// Print the OCR transcripts and segmented answers, without grading.
    #[arg(long)]
    extract_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "GRADER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GRADER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GRADER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<GradeError>() {
            Some(e) if e.is_validation() => {
                eprintln!("{} {}", red("✘"), e);
                ExitCode::from(2)
            }
            _ => {
                eprintln!("{} {:#}", red("✘"), err);
                ExitCode::FAILURE
            }
        },
    }
}

fn init_logging(cli: &Cli) {
    // The progress bar replaces INFO logs unless the user asked for them.
    let show_progress = show_progress(cli);
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
}

fn show_progress(cli: &Cli) -> bool {
    !cli.quiet && !cli.no_progress && !cli.json
}

async fn run(cli: Cli) -> Result<()> {
    // ── Validate the request ─────────────────────────────────────────────
    for path in [&cli.student_pdf, &cli.model_pdf] {
        if !path.is_file() {
            return Err(GradeError::Validation(format!(
                "Please upload both files. Not found: {}",
                path.display()
            ))
            .into());
        }
    }
    validate_max_marks(cli.max_marks)?;

    let progress_cb: Option<ProgressCallback> = if show_progress(&cli) && !cli.extract_only {
        Some(CliProgressCallback::new() as Arc<dyn GradingProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let (student, model) = tokio::try_join!(
            extract_document(DocumentRole::Student, &cli.student_pdf, &config),
            extract_document(DocumentRole::ModelAnswer, &cli.model_pdf, &config),
        )
        .context("Failed to read documents")?;

        let rendered = if cli.json {
            let value = serde_json::json!({
                "student": { "document": &student, "answers": segment_answers(&student.text) },
                "model_answer": { "document": &model, "answers": segment_answers(&model.text) },
            });
            serde_json::to_string_pretty(&value).context("Failed to serialise transcripts")?
        } else {
            let mut out = String::new();
            for doc in [&student, &model] {
                let _ = writeln!(out, "{}", bold(&format!("── {} ({} pages) ──", doc.role, doc.page_count)));
                for (i, answer) in segment_answers(&doc.text).iter().enumerate() {
                    let _ = writeln!(out, "{} {}", cyan(&format!("[{}]", i + 1)), answer);
                }
                out.push('\n');
            }
            out
        };
        return emit(&rendered, cli.output.as_deref()).await;
    }

    // ── Run grading ──────────────────────────────────────────────────────
    let report = grade_submission(&cli.student_pdf, &cli.model_pdf, &config)
        .await
        .context("Grading failed")?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&report).context("Failed to serialise report")?
    } else {
        render_report(&report, cli.output.is_none())
    };
    emit(&rendered, cli.output.as_deref()).await?;

    if !cli.quiet {
        if let Some(ref path) = cli.output {
            eprintln!(
                "{}  {} questions  {}ms  →  {}",
                green("✔"),
                report.stats.questions,
                report.stats.total_duration_ms,
                bold(&path.display().to_string()),
            );
        } else if !show_progress(&cli) {
            eprintln!(
                "Graded {} questions in {}ms",
                report.stats.questions, report.stats.total_duration_ms
            );
        }
    }

    Ok(())
}

/// Map CLI args to `GradingConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GradingConfig> {
    let mut builder = GradingConfig::builder()
        .max_marks(cli.max_marks)
        .concurrency(cli.concurrency)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref p) = cli.ocr_engine_path {
        builder = builder.ocr_engine_path(p);
    }
    if let Some(ref p) = cli.pdf_renderer_path {
        builder = builder.pdf_renderer_path(p);
    }
    if let Some(ref key) = cli.ai_api_key {
        builder = builder.ai_api_key(key);
    }
    if let Some(ref model) = cli.ai_model {
        builder = builder.ai_model_name(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.ai_provider(provider);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref path) = cli.keyword_prompt {
        builder = builder.keyword_prompt(read_prompt(path).await?);
    }
    if let Some(ref path) = cli.feedback_prompt {
        builder = builder.feedback_prompt(read_prompt(path).await?);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}

async fn read_prompt(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read prompt from {:?}", path))
}

/// Human-readable report. Colour only when writing to a terminal stream.
fn render_report(report: &GradingReport, colour: bool) -> String {
    let paint = |f: fn(&str) -> String, s: &str| if colour { f(s) } else { s.to_string() };
    let max = format_marks(report.max_marks);
    let mut out = String::new();

    for r in &report.results {
        let _ = writeln!(
            out,
            "{}  {}",
            paint(bold, &format!("Question {}", r.question)),
            paint(cyan, &format!("{}/{}", r.score, max)),
        );
        let _ = writeln!(out, "  {} {}", paint(dim, "Keywords:"), r.keywords.join(", "));
        let _ = writeln!(out, "  {} {}", paint(dim, "Feedback:"), r.feedback);
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{} {}/{} ({:.1}%)",
        paint(bold, "Total:"),
        report.total_score,
        format_marks(report.max_total()),
        report.percentage()
    );
    out
}

/// Write to `path` (temp file + rename) or to stdout.
async fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let tmp_path = path.with_extension("tmp");
            tokio::fs::write(&tmp_path, text)
                .await
                .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
            tokio::fs::rename(&tmp_path, path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}
