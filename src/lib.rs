//! # edgequake-grader
//!
//! Grade handwritten exam answers from scanned PDFs.
//!
//! ## Why this crate?
//!
//! Marking a stack of handwritten answer sheets against a model-answer key is
//! slow and repetitive. This crate reads both documents with OCR, splits them
//! into individual answers on `Answer N]` markers, and grades each student
//! answer against its model answer with a transparent rubric: near-verbatim
//! answers get full marks, everything else loses an equal share of the marks
//! for each key term it misses. A language model derives the key terms and
//! writes short feedback; it never decides the mark itself.
//!
//! ## Pipeline Overview
//!
//! ```text
//! student PDF ─┐                                  ┌─ keywords  (LLM)
//!              ├─ render ─ OCR ─ segment ─ pair ──┼─ score     (local)
//! model PDF ───┘  pdfium   tesseract  Answer N]   └─ feedback  (LLM)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_grader::{grade_submission, GradingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GradingConfig::builder()
//!         .max_marks(10.0)
//!         .ai_api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     let report = grade_submission("student.pdf", "model_answer.pdf", &config).await?;
//!     for r in &report.results {
//!         println!("Q{}: {}/{}  {}", r.question, r.score, report.max_marks, r.feedback);
//!     }
//!     println!("Total: {}", report.total_score);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `grade` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-grader = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! * **pdfium** shared library, found via `pdf_renderer_path`,
//!   `PDFIUM_LIB_PATH`, or the system library path.
//! * **tesseract** binary, found via `ocr_engine_path` or `PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod grade;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GradingConfig, GradingConfigBuilder, DEFAULT_MAX_MARKS};
pub use error::{ErrorKind, GenerationError, GradeError, OcrError, RenderError};
pub use grade::{
    extract_document, grade_submission, grade_submission_bytes, grade_submission_sync, grade_texts,
};
pub use output::{DocumentRole, DocumentText, GradingReport, GradingStats, ScoreResult};
pub use pipeline::keywords::Keywords;
pub use pipeline::llm::TextGenerator;
pub use pipeline::ocr::TextExtractor;
pub use pipeline::render::PageRenderer;
pub use progress::{GradingProgressCallback, NoopProgressCallback, ProgressCallback};
