//! Error types for the edgequake-grader library.
//!
//! Every stage of the pipeline has its own small error enum describing what
//! went wrong *inside* that stage:
//!
//! * [`RenderError`] — the PDF could not be turned into page images.
//! * [`OcrError`] — the OCR engine could not read a page image.
//! * [`GenerationError`] — the text-generation capability failed or replied
//!   with nothing.
//!
//! The orchestrator wraps them into [`GradeError`], adding the context a
//! caller needs to act on the failure (which document, which page, which
//! question). [`GradeError::kind`] collapses the variants onto the coarse
//! taxonomy used for exit codes and user-facing messages.
//!
//! Every `GradeError` is fatal to the grading request. Noisy OCR output is a
//! data-quality issue and never surfaces here.

use crate::output::DocumentRole;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-grader library.
#[derive(Debug, Error)]
pub enum GradeError {
    // ── Rendering ────────────────────────────────────────────────────────
    /// A document could not be rendered to page images.
    #[error("Failed to render the {document} document: {source}")]
    Render {
        document: DocumentRole,
        #[source]
        source: RenderError,
    },

    // ── OCR ──────────────────────────────────────────────────────────────
    /// The OCR engine could not read a page.
    #[error("OCR failed on page {page} of the {document} document: {source}")]
    Ocr {
        document: DocumentRole,
        page: usize,
        #[source]
        source: OcrError,
    },

    // ── Segmentation ─────────────────────────────────────────────────────
    /// The two documents segment into a different number of answers.
    #[error(
        "Mismatch in number of answers: the student document has {student}, \
the model answer key has {model}.\nCheck that every answer starts with an \"Answer N]\" marker."
    )]
    AnswerCountMismatch { student: usize, model: usize },

    // ── Text generation ──────────────────────────────────────────────────
    /// Keyword derivation failed for a question.
    #[error("Keyword extraction failed for question {question}: {source}")]
    KeywordExtraction {
        question: usize,
        #[source]
        source: GenerationError,
    },

    /// Feedback generation failed for a question.
    #[error("Error generating feedback for question {question}: {source}")]
    Feedback {
        question: usize,
        #[source]
        source: GenerationError,
    },

    /// No text-generation capability could be set up.
    #[error("Text generator is not available: {0}")]
    GeneratorUnavailable(#[source] GenerationError),

    // ── Input validation ─────────────────────────────────────────────────
    /// The request itself is unusable (missing upload, invalid max marks).
    #[error("{0}")]
    Validation(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`GradeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Render,
    Ocr,
    Mismatch,
    KeywordExtraction,
    Feedback,
    Validation,
    Internal,
}

impl GradeError {
    /// Map the error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            GradeError::Render { .. } => ErrorKind::Render,
            GradeError::Ocr { .. } => ErrorKind::Ocr,
            GradeError::AnswerCountMismatch { .. } => ErrorKind::Mismatch,
            GradeError::KeywordExtraction { .. } => ErrorKind::KeywordExtraction,
            GradeError::Feedback { .. } => ErrorKind::Feedback,
            GradeError::GeneratorUnavailable(_) => ErrorKind::KeywordExtraction,
            GradeError::Validation(_) | GradeError::InvalidConfig(_) => ErrorKind::Validation,
            GradeError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` for errors the caller should show to the user as a form
    /// message rather than treat as a crash.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Failure to turn a PDF into page images.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {detail}\n\
Set --pdf-renderer-path (or PDFIUM_LIB_PATH) to the directory or file of an existing libpdfium."
    )]
    LibraryUnavailable { detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The blocking render task died.
    #[error("Render task failed: {0}")]
    Internal(String),
}

/// Failure of the OCR engine on a single page image.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR binary could not be started.
    #[error("OCR engine '{path}' could not be started: {source}\nInstall tesseract or set --ocr-engine-path.")]
    EngineUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OCR binary ran but rejected the image.
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// The page image could not be encoded for the engine.
    #[error("Page image could not be encoded: {0}")]
    ImageEncoding(#[from] image::ImageError),

    /// Talking to the OCR child process failed.
    #[error("I/O error while running the OCR engine: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the text-generation capability.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// No provider could be configured (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    NotConfigured { provider: String, hint: String },

    /// The request never produced an HTTP response (network, DNS, timeout).
    #[error("LLM request failed: {0}")]
    Request(String),

    /// The API answered with an error status.
    #[error("LLM API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered but the reply carried no text.
    #[error("No text returned from the AI model")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display_mentions_both_counts() {
        let e = GradeError::AnswerCountMismatch {
            student: 3,
            model: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains('3') && msg.contains('4'), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::Mismatch);
    }

    #[test]
    fn render_error_names_document() {
        let e = GradeError::Render {
            document: DocumentRole::ModelAnswer,
            source: RenderError::FileNotFound {
                path: PathBuf::from("/tmp/key.pdf"),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("model answer"), "got: {msg}");
        assert!(msg.contains("key.pdf"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::Render);
    }

    #[test]
    fn ocr_error_names_page() {
        let e = GradeError::Ocr {
            document: DocumentRole::Student,
            page: 2,
            source: OcrError::EngineFailed {
                status: "exit status: 1".into(),
                stderr: "Error in pixReadMem".into(),
            },
        };
        assert!(e.to_string().contains("page 2"));
        assert_eq!(e.kind(), ErrorKind::Ocr);
    }

    #[test]
    fn feedback_error_wraps_cause() {
        let e = GradeError::Feedback {
            question: 5,
            source: GenerationError::EmptyResponse,
        };
        assert!(e.to_string().contains("question 5"));
        assert!(e.to_string().contains("No text returned"));
        assert_eq!(e.kind(), ErrorKind::Feedback);
    }

    #[test]
    fn validation_kinds() {
        assert!(GradeError::Validation("Please upload both files.".into()).is_validation());
        assert!(GradeError::InvalidConfig("max_marks".into()).is_validation());
        assert!(!GradeError::Internal("boom".into()).is_validation());
    }
}
