//! Pipeline stages for grading a handwritten answer sheet.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the I/O-bound ones (rendering, OCR, text generation) can be
//! replaced by fakes.
//!
//! ## Data Flow
//!
//! ```text
//!          ┌─ render ─▶ encode ─▶ ocr ─▶ clean ─┐
//! input ──▶│  (pdfium)   (PNG)  (tesseract)     ├─▶ segment ─▶ per question:
//!          └─ render ─▶ encode ─▶ ocr ─▶ clean ─┘              keywords ─▶ score ─▶ feedback
//!            student / model answer documents                 (llm)      (local)   (llm)
//! ```
//!
//! 1. [`input`]    — validate a PDF path or materialise uploaded bytes
//! 2. [`render`]   — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]   — grayscale PNG bytes for the OCR engine
//! 4. [`ocr`]      — one page image in, best-effort text out
//! 5. [`clean`]    — deterministic cleanup of OCR and model output
//! 6. [`segment`]  — split a transcript on `Answer N]` markers
//! 7. [`keywords`] — derive grading terms from a model answer
//! 8. [`score`]    — similarity short-circuit plus keyword coverage
//! 9. [`feedback`] — short written feedback for each graded answer
//!
//! [`llm`] and [`gemini`] provide the text-generation capability used by
//! steps 7 and 9; they are the only stages with network I/O.

pub mod clean;
pub mod encode;
pub mod feedback;
pub mod gemini;
pub mod input;
pub mod keywords;
pub mod llm;
pub mod ocr;
pub mod render;
pub mod score;
pub mod segment;
