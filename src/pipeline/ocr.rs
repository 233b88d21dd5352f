//! Optical character recognition for a single rendered page.
//!
//! The default engine is the Tesseract command-line tool. The page is
//! PNG-encoded in memory and piped to `tesseract stdin stdout`, so no
//! temporary image files are created and concurrent requests cannot trample
//! each other's files.
//!
//! OCR is best effort: whatever text the engine produces is returned, however
//! garbled. Only an engine that cannot run, or refuses the image, is an error.

use crate::error::OcrError;
use crate::pipeline::{clean, encode};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Binary name used when no OCR engine path is configured.
pub const DEFAULT_OCR_ENGINE: &str = "tesseract";

/// Reads the text on one page image.
///
/// Implementations must be pure with respect to the image: no state may carry
/// over from one page to the next.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// [`TextExtractor`] that shells out to the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    binary: PathBuf,
}

impl TesseractExtractor {
    /// Use the Tesseract binary at `binary`; `None` looks it up on `PATH`.
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            binary: binary.unwrap_or_else(|| PathBuf::from(DEFAULT_OCR_ENGINE)),
        }
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode::encode_page(image)?;

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::EngineUnavailable {
                path: self.binary.clone(),
                source,
            })?;

        // Tesseract reads the whole image before writing anything, so writing
        // first and collecting output afterwards cannot deadlock.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = clean::clean_ocr_text(&String::from_utf8_lossy(&output.stdout));
        debug!("OCR produced {} chars", text.len());
        Ok(text)
    }
}
