//! Configuration types for grading a submission.
//!
//! All grading behaviour is controlled through [`GradingConfig`], built via
//! its [`GradingConfigBuilder`]. External tool locations and credentials are
//! explicit fields here rather than process-wide globals, so two requests
//! with different settings can run side by side.

use crate::error::GradeError;
use crate::pipeline::llm::TextGenerator;
use crate::pipeline::ocr::TextExtractor;
use crate::pipeline::render::PageRenderer;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Marks available per question when the caller does not say otherwise.
pub const DEFAULT_MAX_MARKS: f64 = 10.0;

/// Configuration for grading one submission against a model-answer key.
///
/// # Example
/// ```rust
/// use edgequake_grader::GradingConfig;
///
/// let config = GradingConfig::builder()
///     .max_marks(5.0)
///     .ocr_engine_path("/usr/local/bin/tesseract")
///     .ai_model_name("gemini-1.5-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_marks, 5.0);
/// ```
#[derive(Clone)]
pub struct GradingConfig {
    /// Marks available per question. Must be finite and > 0. Default: 10.
    pub max_marks: f64,

    /// How many pages are read, and how many questions graded, at once. Default: 4.
    ///
    /// Output order is always positional regardless of this value. `1`
    /// processes everything strictly one after another.
    pub concurrency: usize,

    /// Longest edge of a rendered page in pixels. Default: 2480.
    ///
    /// 2480 px is an A4 page at 300 DPI, the resolution Tesseract is tuned for.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Tesseract binary. If None, `tesseract` is looked up on `PATH`.
    pub ocr_engine_path: Option<PathBuf>,

    /// pdfium shared library, or a directory containing it.
    /// If None, `PDFIUM_LIB_PATH` and then the system library are tried.
    pub pdf_renderer_path: Option<PathBuf>,

    /// Gemini API key. When set, keywords and feedback are generated through
    /// the Gemini REST API directly.
    pub ai_api_key: Option<String>,

    /// Model identifier, e.g. "gemini-1.5-flash" or "gpt-4.1-nano".
    pub ai_model_name: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// Ignored when `ai_api_key` is set.
    pub ai_provider: Option<String>,

    /// Sampling temperature for keyword and feedback generation. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens per generated reply. Default: 1024.
    pub max_tokens: usize,

    /// Per-request HTTP timeout for the built-in Gemini client, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom keyword prompt template. If None, uses the built-in default.
    pub keyword_prompt: Option<String>,

    /// Custom feedback prompt template. If None, uses the built-in default.
    pub feedback_prompt: Option<String>,

    /// Pre-constructed renderer. Takes precedence over `pdf_renderer_path`.
    pub renderer: Option<Arc<dyn PageRenderer>>,

    /// Pre-constructed OCR engine. Takes precedence over `ocr_engine_path`.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Pre-constructed text generator. Takes precedence over every `ai_*` field.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            max_marks: DEFAULT_MAX_MARKS,
            concurrency: 4,
            max_rendered_pixels: 2480,
            password: None,
            ocr_engine_path: None,
            pdf_renderer_path: None,
            ai_api_key: None,
            ai_model_name: None,
            ai_provider: None,
            temperature: 0.2,
            max_tokens: 1024,
            api_timeout_secs: 60,
            keyword_prompt: None,
            feedback_prompt: None,
            renderer: None,
            extractor: None,
            generator: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GradingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradingConfig")
            .field("max_marks", &self.max_marks)
            .field("concurrency", &self.concurrency)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_engine_path", &self.ocr_engine_path)
            .field("pdf_renderer_path", &self.pdf_renderer_path)
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "<redacted>"))
            .field("ai_model_name", &self.ai_model_name)
            .field("ai_provider", &self.ai_provider)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PageRenderer>"))
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .finish()
    }
}

impl GradingConfig {
    /// Create a new builder for `GradingConfig`.
    pub fn builder() -> GradingConfigBuilder {
        GradingConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the fields a caller may have mutated after `build()`.
    pub fn validate(&self) -> Result<(), GradeError> {
        validate_max_marks(self.max_marks)?;
        if self.concurrency == 0 {
            return Err(GradeError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(())
    }
}

/// `max_marks` must be a finite, strictly positive number.
pub fn validate_max_marks(max_marks: f64) -> Result<(), GradeError> {
    if !max_marks.is_finite() || max_marks <= 0.0 {
        return Err(GradeError::Validation(format!(
            "Max marks must be a positive number, got {max_marks}"
        )));
    }
    Ok(())
}

/// Builder for [`GradingConfig`].
pub struct GradingConfigBuilder {
    config: GradingConfig,
}

impl fmt::Debug for GradingConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradingConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl GradingConfigBuilder {
    pub fn max_marks(mut self, marks: f64) -> Self {
        self.config.max_marks = marks;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn ocr_engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ocr_engine_path = Some(path.into());
        self
    }

    pub fn pdf_renderer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf_renderer_path = Some(path.into());
        self
    }

    pub fn ai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.ai_api_key = Some(key.into());
        self
    }

    pub fn ai_model_name(mut self, model: impl Into<String>) -> Self {
        self.config.ai_model_name = Some(model.into());
        self
    }

    pub fn ai_provider(mut self, name: impl Into<String>) -> Self {
        self.config.ai_provider = Some(name.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn keyword_prompt(mut self, template: impl Into<String>) -> Self {
        self.config.keyword_prompt = Some(template.into());
        self
    }

    pub fn feedback_prompt(mut self, template: impl Into<String>) -> Self {
        self.config.feedback_prompt = Some(template.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GradingConfig, GradeError> {
        let c = &self.config;
        if !c.max_marks.is_finite() || c.max_marks <= 0.0 {
            return Err(GradeError::InvalidConfig(format!(
                "max_marks must be a positive number, got {}",
                c.max_marks
            )));
        }
        if c.concurrency == 0 {
            return Err(GradeError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GradingConfig::default();
        assert_eq!(c.max_marks, 10.0);
        assert_eq!(c.concurrency, 4);
        assert!(c.generator.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_rejects_non_positive_marks() {
        for marks in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = GradingConfig::builder().max_marks(marks).build().unwrap_err();
            assert!(matches!(err, GradeError::InvalidConfig(_)), "marks={marks}");
        }
    }

    #[test]
    fn builder_clamps() {
        let c = GradingConfig::builder()
            .concurrency(0)
            .temperature(9.0)
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn validate_catches_mutated_fields() {
        let mut c = GradingConfig::default();
        c.max_marks = 0.0;
        assert!(c.validate().unwrap_err().is_validation());
        c.max_marks = 10.0;
        c.concurrency = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = GradingConfig::builder()
            .ai_api_key("secret-key-123")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key-123"));
        assert!(dbg.contains("<redacted>"));
    }
}
