//! The text-generation capability used for keywords and feedback.
//!
//! Grading only ever needs one operation: send a prompt, get text back.
//! [`TextGenerator`] is that operation. Keeping it a trait means the keyword
//! and feedback stages can be tested with canned replies and never touch the
//! network.
//!
//! Two implementations ship with the crate:
//!
//! * [`ProviderTextGenerator`] — adapts any `edgequake_llm::LLMProvider`
//!   (OpenAI, Anthropic, Gemini, Ollama, …).
//! * [`crate::pipeline::gemini::GeminiTextGenerator`] — calls the Gemini REST
//!   API directly with an explicit API key.
//!
//! No retries happen here. A failed call fails the request.

use crate::config::GradingConfig;
use crate::error::GenerationError;
use crate::pipeline::gemini::GeminiTextGenerator;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Default model for edgequake-llm providers when none is configured.
pub const DEFAULT_PROVIDER_MODEL: &str = "gpt-4.1-nano";

/// Produces text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// [`TextGenerator`] over an edgequake-llm provider.
pub struct ProviderTextGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderTextGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            options: build_options(temperature, max_tokens),
        }
    }
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl TextGenerator for ProviderTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(response.content)
    }
}

/// Resolve the text generator, from most-specific to least-specific:
///
/// 1. **Pre-built generator** (`config.generator`), used as-is. This is how
///    tests inject fakes.
/// 2. **Explicit API key** (`config.ai_api_key`): the Gemini REST client with
///    `config.ai_model_name` (default `gemini-1.5-flash`).
/// 3. **Named provider** (`config.ai_provider`): built by
///    [`ProviderFactory::create_llm_provider`], which reads that provider's
///    API key from the environment.
/// 4. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 5. **Auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_generator(config: &GradingConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    if let Some(ref key) = config.ai_api_key {
        let generator = GeminiTextGenerator::new(
            key.clone(),
            config.ai_model_name.clone(),
            config.temperature,
            config.max_tokens,
            config.api_timeout_secs,
        )?;
        return Ok(Arc::new(generator));
    }

    let provider = resolve_provider(config)?;
    Ok(Arc::new(ProviderTextGenerator::new(
        provider,
        config.temperature,
        config.max_tokens,
    )))
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, GenerationError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        GenerationError::NotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn resolve_provider(config: &GradingConfig) -> Result<Arc<dyn LLMProvider>, GenerationError> {
    if let Some(ref name) = config.ai_provider {
        let model = config.ai_model_name.as_deref().unwrap_or(DEFAULT_PROVIDER_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| GenerationError::NotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Pass --ai-api-key, set GEMINI_API_KEY / OPENAI_API_KEY, or name a provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}
