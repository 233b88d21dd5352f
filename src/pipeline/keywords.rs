//! Keyword derivation: ask the text generator which terms a good answer must
//! contain, then normalise the reply into a [`Keywords`] list.
//!
//! Keywords are recomputed for every model answer and never cached.

use crate::error::GenerationError;
use crate::pipeline::clean;
use crate::pipeline::llm::TextGenerator;
use crate::prompts;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lower-cased, trimmed, non-empty grading terms in reply order.
///
/// Duplicates are kept: a term the model lists twice weighs twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords(Vec<String>);

impl Keywords {
    /// Normalise a comma-separated reply: split on commas, trim each term,
    /// drop empty terms, lower-case the rest.
    pub fn from_reply(reply: &str) -> Self {
        Self(
            reply
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for Keywords {
    /// Build from raw terms, applying the same normalisation as [`Keywords::from_reply`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }
}

/// Derive grading keywords for one model answer.
///
/// `template` overrides [`prompts::DEFAULT_KEYWORD_PROMPT`]. A reply that is
/// empty after cleanup is [`GenerationError::EmptyResponse`]. A non-empty reply
/// that holds no usable terms yields an empty list, which the scorer treats
/// as "no deduction".
pub async fn derive_keywords(
    generator: &dyn TextGenerator,
    model_answer: &str,
    template: Option<&str>,
) -> Result<Keywords, GenerationError> {
    let prompt = prompts::keyword_prompt(template, model_answer);
    let reply = clean::clean_reply(&generator.generate(&prompt).await?);
    if reply.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let keywords = Keywords::from_reply(&reply);
    if keywords.is_empty() {
        warn!("Keyword reply held no usable terms: {:?}", reply);
    }
    debug!("Derived {} keywords: {:?}", keywords.len(), keywords);
    Ok(keywords)
}
