//! Feedback generation for a graded answer.

use crate::error::GenerationError;
use crate::pipeline::clean;
use crate::pipeline::llm::TextGenerator;
use crate::prompts;
use tracing::debug;

/// Ask the generator for short feedback on one answer.
///
/// The prompt carries both answers, the integer `score` and `max_marks`.
/// The reply is returned after fence/whitespace cleanup; a reply that is
/// empty after cleanup is [`GenerationError::EmptyResponse`].
pub async fn generate_feedback(
    generator: &dyn TextGenerator,
    student_answer: &str,
    model_answer: &str,
    score: u32,
    max_marks: f64,
    template: Option<&str>,
) -> Result<String, GenerationError> {
    let prompt =
        prompts::feedback_prompt(template, student_answer, model_answer, score, max_marks);
    let feedback = clean::clean_reply(&generator.generate(&prompt).await?);
    if feedback.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    debug!("Feedback: {} chars", feedback.len());
    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        reply: &'static str,
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.to_string())
        }
    }

    fn recorder(reply: &'static str) -> Recorder {
        Recorder {
            reply,
            last_prompt: Mutex::new(None),
        }
    }

    #[tokio::test]
    async fn prompt_carries_answers_and_score() {
        let generator = recorder("  Good answer, mention the river Seine.\n");
        let feedback = generate_feedback(
            &generator,
            "Paris",
            "Paris is the capital of France",
            3,
            10.0,
            None,
        )
        .await
        .unwrap();
        assert_eq!(feedback, "Good answer, mention the river Seine.");

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Paris is the capital of France"));
        assert!(prompt.contains("out of 10 is: 3"), "prompt={prompt}");
    }

    #[tokio::test]
    async fn custom_template_is_used() {
        let generator = recorder("ok");
        generate_feedback(&generator, "a", "b", 7, 7.5, Some("{score}/{max_marks}"))
            .await
            .unwrap();
        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, "7/7.50");
    }

    #[tokio::test]
    async fn blank_feedback_is_an_error() {
        let generator = recorder(" \n ");
        let err = generate_feedback(&generator, "a", "b", 0, 10.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }
}
