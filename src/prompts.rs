//! Prompt templates for the text-generation capability.
//!
//! Both grading prompts live here so that tests can inspect them without a
//! live model and so that a prompt change touches exactly one file.
//!
//! Callers may override either template through
//! [`crate::config::GradingConfig::keyword_prompt`] and
//! [`crate::config::GradingConfig::feedback_prompt`]. Overrides use the same
//! placeholders as the defaults:
//!
//! | Placeholder | Keyword prompt | Feedback prompt |
//! |-------------|:--------------:|:---------------:|
//! | `{model_answer}`   | ✓ | ✓ |
//! | `{student_answer}` |   | ✓ |
//! | `{score}`          |   | ✓ |
//! | `{max_marks}`      |   | ✓ |

use crate::output::format_marks;

/// Default instruction for deriving grading keywords from a model answer.
pub const DEFAULT_KEYWORD_PROMPT: &str = "Extract the important keywords for evaluating the \
student's answer based on the following model answer: {model_answer}. Provide keywords in a \
single line, separated by commas.";

/// Default instruction for short feedback on a graded answer.
pub const DEFAULT_FEEDBACK_PROMPT: &str = "The student's answer is: {student_answer}. The model \
answer is: {model_answer} and the predicted marks out of {max_marks} is: {score}. Give me the \
feedback of the student's answer in short.";

/// Fill the keyword template.
pub fn keyword_prompt(template: Option<&str>, model_answer: &str) -> String {
    template
        .unwrap_or(DEFAULT_KEYWORD_PROMPT)
        .replace("{model_answer}", model_answer)
}

/// Fill the feedback template.
pub fn feedback_prompt(
    template: Option<&str>,
    student_answer: &str,
    model_answer: &str,
    score: u32,
    max_marks: f64,
) -> String {
    // Answers go in last: OCR text may contain `{score}`-like braces.
    template
        .unwrap_or(DEFAULT_FEEDBACK_PROMPT)
        .replace("{score}", &score.to_string())
        .replace("{max_marks}", &format_marks(max_marks))
        .replace("{model_answer}", model_answer)
        .replace("{student_answer}", student_answer)
}
