//! Result types produced by a grading run.
//!
//! Everything here is plain data and derives `Serialize`/`Deserialize` so the
//! result consumer can emit JSON without further mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two input documents a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    /// The student's handwritten submission.
    Student,
    /// The model-answer key.
    ModelAnswer,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Student => f.write_str("student"),
            DocumentRole::ModelAnswer => f.write_str("model answer"),
        }
    }
}

/// The full OCR transcript of one document, pages concatenated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentText {
    pub role: DocumentRole,
    /// Number of pages rendered and read.
    pub page_count: usize,
    /// Page texts joined with a single space.
    pub text: String,
}

/// The grade for one positional (student, model) answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 1-indexed question position.
    pub question: usize,
    pub student_answer: String,
    pub model_answer: String,
    /// Normalised keywords derived from the model answer.
    pub keywords: Vec<String>,
    /// Scorer output in `[0, max_marks]`.
    pub raw_score: f64,
    /// `raw_score` truncated to an integer. This is what the total adds up.
    pub score: u32,
    pub feedback: String,
}

/// Timing and size figures for one grading run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingStats {
    pub student_pages: usize,
    pub model_pages: usize,
    pub questions: usize,
    /// Wall-clock time spent rendering and reading both documents.
    pub extraction_duration_ms: u64,
    /// Wall-clock time spent on keywords, scoring and feedback.
    pub grading_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything handed back to the result consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    /// One entry per question, ordered by position.
    pub results: Vec<ScoreResult>,
    /// Sum of the truncated per-question scores.
    pub total_score: u32,
    /// Marks available per question.
    pub max_marks: f64,
    pub stats: GradingStats,
}

impl GradingReport {
    /// Marks available across the whole paper.
    pub fn max_total(&self) -> f64 {
        self.max_marks * self.results.len() as f64
    }

    /// Total score as a percentage of [`Self::max_total`]; `0.0` for an empty paper.
    pub fn percentage(&self) -> f64 {
        let max = self.max_total();
        if max > 0.0 {
            f64::from(self.total_score) / max * 100.0
        } else {
            0.0
        }
    }
}

/// Render a mark value the way a teacher writes it: `10`, not `10.0`.
pub fn format_marks(marks: f64) -> String {
    if marks.fract() == 0.0 {
        format!("{}", marks as i64)
    } else {
        format!("{marks:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(question: usize, score: u32) -> ScoreResult {
        ScoreResult {
            question,
            student_answer: String::new(),
            model_answer: String::new(),
            keywords: vec![],
            raw_score: f64::from(score),
            score,
            feedback: String::new(),
        }
    }

    #[test]
    fn percentage_of_total() {
        let report = GradingReport {
            results: vec![result(1, 10), result(2, 5)],
            total_score: 15,
            max_marks: 10.0,
            stats: GradingStats::default(),
        };
        assert_eq!(report.max_total(), 20.0);
        assert!((report.percentage() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn empty_report_percentage_is_zero() {
        let report = GradingReport {
            results: vec![],
            total_score: 0,
            max_marks: 10.0,
            stats: GradingStats::default(),
        };
        assert_eq!(report.percentage(), 0.0);
    }

    #[test]
    fn format_marks_drops_trailing_zero() {
        assert_eq!(format_marks(10.0), "10");
        assert_eq!(format_marks(6.5), "6.50");
    }

    #[test]
    fn role_serialises_snake_case() {
        let json = serde_json::to_string(&DocumentRole::ModelAnswer).unwrap();
        assert_eq!(json, "\"model_answer\"");
    }
}
