//! Progress-callback trait for grading events.
//!
//! Inject an [`Arc<dyn GradingProgressCallback>`] via
//! [`crate::config::GradingConfigBuilder::progress_callback`] to receive
//! events as the pipeline reads both documents and grades each question.
//!
//! # Example
//!
//! ```rust
//! use edgequake_grader::{GradingConfig, GradingProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     graded: AtomicUsize,
//! }
//!
//! impl GradingProgressCallback for CountingCallback {
//!     fn on_question_graded(&self, question: usize, total: usize, score: u32, max_marks: f64) {
//!         self.graded.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Q{question}/{total}: {score}/{max_marks}");
//!     }
//! }
//!
//! let config = GradingConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { graded: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::DocumentRole;
use std::sync::Arc;

/// Called by the grading pipeline as it progresses.
///
/// All methods default to no-ops. With `concurrency > 1` the per-question
/// methods may be called concurrently and out of order, so implementations
/// must synchronise any shared state.
pub trait GradingProgressCallback: Send + Sync {
    /// A document has been rendered and read.
    fn on_document_extracted(&self, role: DocumentRole, pages: usize, chars: usize) {
        let _ = (role, pages, chars);
    }

    /// Both documents segmented into `total_questions` pairs.
    fn on_grading_start(&self, total_questions: usize) {
        let _ = total_questions;
    }

    /// Keyword derivation for a question is about to start.
    fn on_question_start(&self, question: usize, total_questions: usize) {
        let _ = (question, total_questions);
    }

    /// A question has been scored and has feedback.
    fn on_question_graded(&self, question: usize, total_questions: usize, score: u32, max_marks: f64) {
        let _ = (question, total_questions, score, max_marks);
    }

    /// All questions graded.
    fn on_grading_complete(&self, total_score: u32, max_total: f64) {
        let _ = (total_score, max_total);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl GradingProgressCallback for NoopProgressCallback {}

/// Type stored in [`crate::config::GradingConfig`].
pub type ProgressCallback = Arc<dyn GradingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        extracted: Mutex<Vec<DocumentRole>>,
        starts: AtomicUsize,
        graded: AtomicUsize,
        total: AtomicUsize,
    }

    impl GradingProgressCallback for TrackingCallback {
        fn on_document_extracted(&self, role: DocumentRole, _pages: usize, _chars: usize) {
            self.extracted.lock().unwrap().push(role);
        }

        fn on_question_start(&self, _question: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_question_graded(&self, _q: usize, _total: usize, _score: u32, _max: f64) {
            self.graded.fetch_add(1, Ordering::SeqCst);
        }

        fn on_grading_complete(&self, total_score: u32, _max_total: f64) {
            self.total.store(total_score as usize, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_extracted(DocumentRole::Student, 2, 100);
        cb.on_grading_start(3);
        cb.on_question_start(1, 3);
        cb.on_question_graded(1, 3, 7, 10.0);
        cb.on_grading_complete(7, 30.0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_document_extracted(DocumentRole::ModelAnswer, 1, 10);
        tracker.on_document_extracted(DocumentRole::Student, 1, 12);
        tracker.on_question_start(1, 2);
        tracker.on_question_graded(1, 2, 10, 10.0);
        tracker.on_question_start(2, 2);
        tracker.on_question_graded(2, 2, 4, 10.0);
        tracker.on_grading_complete(14, 20.0);

        assert_eq!(tracker.extracted.lock().unwrap().len(), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.graded.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.total.load(Ordering::SeqCst), 14);
    }
}
