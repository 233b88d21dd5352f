//! Answer segmentation: split a document transcript into individual answers.
//!
//! Answers are delimited by markers such as `Answer 1]` or `answer 2b]`: the
//! word "Answer", optional whitespace, one or more digits, an optional
//! letter, then a literal `]`. Matching is case-insensitive.
//!
//! The numbers in the markers are not read. Answers are identified purely by
//! position, so the n-th segment of the student transcript is graded against
//! the n-th segment of the model-answer transcript.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ANSWER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\banswer\s*\d+[a-z]?\]").unwrap());

/// Split `text` into trimmed, non-empty answers in document order.
///
/// Anything before the first marker (title, name, instructions) is dropped.
/// A transcript without any marker is returned whole as a single answer, or
/// as no answers at all if it is blank.
pub fn segment_answers(text: &str) -> Vec<String> {
    let mut parts = RE_ANSWER_MARKER.split(text);
    if RE_ANSWER_MARKER.is_match(text) {
        // Header material before the first marker.
        parts.next();
    }

    parts
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Number of answer markers in `text`.
pub fn count_markers(text: &str) -> usize {
    RE_ANSWER_MARKER.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_discarded() {
        let answers =
            segment_answers("Header text Answer 1] First answer. Answer 2a] Second answer.");
        assert_eq!(answers, vec!["First answer.", "Second answer."]);
    }

    #[test]
    fn markers_are_case_insensitive() {
        let answers = segment_answers("ANSWER 1] one answer 2B] two aNsWeR 3]three");
        assert_eq!(answers, vec!["one", "two", "three"]);
    }

    #[test]
    fn whitespace_between_word_and_number_is_allowed() {
        assert_eq!(segment_answers("Answer   4] x Answer5] y"), vec!["x", "y"]);
    }

    #[test]
    fn no_markers_yields_whole_text() {
        assert_eq!(
            segment_answers("  just some text without markers \n"),
            vec!["just some text without markers"]
        );
    }

    #[test]
    fn no_markers_never_yields_more_than_one() {
        for text in ["", "   ", "a. b. c.", "Answer one] nope", "Answers 1 without bracket"] {
            assert!(segment_answers(text).len() <= 1, "text={text:?}");
        }
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(segment_answers("").is_empty());
        assert!(segment_answers(" \n\t ").is_empty());
    }

    #[test]
    fn empty_answers_are_dropped() {
        let answers = segment_answers("Answer 1]   Answer 2] only this");
        assert_eq!(answers, vec!["only this"]);
    }

    #[test]
    fn word_boundary_required() {
        // "Reanswer 1]" is not a marker.
        assert_eq!(segment_answers("Reanswer 1] text"), vec!["Reanswer 1] text"]);
    }

    #[test]
    fn multiline_answers_are_kept_intact() {
        let text = "Name: A. Student\nAnswer 1]\nLine one.\nLine two.\n\nAnswer 2]\nOther.";
        assert_eq!(
            segment_answers(text),
            vec!["Line one.\nLine two.", "Other."]
        );
        assert_eq!(count_markers(text), 2);
    }
}
