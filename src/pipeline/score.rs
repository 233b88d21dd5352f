//! The scoring rubric.
//!
//! A student answer is compared against the model answer in two steps:
//!
//! 1. **Similarity short-circuit.** If the two answers are near-verbatim
//!    (similarity ratio ≥ [`FULL_MARKS_SIMILARITY`]) the answer gets full
//!    marks and the keywords are not consulted.
//! 2. **Keyword coverage.** Otherwise every keyword is worth an equal share of
//!    the marks, and each keyword missing from the answer costs its share.
//!
//! The rubric is deterministic and cheap, and a teacher can explain any mark
//! it produces by pointing at the missing keywords.

use crate::pipeline::keywords::Keywords;

/// Similarity at or above which an answer receives full marks.
pub const FULL_MARKS_SIMILARITY: f64 = 0.95;

/// Score `student` against `model` out of `max_marks`.
///
/// `keywords` must already be normalised (see [`Keywords::from_reply`]).
/// `max_marks` must be finite and positive; the orchestrator validates it.
pub fn score_answer(student: &str, model: &str, max_marks: f64, keywords: &Keywords) -> f64 {
    if student.trim().is_empty() {
        return 0.0;
    }

    let student_lower = student.to_lowercase();
    if similarity_ratio(&student_lower, &model.to_lowercase()) >= FULL_MARKS_SIMILARITY {
        return max_marks;
    }

    let segments = split_sentences(&student_lower);
    let missing = missing_keywords(&segments, keywords).len();

    let deduction_per_keyword = if keywords.is_empty() {
        0.0
    } else {
        max_marks / keywords.len() as f64
    };

    (max_marks - missing as f64 * deduction_per_keyword).max(0.0)
}

/// Normalised similarity of two strings in `[0, 1]`.
///
/// Defined as `2·M / T`, where `M` is the length of the longest common
/// subsequence of the two strings (in Unicode scalar values) and `T` their
/// combined length. Two empty strings are identical (`1.0`). The ratio is
/// symmetric and reaches `1.0` only for identical strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Length of the longest common subsequence, in O(|a|·|b|) time and
/// O(min(|a|, |b|)) space.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    // Shared prefix and suffix always belong to an LCS.
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];

    for lc in long {
        for (j, sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prefix + suffix + prev[short.len()]
}

/// Split an answer into sentence-like segments on `.`, `?` and `!`.
///
/// The delimiters are dropped; segments are not trimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '?', '!']).collect()
}

/// Keywords that do not occur as a substring of any segment.
pub fn missing_keywords<'k>(segments: &[&str], keywords: &'k Keywords) -> Vec<&'k str> {
    keywords
        .iter()
        .filter(|kw| !segments.iter().any(|seg| seg.contains(*kw)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "Paris is the capital of France";

    fn kw(reply: &str) -> Keywords {
        Keywords::from_reply(reply)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── Similarity ───────────────────────────────────────────────────────

    #[test]
    fn identical_strings_are_fully_similar() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_have_zero_similarity() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn similarity_known_value() {
        // LCS("abcd", "bcde") = "bcd" → 2·3 / 8
        assert!(approx(similarity_ratio("abcd", "bcde"), 0.75));
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("france capital city paris", "paris is the capital of france"),
            ("abcabba", "cbabac"),
            ("i do not know", MODEL),
            ("ünïcödé", "unicode"),
            ("", "something"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity_ratio(a, b), similarity_ratio(b, a), "{a:?} / {b:?}");
        }
    }

    #[test]
    fn similarity_only_one_for_identical() {
        assert!(similarity_ratio("paris", "paris.") < 1.0);
        assert!(similarity_ratio("paris", "Paris") < 1.0);
    }

    #[test]
    fn lcs_with_shared_prefix_and_suffix() {
        let a: Vec<char> = "the cat sat on the mat".chars().collect();
        let b: Vec<char> = "the dog sat on the mat".chars().collect();
        // Only "cat"/"dog" differ, and they share nothing.
        assert_eq!(lcs_len(&a, &b), a.len() - 3);
    }

    // ── Scoring ──────────────────────────────────────────────────────────

    #[test]
    fn blank_answer_scores_zero() {
        for answer in ["", "   ", "\n\t"] {
            assert_eq!(score_answer(answer, MODEL, 10.0, &kw("Paris, capital")), 0.0);
            assert_eq!(score_answer(answer, MODEL, 3.5, &kw("")), 0.0);
        }
    }

    #[test]
    fn identical_answer_scores_max_case_insensitive() {
        let keywords = kw("nothing, here, matches");
        assert_eq!(score_answer(MODEL, MODEL, 10.0, &keywords), 10.0);
        assert_eq!(
            score_answer(&MODEL.to_uppercase(), MODEL, 7.0, &keywords),
            7.0
        );
    }

    #[test]
    fn near_verbatim_short_circuits_with_empty_keywords() {
        let student = "Paris is the capital of France.";
        assert!(similarity_ratio(&student.to_lowercase(), &MODEL.to_lowercase()) >= 0.95);
        assert_eq!(score_answer(student, MODEL, 10.0, &Keywords::default()), 10.0);
    }

    #[test]
    fn near_verbatim_short_circuits_even_when_keywords_missing() {
        let student = "Paris is the capital of France!";
        assert_eq!(score_answer(student, MODEL, 10.0, &kw("berlin, germany")), 10.0);
    }

    #[test]
    fn reordered_answer_with_all_keywords_scores_max() {
        let student = "France capital city Paris";
        assert!(similarity_ratio(&student.to_lowercase(), &MODEL.to_lowercase()) < 0.95);
        assert_eq!(score_answer(student, MODEL, 10.0, &kw("Paris, capital, France")), 10.0);
    }

    #[test]
    fn unrelated_answer_scores_zero() {
        assert_eq!(
            score_answer("I do not know", MODEL, 10.0, &kw("Paris, capital, France")),
            0.0
        );
    }

    #[test]
    fn missing_m_of_k_keywords() {
        let keywords = kw("Paris, capital, France");
        // Only "paris" present.
        let s = score_answer("Paris is lovely", MODEL, 10.0, &keywords);
        assert!(approx(s, 10.0 * 1.0 / 3.0), "got {s}");
        // "paris" and "capital" present.
        let s = score_answer("Paris. It is a capital!", MODEL, 10.0, &keywords);
        assert!(approx(s, 10.0 * 2.0 / 3.0), "got {s}");
    }

    #[test]
    fn no_keywords_means_no_deduction() {
        assert_eq!(score_answer("Something else entirely", MODEL, 10.0, &Keywords::default()), 10.0);
    }

    #[test]
    fn keywords_do_not_match_across_sentence_breaks() {
        // "capital city" is split by the full stop.
        let s = score_answer("The capital. City is Paris", MODEL, 4.0, &kw("capital city"));
        assert_eq!(s, 0.0);
    }

    #[test]
    fn duplicate_keywords_count_separately() {
        let s = score_answer("Nothing relevant", MODEL, 10.0, &kw("paris, Paris, capital, france"));
        assert_eq!(s, 0.0);
        let s = score_answer("Paris", MODEL, 8.0, &kw("paris, Paris, capital, france"));
        assert!(approx(s, 4.0), "got {s}");
    }

    #[test]
    fn score_never_leaves_range() {
        let keywords = kw("a, b, c, d, e, f, g");
        for answer in ["a", "abc", "zzz", "g f e", MODEL] {
            let s = score_answer(answer, MODEL, 10.0, &keywords);
            assert!((0.0..=10.0).contains(&s), "{answer:?} → {s}");
        }
    }

    #[test]
    fn split_sentences_drops_delimiters() {
        assert_eq!(split_sentences("a. b? c! d"), vec!["a", " b", " c", " d"]);
        assert_eq!(split_sentences("no breaks"), vec!["no breaks"]);
    }
}
