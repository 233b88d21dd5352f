//! Deterministic cleanup of OCR output and generator replies.
//!
//! OCR text is allowed to be noisy and nothing here tries to correct it. The
//! rules only remove artefacts that would silently break substring matching
//! later on: Windows line endings, zero-width characters picked up from the
//! scan, and code fences that chat models wrap around one-line answers.
//!
//! Each rule is a pure `&str → String` function and is tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean one page of OCR output.
///
/// Rules (in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 3. Replace form feeds (Tesseract's page terminator) with a newline
/// 4. Trim trailing whitespace per line
pub fn clean_ocr_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = s.replace('\u{000C}', "\n");
    trim_trailing_whitespace(&s)
}

/// Clean a reply from the text generator.
///
/// Rules (in order):
/// 1. Strip outer code fences (models sometimes ignore the prompt)
/// 2. Normalise line endings
/// 3. Strip invisible Unicode
/// 4. Trim surrounding whitespace
pub fn clean_reply(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule: strip outer code fences ────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule: normalise line endings ─────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule: trim trailing whitespace per line ──────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule: remove invisible Unicode characters ────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(clean_reply("```\nParis, capital\n```"), "Paris, capital");
        assert_eq!(clean_reply("```text\nParis, capital\n```\n"), "Paris, capital");
    }

    #[test]
    fn unfenced_reply_is_trimmed() {
        assert_eq!(clean_reply("  Paris, capital, France \n"), "Paris, capital, France");
    }

    #[test]
    fn inner_backticks_survive() {
        assert_eq!(clean_reply("use `map`, `filter`"), "use `map`, `filter`");
    }

    #[test]
    fn line_endings_normalised() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn invisible_chars_removed() {
        assert_eq!(remove_invisible_chars("ca\u{200B}pi\u{00AD}tal\u{FEFF}"), "capital");
    }

    #[test]
    fn ocr_text_cleanup() {
        let raw = "Answer 1]  Par\u{200B}is   \r\nis the capital\u{000C}";
        assert_eq!(clean_ocr_text(raw), "Answer 1]  Paris\nis the capital");
    }

    #[test]
    fn ocr_noise_is_kept() {
        // Stray punctuation is data, not an artefact.
        assert_eq!(clean_ocr_text("Fr@nce ;; capita1"), "Fr@nce ;; capita1");
    }
}
