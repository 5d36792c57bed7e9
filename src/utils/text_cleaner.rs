use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static WHITESPACE_RUN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\s+"));

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("whitespace pattern failed to compile: {0}")]
    Pattern(String),
}

/// Collapse every whitespace run to a single space and trim both ends.
///
/// Errors instead of panicking if the pattern cannot be built; the engine
/// then translates the raw input.
pub fn clean_text(text: &str) -> Result<String, CleanError> {
    let pattern = WHITESPACE_RUN
        .as_ref()
        .map_err(|e| CleanError::Pattern(e.to_string()))?;

    Ok(pattern.replace_all(text, " ").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs_and_trims() {
        let cleaned = clean_text("  यह   एक\tपरीक्षण\n\nवाक्य है।  ").unwrap();
        assert_eq!(cleaned, "यह एक परीक्षण वाक्य है।");
    }

    #[test]
    fn test_unicode_whitespace() {
        // NBSP and ideographic space count as whitespace.
        let cleaned = clean_text("a\u{00A0}\u{3000}b").unwrap();
        assert_eq!(cleaned, "a b");
    }

    #[test]
    fn test_no_double_whitespace_and_idempotent() {
        let inputs = [
            "",
            "   ",
            "plain",
            " lead",
            "trail ",
            "मैं  आज\r\nबाजार   जा रहा हूँ।",
            "\t\tमिश्रित \u{2003} text \n",
        ];
        for input in inputs {
            let once = clean_text(input).unwrap();
            assert!(!once.starts_with(char::is_whitespace), "{:?}", once);
            assert!(!once.ends_with(char::is_whitespace), "{:?}", once);
            let mut prev_ws = false;
            for c in once.chars() {
                let ws = c.is_whitespace();
                assert!(!(ws && prev_ws), "double whitespace in {:?}", once);
                prev_ws = ws;
            }
            assert_eq!(clean_text(&once).unwrap(), once);
        }
    }
}
