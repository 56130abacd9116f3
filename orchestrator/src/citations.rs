//! Test tooling for Testable Property 5 ("source grounding"): extracts
//! `[Note: <title>]` citations from a synthesized answer. Not used to gate
//! the Synthesizer's output — only to assert citations in the evidence
//! bundle during tests.

use regex::Regex;
use std::sync::OnceLock;

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[Note:\s*([^\]]+)\]").expect("citation pattern is a valid regex"))
}

/// Returns every note title cited as `[Note: <title>]` in `text`, in the
/// order they appear.
pub fn extract_citations(text: &str) -> Vec<String> {
    citation_pattern()
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_one_citation() {
        let text = "Adam met the duke [Note: Session 3] during the feast.";
        assert_eq!(extract_citations(text), vec!["Session 3".to_string()]);
    }

    #[test]
    fn extracts_multiple_citations_in_order() {
        let text = "[Note: A] then [Note: B]";
        assert_eq!(extract_citations(text), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn returns_empty_when_no_citations_present() {
        assert!(extract_citations("no citations here").is_empty());
    }
}
