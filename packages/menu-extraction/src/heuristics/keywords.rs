//! Keyword matching.

use regex::RegexBuilder;

/// Whether `text` contains any keyword as a whole word (case-insensitive).
pub fn contains_keyword(text: &str, keywords: &[String]) -> bool {
    keywords.iter().filter(|k| !k.trim().is_empty()).any(|keyword| {
        let pattern = format!(r"\b{}\b", regex::escape(keyword.trim()));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    })
}

/// Whether `text` contains any keyword as a substring (case-insensitive).
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_whole_word_match() {
        let keywords = words(&["meny", "måndag"]);
        assert!(contains_keyword("Dagens MENY serveras 11-14", &keywords));
        assert!(contains_keyword("Måndag: soppa", &keywords));
        assert!(!contains_keyword("Lunchmenyn finns här", &keywords));
        assert!(!contains_keyword("", &keywords));
    }

    #[test]
    fn test_substring_match() {
        let keywords = words(&["lunch", "dagens"]);
        assert!(contains_any("Veckans LUNCHMENY", &keywords));
        assert!(contains_any("Dagens rätt", &keywords));
        assert!(!contains_any("Middag", &keywords));
        assert!(!contains_any("anything", &[]));
    }
}
