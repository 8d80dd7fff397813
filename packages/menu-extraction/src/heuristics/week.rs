//! Week-number detection in body text and in document locators.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::week::WeekNumber;

lazy_static! {
    /// Body patterns, tried in priority order.
    static ref BODY_PATTERNS: Vec<Regex> = [
        r"(?i)vecka\s*[0-9]{1,2}",
        r"(?i)week\s*[0-9]{1,2}",
        r"(?i)\bv\.?\s*[0-9]{1,2}\b",
        r"(?i)\bw\.?\s*[0-9]{1,2}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// Locator patterns: label must follow the start of the filename or a separator.
    static ref LOCATOR_PATTERNS: Vec<Regex> = [
        r"(?i)(?:^|[-_.])(vecka)[\s\-_.]*([0-9]{1,2})",
        r"(?i)(?:^|[-_.])(v)[\s\-_.]*([0-9]{1,2})",
        r"(?i)(?:^|[-_.])(w)[\s\-_.]*([0-9]{1,2})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Last path segment of a locator, without query or fragment, lowercased.
pub fn locator_filename(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.rsplit('/').next().unwrap_or("").to_lowercase()
}

/// Find a week number in body text.
///
/// Matches (case-insensitive) `vecka NN`, `week NN`, a standalone `v. NN`
/// or a standalone `w NN`, in that priority. The match has its whitespace
/// collapsed and is capitalized, so running this on its own output returns
/// the same value.
pub fn extract_week_number(text: &str) -> Option<WeekNumber> {
    BODY_PATTERNS.iter().find_map(|pattern| {
        let found = pattern.find(text)?;
        let collapsed = WHITESPACE.replace_all(found.as_str().trim(), " ");
        WeekNumber::from_label(capitalize(&collapsed))
    })
}

/// Find a week number in a locator's filename.
///
/// The label must start the filename or follow `-`, `_` or `.`; separators
/// between label and digits are normalized to one space
/// (`lunch-vecka46.pdf` gives `Vecka 46`).
pub fn extract_week_number_from_locator(url: &str) -> Option<WeekNumber> {
    let filename = locator_filename(url);
    LOCATOR_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(&filename)?;
        let label = capitalize(caps.get(1)?.as_str());
        let digits = caps.get(2)?.as_str();
        WeekNumber::from_label(format!("{label} {digits}"))
    })
}

/// Resolve the week for assembled text: body first, then the locator.
pub fn resolve_week(text: &str, url: &str) -> Option<WeekNumber> {
    extract_week_number(text).or_else(|| extract_week_number_from_locator(url))
}

/// Prefix a week label to a text block, separated by a blank line.
pub fn prefix_week(week: Option<&WeekNumber>, body: &str) -> String {
    match week {
        Some(week) => format!("{}\n\n{}", week.label, body.trim()),
        None => body.trim().to_string(),
    }
}

/// Annotate text with the locator's week when the body names none.
pub fn annotate_with_locator_week(text: &str, url: &str) -> String {
    if extract_week_number(text).is_some() {
        return text.trim().to_string();
    }
    prefix_week(extract_week_number_from_locator(url).as_ref(), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_body_patterns() {
        let cases = [
            ("Lunchmeny vecka 46\nMåndag", "Vecka 46"),
            ("VECKA46", "Vecka46"),
            ("Menu for week   12", "Week 12"),
            ("Meny V. 7 - välkomna", "V. 7"),
            ("w47 specials", "W47"),
        ];
        for (text, expected) in cases {
            let week = extract_week_number(text);
            assert_eq!(
                week.as_ref().map(|w| w.label.as_str()),
                Some(expected),
                "text: {text}"
            );
        }
    }

    #[test]
    fn test_priority_is_pattern_order_not_position() {
        let week = extract_week_number("V 3 ... vecka 46").unwrap();
        assert_eq!(week.label, "Vecka 46");
        assert_eq!(week.value, 46);
    }

    #[test]
    fn test_standalone_tokens_only() {
        assert!(extract_week_number("Dessert av 12 slag").is_none());
        assert!(extract_week_number("Review 10 dishes").is_none());
        assert!(extract_week_number("no week here").is_none());
    }

    #[test]
    fn test_locator_week() {
        let week =
            extract_week_number_from_locator("https://example.com/menus/lunch-vecka46.pdf").unwrap();
        assert_eq!(week.label, "Vecka 46");
        assert_eq!(week.value, 46);

        assert_eq!(
            extract_week_number_from_locator("https://x.se/menu_v46.pdf").map(|w| w.label),
            Some("V 46".to_string())
        );
        assert_eq!(
            extract_week_number_from_locator("https://x.se/w-07.pdf?dl=1").map(|w| w.label),
            Some("W 07".to_string())
        );
        assert!(extract_week_number_from_locator("https://x.se/vecka46/menu.pdf").is_none());
        assert!(extract_week_number_from_locator("https://x.se/overview.pdf").is_none());
    }

    #[test]
    fn test_resolve_prefers_body() {
        let week = resolve_week("Vecka 12", "https://x.se/lunch-v46.pdf").unwrap();
        assert_eq!(week.value, 12);

        let week = resolve_week("Måndag: soppa", "https://x.se/lunch-v46.pdf").unwrap();
        assert_eq!(week.value, 46);
    }

    #[test]
    fn test_annotate_with_locator_week() {
        assert_eq!(
            annotate_with_locator_week("Måndag: soppa\n", "https://x.se/lunch_v46.pdf"),
            "V 46\n\nMåndag: soppa"
        );
        assert_eq!(
            annotate_with_locator_week("Vecka 3\nMåndag", "https://x.se/lunch_v46.pdf"),
            "Vecka 3\nMåndag"
        );
    }

    proptest! {
        #[test]
        fn week_extraction_is_idempotent(
            label in "(vecka|VECKA|week|v|V\\.|w)",
            spaces in " {0,3}",
            number in 1u32..=53,
            prefix in "[a-zåäö ]{0,12}",
        ) {
            let text = format!("{prefix}\n{label}{spaces}{number}\n");
            if let Some(week) = extract_week_number(&text) {
                let again = extract_week_number(&week.label);
                prop_assert_eq!(again, Some(week));
            }
        }
    }
}
