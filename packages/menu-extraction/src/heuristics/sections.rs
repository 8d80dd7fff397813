//! Text organization helpers for directly extracted and OCR'd menu text.

use std::collections::HashSet;

/// Drop blank and repeated lines, then group the rest into sections.
///
/// Lines are trimmed; only the first occurrence of a line is kept. A new
/// section starts at every line containing one of `section_keywords`
/// (case-sensitive). Lines within a section are joined by one newline and
/// sections by a blank line.
pub fn clean_and_organize(text: &str, section_keywords: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut sections: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || !seen.insert(line) {
            continue;
        }
        let starts_section = section_keywords.iter().any(|k| line.contains(k.as_str()));
        if starts_section && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        sections.push(current);
    }

    sections
        .iter()
        .map(|section| section.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Pull named sections (for example "Veckans Fisk") out of a text.
///
/// Each section runs from its heading up to the next line that starts with
/// an uppercase letter, or to the end of the text. Headings that do not
/// occur are skipped. Sections are joined by a blank line.
pub fn extract_special_sections(text: &str, headings: &[String]) -> String {
    headings
        .iter()
        .filter_map(|heading| special_section(text, heading))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn special_section<'a>(text: &'a str, heading: &str) -> Option<&'a str> {
    if heading.is_empty() {
        return None;
    }
    let start = text.find(heading)?;
    let rest = &text[start..];

    let mut end = rest.len();
    let mut offset = heading.len();
    while let Some(pos) = rest[offset..].find('\n') {
        let newline = offset + pos;
        let next_is_upper = rest[newline + 1..]
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        if next_is_upper {
            end = newline;
            break;
        }
        offset = newline + 1;
    }

    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::PipelineConfig;
    use proptest::prelude::*;

    fn keywords() -> Vec<String> {
        ["MÅNDAG", "TISDAG", "ONSDAG", "TORSDAG", "FREDAG", "VECKANS"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_clean_and_organize() {
        let text = "Lunch 11-14\n\nMÅNDAG\nSoppa\n  Soppa  \nTISDAG\nPasta\nSallad\nVECKANS FISK\nTorsk\nSallad";
        let organized = clean_and_organize(text, &keywords());

        assert_eq!(
            organized,
            "Lunch 11-14\n\nMÅNDAG\nSoppa\n\nTISDAG\nPasta\nSallad\n\nVECKANS FISK\nTorsk"
        );
    }

    #[test]
    fn test_repeated_day_line_is_dropped() {
        let keywords = PipelineConfig::default().section_keywords;
        assert_eq!(
            clean_and_organize("MÅNDAG Fisk\nTISDAG Kött\nMÅNDAG Fisk", &keywords),
            "MÅNDAG Fisk\n\nTISDAG Kött"
        );
    }

    #[test]
    fn test_clean_and_organize_without_keywords() {
        assert_eq!(clean_and_organize("a\nb\na\n", &keywords()), "a\nb");
        assert_eq!(clean_and_organize("   \n\n", &keywords()), "");
    }

    #[test]
    fn test_special_sections() {
        let text = "Veckans Fisk: Lax med\ndillsås\nVeckans Vegetariska: Linsgryta\nMåndag\nSoppa";
        let headings = vec!["Veckans Fisk".to_string(), "Veckans Vegetariska".to_string()];

        assert_eq!(
            extract_special_sections(text, &headings),
            "Veckans Fisk: Lax med\ndillsås\n\nVeckans Vegetariska: Linsgryta"
        );
    }

    #[test]
    fn test_special_section_runs_to_end() {
        let headings = vec!["Veckans Fisk".to_string(), "Veckans Soppa".to_string()];
        assert_eq!(
            extract_special_sections("intro\nVeckans Fisk: Sej\nmed potatis", &headings),
            "Veckans Fisk: Sej\nmed potatis"
        );
        assert_eq!(extract_special_sections("nothing here", &headings), "");
    }

    proptest! {
        #[test]
        fn organized_lines_are_unique_and_in_first_seen_order(
            lines in prop::collection::vec("(MÅNDAG |TISDAG |VECKANS | )?[a-c]{0,2} ?", 0..24)
        ) {
            let text = lines.join("\n");
            let organized = clean_and_organize(&text, &keywords());

            let mut expected: Vec<&str> = Vec::new();
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if !expected.contains(&line) {
                    expected.push(line);
                }
            }
            let kept: Vec<&str> = organized.lines().filter(|l| !l.is_empty()).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
