//! Weekday-driven heuristics.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

/// Swedish and English weekday names, lowercase.
pub const DAY_NAMES: [&str; 14] = [
    "måndag",
    "tisdag",
    "onsdag",
    "torsdag",
    "fredag",
    "lördag",
    "söndag",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

lazy_static! {
    static ref DAY_WORD: Regex = Regex::new(
        r"\b(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday|Måndag|Tisdag|Onsdag|Torsdag|Fredag|Lördag|Söndag)\b"
    )
    .unwrap();
}

/// Whether a line names a weekday (case-insensitive, substring match).
pub fn mentions_day(line: &str) -> bool {
    let lower = line.to_lowercase();
    DAY_NAMES.iter().any(|day| lower.contains(day))
}

/// Collect the three-line window (previous, current, next) around every
/// line that names a weekday.
///
/// Identical windows are collapsed; the first occurrence decides the order
/// so the output is stable for identical input. Returns an empty string when
/// no weekday is mentioned.
pub fn extract_day_sentences(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut windows: IndexSet<String> = IndexSet::new();

    for (i, line) in lines.iter().enumerate() {
        if !mentions_day(line) {
            continue;
        }
        let prev = if i > 0 { lines[i - 1] } else { "" };
        let next = lines.get(i + 1).copied().unwrap_or("");
        let window = format!("{prev}\n{line}\n{next}").trim().to_string();
        windows.insert(window);
    }

    windows.into_iter().collect::<Vec<_>>().join("\n")
}

/// Put each capitalized weekday name of flattened web text on its own line,
/// prefixed with a "for the day" marker so the semantic service sees day
/// boundaries that the HTML layout carried.
pub fn mark_day_boundaries(text: &str) -> String {
    DAY_WORD
        .replace_all(text, "\n for the day : $1")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_windows() {
        let text = "Vecka 46\nMåndag\nKöttbullar med mos\nTisdag\nFiskgratäng\nKaffe ingår";
        let result = extract_day_sentences(text);

        assert_eq!(
            result,
            "Vecka 46\nMåndag\nKöttbullar med mos\nKöttbullar med mos\nTisdag\nFiskgratäng"
        );
    }

    #[test]
    fn test_duplicate_windows_collapse() {
        let text = "FREDAG\nTacos\nFREDAG\nTacos";
        // windows: "FREDAG\nTacos", "Tacos\nFREDAG\nTacos"
        let result = extract_day_sentences(text);
        assert_eq!(result, "FREDAG\nTacos\nTacos\nFREDAG\nTacos");

        let repeated = "x\nMonday\ny\nx\nMonday\ny";
        assert_eq!(extract_day_sentences(repeated), "x\nMonday\ny");
    }

    #[test]
    fn test_no_days() {
        assert_eq!(extract_day_sentences("Pasta\nPizza"), "");
        assert_eq!(extract_day_sentences(""), "");
    }

    #[test]
    fn test_mark_day_boundaries() {
        let marked = mark_day_boundaries("Lunch Måndag Soppa Tisdag Pasta");
        assert_eq!(
            marked,
            "Lunch \n for the day : Måndag Soppa \n for the day : Tisdag Pasta"
        );
        assert_eq!(mark_day_boundaries("måndagar stängt"), "måndagar stängt");
    }
}
