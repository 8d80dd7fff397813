//! Week number labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized week label (e.g. "Vecka 46") plus its numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekNumber {
    /// Normalized label as it will appear in assembled text
    pub label: String,

    /// Parsed week number (1-2 digits as written; not range-checked)
    pub value: u32,
}

impl WeekNumber {
    /// Build from a normalized label; the value is the trailing digit run.
    ///
    /// Returns None when the label carries no digits.
    pub fn from_label(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        let digits: String = label
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let value = digits.parse().ok()?;
        Some(Self { label, value })
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
