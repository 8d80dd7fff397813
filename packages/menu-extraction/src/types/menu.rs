//! Menu items - the boundary shape shared with the semantic service.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// English weekday labels, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Default availability when the menu names no days.
pub const WORKWEEK: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Offset from Monday for a weekday label (case-insensitive).
pub fn day_offset(label: &str) -> Option<i64> {
    let label = label.trim();
    WEEKDAYS
        .iter()
        .position(|day| day.eq_ignore_ascii_case(label))
        .map(|i| i as i64)
}

/// Week number as returned by the semantic service: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeekField {
    Number(serde_json::Number),
    Text(String),
}

impl WeekField {
    /// Integer value of the week, if it parses as one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for WeekField {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for WeekField {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for WeekField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One dish on a weekly lunch menu.
///
/// Created by the semantic service from assembled text and mutated exactly
/// once by the date resolver, which replaces `week` with a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,

    /// English weekday labels the dish is served on
    #[serde(default)]
    pub availability: Vec<String>,

    #[serde(default, alias = "allergens")]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Week number before resolution; cleared by the resolver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<WeekField>,

    #[serde(default)]
    pub valid_from: Option<NaiveDate>,

    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl MenuItem {
    /// Create a new item with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price: None,
            availability: Vec::new(),
            allergies: Vec::new(),
            tags: Vec::new(),
            week: None,
            valid_from: None,
            valid_to: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_week(mut self, week: impl Into<WeekField>) -> Self {
        self.week = Some(week.into());
        self
    }

    pub fn with_availability(mut self, days: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.availability = days.into_iter().map(|d| d.into()).collect();
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }

    /// Whether the item carries a resolved date range.
    pub fn is_resolved(&self) -> bool {
        self.valid_from.is_some() && self.valid_to.is_some()
    }
}

/// Accept a number, a numeric string ("95 kr", "129,50") or null.
fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_offset() {
        assert_eq!(day_offset("Monday"), Some(0));
        assert_eq!(day_offset("sunday"), Some(6));
        assert_eq!(day_offset("Måndag"), None);
    }

    #[test]
    fn test_week_field_parsing() {
        let item: MenuItem =
            serde_json::from_str(r#"{"name":"Pasta","week":"46","price":"129,50 kr"}"#).unwrap();
        assert_eq!(item.week.as_ref().and_then(|w| w.as_integer()), Some(46));
        assert_eq!(item.price, Some(129.5));

        let item: MenuItem = serde_json::from_str(r#"{"name":"Soppa","week":47.0}"#).unwrap();
        assert_eq!(item.week.and_then(|w| w.as_integer()), Some(47));

        assert_eq!(WeekField::from("V46").as_integer(), None);
    }

    #[test]
    fn test_serializes_explicit_null_dates() {
        let item = MenuItem::new("Fisk");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["validFrom"].is_null());
        assert!(json.get("validFrom").is_some());
        assert!(json.get("week").is_none());
    }
}
