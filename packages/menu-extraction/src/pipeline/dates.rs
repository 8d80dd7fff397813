//! Menu date resolution: turn a week number plus weekday labels into a
//! concrete validity range.

use std::fmt;

use chrono::{Duration, NaiveDate, Weekday};
use tracing::warn;

use crate::error::{ExtractionError, Result};
use crate::types::menu::{day_offset, MenuItem, WORKWEEK};

/// Something the resolver could not make sense of. Resolution carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWarning {
    /// Name of the affected item
    pub item: String,
    pub kind: DateWarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWarningKind {
    /// An availability label that is not an English weekday
    UnknownDay(String),

    /// The week does not name a calendar week of the year
    UnresolvedWeek(String),

    /// None of the availability labels could be placed
    NoValidDates,
}

impl fmt::Display for DateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DateWarningKind::UnknownDay(day) => {
                write!(f, "unknown day '{}' for item '{}'", day, self.item)
            }
            DateWarningKind::UnresolvedWeek(week) => {
                write!(f, "week '{}' unresolved for item '{}'", week, self.item)
            }
            DateWarningKind::NoValidDates => write!(f, "no valid dates for item '{}'", self.item),
        }
    }
}

/// Monday of ISO week `week` in `year`.
pub fn week_start(year: i32, week: i64) -> Result<NaiveDate> {
    u32::try_from(week)
        .ok()
        .and_then(|w| NaiveDate::from_isoywd_opt(year, w, Weekday::Mon))
        .ok_or_else(|| ExtractionError::WeekUnresolved {
            week: week.to_string(),
        })
}

/// Resolve validity dates for every item in place.
///
/// For an item with a week: empty availability becomes Monday to Friday,
/// each known day is placed in that ISO week, and the earliest and latest
/// dates become `valid_from` and `valid_to`. The week is cleared afterwards.
/// Items without a week, with an unusable week, or with no placeable day
/// get both dates cleared. Never fails; problems come back as warnings.
pub fn resolve_menu_dates(items: &mut [MenuItem], year: i32) -> Vec<DateWarning> {
    let mut warnings = Vec::new();

    for item in items.iter_mut() {
        let Some(week) = item.week.take() else {
            item.valid_from = None;
            item.valid_to = None;
            continue;
        };

        let start = match week.as_integer().map(|w| week_start(year, w)) {
            Some(Ok(start)) => start,
            _ => {
                warnings.push(DateWarning {
                    item: item.name.clone(),
                    kind: DateWarningKind::UnresolvedWeek(week.label()),
                });
                item.valid_from = None;
                item.valid_to = None;
                continue;
            }
        };

        if item.availability.is_empty() {
            item.availability = WORKWEEK.iter().map(|d| d.to_string()).collect();
        }

        let mut dates = Vec::new();
        for day in &item.availability {
            match day_offset(day) {
                Some(offset) => dates.push(start + Duration::days(offset)),
                None => warnings.push(DateWarning {
                    item: item.name.clone(),
                    kind: DateWarningKind::UnknownDay(day.clone()),
                }),
            }
        }

        item.valid_from = dates.iter().min().copied();
        item.valid_to = dates.iter().max().copied();
        if dates.is_empty() {
            warnings.push(DateWarning {
                item: item.name.clone(),
                kind: DateWarningKind::NoValidDates,
            });
        }
    }

    for warning in &warnings {
        warn!(%warning, "Menu date resolution");
    }
    warnings
}
