//! Text heuristics shared by the extraction strategies and format handlers.

pub mod days;
pub mod keywords;
pub mod sections;
pub mod week;

pub use days::{extract_day_sentences, mark_day_boundaries};
pub use keywords::{contains_any, contains_keyword};
pub use sections::{clean_and_organize, extract_special_sections};
pub use week::{
    annotate_with_locator_week, extract_week_number, extract_week_number_from_locator,
    prefix_week, resolve_week,
};
