//! Restaurant configuration records held by the storage collaborator.

use serde::{Deserialize, Serialize};

use crate::types::menu::MenuItem;
use crate::types::request::{MenuFormat, ScrapeRequest, StrategyHint};

/// How often a restaurant's menu should be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Periodicity {
    #[default]
    Weekly,
    Daily,
    Never,
}

/// A restaurant and where its lunch menu is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,

    pub name: String,

    /// Where the menu (or the page listing it) lives; None = not configured
    #[serde(default, alias = "lunch_link")]
    pub lunch_link: Option<String>,

    #[serde(default, alias = "lunch_format")]
    pub lunch_format: Option<MenuFormat>,

    #[serde(default)]
    pub strategy: StrategyHint,

    #[serde(default)]
    pub menu_periodicity: Periodicity,

    #[serde(default)]
    pub lunch_menus: Vec<MenuItem>,
}

impl Restaurant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lunch_link: None,
            lunch_format: None,
            strategy: StrategyHint::Auto,
            menu_periodicity: Periodicity::Weekly,
            lunch_menus: Vec::new(),
        }
    }

    pub fn with_menu(mut self, format: MenuFormat, link: impl Into<String>) -> Self {
        self.lunch_format = Some(format);
        self.lunch_link = Some(link.into());
        self
    }

    pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
        self.menu_periodicity = periodicity;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyHint) -> Self {
        self.strategy = strategy;
        self
    }

    /// Scrape request for this restaurant, if its menu source is configured.
    pub fn scrape_request(&self) -> Option<ScrapeRequest> {
        let format = self.lunch_format?;
        let link = self.lunch_link.as_deref().filter(|l| !l.trim().is_empty())?;
        Some(ScrapeRequest::new(format, link).with_hint(self.strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_request_requires_link_and_format() {
        let bare = Restaurant::new("r1", "Bistro");
        assert!(bare.scrape_request().is_none());

        let configured = Restaurant::new("r2", "Kantin").with_menu(MenuFormat::Pdf, "https://k.se");
        let request = configured.scrape_request().unwrap();
        assert_eq!(request.format, MenuFormat::Pdf);
        assert_eq!(request.url, "https://k.se");
    }

    #[test]
    fn test_deserialize_snake_case_fields() {
        let json = r#"{"id":"1","name":"Kök","lunch_link":"https://k.se/lunch","lunch_format":"FACEBOOK POST","menuPeriodicity":"Never"}"#;
        let restaurant: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(restaurant.lunch_format, Some(MenuFormat::FacebookPost));
        assert_eq!(restaurant.menu_periodicity, Periodicity::Never);
    }
}
