//! In-memory restaurant store with JSON snapshots.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::RwLock;

use crate::error::{ExtractionError, Result};
use crate::traits::store::MenuStore;
use crate::types::{
    menu::MenuItem,
    restaurant::{Periodicity, Restaurant},
};

/// In-memory storage for restaurants and their menus.
///
/// Keeps insertion order, so snapshots round-trip in the order they were
/// loaded. Useful for the CLI and tests; nothing survives a restart unless
/// saved.
pub struct MemoryMenuStore {
    restaurants: RwLock<IndexMap<String, Restaurant>>,
}

impl Default for MemoryMenuStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self {
            restaurants: RwLock::new(IndexMap::new()),
        }
    }

    pub fn with_restaurants(restaurants: impl IntoIterator<Item = Restaurant>) -> Self {
        let store = Self::new();
        for restaurant in restaurants {
            store.insert(restaurant);
        }
        store
    }

    /// Parse a JSON array of restaurants.
    pub fn from_json(json: &str) -> Result<Self> {
        let restaurants: Vec<Restaurant> = serde_json::from_str(json)?;
        Ok(Self::with_restaurants(restaurants))
    }

    /// Load a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ExtractionError::Storage(Box::new(e)))?;
        Self::from_json(&json)
    }

    /// Serialize every restaurant, menus included.
    pub fn to_json(&self) -> Result<String> {
        let restaurants: Vec<Restaurant> =
            self.restaurants.read().unwrap().values().cloned().collect();
        Ok(serde_json::to_string_pretty(&restaurants)?)
    }

    /// Write a snapshot file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)
            .map_err(|e| ExtractionError::Storage(Box::new(e)))
    }

    pub fn insert(&self, restaurant: Restaurant) {
        self.restaurants
            .write()
            .unwrap()
            .insert(restaurant.id.clone(), restaurant);
    }

    pub fn get(&self, id: &str) -> Option<Restaurant> {
        self.restaurants.read().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.restaurants.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        Ok(self
            .restaurants
            .read()
            .unwrap()
            .values()
            .filter(|r| r.menu_periodicity != Periodicity::Never)
            .cloned()
            .collect())
    }

    async fn replace_menus(&self, restaurant_id: &str, menus: &[MenuItem]) -> Result<u64> {
        let mut restaurants = self.restaurants.write().unwrap();
        let restaurant = restaurants.get_mut(restaurant_id).ok_or_else(|| {
            ExtractionError::Storage(format!("unknown restaurant: {}", restaurant_id).into())
        })?;

        if restaurant.lunch_menus == menus {
            return Ok(0);
        }
        restaurant.lunch_menus = menus.to_vec();
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::request::MenuFormat;

    fn store() -> MemoryMenuStore {
        MemoryMenuStore::with_restaurants([
            Restaurant::new("1", "Kantin").with_menu(MenuFormat::Pdf, "https://kantin.se/lunch"),
            Restaurant::new("2", "Stängt").with_periodicity(Periodicity::Never),
        ])
    }

    #[tokio::test]
    async fn test_list_skips_never() {
        let restaurants = store().list_restaurants().await.unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].id, "1");
    }

    #[tokio::test]
    async fn test_replace_menus_reports_changes() {
        let store = store();
        let menus = vec![MenuItem::new("Soppa")];

        assert_eq!(store.replace_menus("1", &menus).await.unwrap(), 1);
        assert_eq!(store.replace_menus("1", &menus).await.unwrap(), 0);
        assert_eq!(store.get("1").unwrap().lunch_menus, menus);
        assert!(store.replace_menus("404", &menus).await.is_err());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restaurants.json");

        store().save(&path).unwrap();
        let loaded = MemoryMenuStore::load(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("2").unwrap().menu_periodicity, Periodicity::Never);
    }
}
