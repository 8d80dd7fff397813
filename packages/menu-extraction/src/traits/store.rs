//! Storage trait for restaurants and their resolved menus.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{menu::MenuItem, restaurant::Restaurant};

/// Holds restaurant configuration and final menu records.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Restaurants due for a refresh (periodicity other than Never).
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>>;

    /// Replace a restaurant's menus. Returns the number of records changed;
    /// zero means nothing changed.
    async fn replace_menus(&self, restaurant_id: &str, menus: &[MenuItem]) -> Result<u64>;
}
