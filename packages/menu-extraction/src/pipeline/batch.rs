//! Batch refresh: every restaurant through scrape, interpretation, date
//! resolution and storage, with per-restaurant failure isolation.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::{ErrorCategory, ExtractionError};
use crate::pipeline::dates::DateWarning;
use crate::pipeline::dispatch::MenuPipeline;
use crate::traits::store::MenuStore;
use crate::types::{request::ScrapeRequest, restaurant::Restaurant};

pub use crate::types::config::default_concurrency;

/// A restaurant whose refresh failed.
#[derive(Debug, Clone)]
pub struct RefreshFailure {
    pub restaurant_id: String,
    pub category: ErrorCategory,
    pub message: String,
}

/// Result of a batch refresh.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Restaurants that went through the pipeline
    pub processed: usize,

    /// Restaurants whose stored menus changed
    pub updated: usize,

    /// Restaurants whose menus were already up to date
    pub unchanged: usize,

    /// Restaurants without a menu link or format
    pub skipped: Vec<String>,

    /// Restaurants whose menu text produced no items (nothing stored)
    pub empty: Vec<String>,

    pub failed: Vec<RefreshFailure>,

    pub warnings: Vec<DateWarning>,
}

impl RefreshReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

enum Outcome {
    Stored { changed: bool, warnings: Vec<DateWarning> },
    Empty,
    Failed(ExtractionError),
}

/// Refresh every due restaurant in `store` for `year`, at most
/// `concurrency` at a time.
///
/// Only listing the restaurants can fail the whole batch; each
/// restaurant's own failure is recorded in the report.
pub async fn refresh_all(
    pipeline: &MenuPipeline,
    store: &dyn MenuStore,
    year: i32,
    concurrency: usize,
) -> crate::error::Result<RefreshReport> {
    let restaurants = store.list_restaurants().await?;
    let mut report = RefreshReport::default();

    let mut due = Vec::new();
    for restaurant in restaurants {
        match restaurant.scrape_request() {
            Some(request) => due.push((restaurant, request)),
            None => {
                info!(restaurant = %restaurant.name, "No menu link or format, skipping");
                report.skipped.push(restaurant.id);
            }
        }
    }

    info!(
        restaurants = due.len(),
        skipped = report.skipped.len(),
        concurrency,
        "Starting menu refresh"
    );

    let outcomes: Vec<(Restaurant, Outcome)> = stream::iter(due)
        .map(|(restaurant, request)| async move {
            let outcome = refresh_one(pipeline, store, &restaurant, &request, year).await;
            (restaurant, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (restaurant, outcome) in outcomes {
        report.processed += 1;
        match outcome {
            Outcome::Stored { changed, warnings } => {
                if changed {
                    report.updated += 1;
                } else {
                    report.unchanged += 1;
                }
                report.warnings.extend(warnings);
            }
            Outcome::Empty => report.empty.push(restaurant.id),
            Outcome::Failed(e) => report.failed.push(RefreshFailure {
                restaurant_id: restaurant.id,
                category: e.category(),
                message: e.to_string(),
            }),
        }
    }

    info!(
        processed = report.processed,
        updated = report.updated,
        unchanged = report.unchanged,
        empty = report.empty.len(),
        failed = report.failed.len(),
        "Menu refresh complete"
    );
    Ok(report)
}

async fn refresh_one(
    pipeline: &MenuPipeline,
    store: &dyn MenuStore,
    restaurant: &Restaurant,
    request: &ScrapeRequest,
    year: i32,
) -> Outcome {
    let scrape = match pipeline.scrape(request, year).await {
        Ok(scrape) => scrape,
        Err(e) => {
            warn!(
                restaurant = %restaurant.name,
                category = %e.category(),
                error = %e,
                "Menu refresh failed"
            );
            return Outcome::Failed(e);
        }
    };

    if scrape.items.is_empty() {
        warn!(restaurant = %restaurant.name, "No menu items found, keeping stored menus");
        return Outcome::Empty;
    }

    match store.replace_menus(&restaurant.id, &scrape.items).await {
        Ok(0) => {
            info!(restaurant = %restaurant.name, "Menus unchanged");
            Outcome::Stored {
                changed: false,
                warnings: scrape.warnings,
            }
        }
        Ok(changed) => {
            info!(restaurant = %restaurant.name, items = scrape.items.len(), changed, "Menus updated");
            Outcome::Stored {
                changed: true,
                warnings: scrape.warnings,
            }
        }
        Err(e) => {
            warn!(restaurant = %restaurant.name, error = %e, "Storing menus failed");
            Outcome::Failed(e)
        }
    }
}
