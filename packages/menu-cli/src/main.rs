//! `menu` - scrape a single lunch menu or refresh a restaurant file.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use menu_extraction::{
    pipeline::default_concurrency, refresh_all, HttpFetcher, MemoryMenuStore, MenuFormat,
    MenuPipeline, OpenAiInterpreter, PlaywrightRenderer, ScrapeRequest, ServiceCredentials,
    StrategyHint,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, RendererKind};

#[derive(Parser)]
#[command(name = "menu", about = "Lunch menu extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one menu and print it
    Scrape {
        /// PDF, IMAGE, TEXT, FACEBOOK POST or DYNAMIC
        #[arg(long)]
        format: MenuFormat,

        /// Menu locator
        #[arg(long)]
        link: String,

        /// auto, direct_text, region_ocr or whole_page_ocr
        #[arg(long, default_value = "auto")]
        solution: StrategyHint,

        /// Print the extracted text instead of interpreted items
        #[arg(long)]
        text_only: bool,

        /// Year the menu's week numbers refer to (default: this year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Refresh every restaurant in a JSON file
    Refresh {
        /// JSON array of restaurants
        #[arg(long)]
        restaurants: PathBuf,

        /// Where to write the updated restaurants (default: in place)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,menu_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Scrape {
            format,
            link,
            solution,
            text_only,
            year,
        } => {
            let request = ScrapeRequest::new(format, link).with_hint(solution);
            let pipeline = build_pipeline(&config, !text_only)?;

            if text_only {
                let text = pipeline.extract_text(&request).await?;
                println!("{}", text);
            } else {
                let scrape = pipeline.scrape(&request, year.unwrap_or_else(current_year)).await?;
                for warning in &scrape.warnings {
                    tracing::warn!(%warning, "Date warning");
                }
                println!("{}", serde_json::to_string_pretty(&scrape.items)?);
            }
        }
        Command::Refresh {
            restaurants,
            output,
            year,
        } => {
            let store = MemoryMenuStore::load(&restaurants)
                .with_context(|| format!("loading {}", restaurants.display()))?;
            let pipeline = build_pipeline(&config, true)?;
            let concurrency = config.concurrency.unwrap_or_else(default_concurrency);

            let report = refresh_all(
                &pipeline,
                &store,
                year.unwrap_or_else(current_year),
                concurrency,
            )
            .await?;

            for failure in &report.failed {
                tracing::warn!(
                    restaurant = %failure.restaurant_id,
                    category = %failure.category,
                    "{}",
                    failure.message
                );
            }

            let target = output.unwrap_or(restaurants);
            store
                .save(&target)
                .with_context(|| format!("writing {}", target.display()))?;

            println!(
                "processed {}, updated {}, unchanged {}, empty {}, skipped {}, failed {}",
                report.processed,
                report.updated,
                report.unchanged,
                report.empty.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
    }

    Ok(())
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn build_pipeline(config: &Config, interpret: bool) -> Result<MenuPipeline> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config.pipeline.fetch));
    let mut pipeline = MenuPipeline::new(config.pipeline.clone(), fetcher);

    if config.renderer == RendererKind::Playwright {
        pipeline = pipeline.with_renderer(Arc::new(PlaywrightRenderer::new()));
    }
    if let Some(token) = &config.facebook_access_token {
        pipeline = pipeline.with_facebook_token(token.as_str());
    }
    if interpret {
        let api_key = config
            .openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY must be set to interpret menus")?;
        let credentials = ServiceCredentials::new(api_key, config.openai_model.as_str());
        pipeline =
            pipeline.with_interpreter(Arc::new(OpenAiInterpreter::from_credentials(&credentials)));
    }

    Ok(pipeline)
}
