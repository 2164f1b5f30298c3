//! # Dawn Archive
//!
//! Scrapes one day of the Dawn newspaper ("12 years ago today") into a JSON
//! snapshot that a static front end renders.
//!
//! ## Usage
//!
//! ```sh
//! dawn_archive today
//! dawn_archive date 2013-01-02
//! dawn_archive show
//! ```
//!
//! ## Architecture
//!
//! The scrape follows a short, strictly sequential pipeline:
//! 1. **Browser**: Launch one headless Chrome for the whole run
//! 2. **Fetching**: Render each section page, retrying a failed navigation once
//! 3. **Parsing**: Extract articles with a first-match selector fallback
//! 4. **Output**: Close the browser and replace the archive JSON file

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod archive;
mod cli;
mod error;
mod models;
mod scrapers;
mod utils;

use archive::scrape_day;
use archive::store::ArchiveStore;
use cli::{Cli, Command};
use error::ScrapeError;
use utils::ArchiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let Some(command) = args.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let start_time = std::time::Instant::now();
    if let Err(e) = run(&args, command).await {
        error!(error = %e, "Fatal error");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

async fn run(args: &Cli, command: Command) -> Result<(), Box<dyn Error>> {
    let store = ArchiveStore::new(&args.archive_file);

    let archive_date = match command {
        Command::Today => ArchiveDate::YearsAgo {
            years: args.years_ago,
            tz: args.timezone,
        },
        Command::Date { date } => ArchiveDate::Explicit(date),
        Command::Show => return show(&store).await,
    };
    let date = archive_date.resolve().ok_or(ScrapeError::DateOutOfRange {
        years: args.years_ago,
    })?;
    info!(?archive_date, %date, "Resolved archive date");

    scrape(args, &store, date).await
}

#[instrument(level = "info", skip(args, store))]
async fn scrape(args: &Cli, store: &ArchiveStore, date: NaiveDate) -> Result<(), Box<dyn Error>> {
    let archive = scrape_day(&args.browser_options(), &args.archive_builder(), store, date).await?;
    info!(
        date = %archive.date,
        total = archive.total_articles(),
        "Scraping complete! Found articles"
    );
    Ok(())
}

async fn show(store: &ArchiveStore) -> Result<(), Box<dyn Error>> {
    let archive = store.load().await?;

    println!("\n=== Current Archive ===");
    println!("Date: {}", archive.date);
    for (section, articles) in &archive.sections {
        println!("  {section}: {} articles", articles.len());
    }
    println!("\nTotal Articles: {}", archive.total_articles());
    println!("======================\n");
    Ok(())
}
