//! Building and persisting the day archive.
//!
//! - [`builder`]: Walks every section for a date and assembles a [`DayArchive`]
//! - [`store`]: Saves and loads the archive JSON file
//!
//! [`scrape_day`] ties them to a [`BrowserSession`] whose lifetime spans
//! exactly one run:
//!
//! ```text
//! launch browser → (fetch → parse → sleep) × sections → close browser → save
//! ```

pub mod builder;
pub mod store;

use crate::error::ScrapeError;
use crate::models::DayArchive;
use crate::scrapers::browser::{BrowserOptions, BrowserSession};
use builder::ArchiveBuilder;
use chrono::NaiveDate;
use store::ArchiveStore;
use tracing::{info, instrument};

/// Scrape every section for `date` and replace the stored archive.
///
/// Section failures leave that section empty; only browser start/stop and
/// the final write can fail the run. The browser is closed before saving,
/// whatever happened to the individual sections.
///
/// # Errors
///
/// * [`ScrapeError::Browser`] if the browser cannot start or stop cleanly
/// * [`ScrapeError::Write`] if the archive file cannot be replaced
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn scrape_day(
    options: &BrowserOptions,
    builder: &ArchiveBuilder,
    store: &ArchiveStore,
    date: NaiveDate,
) -> Result<DayArchive, ScrapeError> {
    let session = BrowserSession::launch(options).await?;
    let archive = builder.build_day(&session, date).await;
    session.close().await?;

    store.save(&archive).await?;
    info!(
        %date,
        total = archive.total_articles(),
        path = %store.path().display(),
        "Scraping complete"
    );
    Ok(archive)
}
