//! Command-line interface definitions for the Dawn archive scraper.
//!
//! Subcommands select what to do; every other option can also be supplied
//! through an environment variable.

use crate::archive::builder::ArchiveBuilder;
use crate::archive::store::DEFAULT_ARCHIVE_FILE;
use crate::scrapers::browser::BrowserOptions;
use crate::utils::parse_iso_date;
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the archive scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the paper from 12 years ago today (Pakistan time)
/// dawn_archive today
///
/// # Scrape a specific day
/// dawn_archive date 2013-01-02
///
/// # Summarise the stored archive
/// dawn_archive show --archive-file ./public/data/archive.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path of the archive JSON file
    #[arg(long, global = true, env = "ARCHIVE_FILE", default_value = DEFAULT_ARCHIVE_FILE)]
    pub archive_file: PathBuf,

    /// How many years back `today` reaches
    #[arg(long, global = true, env = "ARCHIVE_YEARS_AGO", default_value_t = 12)]
    pub years_ago: u32,

    /// Time zone whose calendar date counts as "today"
    #[arg(
        long,
        global = true,
        env = "ARCHIVE_TIMEZONE",
        default_value = "Asia/Karachi",
        value_parser = parse_timezone
    )]
    pub timezone: Tz,

    /// Pause after each section request, in milliseconds
    #[arg(long, global = true, env = "SCRAPE_DELAY_MS", default_value_t = 2000)]
    pub delay_ms: u64,

    /// Bound on each page navigation attempt, in seconds
    #[arg(long, global = true, env = "NAVIGATION_TIMEOUT_SECS", default_value_t = 60)]
    pub navigation_timeout_secs: u64,

    /// Chrome/Chromium binary to launch (auto-detected when omitted)
    #[arg(long, global = true, env = "CHROME_EXECUTABLE")]
    pub chrome_executable: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape today's date from N years ago
    Today,
    /// Scrape a specific date
    Date {
        /// Day to scrape, as YYYY-MM-DD
        #[arg(value_parser = parse_iso_date)]
        date: NaiveDate,
    },
    /// Show archive contents
    Show,
}

impl Cli {
    /// Browser launch settings from `--chrome-executable` and
    /// `--navigation-timeout-secs`.
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            executable: self.chrome_executable.clone(),
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
        }
    }

    /// A builder over every section, pausing `--delay-ms` after each one.
    pub fn archive_builder(&self) -> ArchiveBuilder {
        ArchiveBuilder::new(Duration::from_millis(self.delay_ms))
    }
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>()
        .map_err(|e| format!("unknown time zone {s:?}: {e}"))
}
