//! Error types for the scraping pipeline.
//!
//! Per-section errors ([`FetchError`]) are caught by the archive builder and
//! downgraded to an empty section. Everything else ([`BrowserError`],
//! [`ArchiveWriteError`], [`ArchiveReadError`]) reaches `main` and ends the run.
//!
//! There is no parse error type: section parsing returns an empty list when
//! nothing matches.

use chromiumoxide::error::CdpError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A page could not be rendered, even after the single retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to prepare a page for {url}: {source}")]
    Page {
        url: String,
        #[source]
        source: CdpError,
    },

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },

    #[error("navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("failed to read rendered HTML of {url}: {source}")]
    Content {
        url: String,
        #[source]
        source: CdpError,
    },
}

/// The headless browser could not be started or shut down.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("invalid browser configuration: {0}")]
    Config(String),

    #[error("failed to launch headless browser: {0}")]
    Launch(#[source] CdpError),

    #[error("failed to close headless browser: {0}")]
    Close(#[source] CdpError),
}

/// The persisted archive is missing or unreadable.
#[derive(Debug, Error)]
pub enum ArchiveReadError {
    #[error("no archive found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The archive could not be written.
#[derive(Debug, Error)]
pub enum ArchiveWriteError {
    #[error("failed to serialize archive: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a whole scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Write(#[from] ArchiveWriteError),

    #[error("cannot go back {years} years from today")]
    DateOutOfRange { years: u32 },
}
