//! Data models for the archived newspaper day.
//!
//! This module defines the structures persisted to the archive file and read
//! back by the presentation layer:
//! - [`Section`]: The fixed set of newspaper sections that are scraped
//! - [`Article`]: One story extracted from a section page
//! - [`DayArchive`]: Every section's articles for a single calendar date
//!
//! Field names use camelCase where the presentation layer expects it
//! (`imageUrl`), hence the explicit `#[serde(rename)]` attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A section of the printed newspaper.
///
/// Each section maps to both a URL path segment
/// (`https://www.dawn.com/newspaper/{section}/{date}`) and a key in the
/// archive's `sections` object. The declaration order is the scrape order and
/// the order keys appear in the archive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    FrontPage,
    BackPage,
    National,
    Editorial,
    Business,
}

impl Section {
    /// Every section, in scrape order.
    pub const ALL: [Section; 5] = [
        Section::FrontPage,
        Section::BackPage,
        Section::National,
        Section::Editorial,
        Section::Business,
    ];

    /// The URL path segment and archive key for this section.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::FrontPage => "front-page",
            Section::BackPage => "back-page",
            Section::National => "national",
            Section::Editorial => "editorial",
            Section::Business => "business",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single story extracted from a section page.
///
/// # Fields
///
/// * `title` - Trimmed headline text; unique within one section's list
/// * `url` - Absolute link to the story
/// * `summary` - Excerpt text, empty when the page had none
/// * `image_url` - Absolute image URL, omitted from JSON when unresolved
/// * `section` - The section the story was listed under
/// * `date` - The archived day (not the scrape time)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub summary: String,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub section: Section,
    pub date: NaiveDate,
}

/// The persisted snapshot of every section's articles for one date.
///
/// A `DayArchive` is built fresh on every run and replaces the previous file
/// wholesale. Within each section the articles keep page order, which the
/// front end relies on to pick the front-page lead story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayArchive {
    /// The archived day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Articles per section, in page order.
    pub sections: BTreeMap<Section, Vec<Article>>,
}

impl DayArchive {
    /// Create an archive for `date` with no sections recorded yet.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sections: BTreeMap::new(),
        }
    }

    /// Total number of articles across all sections.
    pub fn total_articles(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}
