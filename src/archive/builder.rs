//! Assembles one [`DayArchive`] by walking every section in turn.

use crate::models::{DayArchive, Section};
use crate::scrapers::browser::PageSource;
use crate::scrapers::dawn::{parse_section, NEWSPAPER_URL};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// Fetches and parses every configured section for a date.
///
/// Sections are processed one at a time, in order, with a fixed pause after
/// each attempt. A section whose fetch fails is recorded as an empty list so
/// every configured key is present in the result.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    base_url: String,
    sections: Vec<Section>,
    delay: Duration,
}

impl ArchiveBuilder {
    /// A builder for the Dawn newspaper with every section and the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            base_url: NEWSPAPER_URL.to_string(),
            sections: Section::ALL.to_vec(),
            delay,
        }
    }

    /// Page URL for a section on a date: `{base}/{section}/{YYYY-MM-DD}`.
    pub fn section_url(&self, section: Section, date: NaiveDate) -> String {
        format!("{}/{}/{}", self.base_url, section, date.format("%Y-%m-%d"))
    }

    /// Scrape every section for `date`.
    ///
    /// Never fails; per-section errors are logged and leave that section empty.
    ///
    /// # Returns
    ///
    /// An archive with one key per configured section, in fetch order.
    #[instrument(level = "info", skip_all, fields(%date))]
    pub async fn build_day<S: PageSource>(&self, source: &S, date: NaiveDate) -> DayArchive {
        let mut archive = DayArchive::new(date);

        for &section in &self.sections {
            info!(%section, %date, "Scraping section");
            let url = self.section_url(section, date);

            let articles = match source.fetch(&url).await {
                Ok(html) => {
                    let articles = parse_section(&html, section, date);
                    if articles.is_empty() {
                        info!(%section, "No articles found");
                        debug!(%section, preview = %truncate_for_log(&html, 300), "Page without articles");
                    } else {
                        info!(%section, count = articles.len(), "Found articles");
                    }
                    articles
                }
                Err(e) => {
                    error!(%section, %date, error = %e, "Failed to scrape section");
                    Vec::new()
                }
            };
            archive.sections.insert(section, articles);

            sleep(self.delay).await;
        }

        info!(
            %date,
            sections = archive.sections.len(),
            total = archive.total_articles(),
            "Day archive assembled"
        );
        archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned HTML per URL; unknown URLs fail like a timed-out navigation.
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn with_page(mut self, url: String, html: &str) -> Self {
            self.pages.insert(url, html.to_string());
            self
        }
    }

    impl PageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Timeout {
                url: url.to_string(),
                timeout: Duration::from_secs(60),
            })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 1, 2).unwrap()
    }

    fn fixture(section: Section) -> &'static str {
        match section {
            Section::FrontPage => include_str!("../../tests/fixtures/front-page.html"),
            Section::BackPage => include_str!("../../tests/fixtures/back-page.html"),
            Section::National => include_str!("../../tests/fixtures/national.html"),
            Section::Editorial => include_str!("../../tests/fixtures/editorial.html"),
            Section::Business => include_str!("../../tests/fixtures/business.html"),
        }
    }

    fn builder() -> ArchiveBuilder {
        ArchiveBuilder::new(Duration::ZERO)
    }

    fn full_source(builder: &ArchiveBuilder) -> FakeSource {
        Section::ALL.iter().fold(FakeSource::default(), |source, &section| {
            source.with_page(builder.section_url(section, date()), fixture(section))
        })
    }

    #[test]
    fn test_section_url() {
        assert_eq!(
            builder().section_url(Section::FrontPage, date()),
            "https://www.dawn.com/newspaper/front-page/2013-01-02"
        );
    }

    #[tokio::test]
    async fn test_build_day_from_fixtures() {
        let builder = builder();
        let source = full_source(&builder);

        let archive = builder.build_day(&source, date()).await;

        assert_eq!(archive.date, date());
        assert_eq!(archive.sections.len(), 5);
        for section in Section::ALL {
            assert!(archive.sections.contains_key(&section), "missing {section}");
        }

        // The front page lists "Floods hit Sindh" twice.
        let front = &archive.sections[&Section::FrontPage];
        let titles: Vec<&str> = front.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Floods hit Sindh", "Talks resume in Doha"]);
        assert_eq!(front[0].url, "https://www.dawn.com/news/775001/floods-hit-sindh");
        assert_eq!(
            front[0].image_url.as_deref(),
            Some("https://images.dawn.com/thumbnail/2013/01/floods.jpg")
        );

        for section in Section::ALL.into_iter().skip(1) {
            let articles = &archive.sections[&section];
            assert_eq!(articles.len(), 2, "{section}");
            assert!(articles.iter().all(|a| a.section == section && a.date == date()));
        }
        assert_eq!(archive.total_articles(), 10);
    }

    #[tokio::test]
    async fn test_failed_section_is_kept_as_empty() {
        let builder = builder();
        let mut source = full_source(&builder);
        source
            .pages
            .remove(&builder.section_url(Section::National, date()));

        let archive = builder.build_day(&source, date()).await;

        assert_eq!(archive.sections.len(), 5);
        assert!(archive.sections[&Section::National].is_empty());
        assert_eq!(archive.sections[&Section::Business].len(), 2);
        assert_eq!(archive.total_articles(), 8);
    }

    #[tokio::test]
    async fn test_sections_fetched_in_order_once_each() {
        let builder = builder();
        let source = FakeSource::default();

        let archive = builder.build_day(&source, date()).await;

        let expected: Vec<String> = Section::ALL
            .iter()
            .map(|&s| builder.section_url(s, date()))
            .collect();
        assert_eq!(*source.requested.borrow(), expected);
        assert!(archive.sections.values().all(Vec::is_empty));
        assert_eq!(archive.sections.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_every_section() {
        let builder = ArchiveBuilder::new(Duration::from_secs(2));
        let source = FakeSource::default();
        let t0 = tokio::time::Instant::now();

        builder.build_day(&source, date()).await;

        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_secs(10), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(11), "{elapsed:?}");
    }
}
