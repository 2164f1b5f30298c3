//! Dawn e-paper section parser.
//!
//! Section pages at `https://www.dawn.com/newspaper/{section}/{date}` are
//! rendered from several templates, so no single selector finds the story
//! containers on every page. [`parse_section`] tries an ordered list of
//! container selectors and uses the first one that matches anything.
//!
//! # Container Selectors
//!
//! | Order | Selector |
//! |-------|----------|
//! | 1 | `article.story` |
//! | 2 | `.story` |
//! | 3 | `article` |
//! | 4 | `.box.story` |
//! | 5 | `.story-list article` |
//!
//! A selector that matches containers without usable titles still wins over
//! the later ones; the page then yields no articles.

use crate::models::{Article, Section};
use crate::scrapers::images::{normalize_url, resolve_image_url};
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Origin that relative article and image links are resolved against.
pub const SITE_ORIGIN: &str = "https://www.dawn.com";

/// Root of the per-section, per-date newspaper pages.
pub const NEWSPAPER_URL: &str = "https://www.dawn.com/newspaper";

const CONTAINER_PATTERNS: [&str; 5] = [
    "article.story",
    ".story",
    "article",
    ".box.story",
    ".story-list article",
];

/// A container selector together with its source text, for logging.
struct ContainerMatcher {
    pattern: &'static str,
    selector: Selector,
}

static CONTAINER_MATCHERS: Lazy<Vec<ContainerMatcher>> = Lazy::new(|| {
    CONTAINER_PATTERNS
        .iter()
        .map(|&pattern| ContainerMatcher {
            pattern,
            selector: Selector::parse(pattern).expect("static selector"),
        })
        .collect()
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h2 a, .story__title a, h3 a, .story__link").expect("static selector")
});
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".story__excerpt, .story__text, p").expect("static selector"));

static ORIGIN: Lazy<Url> = Lazy::new(|| Url::parse(SITE_ORIGIN).expect("static origin"));

/// Extract the articles listed on one section page.
///
/// Never fails: HTML without any recognised container yields an empty list.
/// Articles keep document order. Containers without a title or link are
/// skipped, and a title already seen earlier on the page is dropped.
///
/// # Arguments
///
/// * `html` - Rendered section page
/// * `section` - Section stamped on every article
/// * `date` - Archive date stamped on every article
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn parse_section(html: &str, section: Section, date: NaiveDate) -> Vec<Article> {
    let document = Html::parse_document(html);

    let Some((pattern, containers)) = first_matching_containers(&document) else {
        debug!("No container selector matched");
        return Vec::new();
    };
    debug!(pattern, containers = containers.len(), "Using container selector");

    containers
        .into_iter()
        .filter_map(|container| extract_article(container, section, date))
        .unique_by(|article| article.title.clone())
        .collect()
}

/// The first container selector with at least one match, and its matches.
fn first_matching_containers(document: &Html) -> Option<(&'static str, Vec<ElementRef<'_>>)> {
    CONTAINER_MATCHERS.iter().find_map(|matcher| {
        let containers: Vec<ElementRef<'_>> = document.select(&matcher.selector).collect();
        (!containers.is_empty()).then_some((matcher.pattern, containers))
    })
}

fn extract_article(container: ElementRef<'_>, section: Section, date: NaiveDate) -> Option<Article> {
    let link = container.select(&TITLE_SELECTOR).next()?;
    let title = element_text(link);
    let href = link.value().attr("href")?;
    if title.is_empty() || href.is_empty() {
        return None;
    }

    let summary = container
        .select(&SUMMARY_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let image_url = resolve_image_url(container).map(|raw| normalize_url(&raw, &ORIGIN));

    Some(Article {
        title,
        url: normalize_url(href, &ORIGIN),
        summary,
        image_url,
        section,
        date,
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
