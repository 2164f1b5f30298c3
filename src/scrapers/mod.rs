//! Fetching and extracting articles from the Dawn e-paper.
//!
//! The pipeline for one section page is:
//!
//! 1. **Fetching** ([`browser`]): render the page in a headless browser tab
//! 2. **Parsing** ([`dawn`]): find story containers and pull out title, link
//!    and summary
//! 3. **Images** ([`images`]): pick the real image URL among lazy-load
//!    attributes and make it absolute
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Dawn e-paper | [`dawn`] | Headless browser + HTML scraping | One page per section per date |

pub mod browser;
pub mod dawn;
pub mod images;
