//! Single-page extraction for sources without a feed.
//!
//! Every field is produced by a [`StrategyChain`]. Title, date and author
//! read the document as fetched; content reads a copy with navigation, ads and
//! scripts detached.

pub mod author;
pub mod content;
pub mod date;
pub mod meta;
pub mod strategy;
pub mod title;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

use crate::config::ExtractorConfig;
use crate::domain::ExtractedItem;
use crate::errors::{ScrapeError, ScrapeResult};
use crate::normalize;
use crate::sources::fetcher::Fetcher;

pub use strategy::{Resolved, StrategyChain};

/// Every field of a page with the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    pub title: Resolved<String>,
    /// Cleaned text
    pub content: Resolved<String>,
    pub published_at: Resolved<DateTime<Utc>>,
    pub author: Resolved<String>,
}

pub struct PageExtractor {
    fetcher: Arc<dyn Fetcher>,
    config: ExtractorConfig,
}

impl PageExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &ExtractorConfig) -> Self {
        Self {
            fetcher,
            config: config.clone(),
        }
    }

    /// Fetch a page and turn it into at most one item
    pub fn extract(
        &self,
        url: &str,
        selector: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> ScrapeResult<Vec<ExtractedItem>> {
        Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", url, e)))?;
        let selector = parse_selector(selector)?;

        let document = self.fetcher.fetch(url, self.config.page_timeout)?;
        let html = document.text();

        let item = self.item_from_document(&html, url, selector.as_ref(), since, Utc::now());
        Ok(item.into_iter().collect())
    }

    /// Run every strategy chain over already-fetched HTML
    pub fn analyze(&self, html: &str, url: &str, selector: Option<&str>) -> ScrapeResult<PageAnalysis> {
        let selector = parse_selector(selector)?;
        Ok(self.analyze_document(html, url, selector.as_ref(), Utc::now()))
    }

    /// [`analyze`](Self::analyze) plus the cutoff and minimum-length checks
    pub fn item_from_html(
        &self,
        html: &str,
        url: &str,
        selector: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> ScrapeResult<Option<ExtractedItem>> {
        let selector = parse_selector(selector)?;
        Ok(self.item_from_document(html, url, selector.as_ref(), since, Utc::now()))
    }

    fn item_from_document(
        &self,
        html: &str,
        url: &str,
        selector: Option<&Selector>,
        since: Option<DateTime<Utc>>,
        fetched_at: DateTime<Utc>,
    ) -> Option<ExtractedItem> {
        let analysis = self.analyze_document(html, url, selector, fetched_at);

        if let Some(cutoff) = since {
            if analysis.published_at.value <= cutoff {
                tracing::debug!(
                    url,
                    published_at = %analysis.published_at.value,
                    %cutoff,
                    "page is not newer than cutoff"
                );
                return None;
            }
        }

        let length = analysis.content.value.chars().count();
        if length < self.config.min_content_chars {
            tracing::debug!(
                url,
                length,
                minimum = self.config.min_content_chars,
                "page content too short"
            );
            return None;
        }

        Some(
            ExtractedItem::new(analysis.title.value, analysis.content.value, url.to_string())
                .with_published_at(Some(analysis.published_at.value))
                .with_author(analysis.author.value),
        )
    }

    fn analyze_document(
        &self,
        html: &str,
        url: &str,
        selector: Option<&Selector>,
        fetched_at: DateTime<Utc>,
    ) -> PageAnalysis {
        let document = Html::parse_document(html);

        let mut stripped = document.clone();
        content::strip_noise(&mut stripped, &self.config.noise_selectors);

        let title = title::title_chain(url).resolve_or_else(&document, "default", || {
            "Untitled".to_string()
        });
        let published_at = date::date_chain(&self.config.date_selectors)
            .resolve_or_else(&document, "fetch_time", || fetched_at);
        let author = author::author_chain(&self.config.byline_selectors)
            .resolve_or_else(&document, "none", String::new);
        let content = content::content_chain(selector, &self.config.content_selectors)
            .resolve_or_else(&stripped, "none", String::new)
            .map(|text| normalize::clean(&text));

        PageAnalysis {
            title,
            content,
            published_at,
            author,
        }
    }
}

fn parse_selector(selector: Option<&str>) -> ScrapeResult<Option<Selector>> {
    selector
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Selector::parse(s).map_err(|e| ScrapeError::InvalidSelector(format!("{}: {}", s, e))))
        .transpose()
}
