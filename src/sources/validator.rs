use std::sync::Arc;

use scraper::Html;
use url::Url;

use crate::config::ExtractorConfig;
use crate::domain::{FeedType, ValidationResult};
use crate::errors::ScrapeError;
use crate::normalize;
use crate::sources::feed::FeedExtractor;
use crate::sources::fetcher::{FetchedDocument, Fetcher, HttpFetcher};
use crate::sources::page::meta::{css, first_text};

/// Any content-selector match longer than this makes a page scrapable
const MIN_SELECTOR_TEXT_CHARS: usize = 100;
/// ...as does this much visible text anywhere on the page
const MIN_PAGE_TEXT_CHARS: usize = 500;

/// Only the start of an untyped body is inspected for feed markers
const SNIFF_BYTES: usize = 4096;

const FEED_LINK_TYPES: &[&str] = &["application/rss+xml", "application/atom+xml"];

enum BodyKind {
    Feed,
    Html,
}

pub struct UrlValidator {
    fetcher: Arc<dyn Fetcher>,
    feeds: FeedExtractor,
    config: ExtractorConfig,
}

impl UrlValidator {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new(config)), config)
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: &ExtractorConfig) -> Self {
        Self {
            feeds: FeedExtractor::new(fetcher.clone(), config),
            fetcher,
            config: config.clone(),
        }
    }

    /// Decide whether `url` can serve as a source, and how.
    ///
    /// Never fails: every problem is reported through the result's message.
    /// At most two fetches are made (the page, then a discovered feed).
    pub fn validate(&self, url: &str) -> ValidationResult {
        let url = url.trim();

        let parsed = match Url::parse(url) {
            Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => parsed,
            _ => return ValidationResult::invalid("Invalid URL format"),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return ValidationResult::invalid("URL must use HTTP or HTTPS protocol");
        }

        let document = match self.fetcher.fetch(url, self.config.validate_timeout) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(url, error = %e, "validation fetch failed");
                return Self::fetch_failure(&e);
            }
        };

        if let BodyKind::Feed = Self::body_kind(&document) {
            if let Some(result) = self.as_feed(&document, url) {
                return result;
            }
        }

        let page = Html::parse_document(&document.text());
        let page_title = first_text(&page, "title");

        if let Some(result) = self.discover_feed(&page, &document.url, url, page_title.as_deref()) {
            return result;
        }

        if self.is_scrapable(&page) {
            return ValidationResult::scrapable(page_title);
        }

        ValidationResult::invalid("no scrapable content found")
    }

    fn fetch_failure(error: &ScrapeError) -> ValidationResult {
        let message = match error {
            ScrapeError::Timeout(_) => "Website took too long to respond".to_string(),
            ScrapeError::Connection(detail) => format!("Could not connect to website: {}", detail),
            ScrapeError::HttpStatus { status, .. } => format!("Website returned HTTP {}", status),
            other => format!("Could not access website: {}", other),
        };
        ValidationResult::invalid(message)
    }

    fn body_kind(document: &FetchedDocument) -> BodyKind {
        match document.media_type() {
            Some(media) if media.contains("html") => BodyKind::Html,
            Some(media)
                if media.contains("xml")
                    || media.contains("rss")
                    || media.contains("atom")
                    || media.ends_with("feed+json") =>
            {
                BodyKind::Feed
            }
            _ if looks_like_feed(&document.body) => BodyKind::Feed,
            _ => BodyKind::Html,
        }
    }

    fn as_feed(&self, document: &FetchedDocument, url: &str) -> Option<ValidationResult> {
        let feed = match FeedExtractor::parse_bytes(&document.body) {
            Ok(feed) => feed,
            Err(e) => {
                tracing::debug!(url, error = %e, "feed-typed body did not parse");
                return None;
            }
        };
        if feed.entries.is_empty() {
            tracing::debug!(url, "feed has no entries");
            return None;
        }

        Some(ValidationResult::feed(
            "Valid RSS feed",
            url.to_string(),
            FeedType::from(&feed.feed_type),
            feed.title.map(|t| normalize::collapse_whitespace(&t.content)),
            feed.description.map(|d| normalize::collapse_whitespace(&d.content)),
        ))
    }

    fn discover_feed(
        &self,
        page: &Html,
        final_url: &str,
        url: &str,
        page_title: Option<&str>,
    ) -> Option<ValidationResult> {
        let href = feed_link(page)?;

        let base = Url::parse(final_url).or_else(|_| Url::parse(url)).ok()?;
        let feed_url = match base.join(&href) {
            Ok(feed_url) => feed_url.to_string(),
            Err(e) => {
                tracing::debug!(href = %href, error = %e, "unusable feed link");
                return None;
            }
        };

        let feed = match self
            .feeds
            .fetch_and_parse(&feed_url, self.config.validate_timeout)
        {
            Ok(feed) if !feed.entries.is_empty() => feed,
            Ok(_) => {
                tracing::debug!(feed_url = %feed_url, "advertised feed has no entries");
                return None;
            }
            Err(e) => {
                tracing::debug!(feed_url = %feed_url, error = %e, "advertised feed unusable");
                return None;
            }
        };

        let title = feed
            .title
            .map(|t| normalize::collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())
            .or_else(|| page_title.map(str::to_string));

        Some(ValidationResult::feed(
            "Valid website with RSS feed",
            feed_url,
            FeedType::from(&feed.feed_type),
            title,
            feed.description.map(|d| normalize::collapse_whitespace(&d.content)),
        ))
    }

    fn is_scrapable(&self, page: &Html) -> bool {
        let selector_match = self
            .config
            .content_selectors
            .iter()
            .filter_map(|s| css(s))
            .any(|selector| {
                page.select(&selector).any(|element| {
                    normalize::element_text(element).chars().count() > MIN_SELECTOR_TEXT_CHARS
                })
            });

        selector_match
            || normalize::element_text(page.root_element()).chars().count() > MIN_PAGE_TEXT_CHARS
    }
}

/// href of the first `<link rel="alternate">` advertising an RSS or Atom feed
fn feed_link(page: &Html) -> Option<String> {
    let selector = css("link[href]")?;

    page.select(&selector)
        .find(|link| {
            let attrs = link.value();
            let alternate = attrs
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("alternate")));
            let feed_type = attrs.attr("type").is_some_and(|t| {
                FEED_LINK_TYPES
                    .iter()
                    .any(|wanted| t.trim().eq_ignore_ascii_case(wanted))
            });
            alternate && feed_type
        })
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Body sniffing for servers that send feeds as text/plain or without a type
fn looks_like_feed(body: &[u8]) -> bool {
    let head = &body[..body.len().min(SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    head.contains("<rss")
        || (head.contains("<feed") && head.contains("http://www.w3.org/2005/atom"))
        || (head.contains("<channel") && head.contains("<item"))
}
