use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::domain::{ExtractedItem, SourceDescriptor};
use crate::errors::ScrapeResult;
use crate::sources::feed::FeedExtractor;
use crate::sources::fetcher::{Fetcher, HttpFetcher};
use crate::sources::page::PageExtractor;

/// Which extractor a descriptor is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Feed {
        feed_url: &'a str,
    },
    Page {
        url: &'a str,
        selector: Option<&'a str>,
    },
}

pub struct SourceDispatcher {
    feeds: FeedExtractor,
    pages: PageExtractor,
}

impl SourceDispatcher {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new(config)), config)
    }

    /// Both extractors share one fetcher (and so one connection pool)
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: &ExtractorConfig) -> Self {
        Self {
            feeds: FeedExtractor::new(fetcher.clone(), config),
            pages: PageExtractor::new(fetcher, config),
        }
    }

    pub fn route(descriptor: &SourceDescriptor) -> Route<'_> {
        if let Some(feed_url) = descriptor.usable_feed_url() {
            return Route::Feed { feed_url };
        }

        if descriptor.has_feed {
            tracing::warn!(
                url = %descriptor.url,
                "source is marked as feed-backed but has no feed URL; scraping the page instead"
            );
        }

        Route::Page {
            url: &descriptor.url,
            selector: descriptor.selector.as_deref(),
        }
    }

    /// Items newer than the descriptor's `last_fetched_at`, or the error that prevented it
    pub fn try_fetch_new(&self, descriptor: &SourceDescriptor) -> ScrapeResult<Vec<ExtractedItem>> {
        let since = descriptor.last_fetched_at;

        match Self::route(descriptor) {
            Route::Feed { feed_url } => self.feeds.extract(feed_url, since),
            Route::Page { url, selector } => self.pages.extract(url, selector, since),
        }
    }

    /// Like [`try_fetch_new`](Self::try_fetch_new), but a failure is logged and yields no items
    pub fn fetch_new(&self, descriptor: &SourceDescriptor) -> Vec<ExtractedItem> {
        match self.try_fetch_new(descriptor) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(url = %descriptor.url, error = %e, "fetch failed");
                Vec::new()
            }
        }
    }
}
