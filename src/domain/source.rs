use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied description of what to fetch and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub url: String,
    #[serde(default)]
    pub has_feed: bool,
    #[serde(default)]
    pub feed_url: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Failures in a row recorded by earlier runs
    #[serde(default)]
    pub consecutive_failures: u32,
}

impl SourceDescriptor {
    /// A source scraped as a single HTML page
    pub fn page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            has_feed: false,
            feed_url: None,
            selector: None,
            last_fetched_at: None,
            consecutive_failures: 0,
        }
    }

    /// A source backed by a syndication feed
    pub fn feed(url: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            has_feed: true,
            feed_url: Some(feed_url.into()),
            ..Self::page(url)
        }
    }

    pub fn with_selector(mut self, selector: Option<String>) -> Self {
        self.selector = selector.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_last_fetched_at(mut self, last_fetched_at: Option<DateTime<Utc>>) -> Self {
        self.last_fetched_at = last_fetched_at;
        self
    }

    pub fn with_consecutive_failures(mut self, consecutive_failures: u32) -> Self {
        self.consecutive_failures = consecutive_failures;
        self
    }

    /// The feed URL to use, if this descriptor is really feed-backed
    pub fn usable_feed_url(&self) -> Option<&str> {
        if !self.has_feed {
            return None;
        }
        self.feed_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}
