use serde::{Deserialize, Serialize};

use super::{FeedType, SourceKind};

/// Outcome of checking whether a URL can be used as a content source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    pub classified_type: Option<SourceKind>,
    pub has_feed: bool,
    pub feed_url: Option<String>,
    pub feed_type: Option<FeedType>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            classified_type: None,
            has_feed: false,
            feed_url: None,
            feed_type: None,
            title: None,
            description: None,
        }
    }

    pub fn feed(
        message: impl Into<String>,
        feed_url: String,
        feed_type: FeedType,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            valid: true,
            message: message.into(),
            classified_type: Some(SourceKind::Blog),
            has_feed: true,
            feed_url: Some(feed_url),
            feed_type: Some(feed_type),
            title,
            description,
        }
    }

    pub fn scrapable(title: Option<String>) -> Self {
        Self {
            valid: true,
            message: "Valid website (web scraping)".to_string(),
            classified_type: Some(SourceKind::Blog),
            has_feed: false,
            feed_url: None,
            feed_type: None,
            title,
            description: None,
        }
    }
}
