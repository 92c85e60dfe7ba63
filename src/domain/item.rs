use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    pub characters: usize,
    pub words: usize,
    pub reading_time_minutes: usize,
}

impl ExtractedItem {
    pub fn new(title: String, content: String, url: String) -> Self {
        Self {
            title,
            content,
            url,
            published_at: None,
            author: String::new(),
        }
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_author(mut self, author: String) -> Self {
        self.author = author;
        self
    }

    /// Size figures for the content body
    pub fn stats(&self) -> ContentStats {
        let characters = self.content.chars().count();
        let words = self.content.split_whitespace().count();
        let reading_time_minutes = if words == 0 {
            0
        } else {
            words.div_ceil(WORDS_PER_MINUTE)
        };

        ContentStats {
            characters,
            words,
            reading_time_minutes,
        }
    }
}
