use std::time::Duration;

use crate::errors::{ScrapeError, ScrapeResult};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; DigestScraper/0.1; +https://example.com/bot)";

/// Containers that usually hold the article body, most specific last
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post",
    ".entry",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "main",
    ".main-content",
    "#content",
];

/// Elements removed before looking for the article body
const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    ".menu",
    ".navigation",
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    "[class*='advert']",
    "[id*='advert']",
    "[class*='sponsor']",
];

const DATE_SELECTORS: &[&str] = &[
    ".date",
    ".published",
    ".post-date",
    ".entry-date",
    ".pubdate",
    "[class*='date']",
    "[id*='date']",
];

const BYLINE_SELECTORS: &[&str] = &[
    "[rel='author']",
    "[itemprop='author']",
    ".author",
    ".byline",
    ".author-name",
    ".post-author",
    ".entry-author",
];

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub validate_timeout: Duration,
    pub feed_timeout: Duration,
    pub page_timeout: Duration,
    pub content_selectors: Vec<String>,
    pub noise_selectors: Vec<String>,
    pub date_selectors: Vec<String>,
    pub byline_selectors: Vec<String>,
    /// Cleaned page text shorter than this is not worth returning
    pub min_content_chars: usize,
    /// `None` returns every entry that passes the cutoff
    pub max_feed_entries: Option<usize>,
    pub max_consecutive_failures: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            validate_timeout: Duration::from_secs(10),
            feed_timeout: Duration::from_secs(15),
            page_timeout: Duration::from_secs(15),
            content_selectors: to_owned(CONTENT_SELECTORS),
            noise_selectors: to_owned(NOISE_SELECTORS),
            date_selectors: to_owned(DATE_SELECTORS),
            byline_selectors: to_owned(BYLINE_SELECTORS),
            min_content_chars: 100,
            max_feed_entries: None,
            max_consecutive_failures: 5,
        }
    }
}

impl ExtractorConfig {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Build a config from defaults overridden by `SCRAPER_*` environment variables.
    ///
    /// Only the binary calls this; library users construct the config directly.
    pub fn from_env() -> ScrapeResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(user_agent) = std::env::var("SCRAPER_USER_AGENT") {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent;
            }
        }
        if let Some(secs) = env_number("SCRAPER_VALIDATE_TIMEOUT_SECS")? {
            config.validate_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number("SCRAPER_FEED_TIMEOUT_SECS")? {
            config.feed_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number("SCRAPER_PAGE_TIMEOUT_SECS")? {
            config.page_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = env_number("SCRAPER_MAX_FEED_ENTRIES")? {
            config.max_feed_entries = Some(max as usize);
        }

        Ok(config)
    }
}

fn env_number(name: &str) -> ScrapeResult<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ScrapeError::Config(format!("{} must be a whole number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.validate_timeout, Duration::from_secs(10));
        assert_eq!(config.min_content_chars, 100);
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.max_feed_entries, None);
        assert_eq!(config.content_selectors.first().map(String::as_str), Some("article"));
        assert!(config.user_agent.contains("DigestScraper"));
    }

    #[test]
    fn test_env_number_rejects_garbage() {
        std::env::set_var("SCRAPER_TEST_GARBAGE_NUMBER", "ten");
        let err = env_number("SCRAPER_TEST_GARBAGE_NUMBER").unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
        std::env::remove_var("SCRAPER_TEST_GARBAGE_NUMBER");
    }

    #[test]
    fn test_env_number_missing_is_none() {
        assert_eq!(env_number("SCRAPER_TEST_UNSET_NUMBER").unwrap(), None);
    }

    #[test]
    fn test_selectors_are_parseable() {
        let config = ExtractorConfig::default();
        for selector in config
            .content_selectors
            .iter()
            .chain(&config.noise_selectors)
            .chain(&config.date_selectors)
            .chain(&config.byline_selectors)
        {
            assert!(
                scraper::Selector::parse(selector).is_ok(),
                "Selector '{}' should parse",
                selector
            );
        }
    }
}
