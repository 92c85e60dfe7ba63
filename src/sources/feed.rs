use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;

use crate::config::ExtractorConfig;
use crate::domain::ExtractedItem;
use crate::errors::{ScrapeError, ScrapeResult};
use crate::normalize;
use crate::sources::fetcher::Fetcher;
use crate::sources::page::title::title_from_url;

pub struct FeedExtractor {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
    max_entries: Option<usize>,
}

impl FeedExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &ExtractorConfig) -> Self {
        Self {
            fetcher,
            timeout: config.feed_timeout,
            max_entries: config.max_feed_entries,
        }
    }

    /// Fetch a feed and return entries newer than `since`
    pub fn extract(
        &self,
        feed_url: &str,
        since: Option<DateTime<Utc>>,
    ) -> ScrapeResult<Vec<ExtractedItem>> {
        let feed = self.fetch_and_parse(feed_url, self.timeout)?;
        Ok(self.items_from_feed(feed, since))
    }

    pub fn fetch_and_parse(
        &self,
        url: &str,
        timeout: Duration,
    ) -> ScrapeResult<feed_rs::model::Feed> {
        let document = self.fetcher.fetch(url, timeout)?;
        Self::parse_bytes(&document.body)
    }

    pub fn parse_bytes(bytes: &[u8]) -> ScrapeResult<feed_rs::model::Feed> {
        parser::parse(bytes).map_err(|e| ScrapeError::FeedParse(e.to_string()))
    }

    /// Parse items from raw feed bytes without touching the network
    pub fn items_from_bytes(
        &self,
        bytes: &[u8],
        since: Option<DateTime<Utc>>,
    ) -> ScrapeResult<Vec<ExtractedItem>> {
        let feed = Self::parse_bytes(bytes)?;
        Ok(self.items_from_feed(feed, since))
    }

    pub fn items_from_feed(
        &self,
        feed: feed_rs::model::Feed,
        since: Option<DateTime<Utc>>,
    ) -> Vec<ExtractedItem> {
        let total = feed.entries.len();

        let items: Vec<ExtractedItem> = feed
            .entries
            .into_iter()
            .filter(|entry| match (since, entry_date(entry)) {
                // Undated entries are never dropped by the cutoff
                (Some(cutoff), Some(published)) => published > cutoff,
                _ => true,
            })
            .filter_map(|entry| match entry_to_item(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping feed entry: {}", e);
                    None
                }
            })
            .take(self.max_entries.unwrap_or(usize::MAX))
            .collect();

        tracing::debug!(total, kept = items.len(), "feed entries processed");

        items
    }
}

fn entry_date(entry: &Entry) -> Option<DateTime<Utc>> {
    entry.published.or(entry.updated)
}

fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
}

/// Full content first, then summary (RSS description), then media description
fn entry_content(entry: &Entry) -> Option<String> {
    entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .filter(|b| !b.trim().is_empty())
        .or_else(|| {
            entry
                .summary
                .as_ref()
                .map(|s| s.content.clone())
                .filter(|s| !s.trim().is_empty())
        })
        .or_else(|| {
            entry
                .media
                .iter()
                .find_map(|m| m.description.as_ref().map(|d| d.content.clone()))
                .filter(|d| !d.trim().is_empty())
        })
}

fn entry_to_item(entry: Entry) -> ScrapeResult<ExtractedItem> {
    let link = entry_link(&entry);
    let content = entry_content(&entry).map(|html| normalize::html_to_text(&html));
    let title = entry
        .title
        .as_ref()
        .map(|t| normalize::collapse_whitespace(&t.content))
        .filter(|t| !t.is_empty());

    if title.is_none() && link.is_none() && content.is_none() {
        return Err(ScrapeError::EmptyEntry(entry.id.clone()));
    }

    let title = title
        .or_else(|| link.as_deref().and_then(title_from_url))
        .unwrap_or_else(|| "Untitled".to_string());

    let author = entry
        .authors
        .first()
        .map(|a| a.name.trim().to_string())
        .unwrap_or_default();

    Ok(ExtractedItem::new(title, content.unwrap_or_default(), link.unwrap_or_default())
        .with_published_at(entry_date(&entry))
        .with_author(author))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetcher::{FetchedDocument, MockFetcher};
    use chrono::TimeZone;

    // Sample RSS feed (based on Rust Blog format)
    const SAMPLE_RSS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Rust Blog</title>
    <link>https://blog.rust-lang.org/</link>
    <description>Empowering everyone to build reliable and efficient software.</description>
    <item>
      <title>Announcing Rust 1.75.0</title>
      <link>https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html</link>
      <description><![CDATA[<p>The Rust team is happy to announce a new version of Rust, 1.75.0.</p><p>This release includes async fn in traits.</p>]]></description>
      <pubDate>Thu, 28 Dec 2023 00:00:00 +0000</pubDate>
      <author>team@rust-lang.org (The Rust Team)</author>
      <guid>https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html</guid>
    </item>
    <item>
      <title>Rust 2024 Call for Testing</title>
      <link>https://blog.rust-lang.org/2024/01/10/Rust-2024-CFT.html</link>
      <description><![CDATA[<p>We're testing the next edition of Rust!</p>]]></description>
      <pubDate>Wed, 10 Jan 2024 00:00:00 +0000</pubDate>
      <guid>https://blog.rust-lang.org/2024/01/10/Rust-2024-CFT.html</guid>
    </item>
    <item>
      <title>Undated announcement</title>
      <link>https://blog.rust-lang.org/undated.html</link>
      <description>Short</description>
      <guid>https://blog.rust-lang.org/undated.html</guid>
    </item>
  </channel>
</rss>"#;

    // Sample Atom feed
    const SAMPLE_ATOM: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Tech Blog</title>
  <link href="https://example.com/"/>
  <id>https://example.com/feed.atom</id>
  <updated>2024-01-15T12:00:00Z</updated>
  <entry>
    <title>Understanding WebAssembly</title>
    <link href="https://example.com/posts/wasm-intro"/>
    <id>https://example.com/posts/wasm-intro</id>
    <updated>2024-01-15T12:00:00Z</updated>
    <author><name>Ada Example</name></author>
    <summary type="html"><![CDATA[<p>WebAssembly (Wasm) is a binary instruction format...</p>]]></summary>
    <content type="html"><![CDATA[<article><h1>Understanding WebAssembly</h1><p>WebAssembly is a binary instruction format.</p><p>More content here with <a href="https://example.com">links</a>.</p></article>]]></content>
  </entry>
</feed>"#;

    fn extractor() -> FeedExtractor {
        FeedExtractor::new(Arc::new(MockFetcher::new()), &ExtractorConfig::default())
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rss_items_have_plain_text_content() {
        let items = extractor().items_from_bytes(SAMPLE_RSS, None).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Announcing Rust 1.75.0");
        assert_eq!(
            items[0].content,
            "The Rust team is happy to announce a new version of Rust, 1.75.0. This release includes async fn in traits."
        );
        assert_eq!(items[0].url, "https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html");
        assert_eq!(items[0].published_at, Some(utc(2023, 12, 28)));
    }

    #[test]
    fn test_atom_prefers_full_content_over_summary() {
        let items = extractor().items_from_bytes(SAMPLE_ATOM, None).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Understanding WebAssembly");
        assert!(item.content.starts_with("Understanding WebAssembly WebAssembly is a binary"));
        assert!(item.content.contains("More content here with links."));
        assert!(!item.content.contains('<'));
        assert_eq!(item.author, "Ada Example");
        assert_eq!(item.url, "https://example.com/posts/wasm-intro");
    }

    #[test]
    fn test_since_drops_old_entries_but_keeps_undated() {
        let items = extractor()
            .items_from_bytes(SAMPLE_RSS, Some(utc(2024, 1, 1)))
            .unwrap();

        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust 2024 Call for Testing", "Undated announcement"]);
        assert!(items[1].published_at.is_none());
    }

    #[test]
    fn test_since_equal_to_publish_date_is_dropped() {
        let items = extractor()
            .items_from_bytes(SAMPLE_RSS, Some(utc(2024, 1, 10)))
            .unwrap();

        assert!(items.iter().all(|i| i.title != "Rust 2024 Call for Testing"));
    }

    #[test]
    fn test_short_feed_content_is_kept() {
        let items = extractor().items_from_bytes(SAMPLE_RSS, None).unwrap();
        let undated = items.iter().find(|i| i.title == "Undated announcement").unwrap();
        assert_eq!(undated.content, "Short");
    }

    #[test]
    fn test_recent_and_old_entries_both_returned_without_since() {
        let yesterday = Utc::now() - chrono::Duration::days(1);
        let long_ago = Utc::now() - chrono::Duration::days(40);
        let xml = format!(
            r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title><link>https://example.com</link><description>d</description>
<item><title>Fresh</title><link>https://example.com/fresh</link><description>new</description><pubDate>{}</pubDate></item>
<item><title>Stale</title><link>https://example.com/stale</link><description>old</description><pubDate>{}</pubDate></item>
</channel></rss>"#,
            yesterday.to_rfc2822(),
            long_ago.to_rfc2822()
        );

        let items = extractor().items_from_bytes(xml.as_bytes(), None).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Fresh");
        assert_eq!(items[1].title, "Stale");
    }

    #[test]
    fn test_empty_entry_is_skipped_not_fatal() {
        let xml = br#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title><link>https://example.com</link><description>d</description>
<item><guid>nothing-here</guid></item>
<item><title>Real</title><link>https://example.com/real</link></item>
</channel></rss>"#;

        let items = extractor().items_from_bytes(xml, None).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Real");
        assert_eq!(items[0].content, "");
    }

    #[test]
    fn test_missing_title_derived_from_link() {
        let xml = br#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title><link>https://example.com</link><description>d</description>
<item><link>https://example.com/posts/hello-world.html</link><description>Body</description></item>
</channel></rss>"#;

        let items = extractor().items_from_bytes(xml, None).unwrap();
        assert_eq!(items[0].title, "Hello World");
    }

    #[test]
    fn test_max_entries_caps_output() {
        let config = ExtractorConfig {
            max_feed_entries: Some(1),
            ..ExtractorConfig::default()
        };
        let extractor = FeedExtractor::new(Arc::new(MockFetcher::new()), &config);

        let items = extractor.items_from_bytes(SAMPLE_RSS, None).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Announcing Rust 1.75.0");
    }

    #[test]
    fn test_large_feed_is_not_truncated_by_default() {
        let entries: String = (0..60)
            .map(|i| {
                format!(
                    "<item><title>Post {i}</title><link>https://example.com/{i}</link></item>"
                )
            })
            .collect();
        let xml = format!(
            r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title><link>https://example.com</link><description>d</description>
{entries}
</channel></rss>"#
        );

        let items = extractor().items_from_bytes(xml.as_bytes(), None).unwrap();

        assert_eq!(items.len(), 60);
        assert_eq!(items[59].title, "Post 59");
    }

    #[test]
    fn test_invalid_xml_is_parse_error() {
        let err = extractor().items_from_bytes(b"<html>nope</html>", None).unwrap_err();
        assert!(matches!(err, ScrapeError::FeedParse(_)));
    }

    #[test]
    fn test_extract_fetches_with_feed_timeout() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url: &str, timeout: &Duration| {
                url == "https://example.com/feed.atom" && *timeout == Duration::from_secs(15)
            })
            .times(1)
            .returning(|url, _| {
                Ok(FetchedDocument::new(url, Some("application/atom+xml"), SAMPLE_ATOM))
            });

        let extractor = FeedExtractor::new(Arc::new(fetcher), &ExtractorConfig::default());
        let items = extractor.extract("https://example.com/feed.atom", None).unwrap();

        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_extract_propagates_network_error() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|url, _| {
            Err(ScrapeError::HttpStatus {
                status: 503,
                url: url.to_string(),
            })
        });

        let extractor = FeedExtractor::new(Arc::new(fetcher), &ExtractorConfig::default());
        let err = extractor.extract("https://example.com/feed", None).unwrap_err();

        assert!(matches!(err, ScrapeError::HttpStatus { status: 503, .. }));
    }
}
