use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "digest-scraper")]
#[command(about = "Validate content sources and extract new articles from feeds and web pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a URL can be used as a content source
    Validate {
        /// Page or feed URL to check
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract new items from a single source
    Fetch {
        /// Source URL (the page to scrape when no feed URL is given)
        url: String,

        /// Read this RSS/Atom feed instead of scraping the page
        #[arg(long)]
        feed_url: Option<String>,

        /// CSS selector for the article body when scraping
        #[arg(short, long)]
        selector: Option<String>,

        /// Only return items published after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<String>,

        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch every source listed in a JSON file of source descriptors
    Batch {
        /// Path to a JSON array of sources
        path: PathBuf,

        /// Print the per-source report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_all_options() {
        let cli = Cli::try_parse_from([
            "digest-scraper",
            "fetch",
            "https://example.com/post",
            "--feed-url",
            "https://example.com/rss",
            "-s",
            "article .body",
            "--since",
            "2024-01-01T00:00:00Z",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                url,
                feed_url,
                selector,
                since,
                json,
            } => {
                assert_eq!(url, "https://example.com/post");
                assert_eq!(feed_url.as_deref(), Some("https://example.com/rss"));
                assert_eq!(selector.as_deref(), Some("article .body"));
                assert_eq!(since.as_deref(), Some("2024-01-01T00:00:00Z"));
                assert!(json);
            }
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn test_validate_requires_url() {
        assert!(Cli::try_parse_from(["digest-scraper", "validate"]).is_err());
    }
}
