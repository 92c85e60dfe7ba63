use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::config::ExtractorConfig;
use crate::errors::{ScrapeError, ScrapeResult};

const ACCEPT_ANY_DOCUMENT: &str =
    "text/html,application/xhtml+xml,application/rss+xml,application/atom+xml,application/xml;q=0.9,*/*;q=0.8";

/// How far into the body a `<meta charset>` declaration is looked for
const META_SNIFF_BYTES: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#).unwrap()
});

/// A successfully fetched (2xx) response body
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    /// URL after redirects
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.map(|c| c.to_string()),
            body: body.into(),
        }
    }

    /// Decode the body using the header charset, then `<meta charset>`, then UTF-8.
    ///
    /// A byte order mark overrides both hints.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_param)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .or_else(|| sniff_meta_charset(&self.body))
            .unwrap_or(UTF_8);

        let (decoded, used, had_errors) = encoding.decode(&self.body);
        if had_errors {
            tracing::debug!(url = %self.url, encoding = used.name(), "body had undecodable bytes");
        }
        decoded.into_owned()
    }

    /// Lowercased media type without parameters
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or(ct)
                .trim()
                .to_ascii_lowercase()
        })
    }
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}

fn sniff_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

/// The only network seam; everything else is parsing
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher: Send + Sync {
    /// GET a URL. Non-2xx statuses are errors.
    fn fetch(&self, url: &str, timeout: Duration) -> ScrapeResult<FetchedDocument>;
}

pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(config.user_agent.clone())
                .connect_timeout(config.connect_timeout)
                .timeout(config.page_timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> ScrapeResult<FetchedDocument> {
        let response = self
            .client
            .get(url)
            // Set per request too, so a fallback client still identifies itself
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, ACCEPT_ANY_DOCUMENT)
            .timeout(timeout)
            .send()
            .map_err(ScrapeError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response.bytes().map_err(ScrapeError::from_request)?;

        tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");

        Ok(FetchedDocument {
            url: final_url,
            content_type,
            body: body.to_vec(),
        })
    }
}
