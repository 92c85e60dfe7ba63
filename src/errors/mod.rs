use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Input errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    // Network errors
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("Feed entry has no usable fields: {0}")]
    EmptyEntry(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Build from a reqwest failure, keeping timeouts and connect failures apart
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ScrapeError::Timeout(err.to_string());
        }
        if err.is_connect() {
            return ScrapeError::Connection(err.to_string());
        }
        ScrapeError::Http(err)
    }

    /// True for failures caused by the network or the remote server
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ScrapeError::Timeout(_)
                | ScrapeError::Connection(_)
                | ScrapeError::HttpStatus { .. }
                | ScrapeError::Http(_)
        )
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
