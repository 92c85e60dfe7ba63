pub mod dispatcher;
pub mod feed;
pub mod fetcher;
pub mod page;
pub mod validator;

pub use dispatcher::{Route, SourceDispatcher};
pub use feed::FeedExtractor;
pub use fetcher::{FetchedDocument, Fetcher, HttpFetcher};
pub use page::{PageAnalysis, PageExtractor, Resolved};
pub use validator::UrlValidator;
