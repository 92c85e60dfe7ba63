//! Source validation and article extraction for digest pipelines.
//!
//! [`UrlValidator`] decides whether a URL is usable and whether it is backed by
//! a feed. [`SourceDispatcher`] turns a [`SourceDescriptor`] into new
//! [`ExtractedItem`]s, reading the feed when there is one and scraping the page
//! otherwise.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod normalize;
pub mod services;
pub mod sources;

pub use config::ExtractorConfig;
pub use domain::{ExtractedItem, FeedType, SourceDescriptor, SourceKind, ValidationResult};
pub use errors::{ScrapeError, ScrapeResult};
pub use services::{FailureTracker, FetchReport, FetchService, SourceHealth, TrackedReport};
pub use sources::{SourceDispatcher, UrlValidator};
