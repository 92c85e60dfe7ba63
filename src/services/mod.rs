pub mod fetch_service;

pub use fetch_service::{FailureTracker, FetchReport, FetchService, SourceHealth, TrackedReport};
