use std::collections::HashMap;

use serde::Serialize;

use crate::config::ExtractorConfig;
use crate::domain::{ExtractedItem, SourceDescriptor};
use crate::sources::SourceDispatcher;

/// Outcome of fetching one source in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    pub url: String,
    pub items: Vec<ExtractedItem>,
    pub error: Option<String>,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A report plus the source's health after this run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedReport {
    #[serde(flatten)]
    pub report: FetchReport,
    pub health: SourceHealth,
}

pub struct FetchService {
    dispatcher: SourceDispatcher,
}

impl FetchService {
    pub fn new(dispatcher: SourceDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Fetch every source in order; one failing source never stops the batch
    pub fn fetch_all(&self, descriptors: &[SourceDescriptor]) -> Vec<FetchReport> {
        descriptors
            .iter()
            .map(|descriptor| match self.dispatcher.try_fetch_new(descriptor) {
                Ok(items) => {
                    tracing::debug!(url = %descriptor.url, items = items.len(), "source fetched");
                    FetchReport {
                        url: descriptor.url.clone(),
                        items,
                        error: None,
                    }
                }
                Err(e) => {
                    // Log error but continue with other sources
                    tracing::warn!(url = %descriptor.url, error = %e, "source failed");
                    FetchReport {
                        url: descriptor.url.clone(),
                        items: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// [`fetch_all`](Self::fetch_all), recording each outcome in `tracker`.
    ///
    /// Failure counts carried on the descriptors are loaded first.
    pub fn fetch_all_tracked(
        &self,
        descriptors: &[SourceDescriptor],
        tracker: &mut FailureTracker,
    ) -> Vec<TrackedReport> {
        for descriptor in descriptors {
            tracker.seed(&descriptor.url, descriptor.consecutive_failures);
        }

        self.fetch_all(descriptors)
            .into_iter()
            .map(|report| {
                let health = tracker.record(&report);
                TrackedReport { report, health }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SourceHealth {
    Healthy,
    Failing { consecutive_failures: u32 },
    /// The source has failed often enough that it should stop being polled
    Deactivate,
}

/// Consecutive failure counts per source URL, kept in memory
#[derive(Debug, Clone)]
pub struct FailureTracker {
    threshold: u32,
    failures: HashMap<String, u32>,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            failures: HashMap::new(),
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.max_consecutive_failures)
    }

    /// Start from a count persisted by the caller; never lowers a count already held
    pub fn seed(&mut self, url: &str, consecutive_failures: u32) {
        if consecutive_failures == 0 {
            return;
        }
        let count = self.failures.entry(url.to_string()).or_insert(0);
        *count = (*count).max(consecutive_failures);
    }

    pub fn record_success(&mut self, url: &str) -> SourceHealth {
        self.failures.remove(url);
        SourceHealth::Healthy
    }

    pub fn record_failure(&mut self, url: &str) -> SourceHealth {
        let count = self.failures.entry(url.to_string()).or_insert(0);
        *count += 1;

        if *count >= self.threshold {
            tracing::warn!(url, failures = *count, "source reached failure threshold");
            SourceHealth::Deactivate
        } else {
            SourceHealth::Failing {
                consecutive_failures: *count,
            }
        }
    }

    pub fn record(&mut self, report: &FetchReport) -> SourceHealth {
        if report.is_success() {
            self.record_success(&report.url)
        } else {
            self.record_failure(&report.url)
        }
    }

    pub fn consecutive_failures(&self, url: &str) -> u32 {
        self.failures.get(url).copied().unwrap_or(0)
    }
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}
