use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use digest_scraper::cli::{Cli, Commands};
use digest_scraper::config::ExtractorConfig;
use digest_scraper::domain::{ExtractedItem, SourceDescriptor, ValidationResult};
use digest_scraper::errors::ScrapeError;
use digest_scraper::normalize;
use digest_scraper::services::{FailureTracker, FetchService, SourceHealth, TrackedReport};
use digest_scraper::sources::{SourceDispatcher, UrlValidator};

/// Characters of content shown per item in plain output
const PREVIEW_CHARS: usize = 200;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = ExtractorConfig::from_env()?;

    match cli.command {
        Commands::Validate { url, json } => cmd_validate(&url, json, &config),
        Commands::Fetch {
            url,
            feed_url,
            selector,
            since,
            json,
        } => {
            let since = since.as_deref().map(parse_since).transpose()?;
            let descriptor = match feed_url {
                Some(feed_url) => SourceDescriptor::feed(url, feed_url),
                None => SourceDescriptor::page(url),
            }
            .with_selector(selector)
            .with_last_fetched_at(since);

            cmd_fetch(&descriptor, json, &config)
        }
        Commands::Batch { path, json } => cmd_batch(&path, json, &config),
    }
}

fn parse_since(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .with_context(|| format!("invalid --since value '{}', expected RFC 3339", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

fn cmd_validate(url: &str, json: bool, config: &ExtractorConfig) -> anyhow::Result<()> {
    let result = UrlValidator::new(config).validate(url);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_validation(url, &result);
    }

    Ok(())
}

fn print_validation(url: &str, result: &ValidationResult) {
    println!("{}", url);
    println!("  Valid: {}", if result.valid { "yes" } else { "no" });
    println!("  Message: {}", result.message);
    if let Some(kind) = result.classified_type {
        println!("  Type: {}", kind);
    }
    if let Some(feed_url) = &result.feed_url {
        match result.feed_type {
            Some(feed_type) => println!("  Feed: {} ({})", feed_url, feed_type),
            None => println!("  Feed: {}", feed_url),
        }
    }
    if let Some(title) = result.title.as_deref().filter(|t| !t.is_empty()) {
        println!("  Title: {}", title);
    }
    if let Some(description) = result.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  Description: {}", description);
    }
}

fn cmd_fetch(
    descriptor: &SourceDescriptor,
    json: bool,
    config: &ExtractorConfig,
) -> anyhow::Result<()> {
    let dispatcher = SourceDispatcher::new(config);

    let items = match dispatcher.try_fetch_new(descriptor) {
        Ok(items) => items,
        // Bad input is the caller's mistake, not the source's
        Err(e @ (ScrapeError::InvalidUrl(_) | ScrapeError::InvalidSelector(_))) => {
            return Err(e.into())
        }
        Err(e) => {
            eprintln!("Fetch failed: {}", e);
            Vec::new()
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No new items from {}", descriptor.url);
        return Ok(());
    }

    println!("{} new item(s) from {}:\n", items.len(), descriptor.url);
    for item in &items {
        print_item(item);
    }

    Ok(())
}

fn print_item(item: &ExtractedItem) {
    let stats = item.stats();

    println!("  {}", item.title);
    if !item.url.is_empty() {
        println!("    URL: {}", item.url);
    }
    if let Some(published_at) = item.published_at {
        println!("    Published: {}", published_at.to_rfc3339());
    }
    if !item.author.is_empty() {
        println!("    Author: {}", item.author);
    }
    println!(
        "    {} words, ~{} min read",
        stats.words, stats.reading_time_minutes
    );

    let preview = normalize::truncate_chars(&item.content, PREVIEW_CHARS);
    if !preview.is_empty() {
        if preview.len() < item.content.len() {
            println!("    {}...", preview);
        } else {
            println!("    {}", preview);
        }
    }
    println!();
}

fn cmd_batch(path: &Path, json: bool, config: &ExtractorConfig) -> anyhow::Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read batch file {}", path.display()))?;
    let descriptors: Vec<SourceDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of sources", path.display()))?;

    let service = FetchService::new(SourceDispatcher::new(config));
    let mut tracker = FailureTracker::from_config(config);
    let reports = service.fetch_all_tracked(&descriptors, &mut tracker);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&reports);
    }

    Ok(())
}

fn print_reports(reports: &[TrackedReport]) {
    if reports.is_empty() {
        println!("No sources in batch.");
        return;
    }

    for TrackedReport { report, health } in reports {
        match &report.error {
            None => println!("  OK     {} ({} new)", report.url, report.items.len()),
            Some(error) => println!("  FAILED {}: {}", report.url, error),
        }
        match health {
            SourceHealth::Healthy => {}
            SourceHealth::Failing {
                consecutive_failures,
            } => println!("         {} consecutive failure(s)", consecutive_failures),
            SourceHealth::Deactivate => println!("         failure limit reached, deactivate this source"),
        }
    }

    let failed = reports.iter().filter(|r| !r.report.is_success()).count();
    let deactivate = reports
        .iter()
        .filter(|r| r.health == SourceHealth::Deactivate)
        .count();
    let items: usize = reports.iter().map(|r| r.report.items.len()).sum();
    println!(
        "\nBatch complete: {} sources, {} failed, {} new items",
        reports.len(),
        failed,
        items
    );
    if deactivate > 0 {
        println!("{} source(s) should be deactivated", deactivate);
    }
}
