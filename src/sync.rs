//! One full pass over every registered feed.
//!
//! Fetching runs concurrently through [`ParallelFetcher`]; storage writes
//! happen afterwards, one batch per feed, through the [`Store`]. A feed that
//! cannot be fetched or parsed is reported in [`SyncReport::failures`] and
//! does not stop the others. A storage failure aborts the run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::Result;
use crate::domain::{RawEntry, WatchlistEntry};
use crate::fetcher::ParallelFetcher;
use crate::normalizer::Normalizer;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedFailure {
    pub feed_url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub new_items: usize,
    pub failures: Vec<FeedFailure>,
}

impl SyncReport {
    /// True when at least one feed could not be synced.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub async fn sync_all<S: Store + ?Sized>(
    store: &S,
    fetcher: &ParallelFetcher,
    normalizer: &Normalizer,
) -> Result<SyncReport> {
    let started = Utc::now();
    let feeds = store.get_all_feeds()?;

    if feeds.is_empty() {
        tracing::info!("No feeds configured");
        return Ok(SyncReport::default());
    }

    tracing::info!("Syncing {} feeds", feeds.len());

    let mut report = SyncReport::default();
    for (feed, result) in fetcher.fetch_all(feeds).await {
        match result {
            Ok(entries) => {
                let count = ingest_entries(store, normalizer, entries, started)?;
                tracing::info!("Added {} new items from {}", count, feed.display_label());
                report.new_items += count;
            }
            Err(e) => {
                tracing::warn!("Failed to sync {}: {}", feed.display_label(), e);
                report.failures.push(FeedFailure {
                    feed_url: feed.url,
                    reason: e.to_string(),
                });
            }
        }
    }

    let elapsed = Utc::now().signed_duration_since(started);
    tracing::info!(
        "Sync complete: {} new items, {} failed feeds ({:.1}s)",
        report.new_items,
        report.failures.len(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    Ok(report)
}

/// Normalize one feed's entries and store them as a single batch, registering
/// authors as needed. Returns how many entries were new.
pub fn ingest_entries<S: Store + ?Sized>(
    store: &S,
    normalizer: &Normalizer,
    entries: Vec<RawEntry>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let normalized: Vec<WatchlistEntry> = entries
        .into_iter()
        .map(|raw| normalizer.normalize(raw, now))
        .collect();

    store.store_entries(&normalized)
}
