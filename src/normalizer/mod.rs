use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

use crate::domain::{RawEntry, WatchlistEntry, UNKNOWN};

/// Maps raw feed entries onto [`WatchlistEntry`]. Never fails: missing
/// fields get defaults so malformed-but-present entries are still captured.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// `now` is the ingestion time, used when the entry carries no usable
    /// publish time.
    pub fn normalize(&self, raw: RawEntry, now: DateTime<Utc>) -> WatchlistEntry {
        let pub_date = match raw.published {
            Some(published) => published,
            None => now,
        };

        WatchlistEntry {
            author_id: present(raw.author).unwrap_or_else(|| UNKNOWN.to_string()),
            title: present(raw.title)
                .map(|t| decode_html_entities(&t).to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            link: present(raw.link).unwrap_or_default(),
            img_url: present(raw.thumbnail).unwrap_or_default(),
            pub_date,
        }
    }
}

// Blank counts as missing.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
