use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value used for a missing author or title.
pub const UNKNOWN: &str = "Unknown";

/// One item as delivered by a feed, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub author: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// A normalized watchlist item. Identity is `(author_id, link)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub author_id: String,
    pub title: String,
    pub link: String,
    pub img_url: String,
    pub pub_date: DateTime<Utc>,
}

/// A stored entry joined with its author's display name.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: WatchlistEntry,
    pub friendly_name: Option<String>,
}

impl EntryView {
    pub fn display_author(&self) -> &str {
        self.friendly_name
            .as_deref()
            .unwrap_or(&self.entry.author_id)
    }
}

/// Bucket size for request-over-time statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}
