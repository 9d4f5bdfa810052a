pub mod sqlite;

use crate::app::Result;
use crate::domain::{EntryView, Feed, Period, User, WatchlistEntry};

pub use sqlite::SqliteStore;

pub trait Store {
    // Feed registry
    /// Returns `false` if a feed with this URL is already registered.
    fn add_feed(&self, feed: &Feed) -> Result<bool>;
    fn get_feed(&self, url: &str) -> Result<Option<Feed>>;
    fn get_all_feeds(&self) -> Result<Vec<Feed>>;
    fn remove_feed(&self, url: &str) -> Result<()>;

    // User registry
    /// Create a placeholder user for `author_id` unless one already exists.
    /// Existing names are never touched.
    fn ensure_user(&self, author_id: &str) -> Result<()>;
    fn get_user(&self, author_id: &str) -> Result<Option<User>>;
    fn get_all_users(&self) -> Result<Vec<User>>;
    fn rename_user(&self, author_id: &str, friendly_name: &str) -> Result<()>;

    // Watchlist
    /// Insert unless `(author_id, link)` is already stored. Returns whether a
    /// row was inserted; existing rows are never replaced.
    fn upsert_entry(&self, entry: &WatchlistEntry) -> Result<bool>;
    /// Register each entry's author and insert the entry, all or nothing.
    /// Returns how many entries were new.
    fn store_entries(&self, entries: &[WatchlistEntry]) -> Result<usize>;
    fn get_entries(&self) -> Result<Vec<EntryView>>;
    fn entry_count(&self) -> Result<i64>;

    // Statistics
    fn requests_per_user(&self) -> Result<Vec<(String, i64)>>;
    fn requests_per_period(&self, period: Period) -> Result<Vec<(String, i64)>>;
}
