//! # plexvault
//!
//! Collects Plex watchlist RSS/Atom feeds into a deduplicated SQLite vault.
//!
//! ## Architecture
//!
//! ```text
//! Feed registry → Fetcher → Normalizer → User registry → Watchlist store
//! ```
//!
//! Every stored entry is unique by `(author_id, link)`, so re-running a sync
//! never duplicates anything. Authors seen for the first time are registered
//! as `"New: <first 6 chars>"` until someone gives them a real name; a sync
//! never overwrites that name.
//!
//! ## Quick Start
//!
//! ```bash
//! # Register a watchlist feed
//! plexvault feeds add https://rss.plex.tv/<id> --label "Friends"
//!
//! # Sync all feeds (also the default with no subcommand)
//! plexvault sync
//!
//! # Name an author
//! plexvault users rename abc123xyz789 Alice
//!
//! # Show what has been collected
//! plexvault list
//! plexvault stats --by week
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher and normalizer.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// TOML configuration loaded from `~/.config/plexvault/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a registered watchlist feed
/// - [`User`](domain::User): an author and their display name
/// - [`RawEntry`](domain::RawEntry) / [`WatchlistEntry`](domain::WatchlistEntry):
///   an item before and after normalization
pub mod domain;

/// Feed retrieval.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for fetching one feed
/// - [`SourceFetcher`](fetcher::SourceFetcher): HTTP(S) and local files
/// - [`ParallelFetcher`](fetcher::ParallelFetcher): bounded concurrent fetching with timeouts
pub mod fetcher;

/// Maps raw feed entries onto watchlist entries with defaults.
pub mod normalizer;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// The sync pipeline shared by every entry point.
pub mod sync;

/// Scheduled sync loop.
pub mod watch;
