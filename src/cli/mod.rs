pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::domain::Period;

#[derive(Parser)]
#[command(name = "plexvault")]
#[command(about = "Collects Plex watchlist RSS feeds into a local vault", long_about = None)]
pub struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/plexvault/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Defaults to `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref db) = self.db {
            config.storage.db_path = Some(db.clone());
        }
        if let Some(workers) = self.workers {
            config.sync.workers = workers;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync all feeds once
    Sync,
    /// Sync on a schedule until interrupted
    Watch {
        /// Sync interval (e.g., "1h", "30m", "6h", "1d")
        #[arg(short, long, default_value = "1h")]
        interval: String,

        /// Skip the sync on start
        #[arg(long)]
        no_initial_sync: bool,
    },
    /// Manage watchlist feeds
    Feeds {
        #[command(subcommand)]
        action: FeedAction,
    },
    /// Manage friendly names for authors
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// List stored watchlist entries, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show request counts per user and over time
    Stats {
        /// Time bucket for the over-time counts
        #[arg(long, value_enum, default_value_t = Period::Day)]
        by: Period,
    },
}

#[derive(Subcommand)]
pub enum FeedAction {
    /// Register a feed
    Add {
        /// URL (or path) of the feed
        url: String,
        /// Display label
        #[arg(short, long, default_value = "")]
        label: String,
    },
    /// Unregister a feed
    Remove {
        /// URL of the feed to remove
        url: String,
    },
    /// List registered feeds
    List,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List known authors and their names
    List,
    /// Give an author a friendly name
    Rename {
        author_id: String,
        name: String,
    },
}
