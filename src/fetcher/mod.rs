pub mod http_fetcher;
pub mod parallel;
pub mod parser;
pub mod source;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RawEntry;

pub use http_fetcher::HttpFetcher;
pub use parallel::ParallelFetcher;
pub use source::SourceFetcher;

/// A feed is unavailable: it could not be retrieved or parsed. Scoped to that
/// one feed and never fatal to a sync run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid feed location: {0}")]
    InvalidLocation(#[from] url::ParseError),

    #[error("Unsupported feed location: {0}")]
    UnsupportedScheme(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait Fetcher {
    /// Retrieve and parse the entries a feed currently publishes, in source order.
    async fn fetch(&self, location: &str) -> Result<Vec<RawEntry>, FetchError>;
}
