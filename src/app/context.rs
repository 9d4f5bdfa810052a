use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{Result, VaultError};
use crate::config::Config;
use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;
use crate::fetcher::parallel::{ParallelFetcher, DEFAULT_TIMEOUT, DEFAULT_WORKERS};
use crate::fetcher::{Fetcher, HttpFetcher, SourceFetcher};
use crate::normalizer::Normalizer;
use crate::store::sqlite::SqliteStore;
use crate::sync::{self, SyncReport};

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
}

impl AppContext {
    /// Open (and create if absent) the database named by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = config.db_path()?;
        Self::ensure_parent_dir(&db_path)?;

        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!("Opened vault at {}", db_path.display());

        let timeout = Duration::from_secs(config.sync.timeout_secs);
        let fetcher = Self::source_fetcher(&config.sync.user_agent, timeout)?;

        Ok(Self::with_fetcher(
            store,
            ParallelFetcher::with_workers(fetcher, config.sync.workers).with_timeout(timeout),
        ))
    }

    pub fn in_memory() -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let fetcher = Self::source_fetcher(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)?;

        Ok(Self::with_fetcher(
            store,
            ParallelFetcher::with_workers(fetcher, DEFAULT_WORKERS),
        ))
    }

    pub fn with_fetcher(store: Arc<SqliteStore>, fetcher: ParallelFetcher) -> Self {
        Self {
            store,
            fetcher,
            normalizer: Normalizer::new(),
        }
    }

    pub async fn sync_all(&self) -> Result<SyncReport> {
        sync::sync_all(self.store.as_ref(), &self.fetcher, &self.normalizer).await
    }

    fn source_fetcher(
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn Fetcher + Send + Sync>> {
        let http = HttpFetcher::new(user_agent, timeout)
            .map_err(|e| VaultError::Other(format!("Could not build HTTP client: {}", e)))?;
        Ok(Arc::new(SourceFetcher::new(http)))
    }

    fn ensure_parent_dir(db_path: &Path) -> Result<()> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
