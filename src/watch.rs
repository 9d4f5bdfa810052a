//! Foreground scheduled sync.
//!
//! Runs [`AppContext::sync_all`] on a fixed interval until Ctrl-C or SIGTERM,
//! for hosts without a system scheduler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::app::{AppContext, Result};

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Seconds between syncs (default: 3600 = 1 hour)
    pub interval_secs: u64,
    /// Whether to sync immediately on start
    pub sync_on_start: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            sync_on_start: true,
        }
    }
}

/// Unit suffixes accepted by [`WatchConfig::parse_interval`], largest first.
const UNITS: [(char, u64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Longest accepted interval (one year). Tokio timers panic on instants
/// far enough in the future, so anything beyond this is refused up front.
pub const MAX_INTERVAL_SECS: u64 = 365 * 86_400;

impl WatchConfig {
    /// Parse an interval such as `"90s"`, `"30m"`, `"6h"` or `"1d"`. A bare
    /// number is taken as seconds.
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();
        let (digits, scale) = match s.chars().last().and_then(unit_scale) {
            Some(scale) => (&s[..s.len() - 1], scale),
            None => (s.as_str(), 1),
        };

        let count: u64 = digits
            .trim()
            .parse()
            .map_err(|_| format!("invalid interval '{}', expected e.g. 30m, 6h or 1d", s))?;

        match count.checked_mul(scale) {
            Some(0) => Err("interval must be greater than zero".to_string()),
            Some(secs) if secs <= MAX_INTERVAL_SECS => Ok(secs),
            _ => Err(format!("interval '{}' is longer than one year", s)),
        }
    }

    /// Render seconds with the largest unit that divides them evenly.
    pub fn format_interval(secs: u64) -> String {
        UNITS
            .iter()
            .find(|(_, scale)| secs >= *scale && secs % scale == 0)
            .map(|(unit, scale)| format!("{}{}", secs / scale, unit))
            .unwrap_or_else(|| format!("{}s", secs))
    }
}

fn unit_scale(suffix: char) -> Option<u64> {
    UNITS
        .iter()
        .find(|(unit, _)| *unit == suffix)
        .map(|(_, scale)| *scale)
}

pub struct Watcher {
    ctx: Arc<AppContext>,
    config: WatchConfig,
}

impl Watcher {
    pub fn new(ctx: Arc<AppContext>, config: WatchConfig) -> Self {
        Self { ctx, config }
    }

    /// Sync on schedule until the process is asked to stop.
    pub async fn run(&self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Sync on schedule until `shutdown` completes. Storage failures end the
    /// loop with an error; feed failures are only logged.
    pub async fn run_until<F: Future<Output = ()>>(&self, shutdown: F) -> Result<()> {
        tracing::info!(
            "Watching feeds (sync interval: {})",
            WatchConfig::format_interval(self.config.interval_secs)
        );

        tokio::pin!(shutdown);

        if self.config.sync_on_start {
            self.run_sync().await?;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs.max(1)));
        timer.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => self.run_sync().await?,
            }
        }

        tracing::info!("Watch stopped");
        Ok(())
    }

    async fn run_sync(&self) -> Result<()> {
        let report = self.ctx.sync_all().await?;
        for failure in &report.failures {
            tracing::warn!("  {}: {}", failure.feed_url, failure.reason);
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to set up SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
