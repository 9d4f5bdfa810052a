use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plexvault::app::AppContext;
use plexvault::cli::{commands, Cli, Commands, FeedAction, UserAction};
use plexvault::config::Config;
use plexvault::watch::{WatchConfig, Watcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);

    let ctx = AppContext::new(&config)?;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            commands::sync(&ctx).await?;
        }
        Commands::Watch {
            interval,
            no_initial_sync,
        } => {
            let interval_secs =
                WatchConfig::parse_interval(&interval).map_err(anyhow::Error::msg)?;
            let watch_config = WatchConfig {
                interval_secs,
                sync_on_start: !no_initial_sync,
            };
            Watcher::new(Arc::new(ctx), watch_config).run().await?;
        }
        Commands::Feeds { action } => match action {
            FeedAction::Add { url, label } => commands::add_feed(&ctx, &url, &label)?,
            FeedAction::Remove { url } => commands::remove_feed(&ctx, &url)?,
            FeedAction::List => commands::list_feeds(&ctx)?,
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::list_users(&ctx)?,
            UserAction::Rename { author_id, name } => {
                commands::rename_user(&ctx, &author_id, &name)?
            }
        },
        Commands::List { json } => {
            commands::list_entries(&ctx, json)?;
        }
        Commands::Stats { by } => {
            commands::stats(&ctx, by)?;
        }
    }

    Ok(())
}
