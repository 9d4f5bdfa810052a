use crate::app::{AppContext, Result};
use crate::domain::{Feed, Period};
use crate::store::Store;
use crate::sync::SyncReport;

pub async fn sync(ctx: &AppContext) -> Result<SyncReport> {
    let report = ctx.sync_all().await?;

    println!("Sync complete: {} new items found.", report.new_items);
    if report.is_partial() {
        eprintln!("{} feed(s) could not be synced:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.feed_url, failure.reason);
        }
    }

    Ok(report)
}

pub fn add_feed(ctx: &AppContext, url: &str, label: &str) -> Result<()> {
    if ctx.store.add_feed(&Feed::new(url, label))? {
        println!("Added feed: {}", url);
        return Ok(());
    }

    match ctx.store.get_feed(url)? {
        Some(existing) => println!("Feed already exists as {}: {}", existing.display_label(), url),
        None => println!("Feed already exists: {}", url),
    }
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, url: &str) -> Result<()> {
    ctx.store.remove_feed(url)?;
    println!("Removed feed: {}", url);
    Ok(())
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.store.get_all_feeds()?;

    if feeds.is_empty() {
        println!("No feeds configured. Add one with `plexvault feeds add <url>`.");
        return Ok(());
    }

    for feed in feeds {
        println!("{}\n  {}", feed.display_label(), feed.url);
    }

    Ok(())
}

pub fn list_users(ctx: &AppContext) -> Result<()> {
    let users = ctx.store.get_all_users()?;

    if users.is_empty() {
        println!("No users yet");
        return Ok(());
    }

    for user in users {
        println!("{:<24} {}", user.friendly_name, user.author_id);
    }

    Ok(())
}

pub fn rename_user(ctx: &AppContext, author_id: &str, name: &str) -> Result<()> {
    ctx.store.rename_user(author_id, name)?;
    println!("Renamed {} to {}", author_id, name);
    Ok(())
}

pub fn list_entries(ctx: &AppContext, json: bool) -> Result<()> {
    let entries = ctx.store.get_entries()?;

    if json {
        let out = serde_json::to_string_pretty(&entries)
            .map_err(|e| crate::app::VaultError::Other(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if entries.is_empty() {
        println!("The vault is empty. Run `plexvault sync` to fetch data.");
        return Ok(());
    }

    for view in entries {
        println!(
            "{} {:<20} {}\n           {}",
            view.entry.pub_date.format("%Y-%m-%d"),
            view.display_author(),
            view.entry.title,
            view.entry.link
        );
    }

    Ok(())
}

pub fn stats(ctx: &AppContext, period: Period) -> Result<()> {
    let per_user = ctx.store.requests_per_user()?;

    if per_user.is_empty() {
        println!("No data available yet. Run `plexvault sync` to fetch data.");
        return Ok(());
    }

    println!("Requests per user");
    for (name, count) in per_user {
        println!("  {:<24} {:>5}", name, count);
    }

    println!("\nRequests over time (by {:?})", period);
    for (bucket, count) in ctx.store.requests_per_period(period)? {
        println!("  {:<24} {:>5}", bucket, count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::VaultError;

    #[test]
    fn test_add_and_remove_feed() {
        let ctx = AppContext::in_memory().unwrap();

        add_feed(&ctx, "https://rss.plex.tv/abc", "Alice").unwrap();
        add_feed(&ctx, "https://rss.plex.tv/abc", "Again").unwrap();
        assert_eq!(ctx.store.get_all_feeds().unwrap().len(), 1);
        list_feeds(&ctx).unwrap();

        remove_feed(&ctx, "https://rss.plex.tv/abc").unwrap();
        assert!(ctx.store.get_all_feeds().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_reports_unreachable_feed() {
        let ctx = AppContext::in_memory().unwrap();
        add_feed(&ctx, "/nonexistent/watchlist.xml", "").unwrap();

        let report = sync(&ctx).await.unwrap();
        assert!(report.is_partial());
        assert_eq!(report.failures[0].feed_url, "/nonexistent/watchlist.xml");
    }

    #[test]
    fn test_remove_unknown_feed_errors() {
        let ctx = AppContext::in_memory().unwrap();
        let result = remove_feed(&ctx, "https://rss.plex.tv/missing");
        assert!(matches!(result, Err(VaultError::FeedNotFound(_))));
    }

    #[test]
    fn test_rename_user() {
        let ctx = AppContext::in_memory().unwrap();
        ctx.store.ensure_user("abc123xyz789").unwrap();

        rename_user(&ctx, "abc123xyz789", "Alice").unwrap();
        let user = ctx.store.get_user("abc123xyz789").unwrap().unwrap();
        assert_eq!(user.friendly_name, "Alice");
        list_users(&ctx).unwrap();
    }

    #[tokio::test]
    async fn test_sync_with_no_feeds_reports_zero() {
        let ctx = AppContext::in_memory().unwrap();
        let report = sync(&ctx).await.unwrap();
        assert_eq!(report, SyncReport::default());
        list_entries(&ctx, false).unwrap();
        list_entries(&ctx, true).unwrap();
        stats(&ctx, Period::Week).unwrap();
    }
}
