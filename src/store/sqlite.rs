use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, VaultError};
use crate::domain::{EntryView, Feed, Period, User, WatchlistEntry};
use crate::store::Store;

/// SQLite-backed store. All access goes through one connection behind a
/// mutex, so check-and-insert steps are serialized.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations.to_latest(&mut conn).map_err(|e| {
            VaultError::StorageUnavailable(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(format!("migration failed: {}", e)),
            ))
        })?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            VaultError::StorageUnavailable(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        // Fixed-width so text order matches time order.
        dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Accepts RFC 3339 and the zone-less `YYYY-MM-DD HH:MM:SS[.f]` form
    /// older databases hold, which is read as UTC.
    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                    .map(|naive| naive.and_utc())
                    .ok()
            })
    }

    fn entry_view_from_row(row: &Row<'_>) -> rusqlite::Result<EntryView> {
        let raw_date: String = row.get(4)?;
        let pub_date = Self::parse_datetime(&raw_date).ok_or_else(|| {
            tracing::warn!("Unreadable pub_date {:?} in watchlist", raw_date);
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("invalid pub_date: {}", raw_date).into(),
            )
        })?;

        Ok(EntryView {
            entry: WatchlistEntry {
                author_id: row.get(0)?,
                title: row.get(1)?,
                link: row.get(2)?,
                img_url: row.get(3)?,
                pub_date,
            },
            friendly_name: row.get(5)?,
        })
    }

    /// Returns whether the author was new.
    fn insert_user(conn: &Connection, author_id: &str) -> rusqlite::Result<bool> {
        let created = conn.execute(
            "INSERT OR IGNORE INTO users (author_id, friendly_name) VALUES (?1, ?2)",
            params![author_id, User::placeholder_name(author_id)],
        )?;
        if created > 0 {
            tracing::debug!("Registered new author {}", author_id);
        }
        Ok(created > 0)
    }

    /// Returns whether a row was inserted.
    fn insert_entry(conn: &Connection, entry: &WatchlistEntry) -> rusqlite::Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO watchlist (author_id, title, link, img_url, pub_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.author_id,
                entry.title,
                entry.link,
                entry.img_url,
                Self::format_datetime(&entry.pub_date)
            ],
        )?;
        Ok(inserted > 0)
    }

    fn counts(&self, sql: &str) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl Store for SqliteStore {
    fn add_feed(&self, feed: &Feed) -> Result<bool> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO feeds (url, label) VALUES (?1, ?2)",
            params![feed.url, feed.label],
        )?;

        Ok(inserted > 0)
    }

    fn get_feed(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT url, label FROM feeds WHERE url = ?1",
                params![url],
                |row| {
                    Ok(Feed {
                        url: row.get(0)?,
                        label: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_feeds(&self) -> Result<Vec<Feed>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT url, label FROM feeds ORDER BY rowid")?;

        let feeds = stmt
            .query_map([], |row| {
                Ok(Feed {
                    url: row.get(0)?,
                    label: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn remove_feed(&self, url: &str) -> Result<()> {
        let conn = self.conn()?;

        let removed = conn.execute("DELETE FROM feeds WHERE url = ?1", params![url])?;
        if removed == 0 {
            return Err(VaultError::FeedNotFound(url.to_string()));
        }

        Ok(())
    }

    fn ensure_user(&self, author_id: &str) -> Result<()> {
        let conn = self.conn()?;
        Self::insert_user(&conn, author_id)?;
        Ok(())
    }

    fn get_user(&self, author_id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT author_id, friendly_name FROM users WHERE author_id = ?1",
                params![author_id],
                |row| {
                    Ok(User {
                        author_id: row.get(0)?,
                        friendly_name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT author_id, friendly_name FROM users ORDER BY friendly_name, author_id",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    author_id: row.get(0)?,
                    friendly_name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn rename_user(&self, author_id: &str, friendly_name: &str) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE users SET friendly_name = ?1 WHERE author_id = ?2",
            params![friendly_name, author_id],
        )?;
        if updated == 0 {
            return Err(VaultError::UserNotFound(author_id.to_string()));
        }

        Ok(())
    }

    fn upsert_entry(&self, entry: &WatchlistEntry) -> Result<bool> {
        let conn = self.conn()?;
        Ok(Self::insert_entry(&conn, entry)?)
    }

    fn store_entries(&self, entries: &[WatchlistEntry]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut inserted = 0;
        for entry in entries {
            Self::insert_user(&tx, &entry.author_id)?;
            if Self::insert_entry(&tx, entry)? {
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn get_entries(&self) -> Result<Vec<EntryView>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT w.author_id, w.title, w.link, w.img_url, w.pub_date, u.friendly_name
             FROM watchlist w
             LEFT JOIN users u ON w.author_id = u.author_id
             ORDER BY w.pub_date DESC, w.rowid DESC",
        )?;

        let entries = stmt
            .query_map([], Self::entry_view_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn entry_count(&self) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM watchlist", [], |row| row.get(0))?;

        Ok(count)
    }

    fn requests_per_user(&self) -> Result<Vec<(String, i64)>> {
        self.counts(
            "SELECT COALESCE(u.friendly_name, w.author_id) AS name, COUNT(*) AS requests
             FROM watchlist w
             LEFT JOIN users u ON w.author_id = u.author_id
             GROUP BY name
             ORDER BY requests DESC, name",
        )
    }

    fn requests_per_period(&self, period: Period) -> Result<Vec<(String, i64)>> {
        let bucket = match period {
            Period::Day => "substr(pub_date, 1, 10)",
            Period::Week => "strftime('%Y-W%W', pub_date)",
            Period::Month => "substr(pub_date, 1, 7)",
        };

        self.counts(&format!(
            "SELECT {bucket} AS period, COUNT(*) FROM watchlist GROUP BY period ORDER BY period"
        ))
    }
}
