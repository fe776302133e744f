use crate::error::Result;
use crate::identity::CacheKey;
use crate::store::RecordStore;
use rusqlite::{Connection, OptionalExtension, params};
use sitetrail_scanner::record::{CrawlRecord, RecordSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// SQLite-backed record store.
pub struct Database {
    conn: Connection,
}

/// Bookkeeping row for one stored record set.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSetInfo {
    pub cache_key: String,
    pub identity: String,
    pub record_count: usize,
    pub created_at: i64,
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Throwaway database for tests and one-off runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            -- One row per crawled seed
            CREATE TABLE IF NOT EXISTS record_sets (
    cache_key TEXT PRIMARY KEY,
    identity TEXT NOT NULL,
    record_count INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

-- Crawl records, kept in discovery order
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cache_key TEXT NOT NULL,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    parent TEXT,              -- NULL only for the seed
    depth INTEGER NOT NULL DEFAULT 0,

    FOREIGN KEY(cache_key) REFERENCES record_sets(cache_key) ON DELETE CASCADE,
    UNIQUE(cache_key, position)
);

CREATE INDEX IF NOT EXISTS idx_records_set ON records(cache_key);
CREATE INDEX IF NOT EXISTS idx_records_url ON records(cache_key, url);
            ",
        )?;
        Ok(())
    }

    pub fn record_set_info(&self, key: &CacheKey) -> Result<Option<RecordSetInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT cache_key, identity, record_count, created_at FROM record_sets WHERE cache_key = ?1",
        )?;

        let info = stmt
            .query_row(params![key.as_str()], |row| {
                Ok(RecordSetInfo {
                    cache_key: row.get(0)?,
                    identity: row.get(1)?,
                    record_count: row.get::<_, i64>(2)? as usize,
                    created_at: row.get(3)?,
                })
            })
            .optional()?;
        Ok(info)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for Database {
    fn load(&self, key: &CacheKey) -> Result<Option<RecordSet>> {
        if self.record_set_info(key)?.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT url, title, content, parent, depth FROM records
             WHERE cache_key = ?1
             ORDER BY position",
        )?;

        let records = stmt
            .query_map(params![key.as_str()], |row| {
                Ok(CrawlRecord {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    parent: row.get(3)?,
                    depth: row.get::<_, i64>(4)? as usize,
                })
            })?
            .collect::<rusqlite::Result<RecordSet>>()?;

        info!("Loaded {} records for {}", records.len(), key);
        Ok(Some(records))
    }

    fn save(&self, key: &CacheKey, identity: &str, records: &RecordSet) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        // Cascades to the old records
        tx.execute(
            "DELETE FROM record_sets WHERE cache_key = ?1",
            params![key.as_str()],
        )?;
        tx.execute(
            "INSERT INTO record_sets (cache_key, identity, record_count, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![key.as_str(), identity, records.len() as i64, current_timestamp()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (cache_key, position, url, title, content, parent, depth)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    key.as_str(),
                    position as i64,
                    &record.url,
                    &record.title,
                    &record.content,
                    &record.parent,
                    record.depth as i64,
                ])?;
            }
        }

        tx.commit()?;
        info!("Saved {} records for {}", records.len(), identity);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        self.conn.execute(
            "DELETE FROM record_sets WHERE cache_key = ?1",
            params![key.as_str()],
        )?;
        Ok(())
    }

    fn list_known_identities(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT identity FROM record_sets ORDER BY identity")?;

        let identities = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(identities)
    }
}
