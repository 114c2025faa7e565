use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{MatchEngineError, Result};
use crate::text::normalize;
use crate::unknown::{UnknownLog, UnknownProduct, UnknownStats};

/// SQLite-based unknown-product log
///
/// ```sql
/// CREATE TABLE unknown_products (
///     normalized TEXT PRIMARY KEY,
///     spoken_text TEXT NOT NULL,
///     occurrences INTEGER NOT NULL DEFAULT 1,
///     first_seen TEXT NOT NULL,
///     last_seen TEXT NOT NULL
/// );
/// ```
///
/// Timestamps are RFC 3339 UTC with fixed precision, so they order as text.
pub struct SqliteUnknownLog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUnknownLog {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS unknown_products (
                normalized TEXT PRIMARY KEY,
                spoken_text TEXT NOT NULL,
                occurrences INTEGER NOT NULL DEFAULT 1,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_unknown_last_seen ON unknown_products(last_seen)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MatchEngineError::Catalog("connection lock poisoned".to_string()))
    }

    fn timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
    }

    fn row_to_unknown(row: &Row<'_>) -> rusqlite::Result<UnknownProduct> {
        let first_seen: String = row.get(3)?;
        let last_seen: String = row.get(4)?;
        Ok(UnknownProduct {
            normalized: row.get(0)?,
            spoken_text: row.get(1)?,
            occurrences: row.get(2)?,
            first_seen: Self::parse_timestamp(3, &first_seen)?,
            last_seen: Self::parse_timestamp(4, &last_seen)?,
        })
    }
}

#[async_trait]
impl UnknownLog for SqliteUnknownLog {
    async fn record(&self, spoken_text: &str) -> Result<()> {
        let normalized = normalize(spoken_text);
        if normalized.is_empty() {
            return Ok(());
        }
        let now = Self::timestamp(Utc::now());
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO unknown_products (normalized, spoken_text, occurrences, first_seen, last_seen)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT(normalized) DO UPDATE SET
                spoken_text = excluded.spoken_text,
                occurrences = occurrences + 1,
                last_seen = excluded.last_seen",
            params![normalized, spoken_text.trim(), now],
        )?;

        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<UnknownProduct>> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT normalized, spoken_text, occurrences, first_seen, last_seen
             FROM unknown_products
             ORDER BY occurrences DESC, last_seen DESC
             LIMIT ?1",
        )?;
        let entries = stmt
            .query_map(params![limit], Self::row_to_unknown)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    async fn remove(&self, spoken_text: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM unknown_products WHERE normalized = ?1",
            params![normalize(spoken_text)],
        )?;
        Ok(deleted > 0)
    }

    async fn stats(&self) -> Result<UnknownStats> {
        let conn = self.conn()?;

        let (total_entries, total_occurrences, oldest, newest): (
            u64,
            u64,
            Option<String>,
            Option<String>,
        ) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(occurrences), 0), MIN(first_seen), MAX(last_seen)
             FROM unknown_products",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let avg_occurrences = if total_entries > 0 {
            total_occurrences as f64 / total_entries as f64
        } else {
            0.0
        };

        let oldest_entry = oldest
            .as_deref()
            .map(|s| Self::parse_timestamp(2, s))
            .transpose()?;
        let newest_entry = newest
            .as_deref()
            .map(|s| Self::parse_timestamp(3, s))
            .transpose()?;

        Ok(UnknownStats {
            total_entries,
            total_occurrences,
            avg_occurrences,
            oldest_entry,
            newest_entry,
        })
    }

    async fn cleanup(&self, max_age_days: i64) -> Result<u64> {
        let cutoff = chrono::Duration::try_days(max_age_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .ok_or_else(|| {
                MatchEngineError::Other(format!("max age of {} days is out of range", max_age_days))
            })?;
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM unknown_products WHERE last_seen < ?1",
            params![Self::timestamp(cutoff)],
        )?;

        Ok(deleted as u64)
    }
}
