use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::catalog::CandidateSource;
use crate::core::CatalogEntry;
use crate::error::{MatchEngineError, Result};
use crate::text::normalize;

/// SQLite-backed product catalog with an FTS5 index.
///
/// Schema:
/// ```sql
/// CREATE TABLE products (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     aliases TEXT NOT NULL DEFAULT ''
/// );
/// CREATE VIRTUAL TABLE products_fts USING fts5(name, aliases, tokenize = 'unicode61');
/// ```
///
/// `aliases` is comma-joined. The FTS row shares the product rowid and holds
/// normalized text, so queries built from normalized variants line up with it.
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Open or create the catalog at `db_path` (`:memory:` works)
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                aliases TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        conn.execute(
            "CREATE VIRTUAL TABLE IF NOT EXISTS products_fts
             USING fts5(name, aliases, tokenize = 'unicode61')",
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

    fn index_aliases(aliases: &[String]) -> String {
        aliases
            .iter()
            .map(|alias| normalize(alias))
            .filter(|alias| !alias.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_with(conn: &Connection, name: &str, aliases: &[String]) -> Result<CatalogEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MatchEngineError::Catalog(
                "product name must not be blank".to_string(),
            ));
        }

        let aliases: Vec<String> = aliases
            .iter()
            .flat_map(|field| CatalogEntry::split_aliases(field))
            .collect();

        conn.execute(
            "INSERT INTO products (name, aliases) VALUES (?1, ?2)",
            params![name, aliases.join(",")],
        )?;
        let id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO products_fts (rowid, name, aliases) VALUES (?1, ?2, ?3)",
            params![id, normalize(name), Self::index_aliases(&aliases)],
        )?;

        Ok(CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            aliases,
        })
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let aliases: String = row.get(2)?;
        Ok(CatalogEntry {
            id: id.to_string(),
            name,
            aliases: CatalogEntry::split_aliases(&aliases),
        })
    }

    /// Add one product; aliases may themselves be comma-joined fields
    pub async fn insert(&self, name: &str, aliases: &[String]) -> Result<CatalogEntry> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let entry = Self::insert_with(&tx, name, aliases)?;
        tx.commit()?;
        Ok(entry)
    }

    /// Add many products in one transaction. Ids on the input are ignored.
    pub async fn insert_all(&self, entries: &[CatalogEntry]) -> Result<Vec<CatalogEntry>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            inserted.push(Self::insert_with(&tx, &entry.name, &entry.aliases)?);
        }

        tx.commit()?;
        debug!("📦 Imported {} products", inserted.len());
        Ok(inserted)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<CatalogEntry>> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(None);
        };
        let conn = self.conn()?;

        let entry = conn
            .query_row(
                "SELECT id, name, aliases FROM products WHERE id = ?1",
                params![rowid],
                Self::row_to_entry,
            )
            .optional()?;

        Ok(entry)
    }

    /// Remove a product and its index row; `false` when the id is unknown
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(false);
        };
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM products_fts WHERE rowid = ?1", params![rowid])?;
        let deleted = tx.execute("DELETE FROM products WHERE id = ?1", params![rowid])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl CandidateSource for SqliteCatalog {
    async fn search(&self, fts_query: &str) -> Result<Vec<CatalogEntry>> {
        if fts_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;

        // FTS5 reports query syntax errors while stepping, not at prepare time
        let found = conn
            .prepare(
                "SELECT p.id, p.name, p.aliases
                 FROM products p
                 JOIN products_fts ON products_fts.rowid = p.id
                 WHERE products_fts MATCH ?1
                 ORDER BY p.name",
            )
            .and_then(|mut stmt| {
                let rows = stmt
                    .query_map(params![fts_query], Self::row_to_entry)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .map_err(|e| MatchEngineError::retrieval(self.name(), e.to_string()))?;

        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<CatalogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, aliases FROM products ORDER BY name")?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
