//! Store for utterances that resolved to `Unknown`.
//!
//! The engine never writes here; callers that receive an `Unknown` outcome
//! decide whether to record it.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

pub use sqlite::SqliteUnknownLog;

/// Trait for unknown-product log implementations
#[async_trait]
pub trait UnknownLog: Send + Sync {
    /// Record one occurrence; blank text is ignored
    async fn record(&self, spoken_text: &str) -> Result<()>;

    /// Most frequent entries first
    async fn list(&self, limit: usize) -> Result<Vec<UnknownProduct>>;

    /// Forget an entry (e.g. after it was added to the catalog)
    async fn remove(&self, spoken_text: &str) -> Result<bool>;

    /// Get log statistics
    async fn stats(&self) -> Result<UnknownStats>;

    /// Drop entries not seen in the last `max_age_days`
    async fn cleanup(&self, max_age_days: i64) -> Result<u64>;
}

/// One unrecognized utterance, keyed by its normalized form
#[derive(Debug, Clone, Serialize)]
pub struct UnknownProduct {
    pub normalized: String,
    /// Raw text of the latest occurrence
    pub spoken_text: String,
    pub occurrences: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Unknown log statistics
#[derive(Debug, Clone, Serialize)]
pub struct UnknownStats {
    pub total_entries: u64,
    pub total_occurrences: u64,
    pub avg_occurrences: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}
