pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::core::CatalogEntry;
use crate::error::Result;

pub use memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;

/// Where candidates come from during resolution
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates matching a rendered full-text query (`"a" OR "b" OR c*`)
    async fn search(&self, fts_query: &str) -> Result<Vec<CatalogEntry>>;

    /// The whole catalog, used when search fails or finds nothing
    async fn get_all(&self) -> Result<Vec<CatalogEntry>>;

    /// Source name for logging
    fn name(&self) -> &str;
}
