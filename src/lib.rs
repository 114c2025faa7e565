//! # Product Match Engine
//!
//! Resolves noisy spoken product names against a product catalog:
//! - Romanian-aware normalization (diacritics, spoken dimensions like "6 pe 100")
//! - Query expansion rendered as an FTS5 `OR` expression
//! - Weighted fusion of seven string metrics, scored in parallel
//! - Three-way decision: auto-add, suggestions, or unknown
//! - SQLite catalog and unknown-product log, CLI and HTTP API
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use product_match_engine::{MatchEngine, ResolveOutcome, SqliteCatalog};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = SqliteCatalog::new("products.db").await?;
//!     let engine = MatchEngine::new(Arc::new(catalog));
//!
//!     match engine.resolve("șurub 6 pe 100").await {
//!         ResolveOutcome::AutoAdd { entry, score } => println!("Added: {} ({:.2})", entry.name, score),
//!         ResolveOutcome::Suggestions { ranked } => println!("{} suggestions", ranked.len()),
//!         ResolveOutcome::Unknown { original_text } => println!("Unknown: {}", original_text),
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod text;
pub mod unknown;

// Re-export primary types
pub use catalog::{CandidateSource, InMemoryCatalog, SqliteCatalog};
pub use config::EngineConfig;
pub use core::{CatalogEntry, RankedCandidate, ResolveOutcome};
pub use engine::{decide, MatchEngine, AUTO_ADD_THRESHOLD, MAX_SUGGESTIONS, SUGGESTIONS_THRESHOLD};
pub use error::{MatchEngineError, Result};
pub use ranking::{rank, Ranker, ScoringWeights, WeightedRanker};
pub use text::{generate_variants, normalize, to_fts_query};
pub use unknown::{SqliteUnknownLog, UnknownLog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
