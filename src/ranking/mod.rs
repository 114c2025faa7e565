pub mod similarity;
pub mod weighted;
pub mod weights;

use crate::core::CatalogEntry;

pub use crate::core::RankedCandidate;
pub use weighted::{rank, WeightedRanker};
pub use weights::ScoringWeights;

/// Trait for ranking/fuzzy matching implementations
pub trait Ranker: Send + Sync {
    /// Rank candidates against query, return sorted by score (highest first)
    fn rank(&self, query: &str, candidates: &[CatalogEntry]) -> Vec<RankedCandidate>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}
