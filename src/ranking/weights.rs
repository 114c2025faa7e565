use serde::{Deserialize, Serialize};

use crate::error::{MatchEngineError, Result};

/// Per-metric weights for the ranking fusion.
///
/// Read-only during a ranking call; share freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Edit distance
    pub levenshtein: f64,
    /// Character bigrams
    pub jaccard: f64,
    /// Token sets
    pub token: f64,
    /// Phonetic keys
    pub phonetic: f64,
    /// Common prefix (name branch only)
    pub prefix: f64,
    /// Exact/substring bonus
    pub contains_bonus: f64,
    /// Number sequence overlap (name branch only)
    pub number_seq: f64,
}

impl ScoringWeights {
    /// The standard configuration
    pub const DEFAULT: ScoringWeights = ScoringWeights {
        levenshtein: 1.5,
        jaccard: 1.2,
        token: 1.3,
        phonetic: 0.8,
        prefix: 0.7,
        contains_bonus: 2.0,
        number_seq: 1.0,
    };

    /// Reject negative or non-finite weights.
    ///
    /// Scores are not clamped afterwards, so a weight set that passes here
    /// can still push an exact match above 1.0.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("levenshtein", self.levenshtein),
            ("jaccard", self.jaccard),
            ("token", self.token),
            ("phonetic", self.phonetic),
            ("prefix", self.prefix),
            ("contains_bonus", self.contains_bonus),
            ("number_seq", self.number_seq),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchEngineError::InvalidWeights(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}
