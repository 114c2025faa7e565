use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::CatalogEntry;

/// Candidate with its fused score and per-metric breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub entry: CatalogEntry,

    /// Fused score, normally in [0, 1] (not clamped)
    pub score: f64,

    /// Metric name -> value for the name branch, plus `alias_max` and `final`
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

impl RankedCandidate {
    pub fn new(entry: CatalogEntry, score: f64) -> Self {
        Self {
            entry,
            score,
            breakdown: BTreeMap::new(),
        }
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!("{} ({:.3})", self.entry.name, self.score)
    }
}

/// Decision for one spoken utterance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// High confidence: add the entry directly
    AutoAdd { entry: CatalogEntry, score: f64 },

    /// Medium confidence: ranked, non-empty, descending
    Suggestions { ranked: Vec<RankedCandidate> },

    /// Low confidence or nothing to match against
    Unknown { original_text: String },
}

impl ResolveOutcome {
    pub fn unknown(original_text: impl Into<String>) -> Self {
        ResolveOutcome::Unknown {
            original_text: original_text.into(),
        }
    }

    pub fn is_auto_add(&self) -> bool {
        matches!(self, ResolveOutcome::AutoAdd { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolveOutcome::Unknown { .. })
    }

    /// Short label used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveOutcome::AutoAdd { .. } => "auto_add",
            ResolveOutcome::Suggestions { .. } => "suggestions",
            ResolveOutcome::Unknown { .. } => "unknown",
        }
    }

    /// Best score carried by the outcome, if any
    pub fn top_score(&self) -> Option<f64> {
        match self {
            ResolveOutcome::AutoAdd { score, .. } => Some(*score),
            ResolveOutcome::Suggestions { ranked } => ranked.first().map(|r| r.score),
            ResolveOutcome::Unknown { .. } => None,
        }
    }
}
