use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::core::{CatalogEntry, RankedCandidate};
use crate::ranking::similarity::{
    jaccard_similarity, levenshtein_similarity, number_seq_similarity, phonetic_similarity,
    prefix_similarity, token_similarity,
};
use crate::ranking::{Ranker, ScoringWeights};
use crate::text::{contains_digits, normalize};

/// Components in the name branch
const NAME_COMPONENTS: f64 = 7.0;
/// Components in the alias branch (no prefix, no number term)
const ALIAS_COMPONENTS: f64 = 5.0;

/// Weighted multi-metric ranker
#[derive(Debug, Clone, Default)]
pub struct WeightedRanker {
    weights: ScoringWeights,
}

impl WeightedRanker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

impl Ranker for WeightedRanker {
    fn rank(&self, query: &str, candidates: &[CatalogEntry]) -> Vec<RankedCandidate> {
        rank(query, candidates, &self.weights)
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

/// Score every candidate against `spoken_text`, drop zero scores, sort
/// descending. Equal scores keep their input order.
pub fn rank(
    spoken_text: &str,
    candidates: &[CatalogEntry],
    weights: &ScoringWeights,
) -> Vec<RankedCandidate> {
    let spoken = normalize(spoken_text);
    if spoken.is_empty() {
        return Vec::new();
    }

    let scored: Vec<RankedCandidate> = candidates
        .par_iter()
        .map(|entry| score_entry(&spoken, entry, weights))
        .collect();

    let mut ranked: Vec<RankedCandidate> = scored.into_iter().filter(|c| c.score > 0.0).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

fn contains_bonus(spoken: &str, target: &str) -> f64 {
    if spoken == target {
        1.0
    } else if spoken.contains(target) || target.contains(spoken) {
        0.5
    } else {
        0.0
    }
}

fn alias_score(spoken: &str, alias: &str, w: &ScoringWeights) -> f64 {
    (levenshtein_similarity(spoken, alias) * w.levenshtein
        + jaccard_similarity(spoken, alias) * w.jaccard
        + token_similarity(spoken, alias) * w.token
        + phonetic_similarity(spoken, alias) * w.phonetic
        + contains_bonus(spoken, alias) * w.contains_bonus)
        / ALIAS_COMPONENTS
}

fn score_entry(spoken: &str, entry: &CatalogEntry, w: &ScoringWeights) -> RankedCandidate {
    let name = normalize(&entry.name);

    let levenshtein = levenshtein_similarity(spoken, &name);
    let jaccard = jaccard_similarity(spoken, &name);
    let token = token_similarity(spoken, &name);
    let phonetic = phonetic_similarity(spoken, &name);
    let prefix = prefix_similarity(spoken, &name);
    let contains = contains_bonus(spoken, &name);
    let number = if contains_digits(spoken) || contains_digits(&name) {
        number_seq_similarity(spoken, &name)
    } else {
        0.0
    };

    let name_score = (levenshtein * w.levenshtein
        + jaccard * w.jaccard
        + token * w.token
        + phonetic * w.phonetic
        + prefix * w.prefix
        + contains * w.contains_bonus
        + number * w.number_seq)
        / NAME_COMPONENTS;

    let alias_max = entry
        .aliases
        .iter()
        .flat_map(|field| field.split(','))
        .map(normalize)
        .filter(|alias| !alias.is_empty())
        .map(|alias| alias_score(spoken, &alias, w))
        .fold(0.0, f64::max);

    let score = name_score.max(alias_max);

    let breakdown: BTreeMap<String, f64> = [
        ("levenshtein", levenshtein),
        ("jaccard", jaccard),
        ("token", token),
        ("phonetic", phonetic),
        ("prefix", prefix),
        ("contains", contains),
        ("number", number),
        ("alias_max", alias_max),
        ("final", score),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    RankedCandidate {
        entry: entry.clone(),
        score,
        breakdown,
    }
}
