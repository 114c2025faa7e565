use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CandidateSource;
use crate::core::{CatalogEntry, RankedCandidate, ResolveOutcome};
use crate::error::Result;
use crate::ranking::{Ranker, ScoringWeights, WeightedRanker};
use crate::text::{generate_variants, to_fts_query};

/// Top score at or above which the match is accepted without asking
pub const AUTO_ADD_THRESHOLD: f64 = 0.82;
/// Top score at or above which suggestions are offered
pub const SUGGESTIONS_THRESHOLD: f64 = 0.60;
/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 5;

/// Resolves spoken product names against a candidate source
pub struct MatchEngine {
    source: Arc<dyn CandidateSource>,
    ranker: Arc<dyn Ranker>,
}

impl MatchEngine {
    /// Engine with the standard weights
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self::with_ranker(source, Arc::new(WeightedRanker::default()))
    }

    /// Engine with custom weights, rejected if they fail validation
    pub fn with_weights(source: Arc<dyn CandidateSource>, weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self::with_ranker(source, Arc::new(WeightedRanker::new(weights))))
    }

    pub fn with_ranker(source: Arc<dyn CandidateSource>, ranker: Arc<dyn Ranker>) -> Self {
        Self { source, ranker }
    }

    pub fn source(&self) -> &Arc<dyn CandidateSource> {
        &self.source
    }

    /// Resolve one utterance. Never fails: every error path ends in `Unknown`.
    pub async fn resolve(&self, spoken_text: &str) -> ResolveOutcome {
        if spoken_text.trim().is_empty() {
            tracing::debug!("Blank input, nothing to resolve");
            return ResolveOutcome::unknown(spoken_text);
        }

        let start = Instant::now();
        let ranked = self.rank_query(spoken_text).await;

        for candidate in ranked.iter().take(MAX_SUGGESTIONS) {
            tracing::debug!("  {}", candidate.display());
        }

        let outcome = decide(spoken_text, ranked);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            ResolveOutcome::AutoAdd { entry, score } => {
                tracing::info!("✅ '{}' -> {} ({:.3}) in {:.1}ms", spoken_text, entry.name, score, latency_ms);
            }
            ResolveOutcome::Suggestions { ranked } => {
                tracing::info!("🤔 '{}' -> {} suggestions in {:.1}ms", spoken_text, ranked.len(), latency_ms);
            }
            ResolveOutcome::Unknown { .. } => {
                tracing::info!("❓ '{}' -> unknown in {:.1}ms", spoken_text, latency_ms);
            }
        }

        outcome
    }

    /// Retrieve candidates for `spoken_text` and rank them, without deciding
    pub async fn rank_query(&self, spoken_text: &str) -> Vec<RankedCandidate> {
        if spoken_text.trim().is_empty() {
            return Vec::new();
        }

        let candidates = self.candidates(spoken_text).await;
        if candidates.is_empty() {
            return Vec::new();
        }

        self.rank(spoken_text, &candidates)
    }

    /// Rank an explicit candidate list with this engine's ranker
    pub fn rank(&self, spoken_text: &str, candidates: &[CatalogEntry]) -> Vec<RankedCandidate> {
        let ranked = self.ranker.rank(spoken_text, candidates);
        tracing::debug!(
            "Ranker {} scored {} of {} candidates",
            self.ranker.name(),
            ranked.len(),
            candidates.len()
        );
        ranked
    }

    /// Search first, whole catalog when search fails or comes back empty
    async fn candidates(&self, spoken_text: &str) -> Vec<CatalogEntry> {
        let variants = generate_variants(spoken_text);
        let fts_query = to_fts_query(&variants);
        tracing::debug!("Variants: {:?}", variants);
        tracing::debug!("FTS query: {}", fts_query);

        match self.source.search(&fts_query).await {
            Ok(found) if !found.is_empty() => {
                tracing::debug!("Source {} returned {} candidates", self.source.name(), found.len());
                return found;
            }
            Ok(_) => {
                tracing::warn!("⚠️ No search hits for '{}', using full catalog", spoken_text);
            }
            Err(e) => {
                tracing::warn!("⚠️ Search on {} failed, using full catalog: {}", self.source.name(), e);
            }
        }

        match self.source.get_all().await {
            Ok(all) => {
                tracing::debug!("Full catalog: {} candidates", all.len());
                all
            }
            Err(e) => {
                tracing::error!("❌ Full catalog fetch from {} failed: {}", self.source.name(), e);
                Vec::new()
            }
        }
    }
}

/// Map a ranked list to an outcome using the fixed thresholds.
///
/// `ranked` must be sorted descending. Suggestions keep only candidates at
/// or above [`SUGGESTIONS_THRESHOLD`], at most [`MAX_SUGGESTIONS`].
pub fn decide(original_text: &str, ranked: Vec<RankedCandidate>) -> ResolveOutcome {
    let Some(top) = ranked.first() else {
        return ResolveOutcome::unknown(original_text);
    };

    if top.score >= AUTO_ADD_THRESHOLD {
        return ResolveOutcome::AutoAdd {
            entry: top.entry.clone(),
            score: top.score,
        };
    }

    if top.score >= SUGGESTIONS_THRESHOLD {
        let ranked = ranked
            .into_iter()
            .take_while(|c| c.score >= SUGGESTIONS_THRESHOLD)
            .take(MAX_SUGGESTIONS)
            .collect();
        return ResolveOutcome::Suggestions { ranked };
    }

    ResolveOutcome::unknown(original_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::MatchEngineError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn candidate(name: &str, score: f64) -> RankedCandidate {
        RankedCandidate::new(CatalogEntry::new(name, name), score)
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("1", "Lapte").with_aliases(["lapte", "lapte de vaca", "lapte proaspat"]),
            CatalogEntry::new("2", "Cartofi").with_aliases(["cartof"]),
            CatalogEntry::new("3", "Șurub 6x100"),
        ]
    }

    /// Source whose search and full fetch can be made to fail independently
    struct ScriptedSource {
        entries: Vec<CatalogEntry>,
        search_fails: bool,
        search_empty: bool,
        get_all_fails: bool,
        get_all_calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(entries: Vec<CatalogEntry>) -> Self {
            Self {
                entries,
                search_fails: false,
                search_empty: false,
                get_all_fails: false,
                get_all_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CandidateSource for ScriptedSource {
        async fn search(&self, _fts_query: &str) -> Result<Vec<CatalogEntry>> {
            if self.search_fails {
                return Err(MatchEngineError::retrieval("scripted", "index offline"));
            }
            if self.search_empty {
                return Ok(Vec::new());
            }
            Ok(self.entries.clone())
        }

        async fn get_all(&self) -> Result<Vec<CatalogEntry>> {
            self.get_all_calls.fetch_add(1, Ordering::SeqCst);
            if self.get_all_fails {
                return Err(MatchEngineError::Catalog("database gone".to_string()));
            }
            Ok(self.entries.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_decide_thresholds() {
        let outcome = decide("x", vec![candidate("a", 0.82)]);
        assert!(outcome.is_auto_add());

        let outcome = decide("x", vec![candidate("a", 0.8199), candidate("b", 0.6)]);
        match outcome {
            ResolveOutcome::Suggestions { ranked } => assert_eq!(ranked.len(), 2),
            other => panic!("expected suggestions, got {:?}", other),
        }

        let outcome = decide("x", vec![candidate("a", 0.5999)]);
        assert_eq!(outcome, ResolveOutcome::unknown("x"));

        assert_eq!(decide("x", Vec::new()), ResolveOutcome::unknown("x"));
    }

    #[test]
    fn test_decide_suggestions_capped_and_filtered() {
        let ranked = vec![
            candidate("a", 0.80),
            candidate("b", 0.75),
            candidate("c", 0.70),
            candidate("d", 0.66),
            candidate("e", 0.65),
            candidate("f", 0.61),
        ];
        match decide("x", ranked) {
            ResolveOutcome::Suggestions { ranked } => assert_eq!(ranked.len(), MAX_SUGGESTIONS),
            other => panic!("expected suggestions, got {:?}", other),
        }

        let ranked = vec![candidate("a", 0.70), candidate("b", 0.40)];
        match decide("x", ranked) {
            ResolveOutcome::Suggestions { ranked } => {
                assert_eq!(ranked.len(), 1);
                assert_eq!(ranked[0].entry.name, "a");
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_input_skips_retrieval() {
        let source = Arc::new(ScriptedSource::new(catalog()));
        let engine = MatchEngine::new(source.clone());

        assert_eq!(engine.resolve("").await, ResolveOutcome::unknown(""));
        assert_eq!(engine.resolve("   ").await, ResolveOutcome::unknown("   "));
        assert_eq!(source.get_all_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_failure_falls_back() {
        let mut source = ScriptedSource::new(catalog());
        source.search_fails = true;
        let source = Arc::new(source);
        let engine = MatchEngine::new(source.clone());

        let outcome = engine.resolve("lapte").await;
        assert!(outcome.is_auto_add());
        assert_eq!(source.get_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_search_falls_back() {
        let mut source = ScriptedSource::new(catalog());
        source.search_empty = true;
        let source = Arc::new(source);
        let engine = MatchEngine::new(source.clone());

        match engine.resolve("surub 6 pe 100").await {
            ResolveOutcome::AutoAdd { entry, .. } => assert_eq!(entry.name, "Șurub 6x100"),
            other => panic!("expected auto add, got {:?}", other),
        }
        assert_eq!(source.get_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_catalog_is_unknown() {
        let mut source = ScriptedSource::new(catalog());
        source.search_fails = true;
        source.get_all_fails = true;
        let engine = MatchEngine::new(Arc::new(source));

        assert_eq!(engine.resolve("lapte").await, ResolveOutcome::unknown("lapte"));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_unknown() {
        let engine = MatchEngine::new(Arc::new(InMemoryCatalog::default()));
        assert_eq!(engine.resolve("lapte").await, ResolveOutcome::unknown("lapte"));
    }

    #[tokio::test]
    async fn test_search_hits_skip_full_fetch() {
        let source = Arc::new(ScriptedSource::new(catalog()));
        let engine = MatchEngine::new(source.clone());

        engine.resolve("lapte").await;
        assert_eq!(source.get_all_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = ScoringWeights {
            levenshtein: -1.0,
            ..ScoringWeights::DEFAULT
        };
        let source = Arc::new(InMemoryCatalog::default());
        assert!(MatchEngine::with_weights(source, weights).is_err());
    }

    #[tokio::test]
    async fn test_rank_query() {
        let engine = MatchEngine::new(Arc::new(InMemoryCatalog::new(catalog())));
        let ranked = engine.rank_query("cartoful").await;
        assert_eq!(ranked[0].entry.name, "Cartofi");
        assert!(engine.rank_query(" ").await.is_empty());
    }
}
