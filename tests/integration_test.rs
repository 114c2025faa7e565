use product_match_engine::{
    CandidateSource, CatalogEntry, InMemoryCatalog, MatchEngine, ResolveOutcome, SqliteCatalog,
    SqliteUnknownLog, UnknownLog, AUTO_ADD_THRESHOLD, MAX_SUGGESTIONS, SUGGESTIONS_THRESHOLD,
};
use std::sync::Arc;

fn shop_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("1", "Lapte").with_aliases(["lapte", "lapte de vaca", "lapte proaspat"]),
        CatalogEntry::new("2", "Pâine albă").with_aliases(["paine", "paine alba", "franzela"]),
        CatalogEntry::new("3", "Cartofi").with_aliases(["cartofi", "cartof"]),
        CatalogEntry::new("4", "Mere").with_aliases(["mere", "mar"]),
        CatalogEntry::new("5", "Șurub 6x100").with_aliases(["surub 6x100", "vis 6x100"]),
        CatalogEntry::new("6", "Cauciuc 27.5 x 2.25").with_aliases(["cauciuc 27.5x2.25"]),
    ]
}

fn memory_engine() -> MatchEngine {
    MatchEngine::new(Arc::new(InMemoryCatalog::new(shop_catalog())))
}

async fn sqlite_engine() -> MatchEngine {
    let catalog = SqliteCatalog::new(":memory:").await.unwrap();
    catalog.insert_all(&shop_catalog()).await.unwrap();
    MatchEngine::new(Arc::new(catalog))
}

fn assert_auto_add(outcome: ResolveOutcome, expected: &str) {
    match outcome {
        ResolveOutcome::AutoAdd { entry, score } => {
            assert_eq!(entry.name, expected);
            assert!(score >= AUTO_ADD_THRESHOLD);
        }
        other => panic!("expected auto add of {}, got {:?}", expected, other),
    }
}

fn assert_suggests(outcome: ResolveOutcome, expected_top: &str) {
    match outcome {
        ResolveOutcome::Suggestions { ranked } => {
            assert_eq!(ranked[0].entry.name, expected_top);
            assert_suggestions_invariant(&ranked);
        }
        other => panic!("expected suggestions led by {}, got {:?}", expected_top, other),
    }
}

fn assert_suggestions_invariant(ranked: &[product_match_engine::RankedCandidate]) {
    assert!(!ranked.is_empty());
    assert!(ranked.len() <= MAX_SUGGESTIONS);
    for candidate in ranked {
        assert!(candidate.score >= SUGGESTIONS_THRESHOLD);
        assert!(candidate.score < AUTO_ADD_THRESHOLD);
    }
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

async fn check_decisions(engine: &MatchEngine) {
    assert_auto_add(engine.resolve("lapte").await, "Lapte");
    assert_auto_add(engine.resolve("LAPTE").await, "Lapte");
    assert_auto_add(engine.resolve("franzela").await, "Pâine albă");
    assert_auto_add(engine.resolve("PAINE ALBA").await, "Pâine albă");
    assert_auto_add(engine.resolve("șurub 6 pe 100").await, "Șurub 6x100");
    assert_auto_add(engine.resolve("surub 6 100").await, "Șurub 6x100");
    assert_auto_add(engine.resolve("cauciuc 27.5 pe 2.25").await, "Cauciuc 27.5 x 2.25");

    assert_suggests(engine.resolve("cartoful").await, "Cartofi");
    assert_suggests(engine.resolve("cauciuc 275 225").await, "Cauciuc 27.5 x 2.25");

    assert_eq!(
        engine.resolve("xyzabc123nonsense").await,
        ResolveOutcome::unknown("xyzabc123nonsense")
    );
    assert_eq!(engine.resolve("meri").await, ResolveOutcome::unknown("meri"));
    assert_eq!(engine.resolve("").await, ResolveOutcome::unknown(""));
}

#[tokio::test]
async fn test_decisions_in_memory() {
    check_decisions(&memory_engine()).await;
}

#[tokio::test]
async fn test_decisions_sqlite() {
    check_decisions(&sqlite_engine().await).await;
}

#[tokio::test]
async fn test_suggestions_invariant_over_inputs() {
    let engine = memory_engine();
    let inputs = [
        "cartoful", "cartofii", "lapt", "laptele", "paine neagra", "surub 6 80",
        "cauciuc 275 225", "mere rosii", "franzel", "vis 6 pe 100", "cartof dulce",
    ];

    for input in inputs {
        if let ResolveOutcome::Suggestions { ranked } = engine.resolve(input).await {
            assert_suggestions_invariant(&ranked);
        }
    }
}

#[tokio::test]
async fn test_resolve_is_total() {
    let engine = memory_engine();
    for input in ["   ", "\t\n", "!!!", "42", "ж", "😀", "\"", "x", "* × pe", "a OR b*"] {
        // any outcome is fine, as long as there is one
        let outcome = engine.resolve(input).await;
        assert!(["auto_add", "suggestions", "unknown"].contains(&outcome.kind()));
    }
}

#[tokio::test]
async fn test_unknown_recorded_by_caller() {
    let engine = memory_engine();
    let log = SqliteUnknownLog::new(":memory:").await.unwrap();

    for input in ["xyzabc123nonsense", "XYZABC123NONSENSE", "lapte"] {
        if let ResolveOutcome::Unknown { original_text } = engine.resolve(input).await {
            log.record(&original_text).await.unwrap();
        }
    }

    let unknowns = log.list(10).await.unwrap();
    assert_eq!(unknowns.len(), 1);
    assert_eq!(unknowns[0].normalized, "xyzabc123nonsense");
    assert_eq!(unknowns[0].occurrences, 2);
}

#[tokio::test]
async fn test_sqlite_catalog_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.db");
    let path = path.to_str().unwrap();

    {
        let catalog = SqliteCatalog::new(path).await.unwrap();
        catalog.insert_all(&shop_catalog()).await.unwrap();
    }

    let catalog = SqliteCatalog::new(path).await.unwrap();
    assert_eq!(catalog.count().await.unwrap(), 6);
    assert_eq!(catalog.get_all().await.unwrap().len(), 6);

    let engine = MatchEngine::new(Arc::new(catalog));
    assert_auto_add(engine.resolve("lapte de vaca").await, "Lapte");
}

#[tokio::test]
async fn test_rank_query_exposes_breakdown() {
    let engine = memory_engine();
    let ranked = engine.rank_query("cartoful").await;

    assert_eq!(ranked[0].entry.name, "Cartofi");
    for key in ["levenshtein", "jaccard", "token", "phonetic", "prefix", "contains", "number", "alias_max", "final"] {
        assert!(ranked[0].breakdown.contains_key(key), "missing {}", key);
    }
    assert_eq!(ranked[0].breakdown["final"], ranked[0].score);
}
