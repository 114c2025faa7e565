use criterion::{black_box, criterion_group, criterion_main, Criterion};
use product_match_engine::{
    core::CatalogEntry,
    ranking::{Ranker, WeightedRanker},
};

fn create_test_catalog(count: usize) -> Vec<CatalogEntry> {
    (0..count)
        .map(|i| {
            CatalogEntry::new(i.to_string(), format!("Produs {} {}x{}", i, i % 12, 100 + i % 7))
                .with_aliases([format!("produs {}", i), format!("articol {}", i % 10)])
        })
        .collect()
}

fn bench_weighted_ranking(c: &mut Criterion) {
    let ranker = WeightedRanker::default();

    let catalog_10 = create_test_catalog(10);
    let catalog_100 = create_test_catalog(100);
    let catalog_1000 = create_test_catalog(1000);

    c.bench_function("weighted_rank_10", |b| {
        b.iter(|| black_box(ranker.rank("produs 5 pe 105", &catalog_10)));
    });

    c.bench_function("weighted_rank_100", |b| {
        b.iter(|| black_box(ranker.rank("produs 50 2 pe 101", &catalog_100)));
    });

    c.bench_function("weighted_rank_1000", |b| {
        b.iter(|| black_box(ranker.rank("articol 7", &catalog_1000)));
    });
}

criterion_group!(benches, bench_weighted_ranking);
criterion_main!(benches);
