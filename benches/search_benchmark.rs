use criterion::{criterion_group, criterion_main, Criterion};
use insee_geo_finder::models::{Territory, TerritoryKind};
use insee_geo_finder::services::search::search;
use std::hint::black_box;

const STEMS: [&str; 8] = [
    "Saint-Étienne",
    "Vernon",
    "Évreux",
    "Sainte-Marie",
    "Le Havre",
    "Bourg",
    "Châteauneuf",
    "Villeneuve",
];

/// A catalog the size of the commune list, with accented, repeated names.
fn synthetic_catalog() -> Vec<Territory> {
    (0..35_000)
        .map(|i| {
            let title = format!("{}-sur-{}", STEMS[i % STEMS.len()], i);
            Territory::new(TerritoryKind::Commune, &format!("{:05}", i), title)
        })
        .collect()
}

fn benchmark_search(c: &mut Criterion) {
    let catalog = synthetic_catalog();

    let mut group = c.benchmark_group("catalog_search");

    group.bench_function("accent_insensitive_name", |b| {
        b.iter(|| search(black_box(&catalog), black_box("chateauneuf"), 20))
    });

    group.bench_function("multi_word", |b| {
        b.iter(|| search(black_box(&catalog), black_box("saint etienne 12"), 20))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| search(black_box(&catalog), black_box("zzzz"), 20))
    });

    group.finish();
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
