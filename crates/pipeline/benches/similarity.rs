//! Benchmarks for vectorization and the similarity engine
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses a synthetic corpus shaped like real soups (keywords, cast,
//! a tripled director, genres).

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipeline::{CountVectorizer, VectorizerConfig, similarity};

const GENRES: [&str; 8] = ["Action", "Comedy", "Drama", "Horror", "Romance", "Thriller", "Animation", "Crime"];

fn synthetic_soups(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let director = format!("director{}", i % 97);
            format!(
                "keyword{} keyword{} actor{} actor{} actor{} {d} {d} {d} {} {}",
                i % 211,
                (i * 7) % 389,
                i % 503,
                (i * 3) % 503,
                (i * 11) % 503,
                GENRES[i % GENRES.len()],
                GENRES[(i / 3) % GENRES.len()],
                d = director,
            )
        })
        .collect()
}

fn bench_fit_transform(c: &mut Criterion) {
    let soups = synthetic_soups(2_000);
    let vectorizer = CountVectorizer::new(VectorizerConfig::default()).expect("valid config");

    c.bench_function("count_vectorizer_fit_transform_2k", |b| {
        b.iter(|| black_box(vectorizer.fit_transform(black_box(&soups)).unwrap()))
    });
}

fn bench_similarity(c: &mut Criterion) {
    let soups = synthetic_soups(2_000);
    let vectorizer = CountVectorizer::new(VectorizerConfig::default()).expect("valid config");
    let counts = vectorizer.fit_transform(&soups).expect("non-empty vocabulary");
    let labels: Vec<i64> = (0..soups.len() as i64).collect();

    c.bench_function("cosine_similarity_2k", |b| {
        b.iter(|| black_box(similarity::compute(black_box(&counts.counts), labels.clone()).unwrap()))
    });
}

criterion_group!(benches, bench_fit_transform, bench_similarity);
criterion_main!(benches);
