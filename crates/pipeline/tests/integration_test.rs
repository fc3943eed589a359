//! Integration tests for the pipeline.
//!
//! These tests run raw movies through composition, vectorization and
//! similarity, then persist and reload the artifacts.

use data_loader::{Dataset, NamedEntry, RawMovie};
use pipeline::training::{self, TrainingConfig};
use pipeline::{VectorizerConfig, load_artifacts, save_artifacts};
use tempfile::tempdir;

fn movie(id: i64, title: &str, director: &str, genres: &[&str], keywords: &[&str], cast: &[&str]) -> RawMovie {
    RawMovie {
        id,
        title: title.to_string(),
        release_date: Some(format!("20{:02}-01-01", id)),
        popularity: 100.0 - id as f64,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        cast: cast.iter().map(|c| NamedEntry::new(*c)).collect(),
        crew: vec![NamedEntry::with_job(director, "Director")],
        keywords: keywords.iter().map(|k| NamedEntry::new(*k)).collect(),
    }
}

fn create_test_dataset() -> Dataset {
    Dataset {
        movies: vec![
            movie(1, "Toy Story", "John Lasseter", &["Animation", "Comedy"], &["toys", "friendship"], &["Tom Hanks", "Tim Allen"]),
            movie(2, "Toy Story 2", "John Lasseter", &["Animation", "Comedy"], &["toy", "friendship"], &["Tom Hanks", "Tim Allen"]),
            movie(3, "A Bug's Life", "John Lasseter", &["Animation", "Family"], &["insects", "friendship"], &["Kevin Spacey"]),
            movie(4, "Heat", "Michael Mann", &["Action", "Crime"], &["robbery", "detective"], &["Al Pacino", "Robert De Niro"]),
            movie(5, "Collateral", "Michael Mann", &["Action", "Crime"], &["hitman", "taxi"], &["Tom Cruise"]),
            movie(6, "Thief", "Michael Mann", &["Crime", "Drama"], &["robbery", "heist"], &["James Caan"]),
        ],
        links_count: 6,
    }
}

fn config() -> TrainingConfig {
    TrainingConfig {
        vectorizer: VectorizerConfig {
            min_df: 2,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_train_produces_valid_similarity_matrix() {
    let model = training::train(&create_test_dataset(), &config()).unwrap();
    let sim = &model.similarity;

    assert_eq!(sim.len(), 6);
    assert_eq!(model.table.len(), 6);
    for i in 0..sim.len() {
        assert_eq!(sim.get(i, i), 1.0);
        for j in 0..sim.len() {
            let v = sim.get(i, j);
            assert!((0.0..=1.0).contains(&v), "score {} out of range", v);
            assert!((v - sim.get(j, i)).abs() <= 1e-6);
        }
    }
}

#[test]
fn test_same_director_and_cast_rank_closest() {
    let model = training::train(&create_test_dataset(), &config()).unwrap();
    let sim = &model.similarity;

    // Toy Story vs Toy Story 2 share director, cast, genres and keywords
    assert!(sim.get(0, 1) > sim.get(0, 2));
    assert!(sim.get(0, 2) > sim.get(0, 3));
    // Michael Mann films are closer to each other than to Pixar
    assert!(sim.get(3, 5) > sim.get(3, 0));
}

#[test]
fn test_keyword_stemming_merges_inflections() {
    let model = training::train(&create_test_dataset(), &config()).unwrap();
    let first = model.table.get(0).unwrap();
    let second = model.table.get(1).unwrap();
    assert_eq!(first.keywords[0], second.keywords[0]);
}

#[test]
fn test_artifacts_roundtrip_preserves_alignment() {
    let model = training::train(&create_test_dataset(), &config()).unwrap();
    let dir = tempdir().unwrap();
    save_artifacts(dir.path(), &model.table, &model.similarity).unwrap();

    let (table, similarity) = load_artifacts(dir.path()).unwrap();
    for i in 0..table.len() {
        assert_eq!(table.get(i).unwrap().title, model.table.get(i).unwrap().title);
        assert_eq!(similarity.labels()[i], table.get(i).unwrap().id);
    }
    assert_eq!(similarity, model.similarity);
}

#[test]
fn test_training_is_deterministic() {
    let a = training::train(&create_test_dataset(), &config()).unwrap();
    let b = training::train(&create_test_dataset(), &config()).unwrap();
    assert_eq!(a.similarity, b.similarity);
    assert_eq!(a.vocabulary_size, b.vocabulary_size);
}
