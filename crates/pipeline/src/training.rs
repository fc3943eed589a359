//! Offline training: dataset → movie table + similarity matrix.

use crate::error::Result;
use crate::features::FeatureComposer;
use crate::similarity::{self, SimilarityMatrix};
use crate::table::MovieTable;
use crate::vectorizer::{CountVectorizer, VectorizerConfig};
use data_loader::{Dataset, LoadOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// Everything the training run can be tuned with
#[derive(Debug, Clone, Default)]
pub struct TrainingConfig {
    pub load: LoadOptions,
    pub vectorizer: VectorizerConfig,
}

/// A matched table/matrix pair ready to be saved or served
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub table: MovieTable,
    pub similarity: SimilarityMatrix,
    pub vocabulary_size: usize,
}

/// Run feature composition, vectorization and similarity on a dataset.
#[instrument(skip_all, fields(movies = dataset.len()))]
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainedModel> {
    let start = Instant::now();

    let table = FeatureComposer::new().compose_all(&dataset.movies);
    train_table(table, &config.vectorizer).inspect(|_| {
        info!("Training finished in {:.2?}", start.elapsed());
    })
}

/// Vectorize and compare the soups of an already composed table.
pub fn train_table(table: MovieTable, config: &VectorizerConfig) -> Result<TrainedModel> {
    let vectorizer = CountVectorizer::new(config.clone())?;
    let soups: Vec<&str> = table.records().iter().map(|r| r.soup.as_str()).collect();
    let counts = vectorizer.fit_transform(&soups)?;

    let similarity = similarity::compute(&counts.counts, table.ids())?;
    Ok(TrainedModel {
        vocabulary_size: counts.vocabulary.len(),
        table,
        similarity,
    })
}

/// Load the raw dataset from `data_dir` and train on it.
pub fn train_from_dir(data_dir: &Path, config: &TrainingConfig) -> Result<TrainedModel> {
    let dataset = Dataset::load(data_dir, &config.load)?;
    train(&dataset, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MovieRecord;

    fn record(id: i64, title: &str, soup: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            release_date: None,
            main_director: None,
            cast: vec![],
            keywords: vec![],
            genres: vec![],
            soup: soup.to_string(),
        }
    }

    #[test]
    fn test_train_table_aligns_rows() {
        let table = MovieTable::new(vec![
            record(1, "A", "action hero marvel"),
            record(2, "B", "action hero dc"),
            record(3, "C", "romance drama love"),
        ]);
        let config = VectorizerConfig {
            min_df: 1,
            ..Default::default()
        };
        let model = train_table(table, &config).unwrap();

        assert_eq!(model.similarity.labels(), &[1, 2, 3]);
        assert!(model.similarity.get(0, 1) > model.similarity.get(0, 2));
        assert!(model.similarity.get(0, 1) > model.similarity.get(1, 2));
        assert!(model.vocabulary_size > 0);
    }
}
