//! # Recommendation Service
//!
//! Answers "movies like this title" from the trained artifacts:
//! 1. Normalize the query title (trim, lowercase)
//! 2. Look it up in the precomputed title index (first row wins)
//! 3. Rank that row of the similarity matrix (score desc, index asc)
//! 4. Skip the query movie itself and take the top `k`
//! 5. Attach metadata from the movie table
//!
//! The service is built once at startup and never mutated, so it can be
//! shared between request handlers behind an `Arc` without locking.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, instrument};

use pipeline::{MovieTable, PipelineError, SimilarityMatrix, validate_alignment};

/// Default number of recommendations
pub const DEFAULT_TOP_K: usize = 10;

/// Rating reported for every recommendation; ratings are not modeled
pub const PLACEHOLDER_VOTE_AVERAGE: f32 = 8.0;

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search?q=";

#[derive(Error, Debug)]
pub enum RecommendError {
    /// No movie title matches the query after normalization
    #[error("Movie '{0}' not found")]
    NotFound(String),
}

/// One recommended movie
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Row index in the movie table
    pub index: usize,
    pub title: String,
    /// "Directed by <name>" or "Directed by Unknown"
    pub overview: String,
    pub poster_path: String,
    pub vote_average: f32,
    /// Release date, empty when unknown
    pub release_date: String,
    pub director: Option<String>,
    pub score: f32,
}

impl Recommendation {
    /// Web search link for the title (words joined with `+`)
    pub fn google_link(&self) -> String {
        let query: Vec<&str> = self.title.split_whitespace().collect();
        format!("{}{}", GOOGLE_SEARCH_URL, query.join("+"))
    }
}

/// Immutable lookup context over a matched table/matrix pair
pub struct RecommendationService {
    table: MovieTable,
    similarity: SimilarityMatrix,
    /// Normalized title → first row with that title
    title_index: HashMap<String, usize>,
}

/// Normalize a title for lookup.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

impl RecommendationService {
    /// Build the service, failing if the pair is not aligned.
    pub fn new(table: MovieTable, similarity: SimilarityMatrix) -> Result<Self, PipelineError> {
        validate_alignment(&table, &similarity)?;

        let mut title_index = HashMap::with_capacity(table.len());
        for (row, record) in table.records().iter().enumerate() {
            let key = normalize_title(&record.title);
            if !key.is_empty() {
                title_index.entry(key).or_insert(row);
            }
        }
        debug!("Indexed {} distinct titles", title_index.len());

        Ok(Self {
            table,
            similarity,
            title_index,
        })
    }

    /// Number of movies in the loaded table
    pub fn movies_count(&self) -> usize {
        self.table.len()
    }

    pub fn table(&self) -> &MovieTable {
        &self.table
    }

    /// Row index of a title, if it is known.
    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.title_index.get(&normalize_title(title)).copied()
    }

    /// Top `k` movies most similar to `title`.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, RecommendError> {
        let index = self
            .lookup(title)
            .ok_or_else(|| RecommendError::NotFound(title.to_string()))?;

        let recommendations: Vec<Recommendation> = self
            .ranked_neighbors(index)
            .into_iter()
            .take(k)
            .map(|(row, score)| self.build_recommendation(row, score))
            .collect();

        debug!(
            "Returning {} recommendations for row {}",
            recommendations.len(),
            index
        );
        Ok(recommendations)
    }

    /// Every other row ranked by score (desc), ties by row index (asc).
    ///
    /// Only stored entries are sorted; rows with no stored score are
    /// appended in index order, which is exactly where a full sort of
    /// the dense row would put their zeros.
    fn ranked_neighbors(&self, index: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> =
            self.similarity.row(index).filter(|&(j, _)| j != index).collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut stored = vec![false; self.similarity.len()];
        stored[index] = true;
        for &(j, _) in &scored {
            stored[j] = true;
        }
        scored.extend(
            stored
                .iter()
                .enumerate()
                .filter(|(_, seen)| !**seen)
                .map(|(j, _)| (j, 0.0)),
        );
        scored
    }

    fn build_recommendation(&self, row: usize, score: f32) -> Recommendation {
        let record = &self.table.records()[row];
        let director = record.main_director.clone();
        Recommendation {
            index: row,
            title: record.title.clone(),
            overview: format!(
                "Directed by {}",
                director.as_deref().unwrap_or("Unknown")
            ),
            poster_path: String::new(),
            vote_average: PLACEHOLDER_VOTE_AVERAGE,
            release_date: record.release_date.clone().unwrap_or_default(),
            director,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::training::train_table;
    use pipeline::{MovieRecord, VectorizerConfig};

    fn record(id: i64, title: &str, director: Option<&str>, soup: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            release_date: (id != 3).then(|| "1995-10-30".to_string()),
            main_director: director.map(str::to_string),
            cast: vec![],
            keywords: vec![],
            genres: vec![],
            soup: soup.to_string(),
        }
    }

    fn build_service(records: Vec<MovieRecord>) -> RecommendationService {
        let config = VectorizerConfig {
            min_df: 1,
            ..Default::default()
        };
        let model = train_table(MovieTable::new(records), &config).expect("training failed");
        RecommendationService::new(model.table, model.similarity).expect("aligned pair")
    }

    fn abc_service() -> RecommendationService {
        build_service(vec![
            record(1, "A", Some("Jon Favreau"), "action hero marvel"),
            record(2, "B", Some("Zack Snyder"), "action hero dc"),
            record(3, "C", None, "romance drama love"),
        ])
    }

    #[test]
    fn test_recommend_orders_by_similarity() {
        let service = abc_service();
        let recs = service.recommend("A", 2).unwrap();
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert!(recs[0].score > recs[1].score);
        assert_eq!(recs[1].score, 0.0);
    }

    #[test]
    fn test_recommend_never_returns_query_and_respects_k() {
        let service = abc_service();
        for title in ["A", "B", "C"] {
            let own = service.lookup(title).unwrap();
            for k in 0..5 {
                let recs = service.recommend(title, k).unwrap();
                assert_eq!(recs.len(), k.min(service.movies_count() - 1));
                assert!(recs.iter().all(|r| r.index != own));
            }
        }
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let service = abc_service();
        assert_eq!(
            service.recommend("  a  ", 10).unwrap(),
            service.recommend("A", 10).unwrap()
        );
    }

    #[test]
    fn test_unknown_title_is_not_found() {
        let service = abc_service();
        let err = service.recommend("Nonexistent Title", 10).unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(ref t) if t == "Nonexistent Title"));
        // No partial matching
        assert!(service.recommend("A B", 10).is_err());
    }

    #[test]
    fn test_recommendation_fields() {
        let service = abc_service();
        let recs = service.recommend("A", 2).unwrap();

        assert_eq!(recs[0].overview, "Directed by Zack Snyder");
        assert_eq!(recs[0].release_date, "1995-10-30");
        assert_eq!(recs[0].poster_path, "");
        assert_eq!(recs[0].vote_average, 8.0);
        assert_eq!(recs[1].overview, "Directed by Unknown");
        assert_eq!(recs[1].release_date, "");
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_row() {
        let service = build_service(vec![
            record(1, "Hamlet", Some("Laurence Olivier"), "shakespeare tragedy denmark"),
            record(2, "Other", Some("Someone"), "comedy romance"),
            record(3, "hamlet", Some("Kenneth Branagh"), "shakespeare tragedy denmark"),
        ]);
        assert_eq!(service.lookup("HAMLET"), Some(0));

        // The identical later copy scores 1.0 but the query row is still excluded
        let recs = service.recommend("Hamlet", 10).unwrap();
        assert_eq!(recs[0].index, 2);
        assert_eq!(recs[0].score, 1.0);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_recommend_is_deterministic() {
        let service = abc_service();
        let first = service.recommend("B", 10).unwrap();
        for _ in 0..5 {
            assert_eq!(service.recommend("B", 10).unwrap(), first);
        }
    }

    #[test]
    fn test_google_link() {
        let service = abc_service();
        let mut rec = service.recommend("A", 1).unwrap().remove(0);
        rec.title = "  The Dark  Knight ".to_string();
        assert_eq!(rec.google_link(), "https://www.google.com/search?q=The+Dark+Knight");
    }
}
