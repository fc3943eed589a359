//! Feature composition: raw nested metadata → normalized "soup".
//!
//! The soup for a movie is
//!
//! ```text
//! keywords ++ cast[..3] ++ [director, director, director] ++ genres
//! ```
//!
//! joined by single spaces. The director appears three times on purpose:
//! in a bag-of-words vector that triples the director's weight.

use crate::normalize::{SnowballStemmer, Stemmer, normalize, normalize_keyword};
use crate::table::{MovieRecord, MovieTable};
use data_loader::{NamedEntry, RawMovie};
use rayon::prelude::*;
use tracing::{debug, info};

/// Crew job that identifies the director
pub const DIRECTOR_JOB: &str = "Director";

/// Builds `MovieRecord`s (and their soups) from raw movies.
///
/// ## Performance Note
/// Composition is independent per movie and runs on the rayon pool;
/// output order always matches input order.
pub struct FeatureComposer<S: Stemmer = SnowballStemmer> {
    stemmer: S,
    max_cast: usize,
    director_weight: usize,
}

impl FeatureComposer<SnowballStemmer> {
    /// Composer with the Snowball English stemmer, top-3 cast and a
    /// director weight of 3.
    pub fn new() -> Self {
        Self::with_stemmer(SnowballStemmer::english())
    }
}

impl Default for FeatureComposer<SnowballStemmer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stemmer> FeatureComposer<S> {
    pub fn with_stemmer(stemmer: S) -> Self {
        Self {
            stemmer,
            max_cast: 3,
            director_weight: 3,
        }
    }

    /// Configure how many cast members are kept (default: 3)
    pub fn with_max_cast(mut self, max_cast: usize) -> Self {
        self.max_cast = max_cast;
        self
    }

    /// Configure how many times the director token is repeated (default: 3)
    pub fn with_director_weight(mut self, weight: usize) -> Self {
        self.director_weight = weight;
        self
    }

    /// Compose records for all movies, preserving order.
    pub fn compose_all(&self, movies: &[RawMovie]) -> MovieTable {
        let records: Vec<MovieRecord> = movies.par_iter().map(|m| self.compose(m)).collect();
        let without_director = records.iter().filter(|r| r.main_director.is_none()).count();
        info!(
            "Composed soups for {} movies ({} without a director)",
            records.len(),
            without_director
        );
        MovieTable::new(records)
    }

    /// Compose a single movie record.
    pub fn compose(&self, movie: &RawMovie) -> MovieRecord {
        let cast: Vec<String> = movie
            .cast
            .iter()
            .take(self.max_cast)
            .map(|entry| normalize(&entry.name))
            .collect();

        let main_director = find_director(&movie.crew);
        // Missing director contributes empty tokens, which the vectorizer ignores
        let director_token = main_director.as_deref().map(normalize).unwrap_or_default();

        let keywords: Vec<String> = movie
            .keywords
            .iter()
            .map(|entry| normalize_keyword(&self.stemmer, &entry.name))
            .collect();

        let soup = build_soup(
            &keywords,
            &cast,
            &director_token,
            self.director_weight,
            &movie.genres,
        );
        debug!(movie_id = movie.id, "soup: {}", soup);

        MovieRecord {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date.clone(),
            main_director,
            cast,
            keywords,
            genres: movie.genres.clone(),
            soup,
        }
    }
}

/// Name of the first crew member whose job is "Director".
pub fn find_director(crew: &[NamedEntry]) -> Option<String> {
    crew.iter()
        .find(|entry| entry.job.as_deref() == Some(DIRECTOR_JOB))
        .map(|entry| entry.name.clone())
}

/// Concatenate the soup parts in their fixed order.
pub fn build_soup(
    keywords: &[String],
    cast: &[String],
    director: &str,
    director_weight: usize,
    genres: &[String],
) -> String {
    let parts: Vec<&str> = keywords
        .iter()
        .map(String::as_str)
        .chain(cast.iter().map(String::as_str))
        .chain(std::iter::repeat_n(director, director_weight))
        .chain(genres.iter().map(String::as_str))
        .collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_story() -> RawMovie {
        RawMovie {
            id: 862,
            title: "Toy Story".to_string(),
            release_date: Some("1995-10-30".to_string()),
            popularity: 21.9,
            genres: vec!["Animation".to_string(), "Comedy".to_string(), "Family".to_string()],
            cast: vec![
                NamedEntry::new("Tom Hanks"),
                NamedEntry::new("Tim Allen"),
                NamedEntry::new("Don Rickles"),
                NamedEntry::new("Jim Varney"),
            ],
            crew: vec![
                NamedEntry::with_job("Bonnie Arnold", "Producer"),
                NamedEntry::with_job("John Lasseter", "Director"),
                NamedEntry::with_job("Someone Else", "Director"),
            ],
            keywords: vec![NamedEntry::new("jealousy"), NamedEntry::new("toy")],
        }
    }

    #[test]
    fn test_compose_soup_order_and_weighting() {
        let record = FeatureComposer::new().compose(&toy_story());

        assert_eq!(record.cast, vec!["tomhanks", "timallen", "donrickles"]);
        assert_eq!(record.main_director.as_deref(), Some("John Lasseter"));
        assert_eq!(record.keywords, vec!["jealousi", "toy"]);
        assert_eq!(
            record.soup,
            "jealousi toy tomhanks timallen donrickles \
             johnlasseter johnlasseter johnlasseter Animation Comedy Family"
        );
    }

    #[test]
    fn test_missing_director_is_not_an_error() {
        let mut movie = toy_story();
        movie.crew.clear();
        let record = FeatureComposer::new().compose(&movie);

        assert!(record.main_director.is_none());
        assert!(!record.soup.contains("johnlasseter"));
        assert!(record.soup.contains("donrickles"));
    }

    #[test]
    fn test_empty_movie_yields_blank_soup() {
        let movie = RawMovie {
            id: 1,
            title: "Nothing".to_string(),
            release_date: None,
            popularity: 0.0,
            genres: vec![],
            cast: vec![],
            crew: vec![],
            keywords: vec![],
        };
        let record = FeatureComposer::new().compose(&movie);
        assert!(record.soup.trim().is_empty());
    }

    #[test]
    fn test_compose_all_preserves_order() {
        let mut second = toy_story();
        second.id = 2;
        second.title = "Second".to_string();
        let table = FeatureComposer::new().compose_all(&[toy_story(), second]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().id, 862);
        assert_eq!(table.get(1).unwrap().title, "Second");
    }

    #[test]
    fn test_configurable_weights() {
        let composer = FeatureComposer::new().with_max_cast(1).with_director_weight(1);
        let record = composer.compose(&toy_story());
        assert_eq!(record.cast, vec!["tomhanks"]);
        assert_eq!(record.soup.matches("johnlasseter").count(), 1);
    }
}
