//! Core domain types for the raw movie metadata dataset.
//!
//! These types describe movies *before* feature engineering: nested cast,
//! crew and keyword lists are already parsed out of their Python-literal
//! encoding, but nothing has been normalized or stemmed yet.

use crate::literal::parse_list_or_empty;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Type Aliases
// =============================================================================

/// TMDB identifier of a movie (the `id` column shared by all input tables)
pub type MovieId = i64;

/// Raw row positions in `movies_metadata.csv` known to hold corrupted data.
///
/// These rows have their columns shifted (a date where the id should be)
/// and are dropped by position before any other processing.
pub const KNOWN_BAD_ROWS: [usize; 3] = [19730, 29503, 35587];

// =============================================================================
// Nested entries
// =============================================================================

/// One entry of a nested cast, crew, keyword or genre list.
///
/// Only the fields the feature composer needs are kept. `job` is present
/// for crew entries (e.g. "Director", "Producer").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    pub job: Option<String>,
}

impl NamedEntry {
    /// Create an entry without a job (cast, keyword, genre).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: None,
        }
    }

    /// Create a crew entry.
    pub fn with_job(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: Some(job.into()),
        }
    }

    /// Build an entry from a parsed dict; entries without a string `name`
    /// yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?.to_string();
        let job = value.get("job").and_then(Value::as_str).map(str::to_string);
        Some(Self { name, job })
    }

    /// Parse a whole nested column, degrading to an empty list when the
    /// field is missing or malformed.
    pub fn list_from_literal(text: Option<&str>) -> Vec<Self> {
        parse_list_or_empty(text)
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

// =============================================================================
// Raw movie rows
// =============================================================================

/// A movie after cleaning and joining, ready for feature composition.
///
/// The position of a `RawMovie` inside [`Dataset::movies`] is the canonical
/// row index carried through vectorization and into the similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMovie {
    pub id: MovieId,
    pub title: String,
    /// Release date as written in the source ("1995-10-30"), if any
    pub release_date: Option<String>,
    pub popularity: f64,
    /// Genre names, already extracted from their nested encoding
    pub genres: Vec<String>,
    pub cast: Vec<NamedEntry>,
    pub crew: Vec<NamedEntry>,
    pub keywords: Vec<NamedEntry>,
}

// =============================================================================
// Load options and the cleaned dataset
// =============================================================================

/// Knobs for [`Dataset::load`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Raw metadata row positions to drop before parsing
    pub drop_rows: Vec<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            drop_rows: KNOWN_BAD_ROWS.to_vec(),
        }
    }
}

/// The cleaned, merged dataset in final row order.
#[derive(Debug, Default)]
pub struct Dataset {
    pub movies: Vec<RawMovie>,
    /// Number of rows read from `links.csv`
    pub links_count: usize,
}

impl Dataset {
    /// Number of movies in the dataset
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_entries_keep_job() {
        let crew = NamedEntry::list_from_literal(Some(
            "[{'credit_id': 'x', 'job': 'Director', 'name': 'John Lasseter'}, {'job': 'Writer'}]",
        ));
        assert_eq!(crew, vec![NamedEntry::with_job("John Lasseter", "Director")]);
    }

    #[test]
    fn test_malformed_list_is_empty() {
        assert!(NamedEntry::list_from_literal(Some("not a list")).is_empty());
        assert!(NamedEntry::list_from_literal(None).is_empty());
    }

    #[test]
    fn test_default_options_drop_known_rows() {
        let options = LoadOptions::default();
        assert_eq!(options.drop_rows, vec![19730, 29503, 35587]);
    }
}
