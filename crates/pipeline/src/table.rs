//! The movie table: one `MovieRecord` per row, in similarity-matrix order.
//!
//! In memory the table is row-oriented. For persistence it converts to a
//! columnar layout (one typed vector per field) described by a schema, so
//! a reader can check it got the columns it expects before trusting them.

use crate::error::{PipelineError, Result};
use data_loader::MovieId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A movie after feature composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<String>,
    /// Director name as credited, before normalization
    pub main_director: Option<String>,
    /// Up to three normalized cast tokens, in billing order
    pub cast: Vec<String>,
    /// Stemmed, normalized keyword tokens
    pub keywords: Vec<String>,
    pub genres: Vec<String>,
    /// Space-joined bag of tokens fed to the vectorizer
    pub soup: String,
}

/// Immutable, ordered collection of movie records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    records: Vec<MovieRecord>,
}

impl MovieTable {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record at a row index
    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    /// Movie ids in row order
    pub fn ids(&self) -> Vec<MovieId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// SHA-256 over the id and title columns, hex encoded.
    ///
    /// Two artifacts built from the same table share this value; any row
    /// drop or reorder changes it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.id.to_le_bytes());
            hasher.update((record.title.len() as u64).to_le_bytes());
            hasher.update(record.title.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Split the table into typed columns.
    pub fn to_columns(&self) -> MovieColumns {
        let mut columns = MovieColumns::with_capacity(self.len());
        for r in &self.records {
            columns.id.push(r.id);
            columns.title.push(r.title.clone());
            columns.release_date.push(r.release_date.clone());
            columns.main_director.push(r.main_director.clone());
            columns.cast.push(r.cast.clone());
            columns.keywords.push(r.keywords.clone());
            columns.genres.push(r.genres.clone());
            columns.soup.push(r.soup.clone());
        }
        columns
    }

    /// Reassemble a table from columns, rejecting ragged columns.
    pub fn from_columns(columns: MovieColumns) -> Result<Self> {
        let rows = columns.id.len();
        let lengths = [
            ("title", columns.title.len()),
            ("release_date", columns.release_date.len()),
            ("main_director", columns.main_director.len()),
            ("cast", columns.cast.len()),
            ("keywords", columns.keywords.len()),
            ("genres", columns.genres.len()),
            ("soup", columns.soup.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != rows) {
            return Err(PipelineError::ArtifactMismatch(format!(
                "column '{}' has {} rows, id column has {}",
                name, len, rows
            )));
        }

        let MovieColumns {
            id,
            title,
            release_date,
            main_director,
            cast,
            keywords,
            genres,
            soup,
        } = columns;

        let records = id
            .into_iter()
            .zip(title)
            .zip(release_date)
            .zip(main_director)
            .zip(cast)
            .zip(keywords)
            .zip(genres)
            .zip(soup)
            .map(
                |(((((((id, title), release_date), main_director), cast), keywords), genres), soup)| {
                    MovieRecord {
                        id,
                        title,
                        release_date,
                        main_director,
                        cast,
                        keywords,
                        genres,
                        soup,
                    }
                },
            )
            .collect();
        Ok(Self { records })
    }
}

/// Data type of one persisted column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Utf8,
    NullableUtf8,
    Utf8List,
}

/// Name and type of one persisted column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
}

/// Columnar form of a [`MovieTable`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieColumns {
    pub id: Vec<MovieId>,
    pub title: Vec<String>,
    pub release_date: Vec<Option<String>>,
    pub main_director: Vec<Option<String>>,
    pub cast: Vec<Vec<String>>,
    pub keywords: Vec<Vec<String>>,
    pub genres: Vec<Vec<String>>,
    pub soup: Vec<String>,
}

impl MovieColumns {
    fn with_capacity(rows: usize) -> Self {
        Self {
            id: Vec::with_capacity(rows),
            title: Vec::with_capacity(rows),
            release_date: Vec::with_capacity(rows),
            main_director: Vec::with_capacity(rows),
            cast: Vec::with_capacity(rows),
            keywords: Vec::with_capacity(rows),
            genres: Vec::with_capacity(rows),
            soup: Vec::with_capacity(rows),
        }
    }

    /// The schema every persisted movie table carries
    pub fn schema() -> Vec<ColumnSchema> {
        [
            ("id", ColumnType::Int64),
            ("title", ColumnType::Utf8),
            ("release_date", ColumnType::NullableUtf8),
            ("main_director", ColumnType::NullableUtf8),
            ("cast", ColumnType::Utf8List),
            ("keywords", ColumnType::Utf8List),
            ("genres", ColumnType::Utf8List),
            ("soup", ColumnType::Utf8),
        ]
        .into_iter()
        .map(|(name, dtype)| ColumnSchema {
            name: name.to_string(),
            dtype,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: MovieId, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            release_date: Some("1995-10-30".to_string()),
            main_director: Some("John Lasseter".to_string()),
            cast: vec!["tomhanks".to_string()],
            keywords: vec!["jealousi".to_string()],
            genres: vec!["Animation".to_string()],
            soup: "jealousi tomhanks johnlasseter johnlasseter johnlasseter Animation".to_string(),
        }
    }

    #[test]
    fn test_columns_roundtrip_preserves_order() {
        let table = MovieTable::new(vec![record(862, "Toy Story"), record(8844, "Jumanji")]);
        let rebuilt = MovieTable::from_columns(table.to_columns()).unwrap();
        assert_eq!(rebuilt, table);
        assert_eq!(rebuilt.get(1).unwrap().title, "Jumanji");
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let table = MovieTable::new(vec![record(862, "Toy Story")]);
        let mut columns = table.to_columns();
        columns.soup.push("extra".to_string());
        assert!(matches!(
            MovieTable::from_columns(columns),
            Err(PipelineError::ArtifactMismatch(_))
        ));
    }

    #[test]
    fn test_fingerprint_tracks_order() {
        let a = MovieTable::new(vec![record(1, "A"), record(2, "B")]);
        let b = MovieTable::new(vec![record(2, "B"), record(1, "A")]);
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_schema_matches_columns() {
        let names: Vec<String> = MovieColumns::schema().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["id", "title", "release_date", "main_director", "cast", "keywords", "genres", "soup"]
        );
    }
}
