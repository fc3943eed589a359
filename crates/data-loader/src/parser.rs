//! Parser for the raw movie dataset CSV files.
//!
//! This module handles the four input tables:
//! - movies_metadata.csv: one row per movie (id, title, genres, popularity, ...)
//! - credits.csv: cast, crew, id
//! - keywords.csv: id, keywords
//! - links.csv: movieId, imdbId, tmdbId
//!
//! Every column is read as an optional string. Typing (ids, popularity)
//! and nested-field parsing happen later so that one bad cell only ever
//! costs its own row.

use crate::error::{DataLoadError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

pub const MOVIES_FILE: &str = "movies_metadata.csv";
pub const CREDITS_FILE: &str = "credits.csv";
pub const KEYWORDS_FILE: &str = "keywords.csv";
pub const LINKS_FILE: &str = "links.csv";

/// The four files the offline pipeline cannot run without
pub const REQUIRED_FILES: [&str; 4] = [MOVIES_FILE, CREDITS_FILE, KEYWORDS_FILE, LINKS_FILE];

/// A row of movies_metadata.csv (only the columns the pipeline uses)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub release_date: Option<String>,
    pub popularity: Option<String>,
}

/// A row of credits.csv
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreditsRow {
    pub cast: Option<String>,
    pub crew: Option<String>,
    pub id: Option<String>,
}

/// A row of keywords.csv
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeywordsRow {
    pub id: Option<String>,
    pub keywords: Option<String>,
}

/// A row of links.csv
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkRow {
    #[serde(rename = "movieId")]
    pub movie_id: Option<String>,
    #[serde(rename = "imdbId")]
    pub imdb_id: Option<String>,
    #[serde(rename = "tmdbId")]
    pub tmdb_id: Option<String>,
}

/// Fail fast if any required input file is missing.
///
/// Files are checked in a fixed order and the first missing one is
/// reported; nothing is read until all four are present.
pub fn check_required_files(data_dir: &Path) -> Result<()> {
    for file in REQUIRED_FILES {
        if !data_dir.join(file).is_file() {
            return Err(DataLoadError::MissingFile {
                file: file.to_string(),
                dir: data_dir.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Read a CSV file into typed rows, keeping each row's raw position.
///
/// Position counts every data record (including ones that fail to
/// deserialize), so it matches the row label a dataframe would assign.
/// Records that cannot be decoded are skipped with a warning.
fn read_rows<T: DeserializeOwned>(path: &Path, file: &str) -> Result<Vec<(usize, T)>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            source,
        })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (position, record) in reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push((position, row)),
            Err(e) => {
                skipped += 1;
                warn!("Skipping unreadable row {} in {}: {}", position, file, e);
            }
        }
    }
    debug!("Read {} rows from {} ({} skipped)", rows.len(), file, skipped);
    Ok(rows)
}

/// Parse movies_metadata.csv, keeping raw row positions
pub fn parse_movies(path: &Path) -> Result<Vec<(usize, MetadataRow)>> {
    read_rows(path, MOVIES_FILE)
}

/// Parse credits.csv
pub fn parse_credits(path: &Path) -> Result<Vec<CreditsRow>> {
    Ok(read_rows(path, CREDITS_FILE)?.into_iter().map(|(_, row)| row).collect())
}

/// Parse keywords.csv
pub fn parse_keywords(path: &Path) -> Result<Vec<KeywordsRow>> {
    Ok(read_rows(path, KEYWORDS_FILE)?.into_iter().map(|(_, row)| row).collect())
}

/// Parse links.csv
pub fn parse_links(path: &Path) -> Result<Vec<LinkRow>> {
    Ok(read_rows(path, LINKS_FILE)?.into_iter().map(|(_, row)| row).collect())
}

/// Parse an integer id column value.
///
/// Accepts surrounding whitespace and a float spelling of an integer
/// ("862.0"); anything else yields `None`.
pub fn parse_id(raw: Option<&str>) -> Option<i64> {
    let text = raw?.trim();
    if let Ok(id) = text.parse::<i64>() {
        return Some(id);
    }
    let value = text.parse::<f64>().ok()?;
    (value.fract() == 0.0 && value.is_finite()).then_some(value as i64)
}

/// Parse a numeric column value, `None` when missing or not a finite number.
pub fn parse_float(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("862")), Some(862));
        assert_eq!(parse_id(Some(" 862.0 ")), Some(862));
        assert_eq!(parse_id(Some("1997-08-20")), None);
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some("21.946943")), Some(21.946943));
        assert_eq!(parse_float(Some("Beware Of Frost Bites")), None);
        assert_eq!(parse_float(Some("nan")), None);
    }

    #[test]
    fn test_check_required_files_reports_missing() {
        let dir = tempdir().unwrap();
        for file in [MOVIES_FILE, CREDITS_FILE, KEYWORDS_FILE] {
            fs::write(dir.path().join(file), "id\n").unwrap();
        }

        let err = check_required_files(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingFile { ref file, .. } if file == LINKS_FILE));

        fs::write(dir.path().join(LINKS_FILE), "movieId,imdbId,tmdbId\n").unwrap();
        assert!(check_required_files(dir.path()).is_ok());
    }

    #[test]
    fn test_parse_movies_keeps_positions_and_quoted_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MOVIES_FILE);
        fs::write(
            &path,
            "adult,genres,id,popularity,release_date,title\n\
             False,\"[{'id': 16, 'name': 'Animation'}]\",862,21.9,1995-10-30,Toy Story\n\
             False,[],8844,17.0,,Jumanji\n",
        )
        .unwrap();

        let rows = parse_movies(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 0);
        assert_eq!(rows[1].0, 1);
        assert_eq!(rows[0].1.title.as_deref(), Some("Toy Story"));
        assert_eq!(rows[0].1.genres.as_deref(), Some("[{'id': 16, 'name': 'Animation'}]"));
        assert!(rows[1].1.release_date.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(KEYWORDS_FILE);
        fs::write(&path, "id,keywords\n862,\"[{'id': 931, 'name': 'jealousy'}]\"\n15602\n").unwrap();

        let rows = parse_keywords(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id.as_deref(), Some("15602"));
        assert!(rows[1].keywords.is_none());
    }
}
