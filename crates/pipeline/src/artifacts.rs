//! Persistence of the trained model: movie table + similarity matrix.
//!
//! The two files are always written and read as a pair. Each carries a
//! header with the row count and the fingerprint of the movie table's id
//! and title columns; loading fails fast when the pair does not match.
//!
//! Files are bincode encoded and written to a temporary file first, then
//! renamed into place, so a crashed run never leaves a half-written file.

use crate::error::{PipelineError, Result};
use crate::similarity::SimilarityMatrix;
use crate::table::{ColumnSchema, MovieColumns, MovieTable};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const MOVIE_TABLE_FILE: &str = "movie_database.bin";
pub const SIMILARITY_FILE: &str = "similarity_matrix.bin";

/// Bumped whenever the on-disk layout changes
pub const FORMAT_VERSION: u32 = 1;

/// Header shared by both artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub rows: usize,
    /// [`MovieTable::fingerprint`] of the table the artifact belongs to
    pub fingerprint: String,
}

impl ArtifactHeader {
    fn for_table(table: &MovieTable) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            rows: table.len(),
            fingerprint: table.fingerprint(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MovieTableFile {
    header: ArtifactHeader,
    schema: Vec<ColumnSchema>,
    columns: MovieColumns,
}

#[derive(Debug, Deserialize)]
struct SimilarityFile {
    header: ArtifactHeader,
    matrix: SimilarityMatrix,
}

/// Write-side twin of [`SimilarityFile`]; same encoding, no matrix copy
#[derive(Serialize)]
struct SimilarityFileRef<'a> {
    header: ArtifactHeader,
    matrix: &'a SimilarityMatrix,
}

/// Where a matched pair of artifacts was written
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub movie_table: PathBuf,
    pub similarity: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            movie_table: dir.join(MOVIE_TABLE_FILE),
            similarity: dir.join(SIMILARITY_FILE),
        }
    }
}

/// Check that a table and a matrix share row indexing.
///
/// Row counts must agree and the matrix labels must equal the table's ids
/// in order.
pub fn validate_alignment(table: &MovieTable, matrix: &SimilarityMatrix) -> Result<()> {
    if table.len() != matrix.len() {
        return Err(PipelineError::ArtifactMismatch(format!(
            "movie table has {} rows, similarity matrix has {}",
            table.len(),
            matrix.len()
        )));
    }
    let ids = table.ids();
    if let Some(row) = ids.iter().zip(matrix.labels()).position(|(a, b)| a != b) {
        return Err(PipelineError::ArtifactMismatch(format!(
            "row {} is movie {} in the table but {} in the similarity matrix",
            row,
            ids[row],
            matrix.labels()[row]
        )));
    }
    Ok(())
}

/// Write both artifacts into `dir`, creating it if needed.
#[instrument(skip(table, matrix), fields(dir = %dir.display(), rows = table.len()))]
pub fn save_artifacts(dir: &Path, table: &MovieTable, matrix: &SimilarityMatrix) -> Result<ArtifactPaths> {
    validate_alignment(table, matrix)?;
    fs::create_dir_all(dir)?;

    let header = ArtifactHeader::for_table(table);
    let paths = ArtifactPaths::in_dir(dir);

    write_atomic(
        &paths.movie_table,
        &MovieTableFile {
            header: header.clone(),
            schema: MovieColumns::schema(),
            columns: table.to_columns(),
        },
    )?;
    write_atomic(
        &paths.similarity,
        &SimilarityFileRef { header, matrix },
    )?;

    info!(
        "Saved artifacts to {} and {}",
        paths.movie_table.display(),
        paths.similarity.display()
    );
    Ok(paths)
}

/// Load a matched pair of artifacts from `dir`.
#[instrument(fields(dir = %dir.display()))]
pub fn load_artifacts(dir: &Path) -> Result<(MovieTable, SimilarityMatrix)> {
    let paths = ArtifactPaths::in_dir(dir);

    let table_file: MovieTableFile = read_file(&paths.movie_table)?;
    check_version(&table_file.header)?;
    if table_file.schema != MovieColumns::schema() {
        return Err(PipelineError::ArtifactMismatch(format!(
            "{} has an unexpected column schema",
            MOVIE_TABLE_FILE
        )));
    }
    let table = MovieTable::from_columns(table_file.columns)?;

    let matrix_file: SimilarityFile = read_file(&paths.similarity)?;
    check_version(&matrix_file.header)?;

    let fingerprint = table.fingerprint();
    for (name, header) in [
        (MOVIE_TABLE_FILE, &table_file.header),
        (SIMILARITY_FILE, &matrix_file.header),
    ] {
        if header.rows != table.len() {
            return Err(PipelineError::ArtifactMismatch(format!(
                "{} declares {} rows, movie table has {}",
                name,
                header.rows,
                table.len()
            )));
        }
        if header.fingerprint != fingerprint {
            return Err(PipelineError::ArtifactMismatch(format!(
                "{} was built from a different movie table",
                name
            )));
        }
    }

    // Re-check CSR structure, deserialization bypasses it
    let (labels, scores) = matrix_file.matrix.into_parts();
    let matrix = SimilarityMatrix::from_parts(labels, scores)?;
    validate_alignment(&table, &matrix)?;

    info!(
        "Loaded {} movies and {} stored similarity scores",
        table.len(),
        matrix.nnz()
    );
    Ok((table, matrix))
}

fn check_version(header: &ArtifactHeader) -> Result<()> {
    if header.format_version != FORMAT_VERSION {
        return Err(PipelineError::UnsupportedVersion {
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(())
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = bincode::serialize(value)?;
    let temp = path.with_extension("tmp");
    fs::write(&temp, &data)?;
    fs::rename(&temp, path)?;
    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path)?;
    Ok(bincode::deserialize(&data)?)
}
