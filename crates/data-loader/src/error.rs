//! Error types for the data-loader crate.
//!
//! Only precondition and I/O failures surface as errors. Malformed rows
//! and malformed nested fields are recovered locally (dropped or defaulted
//! to empty) and reported through `tracing` instead.

use thiserror::Error;

/// Errors that can occur while loading the raw movie dataset
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// One of the required input tables is not present in the data directory
    #[error("Missing file: {file} in {dir}")]
    MissingFile { file: String, dir: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader could not be opened or its header could not be read
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a table's header
    #[error("Column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },

    /// A nested field could not be parsed as a Python literal
    ///
    /// Callers of the dataset loader never see this variant: the loader
    /// degrades the field to an empty list. It is public so the literal
    /// parser can be used on its own.
    #[error("Literal parse error at offset {offset}: {reason}")]
    LiteralError { offset: usize, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
