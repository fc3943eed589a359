//! Error types for the training pipeline and its artifacts.

use data_loader::DataLoadError;
use thiserror::Error;

/// Errors raised while building, saving or loading the recommendation model
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The raw dataset could not be loaded
    #[error(transparent)]
    Data(#[from] DataLoadError),

    /// The vectorizer was given no documents
    #[error("Cannot vectorize an empty corpus")]
    EmptyCorpus,

    /// Every candidate term was pruned by stop words or frequency limits
    #[error("Empty vocabulary: documents only contain stop words or terms below min_df={min_df}")]
    EmptyVocabulary { min_df: usize },

    /// Vectorizer parameters that cannot produce a vocabulary
    #[error("Invalid vectorizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),

    /// Two structures that must share row indexing disagree in size
    #[error("Shape mismatch: expected {expected} rows, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// The movie table and similarity matrix are not a matched pair
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// An artifact was written by an unknown format version
    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
