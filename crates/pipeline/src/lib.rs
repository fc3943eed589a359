//! Offline training pipeline for content-based movie recommendations.
//!
//! This crate provides:
//! - Text normalization and stemming of soup tokens
//! - FeatureComposer for turning raw movies into records and soups
//! - CountVectorizer for the sparse term-count matrix
//! - The cosine similarity engine
//! - MovieTable and the artifact files the server loads
//!
//! ## Architecture
//! The pipeline processes the dataset in stages:
//! 1. FeatureComposer builds a `MovieRecord` (with soup) per movie
//! 2. CountVectorizer turns soups into unigram/bigram counts
//! 3. `similarity::compute` builds the N×N cosine matrix
//! 4. `artifacts::save_artifacts` writes the table and matrix as a pair
//!
//! Row `i` of the table is row/column `i` of the matrix at every stage.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{TrainingConfig, artifacts, training};
//!
//! let model = training::train_from_dir(Path::new("data/the-movies-dataset"), &TrainingConfig::default())?;
//! artifacts::save_artifacts(Path::new("."), &model.table, &model.similarity)?;
//! ```

pub mod artifacts;
pub mod error;
pub mod features;
pub mod normalize;
pub mod similarity;
pub mod sparse;
pub mod stop_words;
pub mod table;
pub mod training;
pub mod vectorizer;

// Re-export main types
pub use artifacts::{load_artifacts, save_artifacts, validate_alignment};
pub use error::{PipelineError, Result};
pub use features::FeatureComposer;
pub use similarity::SimilarityMatrix;
pub use sparse::CsrMatrix;
pub use table::{MovieRecord, MovieTable};
pub use training::{TrainedModel, TrainingConfig};
pub use vectorizer::{CountVectorizer, VectorizerConfig};
