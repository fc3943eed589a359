//! # Data Loader Crate
//!
//! This crate handles loading and cleaning the raw movie metadata dataset
//! (movies_metadata.csv, credits.csv, keywords.csv, links.csv).
//!
//! ## Main Components
//!
//! - **types**: Raw domain types (RawMovie, NamedEntry, Dataset, LoadOptions)
//! - **parser**: Read the CSV files into typed rows
//! - **literal**: Parse the Python-literal encoded nested columns
//! - **index**: Drop, join and order rows into the final Dataset
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, LoadOptions};
//! use std::path::Path;
//!
//! let dataset = Dataset::load(Path::new("data/the-movies-dataset"), &LoadOptions::default())?;
//! println!("{} movies ready for feature engineering", dataset.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod literal;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{Dataset, LoadOptions, MovieId, NamedEntry, RawMovie, KNOWN_BAD_ROWS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
        assert_eq!(dataset.links_count, 0);
    }
}
