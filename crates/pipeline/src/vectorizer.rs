//! Bag-of-words vectorizer: soups → sparse term-count matrix.
//!
//! ## Algorithm
//! 1. Lowercase each document and extract word tokens (`\b\w\w+\b`)
//! 2. Drop English stop words
//! 3. Build n-grams (default: unigrams and bigrams) from adjacent tokens
//! 4. Keep terms found in at least `min_df` documents
//! 5. Keep the `max_features` terms with the highest corpus counts
//! 6. Columns are the surviving terms in alphabetical order
//!
//! The vocabulary is not persisted; it only shapes the count matrix that
//! feeds the similarity engine.

use crate::error::{PipelineError, Result};
use crate::sparse::CsrMatrix;
use crate::stop_words::ENGLISH_STOP_WORDS;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Vectorizer parameters
#[derive(Debug, Clone)]
pub struct VectorizerConfig {
    /// Inclusive n-gram range, e.g. `(1, 2)` for unigrams and bigrams
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Cap on vocabulary size after `min_df` filtering
    pub max_features: Option<usize>,
    pub token_pattern: String,
    pub use_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            min_df: 3,
            max_features: Some(15_000),
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            use_stop_words: true,
        }
    }
}

/// Term → column mapping, columns in alphabetical term order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    fn from_sorted(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.clone(), col as u32))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column of a term, if it survived pruning
    pub fn column(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Output of [`CountVectorizer::fit_transform`]
#[derive(Debug, Clone)]
pub struct CountMatrix {
    pub vocabulary: Vocabulary,
    /// One row per document, one column per vocabulary term
    pub counts: CsrMatrix<u32>,
}

pub struct CountVectorizer {
    config: VectorizerConfig,
    token_pattern: Regex,
    stop_words: HashSet<&'static str>,
}

impl CountVectorizer {
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        let (lo, hi) = config.ngram_range;
        if lo == 0 || lo > hi {
            return Err(PipelineError::InvalidConfig(format!(
                "ngram_range ({}, {}) must satisfy 1 <= min <= max",
                lo, hi
            )));
        }
        if config.min_df == 0 {
            return Err(PipelineError::InvalidConfig("min_df must be at least 1".to_string()));
        }
        let token_pattern = Regex::new(&config.token_pattern)?;
        let stop_words = if config.use_stop_words {
            ENGLISH_STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        Ok(Self {
            config,
            token_pattern,
            stop_words,
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Turn one document into its list of terms (with repetition).
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lowered = doc.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .collect();

        let (lo, hi) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in lo..=hi.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learn the vocabulary and build the count matrix in one pass.
    #[instrument(skip_all, fields(documents = docs.len()))]
    pub fn fit_transform<D: AsRef<str> + Sync>(&self, docs: &[D]) -> Result<CountMatrix> {
        if docs.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        let doc_counts: Vec<HashMap<String, u32>> = docs
            .par_iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for term in self.analyze(doc.as_ref()) {
                    *counts.entry(term).or_insert(0u32) += 1;
                }
                counts
            })
            .collect();

        // term -> (document frequency, corpus count)
        let mut stats: HashMap<&str, (usize, u64)> = HashMap::new();
        for counts in &doc_counts {
            for (term, &count) in counts {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count as u64;
            }
        }
        debug!("{} candidate terms before pruning", stats.len());

        let mut kept: Vec<(&str, u64)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= self.config.min_df)
            .map(|(term, (_, total))| (term, total))
            .collect();
        debug!("{} terms with df >= {}", kept.len(), self.config.min_df);

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                kept.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                kept.truncate(limit);
            }
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term.to_string()).collect();
        terms.sort_unstable();
        if terms.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                min_df: self.config.min_df,
            });
        }
        let vocabulary = Vocabulary::from_sorted(terms);

        let mut counts = CsrMatrix::new(vocabulary.len());
        for doc in &doc_counts {
            let mut row: Vec<(u32, u32)> = doc
                .iter()
                .filter_map(|(term, &count)| vocabulary.column(term).map(|col| (col, count)))
                .collect();
            row.sort_unstable_by_key(|&(col, _)| col);
            counts.push_row(row);
        }

        info!(
            "Count matrix: {} documents x {} terms ({} non-zero)",
            counts.n_rows(),
            counts.n_cols(),
            counts.nnz()
        );
        Ok(CountMatrix { vocabulary, counts })
    }
}
