//! Similarity engine: all-pairs cosine similarity over sparse count rows.
//!
//! ## Algorithm
//! 1. L2-normalize every row (in f64); zero rows stay zero
//! 2. Build an inverted index: column → [(row, weight)]
//! 3. For each row `i` (in parallel), walk its columns in ascending order
//!    and accumulate `w_ik * w_jk` into a dense scratch buffer for every
//!    row `j` in the column's postings
//! 4. Clamp into [0, 1], cast to f32, keep non-zero entries
//!
//! Each pair (i, j) sums the same products in the same column order from
//! both sides, so the result is exactly symmetric. The diagonal is stored
//! as 1.0 for every row.

use crate::error::{PipelineError, Result};
use crate::sparse::CsrMatrix;
use data_loader::MovieId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Square cosine-similarity matrix labelled with movie ids.
///
/// Row/column `i` belongs to the movie with id `labels[i]`, which is also
/// row `i` of the movie table it was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    labels: Vec<MovieId>,
    scores: CsrMatrix<f32>,
}

impl SimilarityMatrix {
    pub fn from_parts(labels: Vec<MovieId>, scores: CsrMatrix<f32>) -> Result<Self> {
        scores.validate().map_err(PipelineError::ArtifactMismatch)?;
        if scores.n_rows() != labels.len() || scores.n_cols() != labels.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: labels.len(),
                found: scores.n_rows().max(scores.n_cols()),
            });
        }
        Ok(Self { labels, scores })
    }

    pub fn into_parts(self) -> (Vec<MovieId>, CsrMatrix<f32>) {
        (self.labels, self.scores)
    }

    /// Number of rows (= columns)
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of stored (non-zero) scores
    pub fn nnz(&self) -> usize {
        self.scores.nnz()
    }

    pub fn labels(&self) -> &[MovieId] {
        &self.labels
    }

    /// Similarity between rows `i` and `j`; unstored entries are 0.
    ///
    /// # Panics
    /// If either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.len() && j < self.len(), "index ({}, {}) out of range", i, j);
        self.scores.get(i, j).unwrap_or(0.0)
    }

    /// Stored entries of one row as `(column, score)` pairs.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let (cols, values) = self.scores.row(i);
        cols.iter().zip(values).map(|(&c, &v)| (c as usize, v))
    }
}

/// Compute the cosine-similarity matrix of a count matrix.
///
/// `labels` gives the movie id of each row and must match its row count.
#[instrument(skip_all, fields(rows = counts.n_rows(), cols = counts.n_cols()))]
pub fn compute(counts: &CsrMatrix<u32>, labels: Vec<MovieId>) -> Result<SimilarityMatrix> {
    let n = counts.n_rows();
    if labels.len() != n {
        return Err(PipelineError::ShapeMismatch {
            expected: n,
            found: labels.len(),
        });
    }

    let weights: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let (_, values) = counts.row(i);
            let norm = values.iter().map(|&v| (v as f64) * (v as f64)).sum::<f64>().sqrt();
            if norm == 0.0 {
                vec![0.0; values.len()]
            } else {
                values.iter().map(|&v| v as f64 / norm).collect()
            }
        })
        .collect();

    // Column postings in ascending row order
    let mut postings: Vec<Vec<(u32, f64)>> = vec![Vec::new(); counts.n_cols()];
    for (i, row_weights) in weights.iter().enumerate() {
        let (cols, _) = counts.row(i);
        for (&col, &w) in cols.iter().zip(row_weights) {
            postings[col as usize].push((i as u32, w));
        }
    }

    let rows: Vec<Vec<(u32, f32)>> = (0..n)
        .into_par_iter()
        .map_init(
            || (vec![0.0f64; n], Vec::<u32>::new()),
            |(scratch, touched), i| {
                let (cols, _) = counts.row(i);
                for (&col, &w_i) in cols.iter().zip(&weights[i]) {
                    for &(j, w_j) in &postings[col as usize] {
                        let slot = &mut scratch[j as usize];
                        if *slot == 0.0 {
                            touched.push(j);
                        }
                        *slot += w_i * w_j;
                    }
                }

                touched.sort_unstable();
                touched.dedup();
                let mut row = Vec::with_capacity(touched.len() + 1);
                let mut diagonal_written = false;
                for &j in touched.iter() {
                    let value = std::mem::take(&mut scratch[j as usize]);
                    if j as usize == i {
                        row.push((j, 1.0));
                        diagonal_written = true;
                        continue;
                    }
                    let score = value.clamp(0.0, 1.0) as f32;
                    if score > 0.0 {
                        row.push((j, score));
                    }
                }
                touched.clear();
                if !diagonal_written {
                    let pos = row.partition_point(|&(j, _)| (j as usize) < i);
                    row.insert(pos, (i as u32, 1.0));
                }
                row
            },
        )
        .collect();

    let mut scores = CsrMatrix::new(n);
    for row in rows {
        scores.push_row(row);
    }
    info!(
        "Similarity matrix: {} x {} ({} stored scores)",
        n,
        n,
        scores.nnz()
    );
    Ok(SimilarityMatrix { labels, scores })
}
