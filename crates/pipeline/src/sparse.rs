//! Compressed sparse row (CSR) matrix.
//!
//! Used for both the term-count matrix (`CsrMatrix<u32>`) and the stored
//! similarity scores (`CsrMatrix<f32>`). Column indices inside a row are
//! strictly increasing, which `get` relies on for binary search.

use serde::{Deserialize, Serialize};

/// Row-major sparse matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix<T> {
    n_cols: usize,
    /// `indptr[i]..indptr[i + 1]` is the slice of row `i` in `indices`/`data`
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<T>,
}

impl<T: Copy> CsrMatrix<T> {
    /// An empty matrix with zero rows and `n_cols` columns.
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a row given as `(column, value)` pairs sorted by column.
    ///
    /// # Panics
    /// In debug builds, if the columns are unsorted or out of range.
    pub fn push_row(&mut self, entries: impl IntoIterator<Item = (u32, T)>) {
        let start = self.indices.len();
        for (col, value) in entries {
            debug_assert!((col as usize) < self.n_cols, "column {} out of range", col);
            debug_assert!(
                self.indices.len() == start || *self.indices.last().unwrap_or(&0) < col,
                "row columns must be strictly increasing"
            );
            self.indices.push(col);
            self.data.push(value);
        }
        self.indptr.push(self.indices.len());
    }

    #[cfg(test)]
    pub(crate) fn from_raw(n_cols: usize, indptr: Vec<usize>, indices: Vec<u32>, data: Vec<T>) -> Self {
        Self {
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Stored columns and values of one row.
    pub fn row(&self, i: usize) -> (&[u32], &[T]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    /// Stored value at `(i, j)`, `None` when the entry is not stored.
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        if i >= self.n_rows() || j >= self.n_cols {
            return None;
        }
        let (cols, values) = self.row(i);
        cols.binary_search(&(j as u32)).ok().map(|pos| values[pos])
    }

    /// Check the structural invariants, returning a description of the
    /// first violation. Used on data read back from disk.
    pub fn validate(&self) -> Result<(), String> {
        if self.indptr.is_empty() {
            return Err("indptr is empty".to_string());
        }
        if self.indptr[0] != 0 {
            return Err("indptr must start at 0".to_string());
        }
        if self.indices.len() != self.data.len() {
            return Err("indices and data lengths disagree".to_string());
        }
        if self.indptr.iter().any(|&p| p > self.indices.len()) {
            return Err("indptr points past the stored entries".to_string());
        }
        if let Some(i) = self.indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(format!("indptr decreases at row {}", i));
        }
        if self.indptr.last() != Some(&self.indices.len()) {
            return Err("indptr does not cover every stored entry".to_string());
        }
        // Every row range is now in bounds
        for i in 0..self.n_rows() {
            let (cols, _) = self.row(i);
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("row {} has unsorted columns", i));
            }
            if cols.last().is_some_and(|&c| c as usize >= self.n_cols) {
                return Err(format!("row {} has a column out of range", i));
            }
        }
        Ok(())
    }
}
