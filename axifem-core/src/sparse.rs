//! Sparse matrix storage for the global system.
//!
//! Element matrices are accumulated as COO triplets and compressed to CSR
//! once assembly is complete. The partitioned solve extracts DOF blocks of
//! the CSR matrix and multiplies them with dense vectors.

use crate::error::{Error, Result};
use nalgebra::storage::RawStorage;
use nalgebra::{Dim, Matrix};
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// COO builder; duplicate entries are summed on conversion.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Add a value at (row, col). Exact zeros are skipped.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "row index out of bounds");
        debug_assert!(col < self.n_cols, "column index out of bounds");

        if value != 0.0 {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
    }

    /// Scatter a square element matrix onto the global DOFs `dofs`.
    pub fn add_submatrix<R, C, S>(&mut self, dofs: &[usize], submatrix: &Matrix<f64, R, C, S>)
    where
        R: Dim,
        C: Dim,
        S: RawStorage<f64, R, C>,
    {
        debug_assert_eq!(submatrix.nrows(), dofs.len());
        debug_assert_eq!(submatrix.ncols(), dofs.len());

        for (i, &row) in dofs.iter().enumerate() {
            for (j, &col) in dofs.iter().enumerate() {
                self.add(row, col, submatrix[(i, j)]);
            }
        }
    }

    /// Number of stored triplets (before duplicate summation).
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR, summing duplicate entries.
    pub fn to_csr(self) -> Result<CsrMatrix> {
        let coo = CooMatrix::try_from_triplets(
            self.n_rows,
            self.n_cols,
            self.rows,
            self.cols,
            self.values,
        )
        .map_err(|e| Error::Assembly(format!("invalid triplet data: {}", e)))?;

        Ok(CsrMatrix::from(&coo))
    }
}

/// Add `values` into `target` at positions `indices`.
pub fn scatter_add(target: &mut [f64], indices: &[usize], values: &[f64]) {
    debug_assert_eq!(indices.len(), values.len());
    for (&idx, &val) in indices.iter().zip(values) {
        target[idx] += val;
    }
}

/// Sub-matrix `A[rows, cols]` in the order the index lists are given.
pub fn extract_block(matrix: &CsrMatrix, rows: &[usize], cols: &[usize]) -> Result<CsrMatrix> {
    let mut col_map = vec![None; matrix.ncols()];
    for (local, &global) in cols.iter().enumerate() {
        col_map[global] = Some(local);
    }

    let mut block = TripletMatrix::new(rows.len(), cols.len());
    for (local_row, &global_row) in rows.iter().enumerate() {
        let row = matrix.row(global_row);
        for (&col, &value) in row.col_indices().iter().zip(row.values()) {
            if let Some(local_col) = col_map[col] {
                block.add(local_row, local_col, value);
            }
        }
    }
    block.to_csr()
}

/// Sparse matrix-vector product `y = A x`.
pub fn spmv(matrix: &CsrMatrix, x: &[f64]) -> Vec<f64> {
    debug_assert_eq!(matrix.ncols(), x.len());
    matrix
        .row_iter()
        .map(|row| {
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&j, &v)| v * x[j])
                .sum::<f64>()
        })
        .collect()
}

/// Largest absolute diagonal entry and the index of the first zero diagonal.
pub fn diagonal_summary(matrix: &CsrMatrix) -> (f64, Option<usize>) {
    let mut max_diag = 0.0_f64;
    let mut first_zero = None;
    for i in 0..matrix.nrows().min(matrix.ncols()) {
        let d = matrix
            .get_entry(i, i)
            .map(|entry| entry.into_value())
            .unwrap_or(0.0);
        if d == 0.0 && first_zero.is_none() {
            first_zero = Some(i);
        }
        max_diag = max_diag.max(d.abs());
    }
    (max_diag, first_zero)
}
