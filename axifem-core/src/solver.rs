//! Linear system solvers for the reduced (free-DOF) stiffness system.
//!
//! # Solver Backends
//!
//! - [`FaerCholeskySolver`]: sparse LLᵀ from faer. The reduced stiffness
//!   matrix of a properly constrained body is symmetric positive definite.
//! - [`DenseLUSolver`]: nalgebra dense LU, used for small systems.

use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;
use faer::linalg::cholesky::llt::factor::LltError;
use faer::prelude::*;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use serde::{Deserialize, Serialize};

/// Linear solver interface.
pub trait Solver: Send + Sync {
    /// Solve `A x = b`.
    ///
    /// Implementations report a failed factorization as
    /// [`Error::SingularSystem`].
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;
}

/// Solver selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverType {
    /// Sparse Cholesky.
    Direct,
    /// Dense LU.
    Dense,
    /// Dense LU up to `auto_threshold` free DOFs, sparse Cholesky above.
    #[default]
    Auto,
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub solver_type: SolverType,
    /// Largest system solved densely under [`SolverType::Auto`].
    pub auto_threshold: usize,
    /// Upper bound accepted for `‖x‖∞ · max|Aᵢᵢ| / ‖b‖∞`, a lower bound of
    /// the condition number. Larger values are reported as singular.
    pub singularity_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_type: SolverType::Auto,
            auto_threshold: 200,
            singularity_threshold: 1e12,
        }
    }
}

/// Solution statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Solver name used.
    pub solver: String,
    /// Number of free DOFs.
    pub n_free: usize,
    /// Number of constrained DOFs.
    pub n_constrained: usize,
    /// Stored entries of the reduced matrix.
    pub nnz: usize,
    /// `‖x‖∞ · max|Aᵢᵢ| / ‖b‖∞` of the reduced solve.
    pub condition_estimate: f64,
    /// Wall-clock time in seconds.
    pub time_seconds: f64,
}

/// Dense LU via nalgebra, for small systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseLUSolver;

impl DenseLUSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DenseLUSolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        use nalgebra::{DMatrix, DVector};

        let n = check_dimensions(matrix, rhs)?;
        if n == 0 {
            return Ok(vec![]);
        }

        let dense = DMatrix::from(matrix);
        let b = DVector::from_column_slice(rhs);
        let solution = dense
            .lu()
            .solve(&b)
            .ok_or_else(|| Error::SingularSystem("LU factorization hit a zero pivot".into()))?;

        Ok(solution.as_slice().to_vec())
    }

    fn name(&self) -> &str {
        "nalgebra dense LU"
    }
}

/// Sparse Cholesky solver using faer.
///
/// ```ignore
/// let solver = FaerCholeskySolver::new();
/// let a_d = solver.solve(&k_dd, &rhs)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerCholeskySolver;

impl FaerCholeskySolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for FaerCholeskySolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_dimensions(matrix, rhs)?;
        if n == 0 {
            return Ok(vec![]);
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|e| Error::Solver(format!("symbolic Cholesky analysis failed: {:?}", e)))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower).map_err(
            |e| match e {
                SparseLltError::Generic(err) => {
                    Error::Solver(format!("sparse Cholesky error: {:?}", err))
                }
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularSystem(format!(
                        "reduced stiffness is not positive definite (pivot {})",
                        index
                    ))
                }
            },
        )?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        llt.solve_in_place(x.as_mut());

        Ok((0..n).map(|i| x[(i, 0)]).collect())
    }

    fn name(&self) -> &str {
        "faer sparse Cholesky (LLᵀ)"
    }
}

fn check_dimensions(matrix: &CsrMatrix, rhs: &[f64]) -> Result<usize> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(Error::Solver(format!(
            "matrix must be square, got {}x{}",
            n,
            matrix.ncols()
        )));
    }
    if n != rhs.len() {
        return Err(Error::Solver(format!(
            "RHS length {} does not match matrix size {}",
            rhs.len(),
            n
        )));
    }
    Ok(n)
}

/// Convert a CSR matrix to faer's CSC layout by transposing the index arrays.
fn csr_to_faer_csc(csr: &CsrMatrix) -> SparseColMat<usize, f64> {
    let nrows = csr.nrows();
    let ncols = csr.ncols();
    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    let mut col_offsets = vec![0usize; ncols + 1];
    for &col in col_indices {
        col_offsets[col + 1] += 1;
    }
    for i in 0..ncols {
        col_offsets[i + 1] += col_offsets[i];
    }

    let nnz = values.len();
    let mut row_indices = vec![0usize; nnz];
    let mut csc_values = vec![0.0f64; nnz];
    let mut next = col_offsets[..ncols].to_vec();

    for row in 0..nrows {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            let pos = next[col];
            row_indices[pos] = row;
            csc_values[pos] = values[idx];
            next[col] += 1;
        }
    }

    // SAFETY: rows are visited in increasing order, so every column holds
    // sorted, unique row indices and col_offsets is a valid prefix sum.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, row_indices),
            csc_values,
        )
    }
}

/// Select a solver from the configuration and the number of free DOFs.
pub fn select_solver(config: &SolverConfig, n_free: usize) -> Box<dyn Solver> {
    match config.solver_type {
        SolverType::Direct => Box::new(FaerCholeskySolver::new()),
        SolverType::Dense => Box::new(DenseLUSolver::new()),
        SolverType::Auto => {
            if n_free <= config.auto_threshold {
                Box::new(DenseLUSolver::new())
            } else {
                Box::new(FaerCholeskySolver::new())
            }
        }
    }
}
