//! Constrained/free DOF partition and the reduced static solve.
//!
//! With constrained DOFs C (prescribed `a_c`) and free DOFs D:
//!
//! ```text
//! K_dd a_d = f_d − K_dc a_c
//! q_c      = K_cc a_c + K_cd a_d − f_c
//! ```
//!
//! The full displacement vector joins `a_c` and `a_d`; the reaction vector is
//! `q_c` on C and zero on D.

use crate::error::{Error, Result};
use crate::loads::Constraint;
use crate::mesh::DOFS_PER_NODE;
use crate::solver::{select_solver, SolveStats, Solver, SolverConfig};
use crate::sparse::{diagonal_summary, extract_block, spmv, CsrMatrix};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Instant;

/// Split of the global DOFs into free and constrained sets, both ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct DofPartition {
    free: Vec<usize>,
    constrained: Vec<usize>,
    prescribed: Vec<f64>,
}

impl DofPartition {
    /// Partition `n_dofs` DOFs.
    ///
    /// A DOF listed more than once keeps the last prescribed value.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentInput`] for a DOF index `>= n_dofs` or a
    /// non-finite prescribed value.
    pub fn new(n_dofs: usize, constraints: &[Constraint]) -> Result<Self> {
        let mut by_dof = BTreeMap::new();
        for c in constraints {
            if c.dof >= n_dofs {
                return Err(Error::InconsistentInput(format!(
                    "constraint on DOF {} (node {}) outside the {} system DOFs",
                    c.dof,
                    c.dof / DOFS_PER_NODE,
                    n_dofs
                )));
            }
            if !c.value.is_finite() {
                return Err(Error::InconsistentInput(format!(
                    "constraint on DOF {} has non-finite value {}",
                    c.dof, c.value
                )));
            }
            if let Some(previous) = by_dof.insert(c.dof, c.value) {
                if previous != c.value {
                    warn!(
                        "DOF {} constrained twice ({} then {}); keeping the last value",
                        c.dof, previous, c.value
                    );
                }
            }
        }

        let constrained: Vec<usize> = by_dof.keys().copied().collect();
        let prescribed: Vec<f64> = by_dof.values().copied().collect();
        let free = (0..n_dofs).filter(|d| !by_dof.contains_key(d)).collect();

        Ok(Self {
            free,
            constrained,
            prescribed,
        })
    }

    pub fn free(&self) -> &[usize] {
        &self.free
    }

    pub fn constrained(&self) -> &[usize] {
        &self.constrained
    }

    /// Prescribed values, aligned with [`DofPartition::constrained`].
    pub fn prescribed(&self) -> &[f64] {
        &self.prescribed
    }

    pub fn n_dofs(&self) -> usize {
        self.free.len() + self.constrained.len()
    }
}

/// Displacements and reactions of the static problem.
#[derive(Debug, Clone)]
pub struct StaticSolution {
    /// Full displacement vector a.
    pub displacements: Vec<f64>,
    /// Reaction vector q (non-zero only on constrained DOFs).
    pub reactions: Vec<f64>,
    pub stats: SolveStats,
}

/// Solve the partitioned system for `stiffness` and `load`.
///
/// # Errors
///
/// [`Error::SingularSystem`] if K_dd has a zero diagonal entry, the
/// factorization fails, the solution is not finite, or the solution implies
/// a condition number above `config.singularity_threshold`.
pub fn solve_partitioned(
    stiffness: &CsrMatrix,
    load: &[f64],
    partition: &DofPartition,
    config: &SolverConfig,
) -> Result<StaticSolution> {
    let n_dofs = partition.n_dofs();
    if stiffness.nrows() != n_dofs || stiffness.ncols() != n_dofs || load.len() != n_dofs {
        return Err(Error::InconsistentInput(format!(
            "system is {}x{} with {} loads but the partition covers {} DOFs",
            stiffness.nrows(),
            stiffness.ncols(),
            load.len(),
            n_dofs
        )));
    }

    let start = Instant::now();
    let free = partition.free();
    let constrained = partition.constrained();
    let a_c = partition.prescribed();

    let k_dd = extract_block(stiffness, free, free)?;
    let k_dc = extract_block(stiffness, free, constrained)?;

    let coupling = spmv(&k_dc, a_c);
    let rhs: Vec<f64> = free
        .iter()
        .zip(&coupling)
        .map(|(&d, &kc)| load[d] - kc)
        .collect();

    let solver = select_solver(config, free.len());
    info!(
        "solving {} free DOFs ({} constrained) with {}",
        free.len(),
        constrained.len(),
        solver.name()
    );

    let mut condition_estimate = 0.0;
    let a_d = if free.is_empty() {
        Vec::new()
    } else {
        let (max_diag, zero_diag) = diagonal_summary(&k_dd);
        if let Some(i) = zero_diag {
            return Err(Error::SingularSystem(format!(
                "free DOF {} (node {}) has no stiffness",
                free[i],
                free[i] / DOFS_PER_NODE
            )));
        }

        let a_d = solver.solve(&k_dd, &rhs)?;
        if a_d.iter().any(|v| !v.is_finite()) {
            return Err(Error::SingularSystem(
                "reduced solve produced non-finite displacements".into(),
            ));
        }

        condition_estimate = estimate_condition(solver.as_ref(), &k_dd, &rhs, &a_d, max_diag)?;
        if condition_estimate > config.singularity_threshold {
            return Err(Error::SingularSystem(format!(
                "condition estimate {:e} exceeds {:e}; the body is not fully constrained",
                condition_estimate, config.singularity_threshold
            )));
        }
        a_d
    };

    let mut displacements = vec![0.0; n_dofs];
    for (&d, &v) in free.iter().zip(&a_d) {
        displacements[d] = v;
    }
    for (&c, &v) in constrained.iter().zip(a_c) {
        displacements[c] = v;
    }

    let k_cc = extract_block(stiffness, constrained, constrained)?;
    let k_cd = extract_block(stiffness, constrained, free)?;
    let kcc_ac = spmv(&k_cc, a_c);
    let kcd_ad = spmv(&k_cd, &a_d);

    let mut reactions = vec![0.0; n_dofs];
    for (i, &c) in constrained.iter().enumerate() {
        reactions[c] = kcc_ac[i] + kcd_ad[i] - load[c];
    }

    let time_seconds = start.elapsed().as_secs_f64();
    debug!(
        "reduced solve finished in {:.3} ms, condition estimate {:e}",
        time_seconds * 1e3,
        condition_estimate
    );

    Ok(StaticSolution {
        displacements,
        reactions,
        stats: SolveStats {
            solver: solver.name().to_string(),
            n_free: free.len(),
            n_constrained: constrained.len(),
            nnz: k_dd.nnz(),
            condition_estimate,
            time_seconds,
        },
    })
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// `‖x‖∞ · max|Aᵢᵢ| / ‖b‖∞` for the solve just done, or for a probe solve
/// with `b = 1` when the load on the free DOFs vanishes.
fn estimate_condition(
    solver: &dyn Solver,
    matrix: &CsrMatrix,
    rhs: &[f64],
    solution: &[f64],
    max_diag: f64,
) -> Result<f64> {
    let rhs_norm = max_abs(rhs);
    if rhs_norm > 0.0 {
        return Ok(max_abs(solution) * max_diag / rhs_norm);
    }

    let probe = solver.solve(matrix, &vec![1.0; rhs.len()])?;
    if probe.iter().any(|v| !v.is_finite()) {
        return Err(Error::SingularSystem(
            "probe solve produced non-finite values".into(),
        ));
    }
    Ok(max_abs(&probe) * max_diag)
}
