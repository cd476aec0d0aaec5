//! Equivalent nodal forces of a distributed traction on a quadratic edge.
//!
//! An edge is named by its three local nodes in canonical order, so the four
//! sides of the element are `123`, `345`, `567` and `781`. Tractions are given
//! as `[t_r, t_z]` at each of the three edge nodes and interpolated with the
//! quadratic edge basis. The edge matrix is `∫ r Nᵀ N ds`, per radian of
//! revolution; [`EdgeLoadKernel::revolved`] scales it by `2π`, the same
//! factor the element stiffness and body loads carry.

use crate::element::gauss::gauss_1d;
use crate::element::shape::{edge_derivatives, edge_functions};
use crate::error::{Error, Result};
use crate::mesh::DOFS_PER_NODE;
use crate::types::Point2;
use nalgebra::{Matrix6, SMatrix, Vector6};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A side of the 8-node element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Edge {
    E123,
    E345,
    E567,
    E781,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::E123, Edge::E345, Edge::E567, Edge::E781];

    /// Numeric id made of the 1-based local node numbers.
    pub fn id(self) -> u32 {
        match self {
            Edge::E123 => 123,
            Edge::E345 => 345,
            Edge::E567 => 567,
            Edge::E781 => 781,
        }
    }

    /// 0-based local node indices along the edge, counter-clockwise.
    pub fn local_nodes(self) -> [usize; 3] {
        match self {
            Edge::E123 => [0, 1, 2],
            Edge::E345 => [2, 3, 4],
            Edge::E567 => [4, 5, 6],
            Edge::E781 => [6, 7, 0],
        }
    }
}

impl TryFrom<u32> for Edge {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        Edge::ALL
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| {
                Error::UnsupportedEdge(format!(
                    "edge id {} is not one of 123, 345, 567, 781",
                    id
                ))
            })
    }
}

impl From<Edge> for u32 {
    fn from(edge: Edge) -> u32 {
        edge.id()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Integrates edge tractions into element equivalent loads.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLoadKernel {
    order: usize,
    revolve: bool,
}

impl EdgeLoadKernel {
    /// Two-point rule along the edge.
    pub fn new() -> Self {
        Self {
            order: 2,
            revolve: false,
        }
    }

    /// Integrate over the full revolution (`dA = 2π r ds`).
    pub fn revolved(mut self, revolve: bool) -> Self {
        self.revolve = revolve;
        self
    }

    /// Consistent edge matrix `∫ r Nᵀ N ds` (6×6, DOFs ordered
    /// `(t_r, t_z)` per edge node), times `2π` when revolved.
    pub fn edge_matrix(&self, coords: &[Point2], edge: Edge) -> Result<Matrix6<f64>> {
        check_node_count(coords.len())?;
        let local = edge.local_nodes();

        let mut m = Matrix6::zeros();
        for (xi, w) in gauss_1d(self.order) {
            let n = edge_functions(xi);
            let dn = edge_derivatives(xi);

            let mut dr = 0.0;
            let mut dz = 0.0;
            let mut r = 0.0;
            for k in 0..3 {
                let p = coords[local[k]];
                dr += dn[k] * p[0];
                dz += dn[k] * p[1];
                r += n[k] * p[0];
            }
            let ds = dr.hypot(dz);

            let mut nmat = SMatrix::<f64, 2, 6>::zeros();
            for k in 0..3 {
                nmat[(0, 2 * k)] = n[k];
                nmat[(1, 2 * k + 1)] = n[k];
            }
            m += nmat.transpose() * nmat * (r * ds * w);
        }
        if self.revolve {
            m *= 2.0 * PI;
        }
        Ok(m)
    }

    /// Equivalent nodal forces of `tractions` applied on `edge`.
    ///
    /// Returns a vector of `2 · coords.len()` entries that is zero except at
    /// the DOFs of the three edge nodes.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedEdge`] unless the element has 8 or 9 nodes.
    pub fn equivalent_forces(
        &self,
        coords: &[Point2],
        edge: Edge,
        tractions: &[f64; 6],
    ) -> Result<Vec<f64>> {
        let m = self.edge_matrix(coords, edge)?;
        let f = m * Vector6::from_row_slice(tractions);

        let mut forces = vec![0.0; DOFS_PER_NODE * coords.len()];
        for (k, &node) in edge.local_nodes().iter().enumerate() {
            forces[DOFS_PER_NODE * node] += f[2 * k];
            forces[DOFS_PER_NODE * node + 1] += f[2 * k + 1];
        }
        Ok(forces)
    }
}

impl Default for EdgeLoadKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn check_node_count(n: usize) -> Result<()> {
    if n == 8 || n == 9 {
        Ok(())
    } else {
        Err(Error::UnsupportedEdge(format!(
            "edge loads need an 8- or 9-node element, got {} nodes",
            n
        )))
    }
}
