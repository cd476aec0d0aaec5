//! 8-node serendipity axisymmetric element.
//!
//! Integrates the axisymmetric elasticity weak form over one element of the
//! meridian section. The volume element of the body of revolution is
//! `dV = 2π r dr dz`, so every Gauss-point contribution carries the local
//! radius and the element totals are scaled by 2π.
//!
//! Strain rows are `[ε_r, ε_z, ε_θ, γ_rz]` and DOF columns are interleaved
//! `(u_r, u_z)` per local node:
//!
//! ```text
//!        [ ∂Nᵢ/∂r    0     ]
//! Bᵢ =   [   0     ∂Nᵢ/∂z  ]
//!        [ Nᵢ/r      0     ]
//!        [ ∂Nᵢ/∂z  ∂Nᵢ/∂r  ]
//! ```

use crate::element::gauss::gauss_quad;
use crate::element::shape;
use crate::error::{Error, Result};
use crate::mesh::{DOFS_PER_NODE, ELEMENT_DOFS, NODES_PER_ELEMENT};
use crate::types::{ConstitutiveMatrix, Point2};
use nalgebra::{Matrix2, SMatrix, SVector, Vector2};
use std::f64::consts::PI;

/// Interpolation matrix N (2×16): `u(ξ, η) = N · a_e`.
pub type ShapeMatrix = SMatrix<f64, 2, ELEMENT_DOFS>;

/// Strain-displacement matrix B (4×16): `ε = B · a_e`.
pub type StrainMatrix = SMatrix<f64, 4, ELEMENT_DOFS>;

/// Element stiffness matrix (16×16).
pub type ElementMatrix = SMatrix<f64, ELEMENT_DOFS, ELEMENT_DOFS>;

/// Element DOF vector (16).
pub type ElementVector = SVector<f64, ELEMENT_DOFS>;

/// Quantities evaluated at one Gauss point, reused by stress recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussPointState {
    pub n: ShapeMatrix,
    pub b: StrainMatrix,
    pub det_j: f64,
    /// Radius r = Σ Nᵢ rᵢ of the Gauss point.
    pub radius: f64,
    /// Product of the quadrature weights.
    pub weight: f64,
}

/// Result of integrating one element.
#[derive(Debug, Clone)]
pub struct ElementIntegration {
    pub stiffness: ElementMatrix,
    /// Equivalent nodal forces of the body force.
    pub body_load: ElementVector,
    /// One state per Gauss point, in quadrature order.
    pub points: Vec<GaussPointState>,
    /// Volume of the ring swept by the element.
    pub volume: f64,
}

/// Axisymmetric Q8 element kernel.
#[derive(Debug, Clone, Copy)]
pub struct Quad8Axisymmetric {
    order: usize,
}

impl Quad8Axisymmetric {
    /// Kernel with the standard 2×2 reduced integration.
    pub fn new() -> Self {
        Self { order: 2 }
    }

    /// Number of Gauss points per element.
    pub fn n_points(&self) -> usize {
        self.order * self.order
    }

    /// Evaluate N, B, det(J) and r at (ξ, η).
    ///
    /// Returns `Err(det_j)` when the Jacobian determinant is not positive.
    pub fn point_state(
        coords: &[Point2; NODES_PER_ELEMENT],
        xi: f64,
        eta: f64,
        weight: f64,
    ) -> std::result::Result<GaussPointState, f64> {
        let eval = shape::evaluate(xi, eta);

        // J = [[∂r/∂ξ, ∂z/∂ξ], [∂r/∂η, ∂z/∂η]]
        let mut jac = Matrix2::zeros();
        let mut radius = 0.0;
        for (i, c) in coords.iter().enumerate() {
            jac[(0, 0)] += eval.dn_dxi[i] * c[0];
            jac[(0, 1)] += eval.dn_dxi[i] * c[1];
            jac[(1, 0)] += eval.dn_deta[i] * c[0];
            jac[(1, 1)] += eval.dn_deta[i] * c[1];
            radius += eval.n[i] * c[0];
        }

        let det_j = jac.determinant();
        if !(det_j > 0.0) {
            return Err(det_j);
        }

        let mut n = ShapeMatrix::zeros();
        let mut b = StrainMatrix::zeros();
        for i in 0..NODES_PER_ELEMENT {
            let dn_dr = (jac[(1, 1)] * eval.dn_dxi[i] - jac[(0, 1)] * eval.dn_deta[i]) / det_j;
            let dn_dz = (-jac[(1, 0)] * eval.dn_dxi[i] + jac[(0, 0)] * eval.dn_deta[i]) / det_j;
            let col_r = DOFS_PER_NODE * i;
            let col_z = col_r + 1;

            n[(0, col_r)] = eval.n[i];
            n[(1, col_z)] = eval.n[i];

            b[(0, col_r)] = dn_dr;
            b[(1, col_z)] = dn_dz;
            b[(2, col_r)] = eval.n[i] / radius;
            b[(3, col_r)] = dn_dz;
            b[(3, col_z)] = dn_dr;
        }

        Ok(GaussPointState {
            n,
            b,
            det_j,
            radius,
            weight,
        })
    }

    /// Integrate stiffness and body-force vector of element `element`.
    ///
    /// `element` only labels errors.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidGeometry`] if det(J) ≤ 0 at any Gauss point.
    /// - [`Error::InconsistentInput`] if a Gauss point lies on or beyond the axis.
    pub fn integrate(
        &self,
        element: usize,
        coords: &[Point2; NODES_PER_ELEMENT],
        d: &ConstitutiveMatrix,
        body_force: &Vector2<f64>,
    ) -> Result<ElementIntegration> {
        let mut stiffness = ElementMatrix::zeros();
        let mut body_load = ElementVector::zeros();
        let mut points = Vec::with_capacity(self.n_points());
        let mut volume = 0.0;

        for (point, gp) in gauss_quad(self.order).iter().enumerate() {
            let state = Self::point_state(coords, gp.xi(), gp.eta(), gp.weight).map_err(
                |det_j| Error::InvalidGeometry {
                    element,
                    point,
                    det_j,
                },
            )?;
            if !(state.radius > 0.0) {
                return Err(Error::InconsistentInput(format!(
                    "element {}: Gauss point {} lies at r = {} (must be positive)",
                    element, point, state.radius
                )));
            }

            let factor = state.det_j * state.radius * state.weight;
            stiffness += state.b.transpose() * d * state.b * factor;
            body_load += state.n.transpose() * body_force * factor;
            volume += factor;
            points.push(state);
        }

        let revolution = 2.0 * PI;
        Ok(ElementIntegration {
            stiffness: stiffness * revolution,
            body_load: body_load * revolution,
            points,
            volume: volume * revolution,
        })
    }
}

impl Default for Quad8Axisymmetric {
    fn default() -> Self {
        Self::new()
    }
}
