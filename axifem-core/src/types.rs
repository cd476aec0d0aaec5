//! Core data types for axisymmetric analysis.
//!
//! Strain and stress use the 4-component axisymmetric Voigt ordering
//! `[r, z, θ, rz]`, matching the rows of the strain-displacement matrix.
//! The full 3×3 tensors are laid out in the `(r, θ, z)` basis.

use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in the meridian half-plane: `[r, z]`.
pub type Point2 = Vector2<f64>;

/// Axisymmetric constitutive matrix mapping `[ε_r, ε_z, ε_θ, γ_rz]` to
/// `[σ_r, σ_z, σ_θ, τ_rz]`.
pub type ConstitutiveMatrix = Matrix4<f64>;

/// Axisymmetric stress in Voigt notation: `[σ_r, σ_z, σ_θ, τ_rz]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTensor(pub Vector4<f64>);

impl StressTensor {
    pub fn new(components: [f64; 4]) -> Self {
        Self(Vector4::from_row_slice(&components))
    }

    pub fn zero() -> Self {
        Self(Vector4::zeros())
    }

    /// Von Mises equivalent stress computed from the components.
    pub fn von_mises(&self) -> f64 {
        let (sr, sz, st, trz) = (self.0[0], self.0[1], self.0[2], self.0[3]);
        let normal = (sr - sz).powi(2) + (sz - st).powi(2) + (st - sr).powi(2);
        ((normal + 6.0 * trz * trz) / 2.0).sqrt()
    }

    /// Full Cauchy tensor in the `(r, θ, z)` basis. τ_rθ and τ_θz are zero.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let (sr, sz, st, trz) = (self.0[0], self.0[1], self.0[2], self.0[3]);
        Matrix3::new(
            sr,  0.0, trz,
            0.0, st,  0.0,
            trz, 0.0, sz,
        )
    }

    /// Principal stresses sorted σ1 ≥ σ2 ≥ σ3 with matching unit directions.
    pub fn principal(&self) -> PrincipalStress {
        let eigen = self.to_matrix().symmetric_eigen();

        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let values = order.map(|i| eigen.eigenvalues[i]);
        let directions = order.map(|i| {
            let v: Vector3<f64> = eigen.eigenvectors.column(i).into_owned();
            [v[0], v[1], v[2]]
        });

        PrincipalStress::from_sorted(values, directions)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }
}

/// Axisymmetric engineering strain: `[ε_r, ε_z, ε_θ, γ_rz]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainTensor(pub Vector4<f64>);

impl StrainTensor {
    pub fn new(components: [f64; 4]) -> Self {
        Self(Vector4::from_row_slice(&components))
    }

    pub fn zero() -> Self {
        Self(Vector4::zeros())
    }

    /// Volumetric strain ε_r + ε_z + ε_θ.
    pub fn volumetric(&self) -> f64 {
        self.0[0] + self.0[1] + self.0[2]
    }

    /// Stress from this strain through the constitutive matrix.
    pub fn stress(&self, d: &ConstitutiveMatrix) -> StressTensor {
        StressTensor(d * self.0)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }
}

/// Principal decomposition of a nodal stress state.
///
/// Direction components are given in the `(r, θ, z)` basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalStress {
    /// `[σ1, σ2, σ3]`, descending.
    pub values: [f64; 3],
    /// Unit direction of each principal stress, same order as `values`.
    pub directions: [[f64; 3]; 3],
    /// Maximum shear stress (σ1 − σ3) / 2.
    pub tau_max: f64,
    /// Von Mises equivalent stress.
    pub von_mises: f64,
}

impl PrincipalStress {
    fn from_sorted(values: [f64; 3], directions: [[f64; 3]; 3]) -> Self {
        let [s1, s2, s3] = values;
        let von_mises =
            (((s1 - s2).powi(2) + (s2 - s3).powi(2) + (s1 - s3).powi(2)) / 2.0).sqrt();
        Self {
            values,
            directions,
            tau_max: (s1 - s3) / 2.0,
            von_mises,
        }
    }

    /// Principal decomposition of a zero stress state.
    pub fn zero() -> Self {
        StressTensor::zero().principal()
    }
}
