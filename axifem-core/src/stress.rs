//! Strain and stress recovery from the displacement solution.
//!
//! The recovery pipeline:
//! 1. For every element, gather its nodal displacements a_e
//! 2. At each cached Gauss point compute ε = B a_e and σ = D ε
//! 3. Extrapolate the four Gauss-point values to the eight nodes
//! 4. Average the nodal values over the elements sharing each node
//! 5. Decompose the averaged nodal stress into principal values
//!
//! Steps 1 and 2 run in parallel over elements. Steps 3 to 5 are sequential.

use crate::assembly::GaussPointCache;
use crate::element::ElementVector;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::{Mesh, NODES_PER_ELEMENT};
use crate::types::{PrincipalStress, StrainTensor, StressTensor};
use log::debug;
use nalgebra::Vector4;
use rayon::prelude::*;

const SQRT3_2: f64 = 0.866_025_403_784_438_6;
const SQRT3_4: f64 = 0.433_012_701_892_219_3;

/// Bilinear extrapolation from the 2×2 Gauss points to the 8 element nodes.
///
/// Rows follow the canonical node order, columns the Gauss-point order
/// `(−,−), (−,+), (+,−), (+,+)` in `(ξ, η)`.
pub const EXTRAPOLATION: [[f64; EXTRAPOLATION_POINTS]; NODES_PER_ELEMENT] = [
    [1.0 + SQRT3_2, -0.5, -0.5, 1.0 - SQRT3_2],
    [SQRT3_4 + 0.25, 0.25 - SQRT3_4, SQRT3_4 + 0.25, 0.25 - SQRT3_4],
    [-0.5, 1.0 - SQRT3_2, 1.0 + SQRT3_2, -0.5],
    [0.25 - SQRT3_4, 0.25 - SQRT3_4, SQRT3_4 + 0.25, SQRT3_4 + 0.25],
    [1.0 - SQRT3_2, -0.5, -0.5, 1.0 + SQRT3_2],
    [0.25 - SQRT3_4, SQRT3_4 + 0.25, 0.25 - SQRT3_4, SQRT3_4 + 0.25],
    [-0.5, 1.0 + SQRT3_2, 1.0 - SQRT3_2, -0.5],
    [SQRT3_4 + 0.25, SQRT3_4 + 0.25, 0.25 - SQRT3_4, 0.25 - SQRT3_4],
];

/// Number of Gauss points the extrapolation expects per element.
pub const EXTRAPOLATION_POINTS: usize = 4;

/// Strain and stress at the Gauss points of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussField {
    pub strains: Vec<StrainTensor>,
    pub stresses: Vec<StressTensor>,
}

/// Averaged nodal fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NodalField {
    pub strains: Vec<StrainTensor>,
    pub stresses: Vec<StressTensor>,
    pub principal: Vec<PrincipalStress>,
    /// Number of elements contributing to each node.
    pub valence: Vec<usize>,
}

impl NodalField {
    pub fn n_nodes(&self) -> usize {
        self.strains.len()
    }

    /// Largest nodal von Mises stress.
    pub fn max_von_mises(&self) -> f64 {
        self.principal
            .iter()
            .map(|p| p.von_mises)
            .fold(0.0, f64::max)
    }
}

/// Gauss-point fields and the nodal fields derived from them.
#[derive(Debug, Clone)]
pub struct StressRecovery {
    pub gauss: Vec<GaussField>,
    pub nodal: NodalField,
}

/// Gauss-point strains and stresses of every element.
///
/// # Errors
///
/// [`Error::InconsistentInput`] if the cache, the displacement vector or the
/// material table does not match `mesh`.
pub fn recover_gauss_fields(
    mesh: &Mesh,
    materials: &[Material],
    cache: &GaussPointCache,
    displacements: &[f64],
) -> Result<Vec<GaussField>> {
    if displacements.len() != mesh.n_dofs() {
        return Err(Error::InconsistentInput(format!(
            "{} displacements for a mesh with {} DOFs",
            displacements.len(),
            mesh.n_dofs()
        )));
    }
    if cache.n_elements() != mesh.n_elements() {
        return Err(Error::InconsistentInput(format!(
            "Gauss-point cache holds {} elements, mesh has {}",
            cache.n_elements(),
            mesh.n_elements()
        )));
    }
    if let Some((idx, conn)) = mesh
        .elements()
        .iter()
        .enumerate()
        .find(|(_, conn)| conn.material >= materials.len())
    {
        return Err(Error::InconsistentInput(format!(
            "element {} references material {} but only {} are defined",
            idx,
            conn.material,
            materials.len()
        )));
    }

    let constitutive: Vec<_> = materials
        .iter()
        .map(Material::constitutive_axisymmetric)
        .collect();

    let fields = mesh
        .elements()
        .par_iter()
        .enumerate()
        .map(|(idx, conn)| {
            let dofs = conn.dofs();
            let a_e = ElementVector::from_fn(|i, _| displacements[dofs[i]]);
            let d = &constitutive[conn.material];

            let strains: Vec<StrainTensor> = cache
                .element(idx)
                .iter()
                .map(|state| StrainTensor(state.b * a_e))
                .collect();
            let stresses = strains.iter().map(|eps| eps.stress(d)).collect();
            GaussField { strains, stresses }
        })
        .collect();

    Ok(fields)
}

/// Extrapolate Gauss-point fields to the nodes and average over adjacent
/// elements. Nodes without elements keep zero fields.
///
/// # Errors
///
/// [`Error::InconsistentInput`] if the field count differs from the element
/// count or an element does not carry exactly four Gauss points.
pub fn extrapolate_to_nodes(mesh: &Mesh, gauss: &[GaussField]) -> Result<NodalField> {
    if gauss.len() != mesh.n_elements() {
        return Err(Error::InconsistentInput(format!(
            "{} Gauss fields for {} elements",
            gauss.len(),
            mesh.n_elements()
        )));
    }

    let n_nodes = mesh.n_nodes();
    let mut strain_sum = vec![Vector4::<f64>::zeros(); n_nodes];
    let mut stress_sum = vec![Vector4::<f64>::zeros(); n_nodes];
    let mut valence = vec![0usize; n_nodes];

    for (idx, (conn, field)) in mesh.elements().iter().zip(gauss).enumerate() {
        if field.strains.len() != EXTRAPOLATION_POINTS
            || field.stresses.len() != EXTRAPOLATION_POINTS
        {
            return Err(Error::InconsistentInput(format!(
                "element {} has {} Gauss points, extrapolation needs {}",
                idx,
                field.strains.len(),
                EXTRAPOLATION_POINTS
            )));
        }

        for (local, &node) in conn.nodes.iter().enumerate() {
            let row = &EXTRAPOLATION[local];
            for p in 0..EXTRAPOLATION_POINTS {
                strain_sum[node] += field.strains[p].0 * row[p];
                stress_sum[node] += field.stresses[p].0 * row[p];
            }
            valence[node] += 1;
        }
    }

    let mut strains = Vec::with_capacity(n_nodes);
    let mut stresses = Vec::with_capacity(n_nodes);
    for ((eps, sig), &count) in strain_sum.iter().zip(&stress_sum).zip(&valence) {
        if count == 0 {
            strains.push(StrainTensor::zero());
            stresses.push(StressTensor::zero());
        } else {
            let scale = 1.0 / count as f64;
            strains.push(StrainTensor(eps * scale));
            stresses.push(StressTensor(sig * scale));
        }
    }
    let principal = stresses.iter().map(StressTensor::principal).collect();

    Ok(NodalField {
        strains,
        stresses,
        principal,
        valence,
    })
}

/// Full recovery: Gauss-point fields, then averaged nodal fields.
pub fn recover(
    mesh: &Mesh,
    materials: &[Material],
    cache: &GaussPointCache,
    displacements: &[f64],
) -> Result<StressRecovery> {
    let gauss = recover_gauss_fields(mesh, materials, cache, displacements)?;
    let nodal = extrapolate_to_nodes(mesh, &gauss)?;
    debug!(
        "recovered {} Gauss fields, max nodal von Mises {:e}",
        gauss.len(),
        nodal.max_von_mises()
    );
    Ok(StressRecovery { gauss, nodal })
}
