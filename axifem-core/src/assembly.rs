//! Parallel finite element assembly.
//!
//! Element kernels run independently on a rayon pool. Their results are then
//! merged in element order into the global COO builder and load vector, so
//! the assembled system and the first reported error do not depend on
//! thread scheduling. The Gauss-point states computed by the kernels are kept
//! in a flat arena for stress recovery.

use crate::element::{EdgeLoadKernel, ElementIntegration, GaussPointState, Quad8Axisymmetric};
use crate::error::{Error, Result};
use crate::loads::{DistributedLoad, PointLoad};
use crate::material::Material;
use crate::mesh::{Mesh, DOFS_PER_NODE, ELEMENT_DOFS};
use crate::sparse::{scatter_add, CsrMatrix, TripletMatrix};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Assembly options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Number of worker threads (0 = rayon's global pool).
    pub n_threads: usize,
    /// Multiply edge tractions by `2π` like the element integrals.
    /// Off by default: edge loads are then per radian of revolution.
    pub revolve_edge_loads: bool,
}

/// Per-element, per-Gauss-point N, B, det(J) and radius.
///
/// Indexed by `(element, point)`; built once during assembly and read by
/// post-processing.
#[derive(Debug, Clone, Default)]
pub struct GaussPointCache {
    points_per_element: usize,
    states: Vec<GaussPointState>,
}

impl GaussPointCache {
    /// States of one element, in quadrature order.
    pub fn element(&self, element: usize) -> &[GaussPointState] {
        let start = element * self.points_per_element;
        &self.states[start..start + self.points_per_element]
    }

    pub fn get(&self, element: usize, point: usize) -> Option<&GaussPointState> {
        if point >= self.points_per_element {
            return None;
        }
        self.states.get(element * self.points_per_element + point)
    }

    pub fn points_per_element(&self) -> usize {
        self.points_per_element
    }

    pub fn n_elements(&self) -> usize {
        if self.points_per_element == 0 {
            0
        } else {
            self.states.len() / self.points_per_element
        }
    }
}

/// Assembled system ready for partitioning.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    /// Global stiffness matrix K.
    pub stiffness: CsrMatrix,
    /// Global equivalent load vector f (body, edge and point loads).
    pub load: Vec<f64>,
    /// Number of DOFs in the system.
    pub n_dofs: usize,
    /// Gauss-point states of every element.
    pub gauss_cache: GaussPointCache,
    /// Total volume of the body of revolution.
    pub volume: f64,
}

/// Assemble K and f for `mesh`.
///
/// Every element uses `materials[element.material]`; self-weight acts with
/// acceleration `gravity` along -z.
///
/// # Errors
///
/// - [`Error::InconsistentInput`] for out-of-range material, element or DOF
///   indices.
/// - [`Error::InvalidMaterial`] for inadmissible material properties.
/// - [`Error::InvalidGeometry`] from the element kernel; the first failing
///   element (lowest index) is reported and nothing is returned.
/// - [`Error::UnsupportedEdge`] from the edge kernel.
pub fn assemble(
    mesh: &Mesh,
    materials: &[Material],
    point_loads: &[PointLoad],
    distributed_loads: &[DistributedLoad],
    gravity: f64,
    options: &AssemblyOptions,
) -> Result<AssembledSystem> {
    let n_dofs = mesh.n_dofs();
    check_references(mesh, materials, point_loads, distributed_loads)?;

    info!(
        "assembling {} elements, {} DOFs, {} edge loads, {} point loads",
        mesh.n_elements(),
        n_dofs,
        distributed_loads.len(),
        point_loads.len()
    );
    let start = Instant::now();

    let constitutive: Vec<_> = materials
        .iter()
        .map(Material::constitutive_axisymmetric)
        .collect();
    let body_forces: Vec<_> = materials.iter().map(|m| m.body_force(gravity)).collect();
    let kernel = Quad8Axisymmetric::new();

    let integrate_all = || -> Vec<Result<ElementIntegration>> {
        mesh.elements()
            .par_iter()
            .enumerate()
            .map(|(idx, conn)| {
                let coords = mesh
                    .element_coords(idx)
                    .ok_or_else(|| Error::InconsistentInput(format!("missing element {}", idx)))?;
                kernel.integrate(
                    idx,
                    &coords,
                    &constitutive[conn.material],
                    &body_forces[conn.material],
                )
            })
            .collect()
    };

    let integrations = if options.n_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(options.n_threads)
            .build()
            .map_err(|e| Error::Assembly(format!("cannot build thread pool: {}", e)))?
            .install(integrate_all)
    } else {
        integrate_all()
    };

    let nnz_estimate = mesh.n_elements() * ELEMENT_DOFS * ELEMENT_DOFS;
    let mut triplet = TripletMatrix::with_capacity(n_dofs, n_dofs, nnz_estimate);
    let mut load = vec![0.0; n_dofs];
    let mut states = Vec::with_capacity(mesh.n_elements() * kernel.n_points());
    let mut volume = 0.0;

    for (conn, integration) in mesh.elements().iter().zip(integrations) {
        let integration = integration?;
        let dofs = conn.dofs();
        triplet.add_submatrix(&dofs, &integration.stiffness);
        scatter_add(&mut load, &dofs, integration.body_load.as_slice());
        volume += integration.volume;
        states.extend(integration.points);
    }

    let edge_kernel = EdgeLoadKernel::new().revolved(options.revolve_edge_loads);
    for dl in distributed_loads {
        let conn = &mesh.elements()[dl.element];
        let coords = mesh.element_coords(dl.element).ok_or_else(|| {
            Error::InconsistentInput(format!("missing element {}", dl.element))
        })?;
        let forces = edge_kernel.equivalent_forces(&coords, dl.edge, &dl.tractions)?;
        scatter_add(&mut load, &conn.dofs(), &forces);
    }

    for pl in point_loads {
        load[pl.dof] += pl.value;
    }

    let stiffness = triplet.to_csr()?;
    debug!(
        "assembly finished in {:.3} ms ({} stored entries)",
        start.elapsed().as_secs_f64() * 1e3,
        stiffness.nnz()
    );

    Ok(AssembledSystem {
        stiffness,
        load,
        n_dofs,
        gauss_cache: GaussPointCache {
            points_per_element: kernel.n_points(),
            states,
        },
        volume,
    })
}

fn check_references(
    mesh: &Mesh,
    materials: &[Material],
    point_loads: &[PointLoad],
    distributed_loads: &[DistributedLoad],
) -> Result<()> {
    for material in materials {
        material.validate()?;
    }
    for (idx, conn) in mesh.elements().iter().enumerate() {
        if conn.material >= materials.len() {
            return Err(Error::InconsistentInput(format!(
                "element {} references material {} but only {} are defined",
                idx,
                conn.material,
                materials.len()
            )));
        }
    }
    for pl in point_loads {
        if pl.dof >= mesh.n_dofs() {
            return Err(Error::InconsistentInput(format!(
                "point load on DOF {} (node {}) outside the {} mesh DOFs",
                pl.dof,
                pl.dof / DOFS_PER_NODE,
                mesh.n_dofs()
            )));
        }
    }
    for dl in distributed_loads {
        if dl.element >= mesh.n_elements() {
            return Err(Error::InconsistentInput(format!(
                "distributed load on element {} but the mesh has {} elements",
                dl.element,
                mesh.n_elements()
            )));
        }
    }
    Ok(())
}
