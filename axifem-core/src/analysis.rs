//! End-to-end static analysis.
//!
//! [`run_analysis`] reads a [`ModelProvider`], validates it, assembles K and
//! f, solves the partitioned system and recovers nodal fields. Every phase
//! owns its output and hands it to the next one by value.

use crate::assembly::{assemble, AssemblyOptions};
use crate::boundary::{solve_partitioned, DofPartition};
use crate::error::{Error, Result};
use crate::material::STANDARD_GRAVITY;
use crate::mesh::{Mesh, DOFS_PER_NODE};
use crate::provider::ModelProvider;
use crate::solver::{SolveStats, SolverConfig};
use crate::stress::recover;
use crate::types::PrincipalStress;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Options for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Acceleration of gravity along −z used for self-weight.
    pub gravity: f64,
    pub assembly: AssemblyOptions,
    pub solver: SolverConfig,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY,
            assembly: AssemblyOptions::default(),
            solver: SolverConfig::default(),
        }
    }
}

/// Results at one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub node: usize,
    pub r: f64,
    pub z: f64,
    /// `[u_r, u_z]`
    pub displacement: [f64; 2],
    /// Equivalent nodal load `[f_r, f_z]`.
    pub load: [f64; 2],
    /// Reaction `[q_r, q_z]`, zero on free DOFs.
    pub reaction: [f64; 2],
    /// `[ε_r, ε_z, ε_θ, γ_rz]`
    pub strain: [f64; 4],
    /// `[σ_r, σ_z, σ_θ, τ_rz]`
    pub stress: [f64; 4],
    pub principal: PrincipalStress,
}

/// Strain and stress at one Gauss point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussPointResult {
    pub element: usize,
    pub point: usize,
    pub radius: f64,
    pub strain: [f64; 4],
    pub stress: [f64; 4],
}

/// Everything produced by [`run_analysis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub n_nodes: usize,
    pub n_elements: usize,
    pub n_dofs: usize,
    /// Volume of the body of revolution.
    pub volume: f64,
    /// Global displacement vector a.
    pub displacements: Vec<f64>,
    /// Global equivalent load vector f.
    pub loads: Vec<f64>,
    /// Global reaction vector q.
    pub reactions: Vec<f64>,
    pub nodes: Vec<NodeResult>,
    pub gauss_points: Vec<GaussPointResult>,
    pub stats: SolveStats,
}

impl AnalysisResults {
    /// Sum of reactions `[Σ q_r, Σ q_z]`.
    pub fn total_reaction(&self) -> [f64; 2] {
        sum_pairs(&self.reactions)
    }

    /// Sum of equivalent loads `[Σ f_r, Σ f_z]`.
    pub fn total_load(&self) -> [f64; 2] {
        sum_pairs(&self.loads)
    }

    /// Largest nodal displacement magnitude.
    pub fn max_displacement(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.displacement[0].hypot(n.displacement[1]))
            .fold(0.0, f64::max)
    }

    pub fn max_von_mises(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.principal.von_mises)
            .fold(0.0, f64::max)
    }
}

fn sum_pairs(values: &[f64]) -> [f64; 2] {
    values
        .chunks_exact(DOFS_PER_NODE)
        .fold([0.0, 0.0], |acc, v| [acc[0] + v[0], acc[1] + v[1]])
}

/// Run a linear static analysis of `provider`.
///
/// # Errors
///
/// - [`Error::InconsistentInput`] for node coordinates that are not finite or
///   lie at r < 0, out-of-range indices, or an empty material table with
///   elements present. All of these are detected before any computation.
/// - [`Error::InvalidMaterial`], [`Error::InvalidGeometry`] and
///   [`Error::UnsupportedEdge`] from assembly.
/// - [`Error::SingularSystem`] if the constraints leave a rigid-body mode.
pub fn run_analysis<P: ModelProvider + ?Sized>(
    provider: &P,
    options: &AnalysisOptions,
) -> Result<AnalysisResults> {
    let start = Instant::now();

    let mesh = provider.mesh()?;
    let materials = provider.materials();
    let constraints = provider.constraints();
    let point_loads = provider.point_loads();
    let distributed_loads = provider.distributed_loads();

    validate_nodes(&mesh)?;
    if !options.gravity.is_finite() {
        return Err(Error::InconsistentInput(format!(
            "gravity must be finite, got {}",
            options.gravity
        )));
    }
    let partition = DofPartition::new(mesh.n_dofs(), &constraints)?;

    info!(
        "analysis: {} nodes, {} elements, {} materials, {} constraints",
        mesh.n_nodes(),
        mesh.n_elements(),
        materials.len(),
        partition.constrained().len()
    );

    let system = assemble(
        &mesh,
        &materials,
        &point_loads,
        &distributed_loads,
        options.gravity,
        &options.assembly,
    )?;
    let solution = solve_partitioned(&system.stiffness, &system.load, &partition, &options.solver)?;
    let recovery = recover(&mesh, &materials, &system.gauss_cache, &solution.displacements)?;

    let nodes = mesh
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (ur, uz) = (DOFS_PER_NODE * i, DOFS_PER_NODE * i + 1);
            NodeResult {
                node: i,
                r: p[0],
                z: p[1],
                displacement: [solution.displacements[ur], solution.displacements[uz]],
                load: [system.load[ur], system.load[uz]],
                reaction: [solution.reactions[ur], solution.reactions[uz]],
                strain: recovery.nodal.strains[i].as_array(),
                stress: recovery.nodal.stresses[i].as_array(),
                principal: recovery.nodal.principal[i],
            }
        })
        .collect();

    let mut gauss_points =
        Vec::with_capacity(mesh.n_elements() * system.gauss_cache.points_per_element());
    for (element, field) in recovery.gauss.iter().enumerate() {
        for (point, state) in system.gauss_cache.element(element).iter().enumerate() {
            gauss_points.push(GaussPointResult {
                element,
                point,
                radius: state.radius,
                strain: field.strains[point].as_array(),
                stress: field.stresses[point].as_array(),
            });
        }
    }

    let results = AnalysisResults {
        n_nodes: mesh.n_nodes(),
        n_elements: mesh.n_elements(),
        n_dofs: mesh.n_dofs(),
        volume: system.volume,
        displacements: solution.displacements,
        loads: system.load,
        reactions: solution.reactions,
        nodes,
        gauss_points,
        stats: solution.stats,
    };

    info!(
        "analysis finished in {:.3} s: max |u| = {:e}, max von Mises = {:e}",
        start.elapsed().as_secs_f64(),
        results.max_displacement(),
        results.max_von_mises()
    );
    Ok(results)
}

fn validate_nodes(mesh: &Mesh) -> Result<()> {
    for (i, p) in mesh.nodes().iter().enumerate() {
        if !p[0].is_finite() || !p[1].is_finite() {
            return Err(Error::InconsistentInput(format!(
                "node {} has non-finite coordinates ({}, {})",
                i, p[0], p[1]
            )));
        }
        if p[0] < 0.0 {
            return Err(Error::InconsistentInput(format!(
                "node {} lies at negative radius r = {}",
                i, p[0]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{Constraint, Direction, PointLoad, RestraintGroup};
    use crate::material::Material;
    use crate::provider::Model;
    use crate::testing::{nodes_at_r, nodes_at_z, ring_square, strip};
    use crate::types::Point2;
    use approx::assert_relative_eq;

    fn fixture() -> Model {
        let mut model = Model::new(ring_square(), vec![Material::new(1e6, 0.3, 0.0).unwrap()]);
        model.restrain(&RestraintGroup::new(vec![0, 6, 7], Direction::Rz));
        model.with_point_loads([PointLoad { dof: 5, value: 1.0 }])
    }

    #[test]
    fn test_fixture_results() {
        let results = run_analysis(&fixture(), &AnalysisOptions::default()).unwrap();
        assert_eq!(results.n_dofs, 16);
        assert_relative_eq!(results.nodes[2].displacement[0], 3.722276e-7, max_relative = 1e-5);
        assert_relative_eq!(results.nodes[2].displacement[1], 8.751152e-7, max_relative = 1e-5);
        assert_relative_eq!(results.total_reaction()[1], -1.0, epsilon = 1e-9);
        assert_eq!(results.gauss_points.len(), 4);
        assert_eq!(results.nodes[2].load, [0.0, 1.0]);
    }

    #[test]
    fn test_self_weight_reaction_balances_weight() {
        let rho = 7800.0;
        let g = 10.0;
        let mesh = strip(1.0, 2.0, 0.0, 0.5, 3);
        let bottom = nodes_at_z(&mesh, 0.0);
        let mut model = Model::new(mesh, vec![Material::new(2e11, 0.3, rho).unwrap()]);
        model.restrain(&RestraintGroup::new(bottom, Direction::Rz));
        let options = AnalysisOptions {
            gravity: g,
            ..AnalysisOptions::default()
        };
        let results = run_analysis(&model, &options).unwrap();

        let weight = rho * g * results.volume;
        assert_relative_eq!(results.total_load()[1], -weight, max_relative = 1e-12);
        assert_relative_eq!(results.total_reaction()[1], weight, max_relative = 1e-9);
    }

    #[test]
    fn test_unconstrained_model_is_singular() {
        let model = Model::new(ring_square(), vec![Material::steel()])
            .with_point_loads([PointLoad { dof: 5, value: 1.0 }]);
        let result = run_analysis(&model, &AnalysisOptions::default());
        assert!(matches!(result, Err(Error::SingularSystem(_))));
    }

    #[test]
    fn test_axial_restraint_missing_is_singular() {
        // Radial restraint only: axial translation stays free
        let mesh = ring_square();
        let inner = nodes_at_r(&mesh, 1.0);
        let mut model = Model::new(mesh, vec![Material::steel()]);
        model.restrain(&RestraintGroup::new(inner, Direction::R));
        let model = model.with_point_loads([PointLoad { dof: 5, value: 1.0 }]);
        let result = run_analysis(&model, &AnalysisOptions::default());
        assert!(matches!(result, Err(Error::SingularSystem(_))));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut model = fixture();
        let mut mesh = Mesh::new();
        mesh.add_nodes(model.mesh.nodes().iter().map(|p| Point2::new(p[0] - 1.5, p[1])));
        mesh.add_element([0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
        model.mesh = mesh;
        let result = run_analysis(&model, &AnalysisOptions::default());
        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    fn test_out_of_range_constraint_rejected() {
        let mut model = fixture();
        model.constraints.push(Constraint::fixed(99));
        let result = run_analysis(&model, &AnalysisOptions::default());
        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    fn test_options_from_json() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"solver": {"solver_type": "direct"}}"#).unwrap();
        assert_eq!(options.gravity, STANDARD_GRAVITY);
        assert_eq!(options.assembly.n_threads, 0);
        assert!(!options.assembly.revolve_edge_loads);
        assert_eq!(options.solver.auto_threshold, 200);
    }

    #[test]
    fn test_results_serialize() {
        let results = run_analysis(&fixture(), &AnalysisOptions::default()).unwrap();
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 8);
        assert!(json["nodes"][2]["principal"]["von_mises"].as_f64().unwrap() > 0.0);
        assert_eq!(json["stats"]["n_free"], 10);
    }
}
