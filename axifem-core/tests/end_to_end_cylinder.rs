//! Thick-walled cylinder under internal pressure, compared with Lamé.
//!
//! The ends are held at u_z = 0 (plane strain), so
//!
//! ```text
//! u_r = (1+ν) p a² / (E (b²−a²)) · ((1−2ν) r + b²/r)
//! σ_r = p a² / (b²−a²) · (1 − b²/r²)
//! σ_θ = p a² / (b²−a²) · (1 + b²/r²)
//! σ_z = 2ν p a² / (b²−a²)
//! ```

use approx::assert_relative_eq;
use axifem_core::loads::tractions_on_boundary;
use axifem_core::{
    run_analysis, AnalysisOptions, AssemblyOptions, Direction, Material, Mesh, Model, Point2,
    Problem, RestraintGroup, SolverConfig, SolverType,
};
use std::f64::consts::PI;

const A: f64 = 1.0;
const B: f64 = 2.0;
const H: f64 = 0.25;
const P: f64 = 1.0e6;
const E: f64 = 2.0e11;
const NU: f64 = 0.3;

/// `n` elements across the wall; bottom row, middle row, top row.
fn wall_mesh(n: usize) -> Mesh {
    let mut mesh = Mesh::new();
    let dr = (B - A) / (2 * n) as f64;
    for i in 0..=2 * n {
        mesh.add_node(Point2::new(A + i as f64 * dr, 0.0));
    }
    for i in 0..=n {
        mesh.add_node(Point2::new(A + 2.0 * i as f64 * dr, 0.5 * H));
    }
    for i in 0..=2 * n {
        mesh.add_node(Point2::new(A + i as f64 * dr, H));
    }

    let mid = 2 * n + 1;
    let top = mid + n + 1;
    for k in 0..n {
        mesh.add_element(
            [
                2 * k,
                2 * k + 1,
                2 * k + 2,
                mid + k + 1,
                top + 2 * k + 2,
                top + 2 * k + 1,
                top + 2 * k,
                mid + k,
            ],
            0,
        )
        .unwrap();
    }
    mesh
}

fn nodes_where(mesh: &Mesh, pred: impl Fn(&Point2) -> bool) -> Vec<usize> {
    (0..mesh.n_nodes()).filter(|&i| pred(&mesh.nodes()[i])).collect()
}

fn pressurized_cylinder(n: usize) -> Model {
    let mesh = wall_mesh(n);
    let bottom = nodes_where(&mesh, |p| p[1].abs() < 1e-12);
    let top = nodes_where(&mesh, |p| (p[1] - H).abs() < 1e-12);
    let inner = nodes_where(&mesh, |p| (p[0] - A).abs() < 1e-12);

    let pressure = tractions_on_boundary(&mesh, &inner, [P, 0.0]).unwrap();
    let mut model = Model::new(mesh, vec![Material::new(E, NU, 7850.0).unwrap()]);
    model.restrain(&RestraintGroup::new(bottom, Direction::Z));
    model.restrain(&RestraintGroup::new(top, Direction::Z));
    model.with_distributed_loads(pressure)
}

fn lame_displacement(r: f64) -> f64 {
    (1.0 + NU) * P * A * A / (E * (B * B - A * A)) * ((1.0 - 2.0 * NU) * r + B * B / r)
}

/// No self-weight; the pressure is integrated over the full revolution so it
/// balances the `2π`-scaled stiffness.
fn no_gravity() -> AnalysisOptions {
    AnalysisOptions {
        gravity: 0.0,
        assembly: AssemblyOptions {
            revolve_edge_loads: true,
            ..AssemblyOptions::default()
        },
        ..AnalysisOptions::default()
    }
}

#[test]
fn lame_displacements() {
    let model = pressurized_cylinder(8);
    let results = run_analysis(&model, &no_gravity()).unwrap();

    for node in &results.nodes {
        assert_relative_eq!(
            node.displacement[0],
            lame_displacement(node.r),
            max_relative = 1e-3
        );
        assert!(node.displacement[1].abs() < 1e-6 * lame_displacement(A));
    }
}

#[test]
fn lame_stresses_mid_wall() {
    let model = pressurized_cylinder(8);
    let results = run_analysis(&model, &no_gravity()).unwrap();

    let k = P * A * A / (B * B - A * A);
    // Shared corner at r = 1.5 on the bottom row
    let node = results
        .nodes
        .iter()
        .find(|n| (n.r - 1.5).abs() < 1e-12 && n.z.abs() < 1e-12)
        .unwrap();
    let r2 = node.r * node.r;
    assert_relative_eq!(node.stress[0], k * (1.0 - B * B / r2), epsilon = 1e-2 * P);
    assert_relative_eq!(node.stress[2], k * (1.0 + B * B / r2), epsilon = 1e-2 * P);
    assert_relative_eq!(node.stress[1], 2.0 * NU * k, epsilon = 1e-2 * P);
    assert_relative_eq!(node.stress[3], 0.0, epsilon = 1e-2 * P);

    // σ_θ > σ_z > σ_r
    let p = &node.principal;
    assert_relative_eq!(p.values[0], node.stress[2], epsilon = 1e-6 * P);
    assert_relative_eq!(p.values[2], node.stress[0], epsilon = 1e-2 * P);
}

#[test]
fn pressure_load_resultant() {
    let model = pressurized_cylinder(4);
    let results = run_analysis(&model, &no_gravity()).unwrap();
    let [fr, fz] = results.total_load();
    assert_relative_eq!(fr, P * 2.0 * PI * A * H, max_relative = 1e-12);
    assert_relative_eq!(fz, 0.0, epsilon = 1e-9 * P);

    // Per radian of revolution by default
    let plain = AnalysisOptions {
        gravity: 0.0,
        ..AnalysisOptions::default()
    };
    let results = run_analysis(&model, &plain).unwrap();
    let [fr, _] = results.total_load();
    assert_relative_eq!(fr, P * A * H, max_relative = 1e-12);
}

#[test]
fn solvers_and_thread_counts_agree() {
    let model = pressurized_cylinder(6);
    let reference = run_analysis(&model, &no_gravity()).unwrap();

    for (solver_type, n_threads) in [(SolverType::Direct, 1), (SolverType::Dense, 3)] {
        let options = AnalysisOptions {
            gravity: 0.0,
            assembly: AssemblyOptions {
                n_threads,
                revolve_edge_loads: true,
            },
            solver: SolverConfig {
                solver_type,
                ..SolverConfig::default()
            },
        };
        let results = run_analysis(&model, &options).unwrap();
        for (a, b) in results.displacements.iter().zip(&reference.displacements) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14, max_relative = 1e-9);
        }
    }
}

#[test]
fn demo_problem_matches_lame() {
    let problem: Problem =
        serde_json::from_str(include_str!("../../demos/pressurized_ring.json")).unwrap();
    let results = run_analysis(&problem, &problem.options).unwrap();

    // Two elements are coarse; displacements still land within a few percent
    for node in &results.nodes {
        assert_relative_eq!(
            node.displacement[0],
            lame_displacement(node.r),
            max_relative = 3e-2
        );
    }
    let [fr, _] = results.total_load();
    assert_relative_eq!(fr, P * 2.0 * PI * A * H, max_relative = 1e-12);
}
