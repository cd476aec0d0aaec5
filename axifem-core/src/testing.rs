//! Mesh fixtures shared by unit tests.

use crate::mesh::Mesh;
use crate::types::Point2;

/// Single element r ∈ [1, 2], z ∈ [0, 1] with nodes numbered in canonical order.
pub fn ring_square() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.add_nodes([
        Point2::new(1.0, 0.0),
        Point2::new(1.5, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(2.0, 0.5),
        Point2::new(2.0, 1.0),
        Point2::new(1.5, 1.0),
        Point2::new(1.0, 1.0),
        Point2::new(1.0, 0.5),
    ]);
    mesh.add_element([0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
    mesh
}

/// A row of `n` equal elements spanning `[r0, r1] × [z0, z1]`.
///
/// Nodes are numbered bottom row (2n+1), middle row (n+1), top row (2n+1),
/// each from small to large r.
pub fn strip(r0: f64, r1: f64, z0: f64, z1: f64, n: usize) -> Mesh {
    let mut mesh = Mesh::new();
    let dr = (r1 - r0) / (2 * n) as f64;
    let zm = 0.5 * (z0 + z1);

    for i in 0..=2 * n {
        mesh.add_node(Point2::new(r0 + i as f64 * dr, z0));
    }
    for i in 0..=n {
        mesh.add_node(Point2::new(r0 + 2.0 * i as f64 * dr, zm));
    }
    for i in 0..=2 * n {
        mesh.add_node(Point2::new(r0 + i as f64 * dr, z1));
    }

    let mid = 2 * n + 1;
    let top = mid + n + 1;
    for k in 0..n {
        let nodes = [
            2 * k,
            2 * k + 1,
            2 * k + 2,
            mid + k + 1,
            top + 2 * k + 2,
            top + 2 * k + 1,
            top + 2 * k,
            mid + k,
        ];
        mesh.add_element(nodes, 0).unwrap();
    }
    mesh
}

/// Indices of nodes with `|r - value| < 1e-12`.
pub fn nodes_at_r(mesh: &Mesh, value: f64) -> Vec<usize> {
    (0..mesh.n_nodes())
        .filter(|&i| (mesh.nodes()[i][0] - value).abs() < 1e-12)
        .collect()
}

/// Indices of nodes with `|z - value| < 1e-12`.
pub fn nodes_at_z(mesh: &Mesh, value: f64) -> Vec<usize> {
    (0..mesh.n_nodes())
        .filter(|&i| (mesh.nodes()[i][1] - value).abs() < 1e-12)
        .collect()
}
