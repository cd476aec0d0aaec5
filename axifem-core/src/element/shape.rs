//! Serendipity shape functions for the 8-node quadrilateral and the
//! quadratic 3-node edge basis.
//!
//! Local node positions in the reference square follow the canonical
//! counter-clockwise order of [`crate::mesh`]:
//!
//! | node | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! |------|---|---|---|---|---|---|---|---|
//! | ξ    |-1 | 0 | 1 | 1 | 1 | 0 |-1 |-1 |
//! | η    |-1 |-1 |-1 | 0 | 1 | 1 | 1 | 0 |
//!
//! Corner nodes use `N = ¼(1+ξᵢξ)(1+ηᵢη)(ξᵢξ+ηᵢη−1)`, mid-sides on η = ±1
//! use `N = ½(1−ξ²)(1+ηᵢη)` and mid-sides on ξ = ±1 use `N = ½(1+ξᵢξ)(1−η²)`.

/// Reference coordinates of the eight local nodes.
pub const NODE_COORDS: [(f64, f64); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
];

/// Shape function values and parametric derivatives at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeEval {
    pub n: [f64; 8],
    pub dn_dxi: [f64; 8],
    pub dn_deta: [f64; 8],
}

/// Serendipity shape functions N1..N8 at (ξ, η).
pub fn shape_functions(xi: f64, eta: f64) -> [f64; 8] {
    let xi2 = xi * xi;
    let eta2 = eta * eta;
    [
        0.25 * (1.0 - xi) * (1.0 - eta) * (-xi - eta - 1.0),
        0.5 * (1.0 - xi2) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 - eta) * (xi - eta - 1.0),
        0.5 * (1.0 + xi) * (1.0 - eta2),
        0.25 * (1.0 + xi) * (1.0 + eta) * (xi + eta - 1.0),
        0.5 * (1.0 - xi2) * (1.0 + eta),
        0.25 * (1.0 - xi) * (1.0 + eta) * (-xi + eta - 1.0),
        0.5 * (1.0 - xi) * (1.0 - eta2),
    ]
}

/// ∂N/∂ξ at (ξ, η).
pub fn shape_derivatives_xi(xi: f64, eta: f64) -> [f64; 8] {
    let eta2 = eta * eta;
    [
        0.25 * (1.0 - eta) * (2.0 * xi + eta),
        -xi * (1.0 - eta),
        0.25 * (1.0 - eta) * (2.0 * xi - eta),
        0.5 * (1.0 - eta2),
        0.25 * (1.0 + eta) * (2.0 * xi + eta),
        -xi * (1.0 + eta),
        0.25 * (1.0 + eta) * (2.0 * xi - eta),
        -0.5 * (1.0 - eta2),
    ]
}

/// ∂N/∂η at (ξ, η).
pub fn shape_derivatives_eta(xi: f64, eta: f64) -> [f64; 8] {
    let xi2 = xi * xi;
    [
        0.25 * (1.0 - xi) * (xi + 2.0 * eta),
        -0.5 * (1.0 - xi2),
        0.25 * (1.0 + xi) * (2.0 * eta - xi),
        -eta * (1.0 + xi),
        0.25 * (1.0 + xi) * (xi + 2.0 * eta),
        0.5 * (1.0 - xi2),
        0.25 * (1.0 - xi) * (2.0 * eta - xi),
        -eta * (1.0 - xi),
    ]
}

/// Values and both parametric derivatives at (ξ, η).
pub fn evaluate(xi: f64, eta: f64) -> ShapeEval {
    ShapeEval {
        n: shape_functions(xi, eta),
        dn_dxi: shape_derivatives_xi(xi, eta),
        dn_deta: shape_derivatives_eta(xi, eta),
    }
}

/// Quadratic edge basis at ξ ∈ [-1, 1] for nodes at ξ = -1, 0, 1.
pub fn edge_functions(xi: f64) -> [f64; 3] {
    [
        0.5 * xi * (xi - 1.0),
        (1.0 + xi) * (1.0 - xi),
        0.5 * xi * (1.0 + xi),
    ]
}

/// Derivative of [`edge_functions`] with respect to ξ.
pub fn edge_derivatives(xi: f64) -> [f64; 3] {
    [xi - 0.5, -2.0 * xi, xi + 0.5]
}
