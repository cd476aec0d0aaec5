//! Gauss-Legendre quadrature on the reference interval and square.
//!
//! The 2D rule is the tensor product of two 1D rules with ξ as the outer
//! loop, so the point with 1D indices (p, q) has flat index `p * n + q`.
//! Post-processing relies on this ordering when it extrapolates Gauss-point
//! values to the element nodes.
//!
//! ```
//! use axifem_core::element::gauss::{gauss_1d, gauss_quad};
//!
//! let line = gauss_1d(2);
//! assert_eq!(line.len(), 2);
//!
//! let square = gauss_quad(2);
//! assert_eq!(square.len(), 4);
//! assert!(square[0].xi() < 0.0 && square[1].eta() > 0.0);
//! ```

/// A point of the 2D tensor-product rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    /// Natural coordinates [ξ, η] in [-1, 1]².
    pub coords: [f64; 2],
    /// Product of the two 1D weights.
    pub weight: f64,
}

impl GaussPoint {
    pub fn new(xi: f64, eta: f64, weight: f64) -> Self {
        Self {
            coords: [xi, eta],
            weight,
        }
    }

    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }
}

/// 1D Gauss-Legendre abscissae and weights on [-1, 1], ordered by abscissa.
///
/// # Panics
///
/// Panics if `n` is not in 1..=4.
pub fn gauss_1d(n: usize) -> Vec<(f64, f64)> {
    match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        4 => {
            let s = (6.0 / 5.0_f64).sqrt();
            let inner = ((3.0 - 2.0 * s) / 7.0).sqrt();
            let outer = ((3.0 + 2.0 * s) / 7.0).sqrt();
            let w_inner = (18.0 + 30.0_f64.sqrt()) / 36.0;
            let w_outer = (18.0 - 30.0_f64.sqrt()) / 36.0;
            vec![
                (-outer, w_outer),
                (-inner, w_inner),
                (inner, w_inner),
                (outer, w_outer),
            ]
        }
        _ => panic!("gauss_1d: n must be 1, 2, 3, or 4, got {}", n),
    }
}

/// Tensor-product rule on [-1, 1]² with `n` points per direction.
///
/// # Panics
///
/// Panics if `n` is not in 1..=3.
pub fn gauss_quad(n: usize) -> Vec<GaussPoint> {
    if !(1..=3).contains(&n) {
        panic!("gauss_quad: n must be 1, 2, or 3, got {}", n);
    }

    let rule = gauss_1d(n);
    rule.iter()
        .flat_map(|&(xi, w_xi)| {
            rule.iter()
                .map(move |&(eta, w_eta)| GaussPoint::new(xi, eta, w_xi * w_eta))
        })
        .collect()
}
