//! Element-level kernels for the axisymmetric serendipity formulation.
//!
//! # Submodules
//!
//! - [`gauss`] - Gauss-Legendre rules on the reference interval and square
//! - [`shape`] - 8-node serendipity and 3-node edge shape functions
//! - [`quad8_axisym`] - element stiffness, body load and Gauss-point states
//! - [`edge_load`] - equivalent nodal forces of edge tractions

pub mod edge_load;
pub mod gauss;
pub mod quad8_axisym;
pub mod shape;

pub use edge_load::{Edge, EdgeLoadKernel};
pub use gauss::{gauss_1d, gauss_quad, GaussPoint};
pub use quad8_axisym::{
    ElementIntegration, ElementMatrix, ElementVector, GaussPointState, Quad8Axisymmetric,
    ShapeMatrix, StrainMatrix,
};
