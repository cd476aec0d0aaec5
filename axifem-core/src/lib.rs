//! AxiFEM Core - axisymmetric static finite element analysis
//!
//! Linear elastic analysis of bodies of revolution under axisymmetric loads,
//! discretized with 8-node serendipity quadrilaterals in the meridian
//! (r, z) half-plane:
//! - Element kernel with 2×2 Gauss integration and a cached Gauss-point arena
//! - Parallel assembly using Rayon
//! - Sparse matrix operations (CSR format)
//! - Constrained/free DOF partitioning with reaction recovery
//! - Nodal strain/stress recovery with principal stresses
//!
//! # Architecture
//!
//! - [`ModelProvider`] trait: source of nodes, elements, materials and loads
//! - [`Mesh`]: connectivity and nodal coordinates
//! - [`Material`]: isotropic linear elastic properties
//! - [`Solver`] trait: linear system solution strategies
//! - [`run_analysis`]: the full pipeline from provider to [`AnalysisResults`]

pub mod analysis;
pub mod assembly;
pub mod boundary;
pub mod element;
pub mod error;
pub mod loads;
pub mod material;
pub mod mesh;
pub mod provider;
pub mod solver;
pub mod sparse;
pub mod stress;
pub mod types;

#[cfg(test)]
mod testing;

pub use analysis::{run_analysis, AnalysisOptions, AnalysisResults, GaussPointResult, NodeResult};
pub use assembly::{assemble, AssembledSystem, AssemblyOptions, GaussPointCache};
pub use boundary::{solve_partitioned, DofPartition, StaticSolution};
pub use element::{Edge, EdgeLoadKernel, Quad8Axisymmetric};
pub use error::{Error, Result};
pub use loads::{Constraint, Direction, DistributedLoad, PointLoad, RestraintGroup};
pub use material::Material;
pub use mesh::{ElementConnectivity, Mesh};
pub use provider::{ElementInput, Model, ModelProvider, Problem};
pub use solver::{Solver, SolverConfig, SolverType, SolveStats};
pub use sparse::CsrMatrix;
pub use stress::{NodalField, StressRecovery};
pub use types::{Point2, PrincipalStress, StrainTensor, StressTensor};
