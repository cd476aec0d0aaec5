//! Error types for axisymmetric analysis.

use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling, solving or post-processing a model.
///
/// Every variant is fatal for the run that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// An element maps to a region with non-positive Jacobian determinant
    /// (clockwise node ordering or a collapsed element).
    #[error("invalid geometry in element {element}: det(J) = {det_j:e} at Gauss point {point}")]
    InvalidGeometry {
        element: usize,
        point: usize,
        det_j: f64,
    },

    /// Edge id outside {123, 345, 567, 781}, or an element with a node count
    /// the edge kernel cannot handle.
    #[error("unsupported edge: {0}")]
    UnsupportedEdge(String),

    /// The reduced stiffness matrix could not be factorized.
    #[error("singular system: {0}")]
    SingularSystem(String),

    /// Provider data that does not fit together (lengths, index ranges).
    #[error("inconsistent input: {0}")]
    InconsistentInput(String),

    /// Invalid material properties.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Assembly infrastructure errors.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Solver backend errors that are not a singularity.
    #[error("solver error: {0}")]
    Solver(String),
}
