//! Mesh data structure: nodal (r, z) coordinates and 8-node connectivity.
//!
//! Element nodes are stored in canonical counter-clockwise order: corners at
//! local positions 0, 2, 4, 6 and mid-side nodes at 1, 3, 5, 7.
//!
//! ```text
//!  7----6----5
//!  |         |
//!  8         4
//!  |         |
//!  1----2----3
//! ```

use crate::error::{Error, Result};
use crate::types::Point2;

/// Degrees of freedom per node (u_r, u_z).
pub const DOFS_PER_NODE: usize = 2;

/// Nodes per serendipity element.
pub const NODES_PER_ELEMENT: usize = 8;

/// DOFs per element.
pub const ELEMENT_DOFS: usize = NODES_PER_ELEMENT * DOFS_PER_NODE;

/// Position in corner-first input of each canonical local node.
///
/// Corner-first numbering lists the four corners and then the four mid-sides
/// (N1, N5, N2, N6, N3, N7, N4, N8 in canonical terms).
pub(crate) const CORNER_FIRST_TO_CANONICAL: [usize; NODES_PER_ELEMENT] = [0, 4, 1, 5, 2, 6, 3, 7];

/// Connectivity and material assignment of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementConnectivity {
    /// Node indices (0-based) in canonical order.
    pub nodes: [usize; NODES_PER_ELEMENT],
    /// Index into the model's material table.
    pub material: usize,
}

impl ElementConnectivity {
    /// Global DOF indices, interleaved (u_r, u_z) per local node.
    pub fn dofs(&self) -> [usize; ELEMENT_DOFS] {
        let mut dofs = [0usize; ELEMENT_DOFS];
        for (local, &node) in self.nodes.iter().enumerate() {
            dofs[DOFS_PER_NODE * local] = DOFS_PER_NODE * node;
            dofs[DOFS_PER_NODE * local + 1] = DOFS_PER_NODE * node + 1;
        }
        dofs
    }
}

/// Finite element mesh of the meridian section.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    nodes: Vec<Point2>,
    elements: Vec<ElementConnectivity>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_nodes: usize, n_elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n_nodes),
            elements: Vec::with_capacity(n_elements),
        }
    }

    /// Add a node, returning its index.
    pub fn add_node(&mut self, point: Point2) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(point);
        idx
    }

    pub fn add_nodes(&mut self, points: impl IntoIterator<Item = Point2>) {
        self.nodes.extend(points);
    }

    /// Add an element whose nodes are already in canonical order.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentInput`] if a node index is out of range or
    /// repeated within the element.
    pub fn add_element(&mut self, nodes: [usize; NODES_PER_ELEMENT], material: usize) -> Result<usize> {
        let idx = self.elements.len();
        for (local, &node) in nodes.iter().enumerate() {
            if node >= self.nodes.len() {
                return Err(Error::InconsistentInput(format!(
                    "element {}: node index {} out of bounds (mesh has {} nodes)",
                    idx,
                    node,
                    self.nodes.len()
                )));
            }
            if nodes[..local].contains(&node) {
                return Err(Error::InconsistentInput(format!(
                    "element {}: node {} appears more than once",
                    idx, node
                )));
            }
        }

        self.elements.push(ElementConnectivity { nodes, material });
        Ok(idx)
    }

    /// Add an element given in corner-first order (four corners, then the
    /// four mid-sides, both counter-clockwise).
    pub fn add_element_corner_first(
        &mut self,
        nodes: [usize; NODES_PER_ELEMENT],
        material: usize,
    ) -> Result<usize> {
        self.add_element(CORNER_FIRST_TO_CANONICAL.map(|i| nodes[i]), material)
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Size of the global system.
    pub fn n_dofs(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> Option<&Point2> {
        self.nodes.get(idx)
    }

    pub fn elements(&self) -> &[ElementConnectivity] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> Option<&ElementConnectivity> {
        self.elements.get(idx)
    }

    /// Nodal coordinates of an element in canonical order.
    pub fn element_coords(&self, elem_idx: usize) -> Option<[Point2; NODES_PER_ELEMENT]> {
        let elem = self.elements.get(elem_idx)?;
        Some(elem.nodes.map(|i| self.nodes[i]))
    }

    /// Number of elements attached to each node.
    pub fn node_valence(&self) -> Vec<usize> {
        let mut valence = vec![0usize; self.nodes.len()];
        for elem in &self.elements {
            for &node in &elem.nodes {
                valence[node] += 1;
            }
        }
        valence
    }

    /// Bounding box `(min, max)` of the nodal coordinates.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.nodes.first()?;
        Some(self.nodes[1..].iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_nodes(mesh: &mut Mesh) {
        for &(r, z) in &[
            (1.0, 0.0),
            (1.5, 0.0),
            (2.0, 0.0),
            (2.0, 0.5),
            (2.0, 1.0),
            (1.5, 1.0),
            (1.0, 1.0),
            (1.0, 0.5),
        ] {
            mesh.add_node(Point2::new(r, z));
        }
    }

    #[test]
    fn test_mesh_creation() {
        let mut mesh = Mesh::new();
        square_nodes(&mut mesh);
        assert_eq!(mesh.n_nodes(), 8);
        assert_eq!(mesh.n_dofs(), 16);

        mesh.add_element([0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
        assert_eq!(mesh.n_elements(), 1);
        assert_eq!(mesh.element_coords(0).unwrap()[4], Point2::new(2.0, 1.0));
    }

    #[test]
    fn test_element_dofs_interleaved() {
        let conn = ElementConnectivity {
            nodes: [3, 9, 4, 10, 5, 11, 6, 12],
            material: 0,
        };
        let dofs = conn.dofs();
        assert_eq!(&dofs[..4], &[6, 7, 18, 19]);
        assert_eq!(&dofs[14..], &[24, 25]);
    }

    #[test]
    fn test_corner_first_reordering() {
        let mut mesh = Mesh::new();
        square_nodes(&mut mesh);
        // corners 0, 2, 4, 6 then mid-sides 1, 3, 5, 7
        mesh.add_element_corner_first([0, 2, 4, 6, 1, 3, 5, 7], 0).unwrap();
        assert_eq!(mesh.element(0).unwrap().nodes, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_invalid_node_index() {
        let mut mesh = Mesh::new();
        square_nodes(&mut mesh);
        let result = mesh.add_element([0, 1, 2, 3, 4, 5, 6, 8], 0);
        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    fn test_repeated_node() {
        let mut mesh = Mesh::new();
        square_nodes(&mut mesh);
        let result = mesh.add_element([0, 1, 2, 3, 4, 5, 6, 0], 0);
        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    fn test_node_valence() {
        let mut mesh = Mesh::new();
        square_nodes(&mut mesh);
        mesh.add_node(Point2::new(5.0, 5.0));
        mesh.add_element([0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
        let valence = mesh.node_valence();
        assert_eq!(&valence[..8], &[1; 8]);
        assert_eq!(valence[8], 0);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.add_node(Point2::new(0.5, -2.0));
        mesh.add_node(Point2::new(3.0, 1.0));
        mesh.add_node(Point2::new(1.0, 4.0));

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point2::new(0.5, -2.0));
        assert_eq!(max, Point2::new(3.0, 4.0));
        assert!(Mesh::new().bounds().is_none());
    }
}
