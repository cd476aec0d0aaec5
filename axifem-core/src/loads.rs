//! Loads and displacement constraints.
//!
//! All quantities address global DOFs `2·node + {0, 1}` for `(u_r, u_z)`.
//! Helpers expand node-group descriptions (restrained boundaries, boundaries
//! under constant traction) into these DOF-level records.

use crate::element::Edge;
use crate::error::{Error, Result};
use crate::mesh::{Mesh, DOFS_PER_NODE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prescribed displacement on one DOF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub dof: usize,
    #[serde(default)]
    pub value: f64,
}

impl Constraint {
    pub fn fixed(dof: usize) -> Self {
        Self { dof, value: 0.0 }
    }
}

/// Concentrated ring force on one DOF. Loads on the same DOF accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub dof: usize,
    pub value: f64,
}

impl PointLoad {
    /// Force at `node` along a single direction ([`Direction::R`] or [`Direction::Z`]).
    pub fn at_node(node: usize, direction: Direction, value: f64) -> Vec<Self> {
        direction
            .components()
            .iter()
            .map(|&c| Self {
                dof: DOFS_PER_NODE * node + c,
                value,
            })
            .collect()
    }
}

/// Traction distributed along one element edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    pub element: usize,
    pub edge: Edge,
    /// `[t_r, t_z]` at each of the three edge nodes, in edge order.
    pub tractions: [f64; 6],
}

/// Displacement directions a node group can be restrained in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    R,
    Z,
    Rz,
}

impl Direction {
    /// DOF offsets within a node.
    pub fn components(self) -> &'static [usize] {
        match self {
            Direction::R => &[0],
            Direction::Z => &[1],
            Direction::Rz => &[0, 1],
        }
    }
}

/// A set of nodes held at zero displacement in `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestraintGroup {
    pub nodes: Vec<usize>,
    pub direction: Direction,
}

impl RestraintGroup {
    pub fn new(nodes: Vec<usize>, direction: Direction) -> Self {
        Self { nodes, direction }
    }

    /// Zero-valued constraints for every restrained DOF.
    pub fn constraints(&self) -> Vec<Constraint> {
        self.nodes
            .iter()
            .flat_map(|&node| {
                self.direction
                    .components()
                    .iter()
                    .map(move |&c| Constraint::fixed(DOFS_PER_NODE * node + c))
            })
            .collect()
    }
}

/// Distributed loads for a constant traction `[t_r, t_z]` acting on every
/// element edge whose three nodes all belong to `boundary_nodes`.
///
/// # Errors
///
/// [`Error::InconsistentInput`] if an element has three or more nodes on the
/// boundary but none of its edges lies on it, or if no edge matches at all.
pub fn tractions_on_boundary(
    mesh: &Mesh,
    boundary_nodes: &[usize],
    traction: [f64; 2],
) -> Result<Vec<DistributedLoad>> {
    let boundary: HashSet<usize> = boundary_nodes.iter().copied().collect();
    let tractions = [
        traction[0], traction[1], traction[0], traction[1], traction[0], traction[1],
    ];

    let mut loads = Vec::new();
    for (idx, elem) in mesh.elements().iter().enumerate() {
        let on_boundary = elem.nodes.iter().filter(|&&n| boundary.contains(&n)).count();
        if on_boundary < 3 {
            continue;
        }

        let before = loads.len();
        for edge in Edge::ALL {
            if edge
                .local_nodes()
                .iter()
                .all(|&local| boundary.contains(&elem.nodes[local]))
            {
                loads.push(DistributedLoad {
                    element: idx,
                    edge,
                    tractions,
                });
            }
        }
        if loads.len() == before {
            return Err(Error::InconsistentInput(format!(
                "element {} has {} boundary nodes but no edge on the boundary",
                idx, on_boundary
            )));
        }
    }

    if loads.is_empty() && !boundary.is_empty() {
        return Err(Error::InconsistentInput(
            "no element edge lies on the loaded boundary".into(),
        ));
    }
    Ok(loads)
}
