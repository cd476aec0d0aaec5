//! Model data sources.
//!
//! The analysis reads its input through [`ModelProvider`]. Two providers ship
//! with the crate: [`Model`], an in-memory model built around a [`Mesh`], and
//! [`Problem`], the serde form used for problem files.

use crate::analysis::AnalysisOptions;
use crate::error::Result;
use crate::loads::{Constraint, DistributedLoad, PointLoad, RestraintGroup};
use crate::material::Material;
use crate::mesh::{ElementConnectivity, Mesh, CORNER_FIRST_TO_CANONICAL, NODES_PER_ELEMENT};
use crate::types::Point2;
use serde::{Deserialize, Serialize};

/// Source of nodes, elements, materials, constraints and loads.
///
/// Element connectivity is returned in canonical counter-clockwise order.
pub trait ModelProvider {
    fn nodes(&self) -> Vec<Point2>;

    fn elements(&self) -> Vec<ElementConnectivity>;

    fn materials(&self) -> Vec<Material>;

    fn constraints(&self) -> Vec<Constraint>;

    fn point_loads(&self) -> Vec<PointLoad>;

    fn distributed_loads(&self) -> Vec<DistributedLoad>;

    /// Build the mesh, checking node references of every element.
    fn mesh(&self) -> Result<Mesh> {
        let nodes = self.nodes();
        let elements = self.elements();
        let mut mesh = Mesh::with_capacity(nodes.len(), elements.len());
        mesh.add_nodes(nodes);
        for conn in elements {
            mesh.add_element(conn.nodes, conn.material)?;
        }
        Ok(mesh)
    }
}

/// In-memory model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub mesh: Mesh,
    pub materials: Vec<Material>,
    pub constraints: Vec<Constraint>,
    pub point_loads: Vec<PointLoad>,
    pub distributed_loads: Vec<DistributedLoad>,
}

impl Model {
    pub fn new(mesh: Mesh, materials: Vec<Material>) -> Self {
        Self {
            mesh,
            materials,
            ..Self::default()
        }
    }

    /// Restrain a node group; see [`RestraintGroup`].
    pub fn restrain(&mut self, group: &RestraintGroup) -> &mut Self {
        self.constraints.extend(group.constraints());
        self
    }

    pub fn with_point_loads(mut self, loads: impl IntoIterator<Item = PointLoad>) -> Self {
        self.point_loads.extend(loads);
        self
    }

    pub fn with_distributed_loads(
        mut self,
        loads: impl IntoIterator<Item = DistributedLoad>,
    ) -> Self {
        self.distributed_loads.extend(loads);
        self
    }
}

impl ModelProvider for Model {
    fn nodes(&self) -> Vec<Point2> {
        self.mesh.nodes().to_vec()
    }

    fn elements(&self) -> Vec<ElementConnectivity> {
        self.mesh.elements().to_vec()
    }

    fn materials(&self) -> Vec<Material> {
        self.materials.clone()
    }

    fn constraints(&self) -> Vec<Constraint> {
        self.constraints.clone()
    }

    fn point_loads(&self) -> Vec<PointLoad> {
        self.point_loads.clone()
    }

    fn distributed_loads(&self) -> Vec<DistributedLoad> {
        self.distributed_loads.clone()
    }

    fn mesh(&self) -> Result<Mesh> {
        Ok(self.mesh.clone())
    }
}

/// One element of a problem file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInput {
    pub nodes: [usize; NODES_PER_ELEMENT],
    #[serde(default)]
    pub material: usize,
    /// Nodes are listed as four corners followed by four mid-sides.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub corner_first: bool,
}

impl ElementInput {
    pub fn connectivity(&self) -> ElementConnectivity {
        let nodes = if self.corner_first {
            CORNER_FIRST_TO_CANONICAL.map(|i| self.nodes[i])
        } else {
            self.nodes
        };
        ElementConnectivity {
            nodes,
            material: self.material,
        }
    }
}

/// Self-contained problem description, as read from a JSON problem file.
///
/// ```ignore
/// let problem: Problem = serde_json::from_str(&text)?;
/// let results = run_analysis(&problem, &problem.options)?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    /// Node coordinates `[r, z]`.
    pub nodes: Vec<[f64; 2]>,
    pub elements: Vec<ElementInput>,
    pub materials: Vec<Material>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Node groups held at zero displacement, expanded after `constraints`.
    #[serde(default)]
    pub restraints: Vec<RestraintGroup>,
    #[serde(default)]
    pub point_loads: Vec<PointLoad>,
    #[serde(default)]
    pub distributed_loads: Vec<DistributedLoad>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl ModelProvider for Problem {
    fn nodes(&self) -> Vec<Point2> {
        self.nodes.iter().map(|&[r, z]| Point2::new(r, z)).collect()
    }

    fn elements(&self) -> Vec<ElementConnectivity> {
        self.elements.iter().map(ElementInput::connectivity).collect()
    }

    fn materials(&self) -> Vec<Material> {
        self.materials.clone()
    }

    fn constraints(&self) -> Vec<Constraint> {
        let mut all = self.constraints.clone();
        for group in &self.restraints {
            all.extend(group.constraints());
        }
        all
    }

    fn point_loads(&self) -> Vec<PointLoad> {
        self.point_loads.clone()
    }

    fn distributed_loads(&self) -> Vec<DistributedLoad> {
        self.distributed_loads.clone()
    }
}
