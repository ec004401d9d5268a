//! Graph of hardpoints joined by rigid links.

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::errors::ConfigurationError;
use crate::geometry::TOLERANCE;
use crate::hardpoints::{Hardpoint, HardpointSet};

/// A rigid link between two hardpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    /// First endpoint.
    pub start: Hardpoint,
    /// Second endpoint.
    pub end: Hardpoint,
    /// Distance between the endpoints at static ride height in millimetres.
    pub length: f64,
}

/// Container for the rigid-link topology of one suspension corner.
///
/// Nodes are hardpoints and edges carry the static link length. Every solved
/// pose must reproduce each edge length.
#[derive(Clone, Debug, Default)]
pub struct Linkage {
    /// Underlying graph storage for hardpoints and links.
    graph: Graph<Hardpoint, f64>,
    /// Lookup from hardpoint to its node.
    joints: HashMap<Hardpoint, NodeIndex>,
}

impl Linkage {
    /// Create an empty linkage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            joints: HashMap::new(),
        }
    }

    /// Return the number of hardpoints taking part in a link.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of rigid links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fetch the node for `hardpoint`, inserting it on first use.
    fn joint(&mut self, hardpoint: Hardpoint) -> NodeIndex {
        if let Some(&node) = self.joints.get(&hardpoint) {
            return node;
        }
        let node = self.graph.add_node(hardpoint);
        self.joints.insert(hardpoint, node);
        node
    }

    /// Connect two hardpoints with a rigid link of the given static length.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroLengthLink`] when the endpoints
    /// coincide.
    pub fn add_link(
        &mut self,
        start: Hardpoint,
        end: Hardpoint,
        length: f64,
    ) -> Result<EdgeIndex, ConfigurationError> {
        if length <= TOLERANCE {
            return Err(ConfigurationError::ZeroLengthLink { start, end });
        }
        let start_node = self.joint(start);
        let end_node = self.joint(end);
        Ok(self.graph.add_edge(start_node, end_node, length))
    }

    /// Iterate over every link with its static length.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.graph.edge_indices().filter_map(|edge| {
            let (start, end) = self.graph.edge_endpoints(edge)?;
            Some(Link {
                start: self.graph[start],
                end: self.graph[end],
                length: self.graph[edge],
            })
        })
    }

    /// Hardpoints rigidly linked to `hardpoint`.
    #[must_use]
    pub fn neighbours(&self, hardpoint: Hardpoint) -> Vec<Hardpoint> {
        self.joints
            .get(&hardpoint)
            .map(|&node| {
                self.graph
                    .neighbors_undirected(node)
                    .map(|other| self.graph[other])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Largest absolute deviation of any link length in `points` from its
    /// static value.
    ///
    /// Returns `None` when `points` lacks an endpoint of some link.
    #[must_use]
    pub fn max_length_error(&self, points: &HardpointSet) -> Option<f64> {
        self.links().try_fold(0.0_f64, |worst, link| {
            let a = points.get(link.start)?;
            let b = points.get(link.end)?;
            Some(worst.max((a.distance(b) - link.length).abs()))
        })
    }

    /// Returns `true` when every link keeps its static length within
    /// `tolerance`.
    #[must_use]
    pub fn is_rigid(&self, points: &HardpointSet, tolerance: f64) -> bool {
        self.max_length_error(points)
            .is_some_and(|error| error <= tolerance)
    }
}
