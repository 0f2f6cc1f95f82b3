//! Relation graph: pairwise offsets and neighbour adjacency between landmarks.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::LandmarkId;

/// Relation graph shared between the maintainer, deducer and planner.
pub type SharedGraph = Arc<RwLock<RelationGraph>>;

/// A stored displacement between the owning node and `other`.
///
/// `vector` is `owner.position - other.position` at the time both were
/// tracked, so `other.position + vector` recovers the owner's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// The other landmark.
    pub other: LandmarkId,
    /// Owner position minus other position.
    pub vector: Vector3<f32>,
}

impl Offset {
    /// Create an offset entry.
    pub fn new(other: LandmarkId, vector: Vector3<f32>) -> Self {
        Self { other, vector }
    }

    /// Length of the stored displacement.
    pub fn magnitude(&self) -> f32 {
        self.vector.norm()
    }
}

/// Persisted per-landmark record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Landmark id.
    pub id: LandmarkId,
    /// Cached display name.
    pub name: String,
    /// Offsets to other landmarks, ascending by magnitude.
    #[serde(default)]
    pub offsets: Vec<Offset>,
    /// Landmarks directly reachable from this one.
    #[serde(default)]
    pub neighbours: BTreeSet<LandmarkId>,
}

impl GraphNode {
    /// Create an empty node.
    pub fn new(id: LandmarkId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            offsets: Vec::new(),
            neighbours: BTreeSet::new(),
        }
    }

    /// Stored offset to `other`, if any.
    pub fn offset_to(&self, other: &LandmarkId) -> Option<&Offset> {
        self.offsets.iter().find(|o| &o.other == other)
    }

    /// Re-sort offsets ascending by magnitude.
    pub fn sort_offsets(&mut self) {
        self.offsets
            .sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude()));
    }
}

/// The persisted landmark graph, keyed by landmark id.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: HashMap<LandmarkId, GraphNode>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from pre-existing nodes (used by the graph file reader).
    pub fn from_nodes(nodes: Vec<GraphNode>) -> Self {
        let nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        Self { nodes }
    }

    /// Wrap into the shared handle.
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node exists for `id`.
    pub fn contains(&self, id: &LandmarkId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node by id.
    pub fn get_node(&self, id: &LandmarkId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Get a node by id (mutable).
    pub fn get_node_mut(&mut self, id: &LandmarkId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All nodes sorted by id, for stable serialization.
    pub fn sorted_nodes(&self) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Offsets of `id`, or `None` when no node exists.
    pub fn offsets(&self, id: &LandmarkId) -> Option<&[Offset]> {
        self.nodes.get(id).map(|n| n.offsets.as_slice())
    }

    /// Neighbours of `id`, or `None` when no node exists.
    pub fn neighbours(&self, id: &LandmarkId) -> Option<&BTreeSet<LandmarkId>> {
        self.nodes.get(id).map(|n| &n.neighbours)
    }

    /// Get or insert the node for `id`. An existing node keeps its name.
    pub fn ensure_node(&mut self, id: &LandmarkId, name: &str) -> &mut GraphNode {
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| GraphNode::new(id.clone(), name))
    }

    /// Update the cached name. Returns false when no node exists.
    pub fn rename(&mut self, id: &LandmarkId, name: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a node, returning it.
    pub fn remove_node(&mut self, id: &LandmarkId) -> Option<GraphNode> {
        self.nodes.remove(id)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Remove nodes whose landmark is no longer live. Returns the removed ids.
    pub fn sweep_stale(&mut self, is_live: impl Fn(&LandmarkId) -> bool) -> Vec<LandmarkId> {
        let stale: Vec<LandmarkId> = self
            .nodes
            .keys()
            .filter(|id| !is_live(id))
            .cloned()
            .collect();
        for id in &stale {
            log::warn!("Landmark {id} no longer exists; removing it from the graph");
            self.nodes.remove(id);
        }
        stale
    }

    /// Strip every offset and neighbour entry that references `id`.
    pub fn strip_references(&mut self, id: &LandmarkId) {
        for node in self.nodes.values_mut() {
            node.neighbours.remove(id);
            node.offsets.retain(|o| &o.other != id);
        }
    }

    /// Full pairwise offset recomputation over a set of simultaneously tracked landmarks.
    ///
    /// Each member's offset list is replaced entirely; members missing a node
    /// get one. Afterwards every node's offsets are re-sorted by magnitude.
    pub fn recompute_offsets(&mut self, located: &[(LandmarkId, String, Point3<f32>)]) {
        for (id, name, _) in located {
            self.ensure_node(id, name).offsets.clear();
        }

        for (i, (first_id, _, first_pos)) in located.iter().enumerate() {
            for (second_id, _, second_pos) in &located[i + 1..] {
                let delta = first_pos - second_pos;
                if let Some(node) = self.nodes.get_mut(first_id) {
                    node.offsets.push(Offset::new(second_id.clone(), delta));
                }
                if let Some(node) = self.nodes.get_mut(second_id) {
                    node.offsets.push(Offset::new(first_id.clone(), -delta));
                }
            }
        }

        for node in self.nodes.values_mut() {
            node.sort_offsets();
        }
        log::debug!(
            "Recomputed offsets for {} located landmarks ({} nodes)",
            located.len(),
            self.nodes.len()
        );
    }

    /// Record `a` and `b` as mutual neighbours. Missing nodes are skipped.
    pub fn link(&mut self, a: &LandmarkId, b: &LandmarkId) {
        if a == b {
            return;
        }
        if let Some(node) = self.nodes.get_mut(a) {
            node.neighbours.insert(b.clone());
        }
        if let Some(node) = self.nodes.get_mut(b) {
            node.neighbours.insert(a.clone());
        }
    }

    /// Replace the neighbour set of `id`. Returns false when no node exists.
    pub fn set_neighbours(&mut self, id: &LandmarkId, neighbours: BTreeSet<LandmarkId>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.neighbours = neighbours;
                true
            }
            None => false,
        }
    }
}
