//! In-memory landmark state: the live registry and the persisted relation graph.

pub mod registry;
pub mod relation_graph;

pub use registry::{LandmarkRegistry, SharedRegistry};
pub use relation_graph::{GraphNode, Offset, RelationGraph, SharedGraph};
