//! Landmark navigation: persistent spatial landmark graph for indoor navigation.
//!
//! Users place landmarks in the world. The library records the relative
//! offsets between simultaneously tracked landmarks, deduces the position of
//! a landmark whose tracker lost lock, infers which landmarks can see each
//! other, and plans routes between them with A*.

pub mod config;
pub mod engine;
pub mod environment;
pub mod format;
pub mod graph;
pub mod selection;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{EdgeSelection, NavConfig};
pub use engine::{
    astar, deduce_position, infer_neighbours, DeductionReport, DeviationWindow, GraphMaintainer,
    InferenceParams, PathPlanner, PositionDeducer, Route, SectorParams, TrackingJitter, Waypoint,
};
pub use environment::{Aabb, ObstacleField, OcclusionQuery, OpenSpace};
pub use format::{GraphDocument, GraphFile};
pub use graph::{GraphNode, LandmarkRegistry, Offset, RelationGraph, SharedGraph, SharedRegistry};
pub use selection::{NeighbourEditor, Selectable, SelectableSet, SelectionCoordinator};
pub use session::{EditingAction, Mode, NavSession};
pub use store::{AnchorStore, ManualTracker, MemoryAnchorStore};
pub use types::{
    Landmark, LandmarkId, NavError, NavResult, Pose, SelectionMark, TrackingState, Tracker,
    DEDUCTION_LIMIT, GRAPH_FORMAT_VERSION,
};
