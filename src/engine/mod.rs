//! High-level operations: graph maintenance, position deduction and path planning.

pub mod deduce;
pub mod deviation;
pub mod maintain;
pub mod planner;
pub mod sectors;

pub use deduce::{deduce_position, DeductionReport, PositionDeducer};
pub use deviation::{DeviationWindow, TrackingJitter};
pub use maintain::{infer_neighbours, GraphMaintainer, InferenceParams};
pub use planner::{astar, PathPlanner, Route, Waypoint};
pub use sectors::{compute_section, select_sector_neighbours, SectorParams};
