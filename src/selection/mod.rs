//! Single/multi selection bookkeeping and the manual neighbour override workflow.

pub mod coordinator;
pub mod neighbours;

pub use coordinator::{Selectable, SelectableSet, SelectionCoordinator};
pub use neighbours::NeighbourEditor;
