//! All data types for the landmark navigation library.

pub mod error;
pub mod landmark;
pub mod pose;

pub use error::{NavError, NavResult};
pub use landmark::{Landmark, LandmarkId, SelectionMark, TrackingState};
pub use pose::{Pose, Tracker};

/// Current graph file format version.
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Maximum offset entries averaged when deducing a lost landmark's position.
pub const DEDUCTION_LIMIT: usize = 10;

/// Maximum neighbour candidates examined per node when pruning edges by sector.
pub const SECTOR_CANDIDATE_LIMIT: usize = 6;

/// Beyond this distance a sector candidate must also be close relative to the nearest pick.
pub const SAFE_NEIGHBOUR_DISTANCE: f32 = 8.0;

/// Number of horizontal compass sectors used by edge pruning.
pub const SECTOR_COUNT: usize = 8;
