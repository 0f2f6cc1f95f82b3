//! Persistent anchor store contract and an in-memory implementation.

pub mod memory;

pub use memory::{ManualTracker, MemoryAnchorStore};

use std::sync::Arc;

use crate::types::{LandmarkId, Tracker};

/// Device-side store of per-landmark tracking handles.
///
/// Handles are opaque; the store only persists and restores them by id.
pub trait AnchorStore: Send + Sync {
    /// Persist the handle under `id`, replacing any previous one.
    fn save(&self, id: &LandmarkId, tracker: Arc<dyn Tracker>);

    /// Restore the handle saved under `id`.
    fn load(&self, id: &LandmarkId) -> Option<Arc<dyn Tracker>>;

    /// Forget `id`. Returns whether it was present.
    fn delete(&self, id: &LandmarkId) -> bool;

    /// Forget everything.
    fn clear(&self);

    /// All stored ids.
    fn ids(&self) -> Vec<LandmarkId>;

    /// Number of stored handles.
    fn count(&self) -> usize {
        self.ids().len()
    }
}
