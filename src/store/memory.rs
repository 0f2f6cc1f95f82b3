//! In-memory anchor store and a manually driven tracker.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{LandmarkId, Pose, Tracker};

use super::AnchorStore;

/// Tracker whose lock and pose are set explicitly.
///
/// Stands in for a platform anchor in simulations and tests.
#[derive(Debug)]
pub struct ManualTracker {
    inner: RwLock<(bool, Pose)>,
}

impl ManualTracker {
    /// A tracker at `pose` without lock.
    pub fn new(pose: Pose) -> Self {
        Self {
            inner: RwLock::new((false, pose)),
        }
    }

    /// A tracker at `pose` that already has lock.
    pub fn located(pose: Pose) -> Self {
        Self {
            inner: RwLock::new((true, pose)),
        }
    }

    /// Shared handle, ready to hand to the registry.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Set the lock flag.
    pub fn set_located(&self, located: bool) {
        self.inner.write().0 = located;
    }

    /// Move the tracker.
    pub fn set_pose(&self, pose: Pose) {
        self.inner.write().1 = pose;
    }
}

impl Tracker for ManualTracker {
    fn is_located(&self) -> bool {
        self.inner.read().0
    }

    fn pose(&self) -> Pose {
        self.inner.read().1
    }
}

/// Anchor store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryAnchorStore {
    anchors: RwLock<HashMap<LandmarkId, Arc<dyn Tracker>>>,
}

impl MemoryAnchorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a store asynchronously, as platform stores are.
    pub async fn open() -> Self {
        tokio::task::yield_now().await;
        Self::new()
    }
}

impl AnchorStore for MemoryAnchorStore {
    fn save(&self, id: &LandmarkId, tracker: Arc<dyn Tracker>) {
        self.anchors.write().insert(id.clone(), tracker);
    }

    fn load(&self, id: &LandmarkId) -> Option<Arc<dyn Tracker>> {
        self.anchors.read().get(id).cloned()
    }

    fn delete(&self, id: &LandmarkId) -> bool {
        self.anchors.write().remove(id).is_some()
    }

    fn clear(&self) {
        self.anchors.write().clear();
    }

    fn ids(&self) -> Vec<LandmarkId> {
        let mut ids: Vec<LandmarkId> = self.anchors.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn count(&self) -> usize {
        self.anchors.read().len()
    }
}
