//! Live landmark registry: sole owner of the current landmark set.

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::Point3;
use parking_lot::RwLock;

use crate::types::{Landmark, LandmarkId, NavError, NavResult, TrackingState, Tracker};

/// Registry shared between the session and the engine components.
pub type SharedRegistry = Arc<RwLock<LandmarkRegistry>>;

/// All currently live landmarks, keyed by id.
///
/// Registering or unregistering never touches the relation graph; the graph
/// maintainer keeps the two consistent.
#[derive(Debug, Default)]
pub struct LandmarkRegistry {
    landmarks: HashMap<LandmarkId, Landmark>,
}

impl LandmarkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into the shared handle.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register a landmark. Fails if the id is already present.
    pub fn create(
        &mut self,
        id: LandmarkId,
        name: impl Into<String>,
        tracker: Arc<dyn Tracker>,
    ) -> NavResult<&Landmark> {
        if self.landmarks.contains_key(&id) {
            return Err(NavError::DuplicateLandmark(id));
        }
        let landmark = Landmark::new(id.clone(), name, tracker);
        Ok(self.landmarks.entry(id).or_insert(landmark))
    }

    /// Unregister a landmark, returning it.
    pub fn remove(&mut self, id: &LandmarkId) -> NavResult<Landmark> {
        self.landmarks
            .remove(id)
            .ok_or_else(|| NavError::LandmarkNotFound(id.clone()))
    }

    /// Look up a landmark.
    pub fn get(&self, id: &LandmarkId) -> NavResult<&Landmark> {
        self.landmarks
            .get(id)
            .ok_or_else(|| NavError::LandmarkNotFound(id.clone()))
    }

    /// Look up a landmark (mutable).
    pub fn get_mut(&mut self, id: &LandmarkId) -> NavResult<&mut Landmark> {
        self.landmarks
            .get_mut(id)
            .ok_or_else(|| NavError::LandmarkNotFound(id.clone()))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &LandmarkId) -> bool {
        self.landmarks.contains_key(id)
    }

    /// Number of live landmarks.
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// True when no landmark is registered.
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Iterate over all landmarks.
    pub fn all(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.values()
    }

    /// Iterate mutably over all landmarks.
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Landmark> {
        self.landmarks.values_mut()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<LandmarkId> {
        let mut ids: Vec<LandmarkId> = self.landmarks.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Landmarks whose display name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Vec<&Landmark> {
        self.landmarks.values().filter(|l| l.name == name).collect()
    }

    /// Tracker-locked landmarks with their tracker positions, sorted by id.
    pub fn tracked(&self) -> Vec<(LandmarkId, String, Point3<f32>)> {
        let mut tracked: Vec<(LandmarkId, String, Point3<f32>)> = self
            .landmarks
            .values()
            .filter(|l| l.is_tracked())
            .map(|l| (l.id().clone(), l.name.clone(), l.tracker_position()))
            .collect();
        tracked.sort_by(|a, b| a.0.cmp(&b.0));
        tracked
    }

    /// Current state and displayed position of every landmark.
    pub fn snapshot(&self) -> HashMap<LandmarkId, (TrackingState, Point3<f32>)> {
        self.landmarks
            .iter()
            .map(|(id, l)| (id.clone(), (l.state(), l.position())))
            .collect()
    }

    /// Drop every landmark.
    pub fn clear(&mut self) {
        self.landmarks.clear();
    }
}
