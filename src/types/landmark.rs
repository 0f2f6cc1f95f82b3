//! Landmark identity, tracking state and the live landmark record.

use std::sync::Arc;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::pose::{Pose, Tracker};

/// Stable unique landmark id. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkId(String);

impl LandmarkId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LandmarkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LandmarkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much the current position of a landmark can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Live tracker is locked; pose is authoritative.
    Located,
    /// Pose estimated from other landmarks.
    LocationDeduced,
    /// No usable position.
    Lost,
}

impl TrackingState {
    /// True when the landmark has a usable position.
    pub fn has_position(&self) -> bool {
        !matches!(self, Self::Lost)
    }

    /// Return a human-readable name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Located => "located",
            Self::LocationDeduced => "location_deduced",
            Self::Lost => "lost",
        }
    }
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-landmark selection visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMark {
    /// Not selected.
    #[default]
    NotSelected,
    /// The primary (single) selection.
    SinglySelected,
    /// One of the secondary (multi) selections.
    MultiSelected,
}

/// A live landmark: identity, name, tracker handle and displayed pose.
#[derive(Debug, Clone)]
pub struct Landmark {
    id: LandmarkId,
    /// User-editable display name; may be empty.
    pub name: String,
    tracker: Arc<dyn Tracker>,
    state: TrackingState,
    pose: Pose,
    /// Selection visual state, driven by the selection coordinator.
    pub selection: SelectionMark,
}

impl Landmark {
    /// Create a landmark. It starts `Lost` at its tracker's current pose.
    pub fn new(id: LandmarkId, name: impl Into<String>, tracker: Arc<dyn Tracker>) -> Self {
        let pose = tracker.pose();
        Self {
            id,
            name: name.into(),
            tracker,
            state: TrackingState::Lost,
            pose,
            selection: SelectionMark::NotSelected,
        }
    }

    /// Landmark id.
    pub fn id(&self) -> &LandmarkId {
        &self.id
    }

    /// Current tracking state.
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Displayed pose (authoritative, deduced, or stale depending on state).
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Displayed position.
    pub fn position(&self) -> Point3<f32> {
        self.pose.position
    }

    /// Tracker handle.
    pub fn tracker(&self) -> &Arc<dyn Tracker> {
        &self.tracker
    }

    /// Whether the live tracker is currently locked.
    pub fn is_tracked(&self) -> bool {
        self.tracker.is_located()
    }

    /// Position reported by the tracker itself, regardless of lock.
    pub fn tracker_position(&self) -> Point3<f32> {
        self.tracker.pose().position
    }

    /// Adopt the tracker pose if it has lock. Returns whether it did.
    ///
    /// A `Located` landmark whose tracker dropped lock becomes `Lost`; its
    /// stale pose must not serve as a deduction reference.
    pub fn refresh_from_tracker(&mut self) -> bool {
        if !self.tracker.is_located() {
            if self.state == TrackingState::Located {
                self.state = TrackingState::Lost;
            }
            return false;
        }
        self.pose = self.tracker.pose();
        self.state = TrackingState::Located;
        true
    }

    /// Record a deduced position; orientation is kept.
    pub fn set_deduced(&mut self, position: Point3<f32>) {
        self.pose.position = position;
        self.state = TrackingState::LocationDeduced;
    }

    /// Mark the landmark as having no usable position.
    pub fn mark_lost(&mut self) {
        self.state = TrackingState::Lost;
    }
}
