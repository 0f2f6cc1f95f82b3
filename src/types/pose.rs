//! Poses and the tracker handle contract.

use std::fmt::Debug;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a landmark in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position.
    pub position: Point3<f32>,
    /// World orientation.
    pub orientation: UnitQuaternion<f32>,
}

impl Pose {
    /// Create a pose from position and orientation.
    pub fn new(position: Point3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with identity orientation.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(Point3::new(x, y, z), UnitQuaternion::identity())
    }

    /// Same orientation, position moved by `delta`.
    pub fn translated(&self, delta: Vector3<f32>) -> Self {
        Self::new(self.position + delta, self.orientation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

/// Opaque live tracking handle for one landmark.
///
/// Implementations wrap whatever the platform uses to keep a spatial anchor
/// locked; the core only asks whether it is locked and where it is.
pub trait Tracker: Send + Sync + Debug {
    /// Whether the tracker currently has lock.
    fn is_located(&self) -> bool;

    /// Current tracker pose. Authoritative only while located.
    fn pose(&self) -> Pose;
}
