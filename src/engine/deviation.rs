//! Sliding-window tracking jitter estimation.

use std::collections::VecDeque;

use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Positions are scaled to centimetres before variance is taken.
const POSITION_SCALE: f32 = 100.0;

/// Variance of recent positions and frame-to-frame rotation angles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingJitter {
    /// Mean squared distance from the window's mean position (cm²).
    pub position: f32,
    /// Variance of frame-to-frame rotation angles (deg²).
    pub rotation: f32,
}

/// Fixed-length window of pose samples for one landmark.
#[derive(Debug, Clone)]
pub struct DeviationWindow {
    positions: VecDeque<Vector3<f32>>,
    rotation_diffs: VecDeque<f32>,
    last_rotation: Option<UnitQuaternion<f32>>,
    window: usize,
}

impl DeviationWindow {
    /// Create a window holding at most `window` samples of each kind.
    pub fn new(window: usize) -> Self {
        Self {
            positions: VecDeque::with_capacity(window),
            rotation_diffs: VecDeque::with_capacity(window),
            last_rotation: None,
            window: window.max(1),
        }
    }

    /// Drop every sample.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.rotation_diffs.clear();
        self.last_rotation = None;
    }

    /// Record a position sample.
    pub fn push_position(&mut self, position: &Point3<f32>) {
        self.positions.push_back(position.coords * POSITION_SCALE);
        if self.positions.len() > self.window {
            self.positions.pop_front();
        }
    }

    /// Record an orientation sample. The first sample contributes a zero angle.
    pub fn push_rotation(&mut self, rotation: &UnitQuaternion<f32>) {
        let diff = match self.last_rotation {
            Some(last) => last.angle_to(rotation).to_degrees().abs(),
            None => 0.0,
        };
        self.last_rotation = Some(*rotation);
        self.rotation_diffs.push_back(diff);
        if self.rotation_diffs.len() > self.window {
            self.rotation_diffs.pop_front();
        }
    }

    /// Positional variance over the window.
    pub fn position_deviation(&self) -> f32 {
        let count = self.positions.len();
        if count == 0 {
            return 0.0;
        }
        let mean: Vector3<f32> = self.positions.iter().sum::<Vector3<f32>>() / count as f32;
        self.positions
            .iter()
            .map(|p| (p - mean).norm_squared())
            .sum::<f32>()
            / count as f32
    }

    /// Variance of the frame-to-frame rotation angles over the window.
    pub fn rotation_deviation(&self) -> f32 {
        let count = self.rotation_diffs.len();
        if count == 0 {
            return 0.0;
        }
        let n = count as f32;
        let sum: f32 = self.rotation_diffs.iter().sum();
        let sum_squared: f32 = self.rotation_diffs.iter().map(|d| d * d).sum();
        let mean = sum / n;
        sum_squared / n - mean * mean
    }

    /// Both deviations.
    pub fn jitter(&self) -> TrackingJitter {
        TrackingJitter {
            position: self.position_deviation(),
            rotation: self.rotation_deviation(),
        }
    }
}
