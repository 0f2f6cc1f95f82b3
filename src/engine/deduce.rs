//! Fallback position estimation for landmarks whose tracker has lost lock.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::config::NavConfig;
use crate::graph::{Offset, SharedGraph, SharedRegistry};
use crate::types::{LandmarkId, TrackingState};

/// Outcome of one deduction tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeductionReport {
    /// Landmarks whose tracker had lock.
    pub located: usize,
    /// Landmarks positioned from their neighbours.
    pub deduced: usize,
    /// Landmarks left without a usable position.
    pub lost: usize,
}

/// Average `other.position + offset` over the first `limit` offsets whose
/// landmark currently has a usable position.
///
/// Entries whose landmark is unknown or lost still count towards `limit`.
pub fn deduce_position(
    offsets: &[Offset],
    positions: &HashMap<LandmarkId, (TrackingState, Point3<f32>)>,
    limit: usize,
) -> Option<Point3<f32>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;

    for offset in offsets.iter().take(limit) {
        let Some((state, position)) = positions.get(&offset.other) else {
            continue;
        };
        if !state.has_position() {
            continue;
        }
        sum += position.coords + offset.vector;
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(Point3::from(sum / count as f32))
}

/// Keeps every landmark positioned once per tick.
pub struct PositionDeducer {
    registry: SharedRegistry,
    graph: SharedGraph,
    limit: usize,
}

impl PositionDeducer {
    /// Create a deducer over the shared registry and graph.
    pub fn new(registry: SharedRegistry, graph: SharedGraph, config: &NavConfig) -> Self {
        Self {
            registry,
            graph,
            limit: config.deduction_limit,
        }
    }

    /// Refresh tracking states and positions.
    ///
    /// Tracker-locked landmarks adopt their live pose first and landmarks that
    /// just lost lock drop to `Lost`. Every other landmark is then deduced
    /// against a snapshot taken after that pass, so results do not depend on
    /// iteration order.
    pub fn tick(&self) -> DeductionReport {
        let mut registry = self.registry.write();
        let graph = self.graph.read();
        let mut report = DeductionReport::default();

        for landmark in registry.all_mut() {
            if landmark.refresh_from_tracker() {
                report.located += 1;
            }
        }

        let snapshot = registry.snapshot();
        for landmark in registry.all_mut() {
            if landmark.is_tracked() {
                continue;
            }
            let deduced = graph
                .offsets(landmark.id())
                .and_then(|offsets| deduce_position(offsets, &snapshot, self.limit));
            match deduced {
                Some(position) => {
                    landmark.set_deduced(position);
                    report.deduced += 1;
                }
                None => {
                    landmark.mark_lost();
                    report.lost += 1;
                }
            }
        }

        report
    }
}
