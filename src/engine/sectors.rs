//! Angular-sector edge pruning.
//!
//! Each node keeps at most one navigable edge per horizontal compass sector,
//! preferring the nearest candidate, and drops far candidates unless they are
//! within a multiple of the nearest pick's distance.

use nalgebra::Vector3;

use crate::config::NavConfig;
use crate::types::{LandmarkId, SECTOR_COUNT};

/// Tunables for [`select_sector_neighbours`].
#[derive(Debug, Clone, Copy)]
pub struct SectorParams {
    /// Candidates examined, nearest first.
    pub candidate_limit: usize,
    /// Candidates beyond this distance must also pass the ratio test.
    pub safe_distance: f32,
    /// Ratio to the nearest pick's distance.
    pub distance_ratio: f32,
}

impl From<&NavConfig> for SectorParams {
    fn from(config: &NavConfig) -> Self {
        Self {
            candidate_limit: config.sector_candidate_limit,
            safe_distance: config.safe_neighbour_distance,
            distance_ratio: config.sector_distance_ratio,
        }
    }
}

/// Index (0..8) of the 45° sector containing `direction` projected onto the
/// horizontal (x, z) plane. Sector 0 starts at +x and indices grow towards +z.
pub fn compute_section(direction: &Vector3<f32>) -> usize {
    let x = direction.x;
    let z = direction.z;

    if z >= 0.0 {
        if x > 0.0 {
            if (z / x).atan().to_degrees() < 45.0 {
                0
            } else {
                1
            }
        } else if x < 0.0 {
            if (-z / x).atan().to_degrees() < 45.0 {
                3
            } else {
                2
            }
        } else {
            1
        }
    } else if x > 0.0 {
        if (-z / x).atan().to_degrees() < 45.0 {
            7
        } else {
            6
        }
    } else if x < 0.0 {
        if (z / x).atan().to_degrees() < 45.0 {
            4
        } else {
            5
        }
    } else {
        6
    }
}

/// Pick navigable neighbours from `(id, relative position)` candidates.
///
/// Candidates are ordered by distance before the first `candidate_limit` are
/// examined. The nearest one is always kept; later ones are kept when their
/// sector is still free and they are not both beyond `safe_distance` and
/// beyond `distance_ratio` times the nearest pick's distance.
pub fn select_sector_neighbours(
    mut candidates: Vec<(LandmarkId, Vector3<f32>)>,
    params: &SectorParams,
) -> Vec<LandmarkId> {
    candidates.sort_by(|a, b| a.1.norm().total_cmp(&b.1.norm()));

    let mut section_found = [false; SECTOR_COUNT];
    let mut picks: Vec<LandmarkId> = Vec::new();
    let mut closest = f32::MAX;

    for (id, offset) in candidates.into_iter().take(params.candidate_limit) {
        let distance = offset.norm();
        let section = compute_section(&offset);
        if section_found[section] {
            continue;
        }

        if picks.is_empty() {
            closest = distance;
        } else if distance > params.safe_distance && distance > params.distance_ratio * closest {
            continue;
        }

        section_found[section] = true;
        picks.push(id);
    }

    picks
}
