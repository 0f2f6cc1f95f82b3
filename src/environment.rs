//! Environment occlusion queries used by neighbour inference.

use std::time::Duration;

use nalgebra::{Point3, Vector3};

/// Spatial-mesh backed ray queries.
pub trait OcclusionQuery: Send + Sync {
    /// Cast a ray from `origin` along `direction` (need not be normalized).
    ///
    /// Returns the distance to the first surface hit within `max_distance`.
    fn probe(&self, origin: &Point3<f32>, direction: &Vector3<f32>, max_distance: f32)
        -> Option<f32>;

    /// Radius around the user within which the mesh is observed.
    fn observation_radius(&self) -> f32;

    /// How often the environment mesh refreshes.
    fn update_interval(&self) -> Duration;
}

/// An environment without any surfaces.
#[derive(Debug, Clone)]
pub struct OpenSpace {
    /// Observation radius reported to callers.
    pub observation_radius: f32,
    /// Mesh update interval reported to callers.
    pub update_interval: Duration,
}

impl Default for OpenSpace {
    fn default() -> Self {
        Self {
            observation_radius: 10.0,
            update_interval: Duration::from_millis(3500),
        }
    }
}

impl OcclusionQuery for OpenSpace {
    fn probe(&self, _: &Point3<f32>, _: &Vector3<f32>, _: f32) -> Option<f32> {
        None
    }

    fn observation_radius(&self) -> f32 {
        self.observation_radius
    }

    fn update_interval(&self) -> Duration {
        self.update_interval
    }
}

/// Axis-aligned box obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Box spanning the two corners in any order.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Slab test. Distance along the unit ray to the entry point, if hit ahead.
    pub fn ray_hit(&self, origin: &Point3<f32>, unit_dir: &Vector3<f32>) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = unit_dir[axis];
            if d.abs() < f32::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// A simulated environment made of box obstacles (walls, floors, ceilings).
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Aabb>,
    open: OpenSpace,
}

impl ObstacleField {
    /// Empty field with default radius and update interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the reported observation radius and update interval.
    pub fn with_observation(mut self, radius: f32, update_interval: Duration) -> Self {
        self.open = OpenSpace {
            observation_radius: radius,
            update_interval,
        };
        self
    }

    /// Add an obstacle.
    pub fn add(&mut self, obstacle: Aabb) -> &mut Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Number of obstacles.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// True when there are no obstacles.
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl OcclusionQuery for ObstacleField {
    fn probe(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        max_distance: f32,
    ) -> Option<f32> {
        let unit = direction.try_normalize(f32::EPSILON)?;
        self.obstacles
            .iter()
            .filter_map(|b| b.ray_hit(origin, &unit))
            .filter(|&t| t <= max_distance)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn observation_radius(&self) -> f32 {
        self.open.observation_radius
    }

    fn update_interval(&self) -> Duration {
        self.open.update_interval
    }
}
