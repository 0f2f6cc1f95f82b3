//! Route planning over the landmark graph with A*.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use nalgebra::Point3;

use crate::config::{EdgeSelection, NavConfig};
use crate::graph::{LandmarkRegistry, RelationGraph, SharedGraph, SharedRegistry};
use crate::types::{LandmarkId, NavError, NavResult};

use super::sectors::{select_sector_neighbours, SectorParams};

/// One landmark along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Landmark id.
    pub id: LandmarkId,
    /// Landmark position when the route was planned.
    pub position: Point3<f32>,
}

/// Ordered landmarks from the start landmark to the destination.
///
/// An empty route means no route exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    /// Waypoints, start first.
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    /// The "no route" result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no route was found.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Waypoint positions in order.
    pub fn positions(&self) -> Vec<Point3<f32>> {
        self.waypoints.iter().map(|w| w.position).collect()
    }

    /// Waypoint ids in order.
    pub fn ids(&self) -> Vec<&LandmarkId> {
        self.waypoints.iter().map(|w| &w.id).collect()
    }

    /// Sum of segment lengths.
    pub fn total_length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| (pair[1].position - pair[0].position).norm())
            .sum()
    }
}

/// Priority-queue entry; ordered so the heap pops the lowest f-score.
#[derive(Debug, Clone)]
struct SearchNode {
    id: LandmarkId,
    f_score: f32,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted A* from `start` to `goal`.
///
/// Edge cost and heuristic are both Euclidean distance. Returns the id
/// sequence start..=goal, or `None` when the goal is unreachable.
pub fn astar(
    start: &LandmarkId,
    goal: &LandmarkId,
    positions: &HashMap<LandmarkId, Point3<f32>>,
    adjacency: &HashMap<LandmarkId, Vec<LandmarkId>>,
) -> Option<Vec<LandmarkId>> {
    let goal_position = *positions.get(goal)?;
    let start_position = *positions.get(start)?;
    let heuristic = |p: &Point3<f32>| (goal_position - p).norm();

    let mut open_set = BinaryHeap::new();
    let mut closed: HashSet<LandmarkId> = HashSet::new();
    let mut came_from: HashMap<LandmarkId, LandmarkId> = HashMap::new();
    let mut g_score: HashMap<LandmarkId, f32> = HashMap::new();

    g_score.insert(start.clone(), 0.0);
    open_set.push(SearchNode {
        id: start.clone(),
        f_score: heuristic(&start_position),
    });

    let mut expansions = 0usize;
    let mut reached = false;

    while let Some(current) = open_set.pop() {
        if !closed.insert(current.id.clone()) {
            continue;
        }
        expansions += 1;
        if &current.id == goal {
            reached = true;
            break;
        }

        let current_g = g_score.get(&current.id).copied().unwrap_or(f32::INFINITY);
        let Some(current_position) = positions.get(&current.id) else {
            continue;
        };

        for neighbour in adjacency.get(&current.id).into_iter().flatten() {
            if closed.contains(neighbour) {
                continue;
            }
            let Some(neighbour_position) = positions.get(neighbour) else {
                continue;
            };

            let tentative_g = current_g + (neighbour_position - current_position).norm();
            if tentative_g < g_score.get(neighbour).copied().unwrap_or(f32::INFINITY) {
                came_from.insert(neighbour.clone(), current.id.clone());
                g_score.insert(neighbour.clone(), tentative_g);
                open_set.push(SearchNode {
                    id: neighbour.clone(),
                    f_score: tentative_g + heuristic(neighbour_position),
                });
            }
        }
    }

    log::debug!("A* finished after {expansions} expansions, reached={reached}");
    if !reached {
        return None;
    }

    let mut path = vec![goal.clone()];
    let mut node = goal;
    while let Some(parent) = came_from.get(node) {
        path.push(parent.clone());
        node = parent;
    }
    path.reverse();
    Some(path)
}

/// Plans walkable routes between landmarks.
pub struct PathPlanner {
    registry: SharedRegistry,
    graph: SharedGraph,
    edge_selection: EdgeSelection,
    sector_params: SectorParams,
}

impl PathPlanner {
    /// Create a planner over the shared registry and graph.
    pub fn new(registry: SharedRegistry, graph: SharedGraph, config: &NavConfig) -> Self {
        Self {
            registry,
            graph,
            edge_selection: config.edge_selection,
            sector_params: SectorParams::from(config),
        }
    }

    /// Route from the landmark nearest `start` to the landmark named `name`.
    ///
    /// When several landmarks share the name, a positioned one is preferred.
    pub fn find_by_name(&self, start: Point3<f32>, name: &str) -> NavResult<Route> {
        let destination = {
            let registry = self.registry.read();
            if registry.is_empty() {
                log::info!("No landmark exists. Stop finding path.");
                return Ok(Route::empty());
            }
            let mut matches = registry.find_by_name(name);
            if matches.is_empty() {
                log::warn!("Unable to find landmark name: {name:?}");
                return Err(NavError::DestinationNotFound(name.to_string()));
            }
            matches.sort_by(|a, b| {
                b.state()
                    .has_position()
                    .cmp(&a.state().has_position())
                    .then_with(|| a.id().cmp(b.id()))
            });
            matches[0].id().clone()
        };
        self.find(start, &destination)
    }

    /// Route from the landmark nearest `start` to `destination`.
    pub fn find(&self, start: Point3<f32>, destination: &LandmarkId) -> NavResult<Route> {
        let registry = self.registry.read();
        let graph = self.graph.read();

        if registry.is_empty() {
            log::info!("No landmark exists. Stop finding path.");
            return Ok(Route::empty());
        }

        let target = registry.get(destination)?;
        if !target.state().has_position() {
            log::warn!("Landmark {destination} lost tracking. Unable to find path.");
            return Err(NavError::DestinationLost(destination.clone()));
        }

        let positions = positioned(&registry);
        let Some(start_id) = nearest(&positions, &start) else {
            return Ok(Route::empty());
        };
        let adjacency = self.edges(&graph, &positions);

        match astar(&start_id, destination, &positions, &adjacency) {
            Some(ids) => {
                log::info!("Path found with {} waypoints", ids.len());
                let waypoints = ids
                    .into_iter()
                    .filter_map(|id| positions.get(&id).map(|&position| Waypoint { id, position }))
                    .collect();
                Ok(Route { waypoints })
            }
            None => {
                log::warn!("Fail to find a path to landmark {destination}");
                Ok(Route::empty())
            }
        }
    }

    /// Navigable directed edges between currently positioned landmarks.
    pub fn navigable_edges(&self) -> HashMap<LandmarkId, Vec<LandmarkId>> {
        let registry = self.registry.read();
        let graph = self.graph.read();
        let positions = positioned(&registry);
        self.edges(&graph, &positions)
    }

    fn edges(
        &self,
        graph: &RelationGraph,
        positions: &HashMap<LandmarkId, Point3<f32>>,
    ) -> HashMap<LandmarkId, Vec<LandmarkId>> {
        let mut adjacency = HashMap::with_capacity(positions.len());

        for (id, position) in positions {
            let candidates: Vec<(LandmarkId, nalgebra::Vector3<f32>)> = graph
                .neighbours(id)
                .into_iter()
                .flatten()
                .filter_map(|other| positions.get(other).map(|p| (other.clone(), p - position)))
                .collect();

            let selected = match self.edge_selection {
                EdgeSelection::SectorPruned => {
                    select_sector_neighbours(candidates, &self.sector_params)
                }
                EdgeSelection::Maintained => candidates.into_iter().map(|(id, _)| id).collect(),
            };
            adjacency.insert(id.clone(), selected);
        }

        adjacency
    }
}

/// Positions of every landmark that is not lost.
fn positioned(registry: &LandmarkRegistry) -> HashMap<LandmarkId, Point3<f32>> {
    registry
        .all()
        .filter(|l| l.state().has_position())
        .map(|l| (l.id().clone(), l.position()))
        .collect()
}

/// The positioned landmark closest to `point`; ties go to the smaller id.
fn nearest(positions: &HashMap<LandmarkId, Point3<f32>>, point: &Point3<f32>) -> Option<LandmarkId> {
    positions
        .iter()
        .min_by(|(a_id, a), (b_id, b)| {
            (*a - point)
                .norm()
                .total_cmp(&(*b - point).norm())
                .then_with(|| a_id.cmp(b_id))
        })
        .map(|(id, _)| id.clone())
}
