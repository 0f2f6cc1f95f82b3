//! Path planning tests.

use std::sync::Arc;

use landmark_nav::config::{EdgeSelection, NavConfig};
use landmark_nav::engine::{PathPlanner, PositionDeducer};
use landmark_nav::graph::{LandmarkRegistry, RelationGraph, SharedGraph, SharedRegistry};
use landmark_nav::store::ManualTracker;
use landmark_nav::types::{LandmarkId, NavError, Pose};
use nalgebra::Point3;

// ==================== Helpers ====================

struct World {
    registry: SharedRegistry,
    graph: SharedGraph,
    trackers: Vec<Arc<ManualTracker>>,
}

impl World {
    /// Located landmarks named after their ids, linked along `edges`.
    fn new(spots: &[(&str, f32, f32, f32)], edges: &[(&str, &str)]) -> Self {
        let mut registry = LandmarkRegistry::new();
        let mut trackers = Vec::new();
        for &(name, x, y, z) in spots {
            let tracker = ManualTracker::located(Pose::at(x, y, z)).shared();
            registry
                .create(LandmarkId::from(name), name, tracker.clone())
                .unwrap();
            trackers.push(tracker);
        }

        let mut graph = RelationGraph::new();
        graph.recompute_offsets(&registry.tracked());
        for &(a, b) in edges {
            graph.link(&LandmarkId::from(a), &LandmarkId::from(b));
        }

        let world = Self {
            registry: registry.into_shared(),
            graph: graph.into_shared(),
            trackers,
        };
        world.tick();
        world
    }

    fn tick(&self) {
        PositionDeducer::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.graph),
            &NavConfig::default(),
        )
        .tick();
    }

    fn planner(&self, edge_selection: EdgeSelection) -> PathPlanner {
        let config = NavConfig {
            edge_selection,
            ..NavConfig::default()
        };
        PathPlanner::new(Arc::clone(&self.registry), Arc::clone(&self.graph), &config)
    }
}

fn ids(names: &[&str]) -> Vec<LandmarkId> {
    names.iter().map(|n| LandmarkId::from(*n)).collect()
}

// ==================== Routes ====================

#[test]
fn test_route_through_middle_landmark() {
    let world = World::new(
        &[
            ("start-nearest", 0.0, 0.0, 0.0),
            ("mid", 5.0, 0.0, 0.0),
            ("dest", 10.0, 0.0, 0.0),
        ],
        &[("start-nearest", "mid"), ("mid", "dest"), ("start-nearest", "dest")],
    );

    let route = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::origin(), "dest")
        .unwrap();

    assert_eq!(
        route.positions(),
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ]
    );
    assert!((route.total_length() - 10.0).abs() < 1e-5);
}

#[test]
fn test_start_snaps_to_nearest_landmark() {
    let world = World::new(
        &[("a", 0.0, 0.0, 0.0), ("b", 4.0, 0.0, 0.0), ("c", 4.0, 0.0, 4.0)],
        &[("a", "b"), ("b", "c")],
    );

    let route = world
        .planner(EdgeSelection::Maintained)
        .find_by_name(Point3::new(3.5, 1.0, 0.2), "c")
        .unwrap();

    let route_ids: Vec<LandmarkId> = route.ids().into_iter().cloned().collect();
    assert_eq!(route_ids, ids(&["b", "c"]));
}

#[test]
fn test_detour_around_missing_edge() {
    let world = World::new(
        &[
            ("a", 0.0, 0.0, 0.0),
            ("b", 3.0, 0.0, 0.0),
            ("c", 3.0, 0.0, 3.0),
            ("d", 6.0, 0.0, 3.0),
            ("e", 6.0, 0.0, 0.0),
        ],
        &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
    );

    let route = world
        .planner(EdgeSelection::Maintained)
        .find_by_name(Point3::origin(), "e")
        .unwrap();

    let route_ids: Vec<LandmarkId> = route.ids().into_iter().cloned().collect();
    assert_eq!(route_ids, ids(&["a", "b", "c", "d", "e"]));
}

#[test]
fn test_same_start_and_destination() {
    let world = World::new(&[("a", 0.0, 0.0, 0.0), ("b", 2.0, 0.0, 0.0)], &[("a", "b")]);
    let route = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::new(0.1, 0.0, 0.0), "a")
        .unwrap();
    assert_eq!(route.len(), 1);
    assert_eq!(route.positions(), vec![Point3::origin()]);
}

#[test]
fn test_lost_landmarks_are_routed_around() {
    let world = World::new(
        &[
            ("a", 0.0, 0.0, 0.0),
            ("b", 2.0, 0.0, 0.0),
            ("c", 4.0, 0.0, 0.0),
            ("d", 2.0, 0.0, 2.0),
        ],
        &[("a", "b"), ("b", "c"), ("a", "d"), ("d", "c")],
    );

    // b loses lock and every offset it has points at a landmark that is also gone.
    world.graph.write().get_node_mut(&LandmarkId::from("b")).unwrap().offsets.clear();
    world.trackers[1].set_located(false);
    world.tick();

    let route = world
        .planner(EdgeSelection::Maintained)
        .find_by_name(Point3::origin(), "c")
        .unwrap();
    let route_ids: Vec<LandmarkId> = route.ids().into_iter().cloned().collect();
    assert_eq!(route_ids, ids(&["a", "d", "c"]));
}

// ==================== Failures ====================

#[test]
fn test_unreachable_destination_is_empty() {
    let world = World::new(
        &[("a", 0.0, 0.0, 0.0), ("b", 1.0, 0.0, 0.0), ("island", 5.0, 0.0, 0.0)],
        &[("a", "b")],
    );
    let route = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::origin(), "island")
        .unwrap();
    assert!(route.is_empty());
}

#[test]
fn test_unknown_destination_fails() {
    let world = World::new(&[("a", 0.0, 0.0, 0.0)], &[]);
    let result = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::origin(), "nowhere");
    assert!(matches!(result, Err(NavError::DestinationNotFound(name)) if name == "nowhere"));
}

#[test]
fn test_lost_destination_fails() {
    let world = World::new(&[("a", 0.0, 0.0, 0.0), ("b", 1.0, 0.0, 0.0)], &[("a", "b")]);
    world.graph.write().get_node_mut(&LandmarkId::from("b")).unwrap().offsets.clear();
    world.trackers[1].set_located(false);
    world.tick();

    let result = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::origin(), "b");
    assert!(matches!(result, Err(NavError::DestinationLost(id)) if id.as_str() == "b"));
}

#[test]
fn test_no_landmarks_is_empty() {
    let world = World::new(&[], &[]);
    let route = world
        .planner(EdgeSelection::SectorPruned)
        .find_by_name(Point3::origin(), "anything")
        .unwrap();
    assert!(route.is_empty());
}

// ==================== Edge selection ====================

#[test]
fn test_sector_pruning_keeps_nearest_per_direction() {
    let world = World::new(
        &[
            ("hub", 0.0, 0.0, 0.0),
            ("east-near", 2.0, 0.0, 0.1),
            ("east-far", 4.0, 0.0, 0.2),
            ("west", -3.0, 0.0, 0.0),
        ],
        &[("hub", "east-near"), ("hub", "east-far"), ("hub", "west")],
    );

    let edges = world.planner(EdgeSelection::SectorPruned).navigable_edges();
    let hub = &edges[&LandmarkId::from("hub")];
    assert_eq!(hub, &ids(&["east-near", "west"]));

    let edges = world.planner(EdgeSelection::Maintained).navigable_edges();
    assert_eq!(edges[&LandmarkId::from("hub")].len(), 3);
}
