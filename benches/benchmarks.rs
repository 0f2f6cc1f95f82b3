//! Criterion benchmarks for landmark navigation.

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point3;
use rand::Rng;
use tempfile::TempDir;

use landmark_nav::config::NavConfig;
use landmark_nav::engine::{infer_neighbours, InferenceParams, PathPlanner, PositionDeducer};
use landmark_nav::environment::{Aabb, ObstacleField};
use landmark_nav::format::GraphFile;
use landmark_nav::graph::{LandmarkRegistry, RelationGraph, SharedGraph, SharedRegistry};
use landmark_nav::store::ManualTracker;
use landmark_nav::types::{LandmarkId, Pose};

/// Random landmarks on a square floor, linked to every landmark within `link_radius`.
fn make_floor(
    count: usize,
    size: f32,
    link_radius: f32,
) -> (SharedRegistry, SharedGraph, Vec<Arc<ManualTracker>>) {
    let mut rng = rand::thread_rng();
    let mut registry = LandmarkRegistry::new();
    let mut trackers = Vec::with_capacity(count);

    for i in 0..count {
        let pose = Pose::at(rng.gen_range(0.0..size), 0.0, rng.gen_range(0.0..size));
        let tracker = ManualTracker::located(pose).shared();
        let name = format!("landmark_{}", i);
        let _ = registry.create(LandmarkId::from(name.as_str()), name, tracker.clone());
        trackers.push(tracker);
    }

    let tracked = registry.tracked();
    let mut graph = RelationGraph::new();
    graph.recompute_offsets(&tracked);
    for (i, (a, _, pa)) in tracked.iter().enumerate() {
        for (b, _, pb) in &tracked[i + 1..] {
            if (pa - pb).norm() <= link_radius {
                graph.link(a, b);
            }
        }
    }

    for landmark in registry.all_mut() {
        landmark.refresh_from_tracker();
    }
    (registry.into_shared(), graph.into_shared(), trackers)
}

fn bench_recompute_offsets_200(c: &mut Criterion) {
    let (registry, _, _) = make_floor(200, 50.0, 0.0);
    let tracked = registry.read().tracked();
    let mut graph = RelationGraph::new();

    c.bench_function("recompute_offsets_200", |b| {
        b.iter(|| graph.recompute_offsets(&tracked))
    });
}

fn bench_deduction_tick(c: &mut Criterion) {
    let (registry, graph, trackers) = make_floor(500, 60.0, 8.0);
    for tracker in trackers.iter().step_by(2) {
        tracker.set_located(false);
    }
    let deducer = PositionDeducer::new(registry, graph, &NavConfig::default());

    c.bench_function("deduction_tick_500_half_lost", |b| b.iter(|| deducer.tick()));
}

fn bench_find_path(c: &mut Criterion) {
    let (registry, graph, _) = make_floor(1_000, 100.0, 8.0);
    let planner = PathPlanner::new(registry, graph, &NavConfig::default());

    c.bench_function("find_path_1k", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let target = format!("landmark_{}", rng.gen_range(0..1_000));
            let _ = planner.find_by_name(Point3::origin(), &target);
        })
    });
}

fn bench_infer_neighbours(c: &mut Criterion) {
    let (registry, _, _) = make_floor(300, 40.0, 0.0);
    let registry = registry.read();
    let mut rng = rand::thread_rng();
    let mut field = ObstacleField::new().with_observation(10.0, Duration::ZERO);
    for _ in 0..100 {
        let x = rng.gen_range(0.0..40.0);
        let z = rng.gen_range(0.0..40.0);
        field.add(Aabb::new(
            Point3::new(x, -1.5, z),
            Point3::new(x + rng.gen_range(0.1..3.0), 2.5, z + rng.gen_range(0.1..3.0)),
        ));
    }
    let params = InferenceParams {
        observation_radius: 10.0,
        probe_margin: 0.5,
        vertical_probe_distance: 100.0,
    };
    let ids = registry.ids();
    let mut graph = RelationGraph::new();

    c.bench_function("infer_neighbours_300_with_100_walls", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let _ = infer_neighbours(&registry, &mut graph, &field, &ids[i % ids.len()], &params);
            i += 1;
        })
    });
}

fn bench_save_graph_1k(c: &mut Criterion) {
    let (_, graph, _) = make_floor(1_000, 100.0, 8.0);
    let dir = TempDir::new().unwrap();
    let file = GraphFile::new(dir.path().join("graph.json"));
    let graph = graph.read();

    c.bench_function("save_graph_1k", |b| b.iter(|| file.save(&graph).unwrap()));
}

criterion_group!(
    benches,
    bench_recompute_offsets_200,
    bench_deduction_tick,
    bench_find_path,
    bench_infer_neighbours,
    bench_save_graph_1k,
);
criterion_main!(benches);
