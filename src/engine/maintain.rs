//! Graph maintenance: offset recomputation and neighbour inference.
//!
//! Offset updates run synchronously inside the creating/removing call.
//! Neighbour inference for a new landmark runs later on the tokio runtime,
//! once the environment mesh has had time to settle. Inference tasks run one
//! at a time in creation order.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use nalgebra::{Point3, Vector3};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::NavConfig;
use crate::environment::OcclusionQuery;
use crate::format::GraphFile;
use crate::graph::{LandmarkRegistry, RelationGraph, SharedGraph, SharedRegistry};
use crate::types::{Landmark, LandmarkId, NavError, NavResult, Tracker};

/// Tunables for [`infer_neighbours`].
#[derive(Debug, Clone, Copy)]
pub struct InferenceParams {
    /// Only landmarks within this distance are candidates.
    pub observation_radius: f32,
    /// Vertical offset of the extra probes above and below.
    pub probe_margin: f32,
    /// Reach of the floor and ceiling detection probes.
    pub vertical_probe_distance: f32,
}

impl InferenceParams {
    /// Resolve against the config and environment.
    pub fn resolve(config: &NavConfig, environment: &dyn OcclusionQuery) -> Self {
        Self {
            observation_radius: config.observation_radius(environment),
            probe_margin: config.probe_margin,
            vertical_probe_distance: config.vertical_probe_distance,
        }
    }
}

/// True when a surface lies between the two ends, probing from both.
fn segment_blocked(
    environment: &dyn OcclusionQuery,
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
) -> bool {
    let max_distance = direction.norm();
    let destination = origin + direction;
    environment.probe(origin, direction, max_distance).is_some()
        || environment
            .probe(&destination, &-direction, max_distance)
            .is_some()
}

/// Discover the physical neighbours of `id` and record them mutually.
///
/// Candidates are other positioned landmarks within the observation radius.
/// A candidate survives only if every probe to it is clear: one at the
/// landmark's height plus one a margin below and one a margin above, the
/// latter two skipped when the floor or ceiling is closer than the margin.
/// The node's neighbour set is replaced with the survivors and each survivor
/// gains `id`. Returns the survivors.
pub fn infer_neighbours(
    registry: &LandmarkRegistry,
    graph: &mut RelationGraph,
    environment: &dyn OcclusionQuery,
    id: &LandmarkId,
    params: &InferenceParams,
) -> NavResult<Vec<LandmarkId>> {
    let landmark = registry.get(id)?;
    let origin = landmark.position();

    let mut candidates: Vec<&Landmark> = registry
        .all()
        .filter(|other| other.id() != id)
        .filter(|other| other.state().has_position())
        .filter(|other| (other.position() - origin).norm() <= params.observation_radius)
        .collect();
    candidates.sort_by(|a, b| a.id().cmp(b.id()));

    let up = Vector3::y();
    let clear_of = |hit: Option<f32>| hit.map_or(true, |d| d > params.probe_margin);
    let probe_bottom = clear_of(environment.probe(&origin, &-up, params.vertical_probe_distance));
    let probe_top = clear_of(environment.probe(&origin, &up, params.vertical_probe_distance));
    let bottom = origin - up * params.probe_margin;
    let top = origin + up * params.probe_margin;

    let mut neighbours: Vec<LandmarkId> = Vec::new();
    for other in candidates {
        let direction = other.position() - origin;
        if probe_bottom && segment_blocked(environment, &bottom, &direction) {
            continue;
        }
        if probe_top && segment_blocked(environment, &top, &direction) {
            continue;
        }
        if segment_blocked(environment, &origin, &direction) {
            continue;
        }
        neighbours.push(other.id().clone());
    }

    graph.ensure_node(id, &landmark.name);
    for neighbour in &neighbours {
        if let Ok(other) = registry.get(neighbour) {
            graph
                .ensure_node(neighbour, &other.name)
                .neighbours
                .insert(id.clone());
        }
    }
    graph.set_neighbours(id, neighbours.iter().cloned().collect::<BTreeSet<_>>());

    log::debug!("Landmark {id} inferred {} neighbours", neighbours.len());
    Ok(neighbours)
}

/// Decrements the outstanding-inference count when dropped, even on panic.
struct PendingGuard(Arc<watch::Sender<usize>>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Keeps the relation graph consistent with the live landmark set.
pub struct GraphMaintainer {
    registry: SharedRegistry,
    graph: SharedGraph,
    environment: Arc<dyn OcclusionQuery>,
    file: GraphFile,
    params: InferenceParams,
    settle_delay: Duration,
    runtime: Handle,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<watch::Sender<usize>>,
}

impl GraphMaintainer {
    /// Create a maintainer. Inference tasks are spawned on `runtime`.
    pub fn new(
        registry: SharedRegistry,
        graph: SharedGraph,
        environment: Arc<dyn OcclusionQuery>,
        file: GraphFile,
        config: &NavConfig,
        runtime: Handle,
    ) -> Self {
        let params = InferenceParams::resolve(config, environment.as_ref());
        let settle_delay = config.settle_delay(environment.as_ref());
        let (pending, _) = watch::channel(0usize);
        Self {
            registry,
            graph,
            environment,
            file,
            params,
            settle_delay,
            runtime,
            in_flight: Mutex::new(None),
            pending: Arc::new(pending),
        }
    }

    /// Whether a neighbour inference task is queued or running.
    pub fn is_inference_pending(&self) -> bool {
        *self.pending.borrow() > 0
    }

    /// Wait until every queued inference task has finished.
    pub async fn wait_for_inference(&self) {
        let mut rx = self.pending.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Register a new landmark and update the graph around it.
    pub fn register(
        &self,
        id: LandmarkId,
        name: &str,
        tracker: Arc<dyn Tracker>,
    ) -> NavResult<()> {
        self.registry.write().create(id.clone(), name, tracker)?;
        self.on_created(&id)
    }

    /// Recompute offsets after `id` was created, then queue its neighbour inference.
    ///
    /// The new landmark joins the tracked set even before its tracker has
    /// lock, since it was placed at its tracker's pose.
    pub fn on_created(&self, id: &LandmarkId) -> NavResult<()> {
        {
            let registry = self.registry.read();
            let landmark = registry.get(id)?;
            let mut graph = self.graph.write();

            graph.sweep_stale(|node| registry.contains(node));

            let mut located = registry.tracked();
            if !located.iter().any(|(other, _, _)| other == id) {
                located.push((
                    id.clone(),
                    landmark.name.clone(),
                    landmark.tracker_position(),
                ));
            }
            graph.recompute_offsets(&located);

            for node in graph.nodes() {
                log::debug!("{}: {} offsets", node.id, node.offsets.len());
            }
            self.file.save_or_log(&graph);
        }

        self.schedule_inference(id.clone());
        Ok(())
    }

    /// Unregister a landmark and purge it from the graph.
    ///
    /// Refused with [`NavError::InferencePending`] while inference is outstanding.
    pub fn unregister(&self, id: &LandmarkId) -> NavResult<Landmark> {
        if self.is_inference_pending() {
            return Err(NavError::InferencePending);
        }

        let mut registry = self.registry.write();
        let removed = registry.remove(id)?;
        let mut graph = self.graph.write();

        graph.remove_node(id);
        graph.sweep_stale(|node| registry.contains(node));
        graph.strip_references(id);
        graph.recompute_offsets(&registry.tracked());
        self.file.save_or_log(&graph);

        Ok(removed)
    }

    /// Rename a landmark. A landmark without a graph node is treated as newly created.
    pub fn rename(&self, id: &LandmarkId, name: &str) -> NavResult<()> {
        let has_node = {
            let mut registry = self.registry.write();
            registry.get_mut(id)?.name = name.to_string();
            let mut graph = self.graph.write();
            let renamed = graph.rename(id, name);
            if renamed {
                self.file.save_or_log(&graph);
            }
            renamed
        };

        if has_node {
            Ok(())
        } else {
            self.on_created(id)
        }
    }

    /// Drop every node and persist the empty graph.
    pub fn clear(&self) {
        let mut graph = self.graph.write();
        graph.clear();
        self.file.save_or_log(&graph);
    }

    /// Persist the current graph.
    pub fn persist(&self) {
        let graph = self.graph.read();
        self.file.save_or_log(&graph);
    }

    fn schedule_inference(&self, id: LandmarkId) {
        self.pending.send_modify(|n| *n += 1);
        let guard = PendingGuard(Arc::clone(&self.pending));

        let registry = Arc::clone(&self.registry);
        let graph = Arc::clone(&self.graph);
        let environment = Arc::clone(&self.environment);
        let file = self.file.clone();
        let params = self.params;
        let delay = self.settle_delay;

        let mut slot = self.in_flight.lock();
        let previous = slot.take();
        let handle = self.runtime.spawn(async move {
            let _guard = guard;
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    log::error!("Previous neighbour inference failed: {e}");
                }
            }
            tokio::time::sleep(delay).await;

            let registry = registry.read();
            let mut graph = graph.write();
            match infer_neighbours(&registry, &mut graph, environment.as_ref(), &id, &params) {
                Ok(_) => file.save_or_log(&graph),
                Err(e) => log::warn!("Skipping neighbour inference for {id}: {e}"),
            }
        });
        *slot = Some(handle);
    }
}
