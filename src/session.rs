//! Navigation session: owns the shared state and wires every component together.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nalgebra::Point3;
use tokio::runtime::Handle;

use crate::config::NavConfig;
use crate::engine::{
    DeductionReport, DeviationWindow, GraphMaintainer, PathPlanner, PositionDeducer, Route,
    TrackingJitter,
};
use crate::environment::OcclusionQuery;
use crate::format::GraphFile;
use crate::graph::{LandmarkRegistry, SharedGraph, SharedRegistry};
use crate::selection::{NeighbourEditor, SelectionCoordinator};
use crate::store::AnchorStore;
use crate::types::{LandmarkId, NavError, NavResult, TrackingState, Tracker};

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigation only; selecting landmarks does nothing.
    #[default]
    Release,
    /// Landmarks can be placed, inspected and re-linked.
    Editing,
}

/// What a selection does while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditingAction {
    /// Place new landmarks; selecting one focuses it.
    #[default]
    PlaceAnchor,
    /// Selecting a landmark highlights its neighbours.
    ShowNeighbours,
    /// First selection picks a master, later ones its proposed neighbours.
    OverrideNeighbours,
}

/// A running navigation session.
pub struct NavSession {
    config: NavConfig,
    registry: SharedRegistry,
    graph: SharedGraph,
    maintainer: GraphMaintainer,
    deducer: PositionDeducer,
    planner: PathPlanner,
    store: Option<Arc<dyn AnchorStore>>,
    editor: NeighbourEditor,
    mode: Mode,
    action: EditingAction,
    jitter: HashMap<LandmarkId, DeviationWindow>,
    elapsed: Duration,
}

impl NavSession {
    /// Start a session, loading the graph from `config.graph_path`.
    ///
    /// Neighbour inference tasks are spawned on `runtime`. Landmarks become
    /// available once an anchor store is attached.
    pub fn new(
        config: NavConfig,
        environment: Arc<dyn OcclusionQuery>,
        runtime: Handle,
    ) -> NavResult<Self> {
        config.validate()?;

        let file = GraphFile::new(&config.graph_path);
        let graph = file.load().into_shared();
        let registry = LandmarkRegistry::new().into_shared();

        let maintainer = GraphMaintainer::new(
            Arc::clone(&registry),
            Arc::clone(&graph),
            environment,
            file,
            &config,
            runtime,
        );
        let deducer = PositionDeducer::new(Arc::clone(&registry), Arc::clone(&graph), &config);
        let planner = PathPlanner::new(Arc::clone(&registry), Arc::clone(&graph), &config);

        Ok(Self {
            config,
            registry,
            graph,
            maintainer,
            deducer,
            planner,
            store: None,
            editor: NeighbourEditor::new(),
            mode: Mode::default(),
            action: EditingAction::default(),
            jitter: HashMap::new(),
            elapsed: Duration::ZERO,
        })
    }

    /// Start a session on the current runtime and attach the store once it resolves.
    pub async fn open<F>(
        config: NavConfig,
        environment: Arc<dyn OcclusionQuery>,
        store: F,
    ) -> NavResult<Self>
    where
        F: Future<Output = Arc<dyn AnchorStore>>,
    {
        let runtime = Handle::try_current()?;
        let mut session = Self::new(config, environment, runtime)?;
        let store = store.await;
        session.attach_store(store)?;
        Ok(session)
    }

    /// Attach the anchor store and restore every landmark it holds.
    ///
    /// With `clear_on_start` the store and the graph are wiped instead.
    pub fn attach_store(&mut self, store: Arc<dyn AnchorStore>) -> NavResult<()> {
        if self.config.clear_on_start {
            log::info!("Clearing anchor store and graph on start");
            store.clear();
            self.editor.reset(&mut *self.registry.write());
            self.registry.write().clear();
            self.maintainer.clear();
            self.store = Some(store);
            return Ok(());
        }

        let ids = store.ids();
        let mut restored = 0usize;
        {
            let mut registry = self.registry.write();
            let graph = self.graph.read();
            for id in ids {
                let Some(tracker) = store.load(&id) else {
                    log::warn!("Anchor {id} could not be loaded from the store");
                    continue;
                };
                let name = match graph.get_node(&id) {
                    Some(node) => node.name.clone(),
                    None => {
                        log::warn!("Anchor {id} is not in the graph");
                        String::new()
                    }
                };
                if registry.contains(&id) {
                    continue;
                }
                registry.create(id, name, tracker)?;
                restored += 1;
            }
        }

        log::info!("Anchor store attached; restored {restored} landmarks");
        self.store = Some(store);
        Ok(())
    }

    /// Whether an anchor store is attached.
    pub fn is_store_loaded(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> NavResult<&Arc<dyn AnchorStore>> {
        self.store.as_ref().ok_or(NavError::StoreNotLoaded)
    }

    /// Place a landmark at its tracker's pose. Returns the new id.
    pub fn place_landmark(
        &mut self,
        name: impl Into<String>,
        tracker: Arc<dyn Tracker>,
    ) -> NavResult<LandmarkId> {
        let store = Arc::clone(self.store()?);
        let id = LandmarkId::generate();
        let name = name.into();

        store.save(&id, Arc::clone(&tracker));
        if let Err(e) = self.maintainer.register(id.clone(), &name, tracker) {
            store.delete(&id);
            return Err(e);
        }

        log::info!("Landmark {id} ({name:?}) created");
        Ok(id)
    }

    /// Delete a landmark from the store, the registry and the graph.
    ///
    /// Refused with [`NavError::InferencePending`] while neighbour inference runs.
    pub fn delete_landmark(&mut self, id: &LandmarkId) -> NavResult<()> {
        let store = Arc::clone(self.store()?);
        self.maintainer.unregister(id)?;
        self.editor.reset(&mut *self.registry.write());

        if !store.delete(id) {
            log::warn!("Landmark {id} was not in the anchor store");
        }
        self.jitter.remove(id);
        log::info!("Landmark {id} deleted");
        Ok(())
    }

    /// Change a landmark's display name.
    pub fn rename_landmark(&mut self, id: &LandmarkId, name: &str) -> NavResult<()> {
        self.maintainer.rename(id, name)
    }

    /// Delete every landmark and empty the graph.
    pub fn clear_all(&mut self) -> NavResult<()> {
        let store = Arc::clone(self.store()?);
        if self.maintainer.is_inference_pending() {
            return Err(NavError::InferencePending);
        }

        {
            let mut registry = self.registry.write();
            self.editor.reset(&mut *registry);
            registry.clear();
        }
        store.clear();
        self.maintainer.clear();
        self.jitter.clear();
        log::info!("All landmarks cleared");
        Ok(())
    }

    /// Advance one frame: refresh tracking, deduce positions, sample jitter.
    pub fn tick(&mut self, dt: Duration) -> DeductionReport {
        self.elapsed += dt;
        let report = self.deducer.tick();

        let registry = self.registry.read();
        for landmark in registry.all() {
            if landmark.state() != TrackingState::Located {
                continue;
            }
            let window = self
                .jitter
                .entry(landmark.id().clone())
                .or_insert_with(|| DeviationWindow::new(self.config.deviation_window));
            let pose = landmark.pose();
            window.push_position(&pose.position);
            window.push_rotation(&pose.orientation);
        }

        report
    }

    /// Time accumulated over all ticks.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Tracking jitter observed for a landmark while it was located.
    pub fn tracking_jitter(&self, id: &LandmarkId) -> Option<TrackingJitter> {
        self.jitter.get(id).map(DeviationWindow::jitter)
    }

    /// Route from `start` to the landmark named `destination`.
    pub fn find_path(&self, start: Point3<f32>, destination: &str) -> NavResult<Route> {
        self.planner.find_by_name(start, destination)
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode. The selection is reset.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset_selection();
    }

    /// Current editing action.
    pub fn editing_action(&self) -> EditingAction {
        self.action
    }

    /// Switch editing action. The selection is reset.
    pub fn set_editing_action(&mut self, action: EditingAction) {
        self.action = action;
        self.reset_selection();
    }

    /// Select a landmark according to the mode and editing action.
    pub fn select(&mut self, id: &LandmarkId) -> NavResult<()> {
        if self.mode == Mode::Release {
            return Ok(());
        }

        let mut registry = self.registry.write();
        match self.action {
            EditingAction::PlaceAnchor => self.editor.focus(&mut registry, id),
            EditingAction::ShowNeighbours => {
                let graph = self.graph.read();
                self.editor.show_neighbours(&mut registry, &graph, id)
            }
            EditingAction::OverrideNeighbours => self.editor.override_select(&mut registry, id),
        }
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionCoordinator {
        self.editor.selection()
    }

    /// Apply the pending neighbour override and persist the graph.
    ///
    /// Returns the master landmark, or `None` if no override was in progress.
    pub fn commit_override(&mut self) -> NavResult<Option<LandmarkId>> {
        if self.editor.master().is_none() {
            return Ok(None);
        }

        let master = {
            let registry = self.registry.read();
            let mut graph = self.graph.write();
            self.editor.commit(&registry, &mut graph)?
        };
        self.maintainer.persist();
        self.reset_selection();
        Ok(master)
    }

    /// Clear the selection.
    pub fn reset_selection(&mut self) {
        self.editor.reset(&mut *self.registry.write());
    }

    /// Whether neighbour inference is queued or running.
    pub fn is_inference_pending(&self) -> bool {
        self.maintainer.is_inference_pending()
    }

    /// Wait for every queued neighbour inference task.
    pub async fn wait_for_inference(&self) {
        self.maintainer.wait_for_inference().await;
    }

    /// Shared landmark registry.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Shared relation graph.
    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// Graph maintainer.
    pub fn maintainer(&self) -> &GraphMaintainer {
        &self.maintainer
    }

    /// Session configuration.
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// End the session, persisting the graph.
    ///
    /// Outstanding inference tasks keep running and save their own results.
    pub fn dispose(self) {
        self.maintainer.persist();
        log::info!("Navigation session disposed");
    }
}
