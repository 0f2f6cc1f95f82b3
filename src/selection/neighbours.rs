//! Inspecting and manually overriding a landmark's neighbour list.

use std::collections::BTreeSet;

use crate::graph::{LandmarkRegistry, RelationGraph};
use crate::types::{LandmarkId, NavResult};

use super::coordinator::{SelectableSet, SelectionCoordinator};

/// Drives the selection for neighbour inspection and override.
///
/// In override mode the first selection picks the master landmark and every
/// later one toggles a proposed neighbour. [`NeighbourEditor::commit`] makes
/// the proposal authoritative.
#[derive(Debug, Clone, Default)]
pub struct NeighbourEditor {
    selection: SelectionCoordinator,
    master_selected: bool,
}

impl NeighbourEditor {
    /// Create an editor with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection state.
    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    /// The master landmark of an override in progress.
    pub fn master(&self) -> Option<&LandmarkId> {
        if self.master_selected {
            self.selection.primary()
        } else {
            None
        }
    }

    /// Make `id` the sole selection.
    pub fn focus(&mut self, registry: &mut LandmarkRegistry, id: &LandmarkId) -> NavResult<()> {
        self.reset(registry);
        self.selection.single_select(registry, id)
    }

    /// Highlight `id` and every landmark its neighbour list names.
    ///
    /// Does nothing when `id` is already the primary selection.
    pub fn show_neighbours(
        &mut self,
        registry: &mut LandmarkRegistry,
        graph: &RelationGraph,
        id: &LandmarkId,
    ) -> NavResult<()> {
        if self.selection.primary() == Some(id) {
            return Ok(());
        }

        self.reset(registry);
        self.selection.single_select(registry, id)?;
        for neighbour in graph.neighbours(id).into_iter().flatten() {
            if !self.selection.multi_select(registry, neighbour) {
                log::warn!("Neighbour {neighbour} of {id} is not a live landmark");
            }
        }
        Ok(())
    }

    /// Select the master, or toggle a proposed neighbour once a master is chosen.
    pub fn override_select(
        &mut self,
        registry: &mut LandmarkRegistry,
        id: &LandmarkId,
    ) -> NavResult<()> {
        if !self.master_selected {
            self.reset(registry);
            self.selection.single_select(registry, id)?;
            self.master_selected = true;
            return Ok(());
        }

        if self.selection.primary() == Some(id) {
            return Ok(());
        }
        self.selection.multi_select(registry, id);
        Ok(())
    }

    /// Replace the primary landmark's neighbours with the secondary selection.
    ///
    /// Every previous neighbour loses the primary; every secondary gains it.
    /// Former neighbours left out of the selection are unlinked. Returns the
    /// primary's id, or `None` when nothing is selected.
    pub fn commit(
        &self,
        registry: &LandmarkRegistry,
        graph: &mut RelationGraph,
    ) -> NavResult<Option<LandmarkId>> {
        let Some(master) = self.selection.primary() else {
            return Ok(None);
        };
        let master_name = registry.get(master)?.name.clone();

        let previous: Vec<LandmarkId> = graph
            .neighbours(master)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        for id in &previous {
            if let Some(node) = graph.get_node_mut(id) {
                node.neighbours.remove(master);
            }
        }

        let mut current = BTreeSet::new();
        for id in self.selection.secondary() {
            let Ok(landmark) = registry.get(id) else {
                log::warn!("Skipping override neighbour {id}: landmark no longer exists");
                continue;
            };
            graph
                .ensure_node(id, &landmark.name)
                .neighbours
                .insert(master.clone());
            current.insert(id.clone());
        }

        log::info!(
            "Overrode neighbours of {master}: {} previous, {} now",
            previous.len(),
            current.len()
        );
        graph.ensure_node(master, &master_name);
        graph.set_neighbours(master, current);
        Ok(Some(master.clone()))
    }

    /// Clear the selection and forget the master.
    pub fn reset(&mut self, objects: &mut dyn SelectableSet) {
        self.selection.reset(objects);
        self.master_selected = false;
    }
}
