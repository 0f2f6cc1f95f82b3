//! Selection coordinator: one primary selection plus a set of secondary ones.

use std::collections::{BTreeSet, HashMap};

use crate::graph::LandmarkRegistry;
use crate::types::{Landmark, LandmarkId, NavError, NavResult, SelectionMark};

/// Something that reacts to being selected.
pub trait Selectable {
    /// Became the primary selection.
    fn on_single_selected(&mut self);

    /// Stopped being the primary selection.
    fn on_single_unselected(&mut self);

    /// Joined the secondary selection.
    fn on_multi_selected(&mut self);

    /// Left the secondary selection.
    fn on_multi_unselected(&mut self);
}

impl Selectable for Landmark {
    fn on_single_selected(&mut self) {
        self.selection = SelectionMark::SinglySelected;
    }

    fn on_single_unselected(&mut self) {
        self.selection = SelectionMark::NotSelected;
    }

    fn on_multi_selected(&mut self) {
        self.selection = SelectionMark::MultiSelected;
    }

    fn on_multi_unselected(&mut self) {
        self.selection = SelectionMark::NotSelected;
    }
}

/// Lookup of selectable objects by landmark id.
pub trait SelectableSet {
    /// The selectable for `id`, if it still exists.
    fn selectable_mut(&mut self, id: &LandmarkId) -> Option<&mut dyn Selectable>;
}

impl SelectableSet for LandmarkRegistry {
    fn selectable_mut(&mut self, id: &LandmarkId) -> Option<&mut dyn Selectable> {
        self.get_mut(id).ok().map(|l| l as &mut dyn Selectable)
    }
}

impl<T: Selectable> SelectableSet for HashMap<LandmarkId, T> {
    fn selectable_mut(&mut self, id: &LandmarkId) -> Option<&mut dyn Selectable> {
        self.get_mut(id).map(|s| s as &mut dyn Selectable)
    }
}

/// Tracks the primary and secondary selections.
///
/// Selected ids may outlive their objects; callbacks are skipped for ids
/// no longer present in the set passed in.
#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    primary: Option<LandmarkId>,
    secondary: BTreeSet<LandmarkId>,
}

impl SelectionCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The primary selection.
    pub fn primary(&self) -> Option<&LandmarkId> {
        self.primary.as_ref()
    }

    /// The secondary selections.
    pub fn secondary(&self) -> &BTreeSet<LandmarkId> {
        &self.secondary
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_empty()
    }

    /// Make `id` the primary selection, unselecting the previous one.
    ///
    /// Re-selecting the current primary is allowed and leaves it selected.
    pub fn single_select(
        &mut self,
        objects: &mut dyn SelectableSet,
        id: &LandmarkId,
    ) -> NavResult<()> {
        if objects.selectable_mut(id).is_none() {
            return Err(NavError::LandmarkNotFound(id.clone()));
        }

        if let Some(previous) = self.primary.take() {
            if let Some(object) = objects.selectable_mut(&previous) {
                object.on_single_unselected();
            }
        }

        if let Some(object) = objects.selectable_mut(id) {
            object.on_single_selected();
        }
        self.primary = Some(id.clone());
        Ok(())
    }

    /// Toggle `id` in the secondary set. Returns whether it is now selected.
    ///
    /// An id whose object no longer exists can be removed but not added.
    pub fn multi_select(&mut self, objects: &mut dyn SelectableSet, id: &LandmarkId) -> bool {
        if self.secondary.remove(id) {
            if let Some(object) = objects.selectable_mut(id) {
                object.on_multi_unselected();
            }
            return false;
        }

        match objects.selectable_mut(id) {
            Some(object) => {
                object.on_multi_selected();
                self.secondary.insert(id.clone());
                true
            }
            None => false,
        }
    }

    /// Clear both selections, notifying every object still present.
    pub fn reset(&mut self, objects: &mut dyn SelectableSet) {
        if let Some(primary) = self.primary.take() {
            if let Some(object) = objects.selectable_mut(&primary) {
                object.on_single_unselected();
            }
        }
        for id in std::mem::take(&mut self.secondary) {
            if let Some(object) = objects.selectable_mut(&id) {
                object.on_multi_unselected();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        single: bool,
        multi: bool,
        calls: usize,
    }

    impl Selectable for Probe {
        fn on_single_selected(&mut self) {
            self.single = true;
            self.calls += 1;
        }
        fn on_single_unselected(&mut self) {
            self.single = false;
            self.calls += 1;
        }
        fn on_multi_selected(&mut self) {
            self.multi = true;
            self.calls += 1;
        }
        fn on_multi_unselected(&mut self) {
            self.multi = false;
            self.calls += 1;
        }
    }

    fn probes(ids: &[&str]) -> HashMap<LandmarkId, Probe> {
        ids.iter()
            .map(|s| (LandmarkId::from(*s), Probe::default()))
            .collect()
    }

    #[test]
    fn test_single_select_replaces_previous() {
        let mut objects = probes(&["a", "b"]);
        let mut selection = SelectionCoordinator::new();

        selection.single_select(&mut objects, &"a".into()).unwrap();
        selection.single_select(&mut objects, &"b".into()).unwrap();

        assert_eq!(selection.primary(), Some(&LandmarkId::from("b")));
        assert!(!objects[&LandmarkId::from("a")].single);
        assert!(objects[&LandmarkId::from("b")].single);
    }

    #[test]
    fn test_single_select_same_twice_stays_selected() {
        let mut objects = probes(&["a"]);
        let mut selection = SelectionCoordinator::new();

        selection.single_select(&mut objects, &"a".into()).unwrap();
        selection.single_select(&mut objects, &"a".into()).unwrap();

        assert_eq!(selection.primary(), Some(&LandmarkId::from("a")));
        assert!(objects[&LandmarkId::from("a")].single);
    }

    #[test]
    fn test_single_select_unknown_fails() {
        let mut objects = probes(&["a"]);
        let mut selection = SelectionCoordinator::new();
        let result = selection.single_select(&mut objects, &"zzz".into());
        assert!(matches!(result, Err(NavError::LandmarkNotFound(_))));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_multi_select_twice_is_empty() {
        let mut objects = probes(&["a"]);
        let mut selection = SelectionCoordinator::new();

        assert!(selection.multi_select(&mut objects, &"a".into()));
        assert!(!selection.multi_select(&mut objects, &"a".into()));

        assert!(selection.secondary().is_empty());
        assert!(!objects[&LandmarkId::from("a")].multi);
    }

    #[test]
    fn test_multi_select_missing_not_added() {
        let mut objects = probes(&[]);
        let mut selection = SelectionCoordinator::new();
        assert!(!selection.multi_select(&mut objects, &"ghost".into()));
        assert!(selection.secondary().is_empty());
    }

    #[test]
    fn test_reset_notifies_everything() {
        let mut objects = probes(&["a", "b", "c"]);
        let mut selection = SelectionCoordinator::new();
        selection.single_select(&mut objects, &"a".into()).unwrap();
        selection.multi_select(&mut objects, &"b".into());
        selection.multi_select(&mut objects, &"c".into());

        selection.reset(&mut objects);

        assert!(selection.is_empty());
        assert!(objects.values().all(|p| !p.single && !p.multi));
        assert_eq!(objects[&LandmarkId::from("b")].calls, 2);
    }
}
