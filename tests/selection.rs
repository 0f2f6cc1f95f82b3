//! Selection and manual neighbour override tests.

use std::collections::BTreeSet;

use landmark_nav::graph::{LandmarkRegistry, RelationGraph};
use landmark_nav::selection::{NeighbourEditor, SelectionCoordinator};
use landmark_nav::store::ManualTracker;
use landmark_nav::types::{LandmarkId, NavError, Pose, SelectionMark};

// ==================== Helpers ====================

fn id(s: &str) -> LandmarkId {
    LandmarkId::from(s)
}

fn set(names: &[&str]) -> BTreeSet<LandmarkId> {
    names.iter().map(|n| id(n)).collect()
}

fn registry(names: &[&str]) -> LandmarkRegistry {
    let mut registry = LandmarkRegistry::new();
    for (i, name) in names.iter().enumerate() {
        let tracker = ManualTracker::located(Pose::at(i as f32, 0.0, 0.0)).shared();
        registry.create(id(name), *name, tracker).unwrap();
    }
    registry
}

/// M neighbours B and C; D is unlinked.
fn linked() -> (LandmarkRegistry, RelationGraph) {
    let registry = registry(&["m", "b", "c", "d"]);
    let mut graph = RelationGraph::new();
    graph.recompute_offsets(&registry.tracked());
    graph.link(&id("m"), &id("b"));
    graph.link(&id("m"), &id("c"));
    (registry, graph)
}

fn mark(registry: &LandmarkRegistry, name: &str) -> SelectionMark {
    registry.get(&id(name)).unwrap().selection
}

// ==================== Coordinator ====================

#[test]
fn test_multi_select_twice_after_reset_is_empty() {
    let mut registry = registry(&["a", "b"]);
    let mut selection = SelectionCoordinator::new();
    selection.multi_select(&mut registry, &id("b"));
    selection.reset(&mut registry);

    selection.multi_select(&mut registry, &id("a"));
    selection.multi_select(&mut registry, &id("a"));

    assert!(selection.secondary().is_empty());
    assert_eq!(mark(&registry, "a"), SelectionMark::NotSelected);
}

#[test]
fn test_landmark_marks_follow_selection() {
    let mut registry = registry(&["a", "b", "c"]);
    let mut selection = SelectionCoordinator::new();

    selection.single_select(&mut registry, &id("a")).unwrap();
    selection.multi_select(&mut registry, &id("b"));
    assert_eq!(mark(&registry, "a"), SelectionMark::SinglySelected);
    assert_eq!(mark(&registry, "b"), SelectionMark::MultiSelected);
    assert_eq!(mark(&registry, "c"), SelectionMark::NotSelected);

    selection.single_select(&mut registry, &id("c")).unwrap();
    assert_eq!(mark(&registry, "a"), SelectionMark::NotSelected);
    assert_eq!(mark(&registry, "c"), SelectionMark::SinglySelected);

    selection.reset(&mut registry);
    assert!(registry.all().all(|l| l.selection == SelectionMark::NotSelected));
}

#[test]
fn test_removed_landmark_can_be_deselected() {
    let mut registry = registry(&["a"]);
    let mut selection = SelectionCoordinator::new();
    selection.multi_select(&mut registry, &id("a"));
    registry.remove(&id("a")).unwrap();

    assert!(!selection.multi_select(&mut registry, &id("a")));
    assert!(selection.secondary().is_empty());
}

// ==================== Show neighbours ====================

#[test]
fn test_show_neighbours_highlights_adjacent() {
    let (mut registry, graph) = linked();
    let mut editor = NeighbourEditor::new();

    editor.show_neighbours(&mut registry, &graph, &id("m")).unwrap();

    assert_eq!(editor.selection().primary(), Some(&id("m")));
    assert_eq!(editor.selection().secondary(), &set(&["b", "c"]));
    assert_eq!(mark(&registry, "d"), SelectionMark::NotSelected);
}

#[test]
fn test_show_neighbours_again_is_noop() {
    let (mut registry, graph) = linked();
    let mut editor = NeighbourEditor::new();
    editor.show_neighbours(&mut registry, &graph, &id("m")).unwrap();
    editor.show_neighbours(&mut registry, &graph, &id("m")).unwrap();
    assert_eq!(editor.selection().secondary(), &set(&["b", "c"]));

    editor.show_neighbours(&mut registry, &graph, &id("b")).unwrap();
    assert_eq!(editor.selection().primary(), Some(&id("b")));
    assert_eq!(editor.selection().secondary(), &set(&["m"]));
    assert_eq!(mark(&registry, "c"), SelectionMark::NotSelected);
}

// ==================== Override ====================

#[test]
fn test_override_commit_replaces_neighbours() {
    let (mut registry, mut graph) = linked();
    let mut editor = NeighbourEditor::new();

    editor.override_select(&mut registry, &id("m")).unwrap();
    editor.override_select(&mut registry, &id("d")).unwrap();
    let master = editor.commit(&registry, &mut graph).unwrap();

    assert_eq!(master, Some(id("m")));
    assert_eq!(graph.neighbours(&id("m")).unwrap(), &set(&["d"]));
    assert!(!graph.neighbours(&id("b")).unwrap().contains(&id("m")));
    assert!(!graph.neighbours(&id("c")).unwrap().contains(&id("m")));
    assert!(graph.neighbours(&id("d")).unwrap().contains(&id("m")));
}

#[test]
fn test_override_keeps_secondary_lists_otherwise_intact() {
    let (mut registry, mut graph) = linked();
    graph.link(&id("d"), &id("c"));
    let mut editor = NeighbourEditor::new();

    editor.override_select(&mut registry, &id("m")).unwrap();
    editor.override_select(&mut registry, &id("d")).unwrap();
    editor.commit(&registry, &mut graph).unwrap();

    assert_eq!(graph.neighbours(&id("d")).unwrap(), &set(&["c", "m"]));
}

#[test]
fn test_override_master_click_is_ignored() {
    let (mut registry, _graph) = linked();
    let mut editor = NeighbourEditor::new();

    editor.override_select(&mut registry, &id("m")).unwrap();
    editor.override_select(&mut registry, &id("m")).unwrap();
    editor.override_select(&mut registry, &id("b")).unwrap();
    editor.override_select(&mut registry, &id("b")).unwrap();

    assert_eq!(editor.master(), Some(&id("m")));
    assert!(editor.selection().secondary().is_empty());
    assert_eq!(mark(&registry, "m"), SelectionMark::SinglySelected);
}

#[test]
fn test_override_with_empty_selection_unlinks_master() {
    let (mut registry, mut graph) = linked();
    let mut editor = NeighbourEditor::new();
    editor.override_select(&mut registry, &id("m")).unwrap();

    editor.commit(&registry, &mut graph).unwrap();

    assert!(graph.neighbours(&id("m")).unwrap().is_empty());
    assert!(graph.nodes().all(|n| !n.neighbours.contains(&id("m"))));
}

#[test]
fn test_commit_without_master_does_nothing() {
    let (registry, mut graph) = linked();
    let editor = NeighbourEditor::new();
    let before = graph.clone();

    assert_eq!(editor.commit(&registry, &mut graph).unwrap(), None);
    assert_eq!(graph.sorted_nodes(), before.sorted_nodes());
}

#[test]
fn test_override_unknown_master_fails() {
    let (mut registry, _graph) = linked();
    let mut editor = NeighbourEditor::new();
    let result = editor.override_select(&mut registry, &id("ghost"));
    assert!(matches!(result, Err(NavError::LandmarkNotFound(_))));
    assert!(editor.master().is_none());
}
