//! Level 6: Persistence Tests
//!
//! Tests the save callback, named layouts across editors sharing one store,
//! the file backend, and recovery from corrupted stored data.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::harness::EditorHarness;
use slint::Model;
use slint_mindmap_editor::{
    FileBackend, GraphSnapshot, KeyValueBackend, KeyValueLayoutStore, LayoutKind, LayoutStore,
    MemoryBackend, NodeColor,
};

fn sorted<T: Clone + Ord>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort();
    items
}

// ============================================================================
// Save callback
// ============================================================================

#[test]
fn test_confirm_save_reports_current_graph() {
    let mut harness = EditorHarness::new();
    harness.editor.change_node_color("a", NodeColor::Teal);
    harness.editor.confirm_save();

    assert_eq!(harness.tracker.save_count(), 1);
    let saved = harness.tracker.last_save().unwrap();
    assert_eq!(saved, harness.editor.graph().snapshot());
    assert_eq!(saved.nodes.iter().find(|n| n.id == "a").unwrap().color, NodeColor::Teal);
}

#[test]
fn test_edits_do_not_call_save() {
    let mut harness = EditorHarness::new();
    harness.editor.add_node(None);
    harness.editor.apply_layout(LayoutKind::Radial);
    assert_eq!(harness.tracker.save_count(), 0);
}

// ============================================================================
// Named layouts
// ============================================================================

#[test]
fn test_save_edit_load_round_trip() {
    let mut harness = EditorHarness::new();
    let original = harness.editor.graph().snapshot();

    let saved = harness.editor.save_layout("Ciclo 1").unwrap();
    assert_eq!(saved.name, "Ciclo 1");
    assert_eq!(saved.node_count, 5);
    assert_eq!(saved.connection_count, 4);

    harness.editor.apply_layout(LayoutKind::OrgChart);
    harness.editor.delete_node("b");
    harness.editor.add_child_node("a");

    harness.editor.load_layout(&saved.id).unwrap();
    let restored = harness.editor.graph().snapshot();
    let ids = |s: &GraphSnapshot| s.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(sorted(&ids(&restored)), sorted(&ids(&original)));
    for node in &original.nodes {
        assert_eq!(restored.nodes.iter().find(|n| n.id == node.id), Some(node));
    }
    assert_eq!(restored.connections, original.connections);
    assert_eq!(harness.nodes.row_count(), 5);
}

#[test]
fn test_saved_layout_is_not_affected_by_later_edits() {
    let mut harness = EditorHarness::new();
    let saved = harness.editor.save_layout("Before").unwrap();
    harness.editor.start_editing("a");
    harness.type_text("Changed");
    harness.press(slint_mindmap_editor::Key::Enter);

    harness.editor.load_layout(&saved.id).unwrap();
    assert_eq!(harness.editor.graph().node("a").unwrap().text, "Alpha");
}

#[test]
fn test_load_resets_interaction() {
    let mut harness = EditorHarness::new();
    let saved = harness.editor.save_layout("Snapshot").unwrap();
    harness.click_node("c");
    harness.editor.start_connecting();

    harness.editor.load_layout(&saved.id).unwrap();
    assert!(harness.editor.state().is_idle());
    assert_eq!(harness.editor.selected(), None);
}

#[test]
fn test_list_and_delete() {
    let mut harness = EditorHarness::new();
    let first = harness.editor.save_layout("One").unwrap();
    harness.editor.delete_node("a1");
    let second = harness.editor.save_layout("Two").unwrap();

    let list = harness.editor.saved_layouts();
    let names: Vec<&str> = list.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Two"]);
    assert_eq!(list[1].node_count, 4);
    assert!(list[0].created_at <= list[1].created_at);

    assert!(harness.editor.delete_layout(&first.id).unwrap());
    assert!(!harness.editor.delete_layout(&first.id).unwrap());
    assert!(harness.editor.load_layout(&first.id).is_err());
    assert_eq!(harness.editor.saved_layouts().len(), 1);
    assert_eq!(harness.editor.saved_layouts()[0].id, second.id);
}

#[test]
fn test_store_shared_between_editors() {
    let store = Rc::new(RefCell::new(KeyValueLayoutStore::in_memory()));
    let mut first = EditorHarness::with_store(store.clone());
    let mut second = EditorHarness::with_store(store.clone());

    first.editor.apply_layout(LayoutKind::HorizontalTree);
    let saved = first.editor.save_layout("Shared").unwrap();

    assert_eq!(second.editor.saved_layouts().len(), 1);
    second.editor.load_layout(&saved.id).unwrap();
    assert_eq!(second.editor.graph().snapshot(), first.editor.graph().snapshot());
    assert_eq!(store.list().len(), 1);
}

// ============================================================================
// Backends and corruption
// ============================================================================

#[test]
fn test_corrupted_store_reads_as_empty() {
    let mut backend = MemoryBackend::new();
    backend.set("mindmap-saved-layouts", "{ this is not json").unwrap();
    let mut harness = EditorHarness::with_store(KeyValueLayoutStore::new(backend));

    assert!(harness.editor.saved_layouts().is_empty());
    // Saving replaces the unreadable collection
    let saved = harness.editor.save_layout("Fresh").unwrap();
    assert_eq!(harness.editor.saved_layouts().len(), 1);
    assert!(harness.editor.load_layout(&saved.id).is_ok());
}

#[test]
fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let store = KeyValueLayoutStore::new(FileBackend::open(dir.path()).unwrap());
        let mut harness = EditorHarness::with_store(store);
        harness.editor.change_node_color("root", NodeColor::Red);
        harness.editor.save_layout("On disk").unwrap().id
    };

    let store = KeyValueLayoutStore::new(FileBackend::open(dir.path()).unwrap());
    let mut harness = EditorHarness::with_store(store);
    assert_eq!(harness.editor.saved_layouts()[0].name, "On disk");
    harness.editor.load_layout(&id).unwrap();
    assert_eq!(harness.editor.graph().root().unwrap().color, NodeColor::Red);
}

#[test]
fn test_stored_record_shape() {
    let store = Rc::new(RefCell::new(KeyValueLayoutStore::in_memory()));
    let mut harness = EditorHarness::with_store(store.clone());
    harness.editor.save_layout("Shape").unwrap();

    let raw = store.borrow().backend().get("mindmap-saved-layouts").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &json[0];
    for field in ["id", "name", "createdAt", "nodes", "connections"] {
        assert!(record.get(field).is_some(), "missing {field}");
    }
    let root = &record["nodes"][0];
    for field in ["id", "text", "x", "y", "color", "isRoot"] {
        assert!(root.get(field).is_some(), "missing node field {field}");
    }
    assert_eq!(record["connections"][0]["from"], "root");
    assert_eq!(record["connections"][0]["to"], "a");
}
