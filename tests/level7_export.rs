//! Level 7: Export Tests
//!
//! Tests SVG and PNG export from a live session: naming, independence from
//! the viewport, and background rasterization while editing continues.

mod common;

use common::harness::EditorHarness;
use slint_mindmap_editor::{ExportConfig, LayoutKind, Node, Point};

fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[1..4], b"PNG");
    let w = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let h = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (w, h)
}

fn is_timestamped(name: &str, extension: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix("mind-map-")
        .and_then(|rest| rest.strip_suffix(&format!(".{extension}")))
    else {
        return false;
    };
    let (date, time) = match stamp.split_once('-') {
        Some(parts) => parts,
        None => return false,
    };
    date.len() == 8
        && time.len() == 6
        && date.chars().all(|c| c.is_ascii_digit())
        && time.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// Vector export
// ============================================================================

#[test]
fn test_svg_export_artifact() {
    let harness = EditorHarness::new();
    let artifact = harness.editor.export_svg().unwrap();
    assert_eq!(artifact.mime_type, "image/svg+xml");
    assert!(is_timestamped(&artifact.file_name, "svg"), "{}", artifact.file_name);

    let svg = String::from_utf8(artifact.bytes).unwrap();
    assert_eq!(svg.matches("<rect").count(), 5);
    assert_eq!(svg.matches("<path").count(), 4);
    assert!(svg.contains(">Alpha one<"));
}

#[test]
fn test_svg_ignores_zoom_and_pan() {
    let mut harness = EditorHarness::new();
    let before = harness.editor.export_svg().unwrap().bytes;
    harness.editor.zoom_in();
    harness.scroll(120.0, -45.0);
    harness.editor.fit_to_view();
    let after = harness.editor.export_svg().unwrap().bytes;
    assert_eq!(before, after);
}

#[test]
fn test_export_does_not_mutate_graph() {
    let harness = EditorHarness::new();
    let before = harness.editor.graph().clone();
    harness.editor.export_svg().unwrap();
    harness.editor.export_png().unwrap();
    assert_eq!(harness.editor.graph(), &before);
}

#[test]
fn test_svg_follows_layout_changes() {
    let mut harness = EditorHarness::new();
    let before = harness.editor.export_svg().unwrap().bytes;
    harness.editor.apply_layout(LayoutKind::OrgChart);
    assert_ne!(harness.editor.export_svg().unwrap().bytes, before);
}

// ============================================================================
// Raster export
// ============================================================================

#[test]
fn test_png_export_has_fixed_size() {
    let harness = EditorHarness::new();
    let artifact = harness.editor.export_png().unwrap();
    assert_eq!(artifact.mime_type, "image/png");
    assert!(is_timestamped(&artifact.file_name, "png"), "{}", artifact.file_name);
    assert_eq!(png_dimensions(&artifact.bytes), (1200, 800));
}

#[test]
fn test_background_export_while_editing() {
    let mut harness = EditorHarness::new();
    let job = harness.editor.spawn_raster_export().unwrap();

    // The session stays usable while the job runs
    let id = harness.editor.add_node(Some("root")).unwrap();
    harness.type_text("Added meanwhile");
    harness.press(slint_mindmap_editor::Key::Enter);
    assert_eq!(harness.editor.graph().node(&id).unwrap().text, "Added meanwhile");

    let artifact = job.wait().unwrap();
    assert_eq!(png_dimensions(&artifact.bytes), (1200, 800));
}

#[test]
fn test_custom_raster_size() {
    let mut root = Node::new("r", "Tiny", Point::ZERO);
    root.is_root = true;
    let config = slint_mindmap_editor::EditorConfig {
        export: ExportConfig { raster_width: 320, raster_height: 200, ..Default::default() },
        ..Default::default()
    };
    let editor = slint_mindmap_editor::MindMapEditor::new(vec![root], Vec::new(), "Small")
        .with_config(config)
        .unwrap();
    let artifact = editor.export_png().unwrap();
    assert_eq!(png_dimensions(&artifact.bytes), (320, 200));
}

#[test]
fn test_artifacts_write_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let harness = EditorHarness::new();
    for artifact in [harness.editor.export_svg().unwrap(), harness.editor.export_png().unwrap()] {
        let path = artifact.write_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    }
}
