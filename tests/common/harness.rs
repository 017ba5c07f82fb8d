//! Test harness around a [`MindMapEditor`].
//!
//! Binds Slint `VecModel`s the way a front end would, records `on_save`
//! calls, and offers helpers for simulating pointer and keyboard input in
//! screen coordinates.

#![allow(dead_code)]

use super::CallbackTracker;
use slint::{Color, Model, SharedString, VecModel};
use slint_mindmap_editor::{
    Connection, EditorEvent, Key, LayoutStore, MindMapEditor, Node, Point, SceneSync,
};
use std::rc::Rc;

/// Node row as a front end would declare it.
#[derive(Debug, Clone, PartialEq)]
pub struct UiNode {
    pub id: SharedString,
    pub label: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub color: Color,
    pub selected: bool,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiEdge {
    pub id: SharedString,
    pub path: SharedString,
}

/// Default map:
///
/// ```text
///   c (200,300) ── root (400,300) ── a (600,300) ── a1 (800,300)
///                        │
///                   b (400,500)
/// ```
pub fn default_nodes() -> Vec<Node> {
    let mut root = Node::new("root", "Central", Point::new(400.0, 300.0));
    root.is_root = true;
    vec![
        root,
        Node::new("a", "Alpha", Point::new(600.0, 300.0)),
        Node::new("b", "Beta", Point::new(400.0, 500.0)),
        Node::new("c", "Gamma", Point::new(200.0, 300.0)),
        Node::new("a1", "Alpha one", Point::new(800.0, 300.0)),
    ]
}

pub fn default_connections() -> Vec<Connection> {
    vec![
        Connection::new("root", "a"),
        Connection::new("root", "b"),
        Connection::new("root", "c"),
        Connection::new("a", "a1"),
    ]
}

pub struct EditorHarness {
    pub editor: MindMapEditor,
    pub nodes: Rc<VecModel<UiNode>>,
    pub edges: Rc<VecModel<UiEdge>>,
    pub tracker: CallbackTracker,
}

impl EditorHarness {
    /// Create a harness with the default map.
    pub fn new() -> Self {
        Self::with_graph(default_nodes(), default_connections())
    }

    pub fn with_graph(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self::build(MindMapEditor::new(nodes, connections, "Test map"))
    }

    /// Default map backed by a caller-provided layout store.
    pub fn with_store(store: impl LayoutStore + 'static) -> Self {
        let editor = MindMapEditor::new(default_nodes(), default_connections(), "Test map");
        Self::build(editor.with_store(store))
    }

    fn build(editor: MindMapEditor) -> Self {
        let tracker = CallbackTracker::new();
        let mut editor = editor.with_seed(42).on_save({
            let tracker = tracker.clone();
            move |snapshot| tracker.saves.borrow_mut().push(snapshot.clone())
        });

        let nodes = Rc::new(VecModel::<UiNode>::default());
        let edges = Rc::new(VecModel::<UiEdge>::default());
        let mut sync = SceneSync::new();
        sync.bind_nodes(nodes.clone(), |n| UiNode {
            id: n.id.clone(),
            label: n.label.clone(),
            x: n.x,
            y: n.y,
            width: n.width,
            color: n.color,
            selected: n.selected,
            editing: n.editing,
        });
        sync.bind_edges(edges.clone(), |e| UiEdge { id: e.id.clone(), path: e.path.clone() });
        editor.bind_scene(sync);

        Self { editor, nodes, edges, tracker }
    }

    /// Screen position of a node's center.
    pub fn node_center(&self, id: &str) -> Option<Point> {
        let node = self.editor.graph().node(id)?;
        Some(self.editor.viewport().world_to_screen(node.position()))
    }

    /// World position of a node.
    pub fn node_position(&self, id: &str) -> Option<Point> {
        self.editor.graph().node(id).map(|n| n.position())
    }

    /// The bound model row for a node.
    pub fn node_row(&self, id: &str) -> Option<UiNode> {
        self.nodes.iter().find(|row| row.id.as_str() == id)
    }

    // === Pointer helpers ===

    pub fn mouse_down(&mut self, x: f32, y: f32) {
        self.editor.handle_event(EditorEvent::PointerDown { position: Point::new(x, y) });
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.editor.handle_event(EditorEvent::PointerMove { position: Point::new(x, y) });
    }

    pub fn mouse_up(&mut self, x: f32, y: f32) {
        self.editor.handle_event(EditorEvent::PointerUp { position: Point::new(x, y) });
    }

    /// Press, release and click at the same spot.
    pub fn click(&mut self, x: f32, y: f32) {
        self.mouse_down(x, y);
        self.mouse_up(x, y);
        self.editor.handle_event(EditorEvent::Click { position: Point::new(x, y) });
    }

    pub fn double_click(&mut self, x: f32, y: f32) {
        self.click(x, y);
        self.click(x, y);
        self.editor.handle_event(EditorEvent::DoubleClick { position: Point::new(x, y) });
    }

    pub fn click_node(&mut self, id: &str) {
        let p = self.node_center(id).unwrap_or_else(|| panic!("no node {id}"));
        self.click(p.x, p.y);
    }

    pub fn double_click_node(&mut self, id: &str) {
        let p = self.node_center(id).unwrap_or_else(|| panic!("no node {id}"));
        self.double_click(p.x, p.y);
    }

    /// Drag from one screen point to another in `steps` moves.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32), steps: usize) {
        self.mouse_down(from.0, from.1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.mouse_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        self.mouse_up(to.0, to.1);
    }

    pub fn scroll(&mut self, dx: f32, dy: f32) {
        let delta = Point::new(dx, dy);
        self.editor.handle_event(EditorEvent::Wheel { delta, zoom_modifier: false });
    }

    /// Wheel with Ctrl held. Negative `dy` zooms in.
    pub fn ctrl_scroll(&mut self, dy: f32) {
        let delta = Point::new(0.0, dy);
        self.editor.handle_event(EditorEvent::Wheel { delta, zoom_modifier: true });
    }

    // === Keyboard helpers ===

    pub fn press(&mut self, key: Key) {
        self.editor.handle_event(EditorEvent::Key(key));
    }

    /// Replace the label editor's text.
    pub fn type_text(&mut self, text: &str) {
        self.editor.handle_event(EditorEvent::DraftChanged(text.to_string()));
    }
}
