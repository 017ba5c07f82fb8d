//! The editing session.
//!
//! [`MindMapEditor`] owns the graph, the viewport and the interaction state.
//! Front ends feed it [`EditorEvent`]s and toolbar actions, then draw the
//! [`Scene`] it produces (or let a bound [`SceneSync`] update their models).
//!
//! Attempts that would break a graph invariant (deleting the root, self or
//! duplicate connections, blank labels) are ignored. They are logged at
//! `debug` level and the call reports that nothing changed.
//!
//! # Example
//!
//! ```ignore
//! use slint_mindmap_editor::{EditorEvent, Key, LayoutKind, MindMapEditor, Point};
//!
//! let mut editor = MindMapEditor::new(nodes, connections, "Roadmap")
//!     .on_save(|snapshot| persist(snapshot));
//!
//! editor.handle_event(EditorEvent::DoubleClick { position: Point::new(400.0, 300.0) });
//! editor.handle_event(EditorEvent::DraftChanged("Q3 goals".into()));
//! editor.handle_event(EditorEvent::Key(Key::Enter));
//! editor.apply_layout(LayoutKind::OrgChart);
//! editor.confirm_save();
//! ```

use std::collections::{HashMap, VecDeque};
use std::f32::consts::{FRAC_PI_2, TAU};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::{ConfigError, ExportError, StoreError};
use crate::export::{self, ExportArtifact, RasterJob};
use crate::graph::{
    new_node_id, Connection, Graph, GraphSnapshot, Node, NodeColor, NodeId, Point, ValidationError,
};
use crate::hit_test::{find_node_at, node_box};
use crate::interaction::{EditorEvent, InteractionState, Key};
use crate::layout::{self, LayoutKind};
use crate::scene::{Scene, SceneSync};
use crate::store::{KeyValueLayoutStore, LayoutStore, SavedLayoutSummary};
use crate::viewport::Viewport;

/// Receives the current graph when the user confirms a save.
pub type SaveCallback = Box<dyn FnMut(&GraphSnapshot)>;

pub struct MindMapEditor {
    title: String,
    graph: Graph,
    viewport: Viewport,
    state: InteractionState,
    selected: Option<NodeId>,
    config: EditorConfig,
    rng: StdRng,
    store: Box<dyn LayoutStore>,
    scene_sync: Option<SceneSync>,
    on_save: Option<SaveCallback>,
}

impl MindMapEditor {
    /// Start a session on an initial graph.
    ///
    /// # Arguments
    /// * `nodes` - Initial nodes; repaired to have exactly one root
    /// * `connections` - Initial connections; invalid ones are dropped
    /// * `title` - Display title of the map
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>, title: impl Into<String>) -> Self {
        let config = EditorConfig::default();
        Self {
            title: title.into(),
            graph: Graph::from_parts(nodes, connections, &config.mutation.root_text),
            viewport: Viewport::new(config.viewport),
            state: InteractionState::Idle,
            selected: None,
            rng: StdRng::from_entropy(),
            store: Box::new(KeyValueLayoutStore::in_memory()),
            scene_sync: None,
            on_save: None,
            config,
        }
    }

    /// Replace the configuration. Resets the viewport.
    ///
    /// Fails without touching the session if the config does not pass
    /// [`EditorConfig::validate`].
    pub fn with_config(mut self, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.viewport = Viewport::new(config.viewport);
        self.config = config;
        Ok(self)
    }

    /// Make new-node placement reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Use `store` for named layouts instead of a private in-memory one.
    pub fn with_store(mut self, store: impl LayoutStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn on_save(mut self, callback: impl FnMut(&GraphSnapshot) + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    // === Accessors ===

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // === Event dispatch ===

    /// Run one input event through the interaction state machine.
    pub fn handle_event(&mut self, event: EditorEvent) {
        let before = self.state.name();
        match event {
            EditorEvent::PointerDown { position } => self.pointer_down(position),
            EditorEvent::PointerMove { position } => self.pointer_move(position),
            EditorEvent::PointerUp { .. } => self.pointer_up(),
            EditorEvent::Click { position } => self.click(position),
            EditorEvent::DoubleClick { position } => self.double_click(position),
            EditorEvent::Wheel { delta, zoom_modifier } => {
                self.viewport.wheel(delta, zoom_modifier)
            }
            EditorEvent::Key(key) => self.key(key),
            EditorEvent::DraftChanged(text) => {
                if let InteractionState::EditingLabel { draft, .. } = &mut self.state {
                    *draft = text;
                }
            }
        }
        if before != self.state.name() {
            debug!(from = before, to = self.state.name(), "interaction state changed");
        }
        self.refresh();
    }

    /// Node under a screen-space point.
    pub fn node_at(&self, screen: Point) -> Option<NodeId> {
        let world = self.viewport.screen_to_world(screen);
        find_node_at(
            world,
            self.graph
                .nodes()
                .iter()
                .map(|n| node_box(n, &self.config.nodes, self.config.label_max_chars)),
        )
    }

    fn pointer_down(&mut self, position: Point) {
        if !self.state.is_idle() {
            return;
        }
        match self.node_at(position) {
            Some(node_id) => {
                let world = self.viewport.screen_to_world(position);
                let Some(node) = self.graph.node(&node_id) else {
                    return;
                };
                let grab_offset = world - node.position();
                self.selected = Some(node_id.clone());
                self.state = InteractionState::DraggingNode { node_id, grab_offset };
            }
            None => self.state = InteractionState::Panning { last: position },
        }
    }

    fn pointer_move(&mut self, position: Point) {
        match &mut self.state {
            InteractionState::Panning { last } => {
                let delta = position - *last;
                *last = position;
                self.viewport.pan_by(delta);
            }
            InteractionState::DraggingNode { node_id, grab_offset } => {
                let target = self.viewport.screen_to_world(position) - *grab_offset;
                if self.graph.set_position(node_id, target).is_err() {
                    self.state = InteractionState::Idle;
                }
            }
            _ => {}
        }
    }

    fn pointer_up(&mut self) {
        if matches!(
            self.state,
            InteractionState::Panning { .. } | InteractionState::DraggingNode { .. }
        ) {
            self.state = InteractionState::Idle;
        }
    }

    fn click(&mut self, position: Point) {
        let target = self.node_at(position);
        match &self.state {
            InteractionState::ConnectingFrom { node_id: source } => {
                let Some(target) = target.filter(|t| t != source) else {
                    return;
                };
                let source = source.clone();
                match self.graph.connect(&source, &target) {
                    Ok(connection) => debug!(id = %connection.id, "connected nodes"),
                    Err(reason) => debug!(%source, %target, %reason, "connection refused"),
                }
                self.state = InteractionState::Idle;
            }
            InteractionState::Idle => self.selected = target,
            _ => {}
        }
    }

    fn double_click(&mut self, position: Point) {
        if !self.state.is_idle() {
            return;
        }
        if let Some(node_id) = self.node_at(position) {
            self.begin_editing(&node_id);
        }
    }

    fn key(&mut self, key: Key) {
        match key {
            Key::Enter => self.commit_label(),
            Key::Escape => {
                if matches!(
                    self.state,
                    InteractionState::EditingLabel { .. } | InteractionState::ConnectingFrom { .. }
                ) {
                    self.state = InteractionState::Idle;
                }
            }
            Key::Delete => {
                if self.state.is_idle() {
                    self.delete_selected();
                }
            }
        }
    }

    /// Write the draft label. A blank draft keeps the editor open.
    fn commit_label(&mut self) {
        let InteractionState::EditingLabel { node_id, draft } = &self.state else {
            return;
        };
        match self.graph.set_text(node_id, draft) {
            Ok(()) => {}
            Err(ValidationError::EmptyLabel) => {
                debug!(%node_id, "blank label not committed");
                return;
            }
            Err(reason) => debug!(%node_id, %reason, "label edit dropped"),
        }
        self.state = InteractionState::Idle;
    }

    // === Graph mutation operations ===

    /// Add a node at a random angle around `parent` (or the root).
    ///
    /// A given parent also gets a connection to the new node. The new node is
    /// selected and opened for label editing. Returns `None` if the parent
    /// does not exist.
    pub fn add_node(&mut self, parent: Option<&str>) -> Option<NodeId> {
        let anchor_id = match parent {
            Some(id) => id,
            None => self.graph.root_id()?,
        };
        let Some(anchor) = self.graph.node(anchor_id).map(Node::position) else {
            debug!(parent = anchor_id, "add_node: parent not found");
            return None;
        };
        let angle = self.rng.gen_range(0.0..TAU);
        let position = anchor.polar_offset(angle, self.config.mutation.new_node_distance);
        let id = self.insert_new_node(position)?;
        if let Some(parent) = parent {
            if let Err(reason) = self.graph.connect(parent, &id) {
                debug!(%reason, "add_node: parent connection refused");
            }
        }
        self.begin_editing(&id);
        self.refresh();
        Some(id)
    }

    /// Add a connected child to `parent` and fan all of its children out.
    ///
    /// Children are spread evenly across `child_spread` radians, centered on
    /// the direction pointing from the graph's centroid through the parent.
    /// A parent sitting on the centroid spreads its children around the full
    /// circle, starting straight up.
    pub fn add_child_node(&mut self, parent: &str) -> Option<NodeId> {
        let Some(anchor) = self.graph.node(parent).map(Node::position) else {
            debug!(parent, "add_child_node: parent not found");
            return None;
        };
        let centroid = self.graph.centroid().unwrap_or(anchor);
        let id = self.insert_new_node(anchor)?;
        if let Err(reason) = self.graph.connect(parent, &id) {
            debug!(%reason, "add_child_node: connection refused");
        }

        let children = self.children_of(parent);
        let n = children.len();
        let away = anchor - centroid;
        let distance = self.config.mutation.child_distance;
        let spread = self.config.mutation.child_spread;
        for (i, child) in children.iter().enumerate() {
            let angle = if away.length() < f32::EPSILON {
                TAU * i as f32 / n as f32 - FRAC_PI_2
            } else if n == 1 {
                away.y.atan2(away.x)
            } else {
                away.y.atan2(away.x) - spread / 2.0 + spread * i as f32 / (n - 1) as f32
            };
            let target = anchor.polar_offset(angle, distance);
            if let Err(reason) = self.graph.set_position(child, target) {
                debug!(child = %child, %reason, "add_child_node: sibling not moved");
            }
        }

        self.begin_editing(&id);
        self.refresh();
        Some(id)
    }

    /// Remove a node and its connections. The root is never removed.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if let Err(reason) = self.graph.delete_node(id) {
            debug!(id, %reason, "delete refused");
            return false;
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        let involved = match &self.state {
            InteractionState::DraggingNode { node_id, .. }
            | InteractionState::ConnectingFrom { node_id }
            | InteractionState::EditingLabel { node_id, .. } => node_id == id,
            _ => false,
        };
        if involved {
            self.state = InteractionState::Idle;
        }
        self.refresh();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected.clone() {
            Some(id) => self.delete_node(&id),
            None => false,
        }
    }

    /// Remove the connection between `a` and `b`, in either direction.
    pub fn disconnect(&mut self, a: &str, b: &str) -> bool {
        let removed = self.graph.disconnect(a, b).is_some();
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn delete_connection(&mut self, connection_id: &str) -> bool {
        let removed = self.graph.delete_connection(connection_id).is_some();
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn change_node_color(&mut self, id: &str, color: NodeColor) -> bool {
        if let Err(reason) = self.graph.set_color(id, color) {
            debug!(id, %reason, "color change refused");
            return false;
        }
        self.refresh();
        true
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.graph.contains(id) {
            return false;
        }
        self.selected = Some(id.to_string());
        self.refresh();
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.refresh();
    }

    /// Enter connecting mode from the selected node. Only valid while idle.
    pub fn start_connecting(&mut self) -> bool {
        let Some(source) = self.selected.clone().filter(|id| self.graph.contains(id)) else {
            return false;
        };
        if !self.state.is_idle() {
            debug!(state = self.state.name(), "connect ignored outside idle");
            return false;
        }
        self.state = InteractionState::ConnectingFrom { node_id: source };
        self.refresh();
        true
    }

    /// Open the label editor on a node, seeded with its current text.
    pub fn start_editing(&mut self, id: &str) -> bool {
        if !self.graph.contains(id) {
            return false;
        }
        self.begin_editing(id);
        self.refresh();
        true
    }

    fn begin_editing(&mut self, id: &str) {
        let Some(node) = self.graph.node(id) else {
            return;
        };
        self.state = InteractionState::EditingLabel {
            node_id: node.id.clone(),
            draft: node.text.clone(),
        };
        self.selected = Some(node.id.clone());
    }

    fn insert_new_node(&mut self, position: Point) -> Option<NodeId> {
        let node = Node::new(new_node_id(), self.config.mutation.new_node_text.as_str(), position);
        let id = node.id.clone();
        match self.graph.insert_node(node) {
            Ok(()) => Some(id),
            Err(reason) => {
                debug!(%reason, "node insert refused");
                None
            }
        }
    }

    /// Nodes one level further from the root than `parent`, in connection order.
    ///
    /// A parent cut off from the root has no level; its children are then the
    /// targets of its outgoing connections.
    fn children_of(&self, parent: &str) -> Vec<NodeId> {
        let depth = self.depths();
        let Some(&parent_depth) = depth.get(parent) else {
            return self
                .graph
                .connections()
                .iter()
                .filter(|c| c.from == parent)
                .map(|c| c.to.clone())
                .collect();
        };
        self.graph
            .neighbors(parent)
            .filter(|n| depth.get(n) == Some(&(parent_depth + 1)))
            .map(str::to_string)
            .collect()
    }

    /// Breadth-first distance of every reachable node from the root.
    fn depths(&self) -> HashMap<&str, usize> {
        let mut depth = HashMap::new();
        let Some(root) = self.graph.root_id() else {
            return depth;
        };
        depth.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let next = depth[id] + 1;
            for neighbor in self.graph.neighbors(id) {
                if !depth.contains_key(neighbor) {
                    depth.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
        depth
    }

    // === Layout ===

    /// Reposition the root, its children and grandchildren.
    pub fn apply_layout(&mut self, kind: LayoutKind) -> usize {
        let moved = layout::apply_layout(&mut self.graph, kind, &self.config.layout);
        self.refresh();
        moved
    }

    // === Viewport ===

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.refresh();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.refresh();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
        self.refresh();
    }

    pub fn center_view(&mut self) {
        self.viewport.center_view(self.graph.nodes());
        self.refresh();
    }

    pub fn fit_to_view(&mut self) {
        self.viewport.fit_to_view(self.graph.nodes());
        self.refresh();
    }

    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.viewport.set_container_size(width, height);
        self.refresh();
    }

    // === Saving and named layouts ===

    /// Hand the current graph to the `on_save` callback.
    pub fn confirm_save(&mut self) {
        let snapshot = self.graph.snapshot();
        if let Some(callback) = self.on_save.as_mut() {
            callback(&snapshot);
        }
        info!(title = %self.title, nodes = snapshot.nodes.len(), "save confirmed");
    }

    /// Store the current graph as a named layout.
    pub fn save_layout(&mut self, name: &str) -> Result<SavedLayoutSummary, StoreError> {
        let saved = self.store.save(name.trim(), &self.graph.snapshot())?;
        Ok(saved.summary())
    }

    pub fn saved_layouts(&self) -> Vec<SavedLayoutSummary> {
        self.store.list()
    }

    /// Replace the live graph with a saved layout.
    ///
    /// Selection is cleared and the state machine returns to idle.
    pub fn load_layout(&mut self, id: &str) -> Result<(), StoreError> {
        let snapshot = self.store.load(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.graph = Graph::from_snapshot(snapshot, &self.config.mutation.root_text);
        self.selected = None;
        self.state = InteractionState::Idle;
        info!(id, nodes = self.graph.nodes().len(), "loaded layout");
        self.refresh();
        Ok(())
    }

    pub fn delete_layout(&mut self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(id)
    }

    // === Export ===

    pub fn export_svg(&self) -> Result<ExportArtifact, ExportError> {
        export::export_svg(&self.graph, &self.config, Utc::now())
    }

    /// Render the PNG on the calling thread.
    pub fn export_png(&self) -> Result<ExportArtifact, ExportError> {
        export::export_png(&self.graph, &self.config, Utc::now())
    }

    /// Render the PNG on a worker thread. Editing can continue meanwhile.
    pub fn spawn_raster_export(&self) -> Result<RasterJob, ExportError> {
        export::spawn_raster_export(&self.graph, &self.config, Utc::now())
    }

    // === Rendering ===

    pub fn scene(&self) -> Scene {
        Scene::build(&self.graph, &self.viewport, &self.state, self.selected(), &self.config)
    }

    /// Attach UI models. They are refreshed after every change.
    pub fn bind_scene(&mut self, sync: SceneSync) {
        self.scene_sync = Some(sync);
        self.refresh();
    }

    fn refresh(&self) {
        if let Some(sync) = &self.scene_sync {
            sync.sync(&self.scene());
        }
    }
}
