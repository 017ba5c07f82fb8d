//! # Slint Mind Map Editor
//!
//! The headless core of an interactive mind-map editor: a rooted graph of
//! labeled, colored nodes joined by undirected connections, a pan/zoom
//! viewport, an interaction state machine, three automatic layouts, named
//! saved layouts and SVG/PNG export.
//!
//! The crate has no window of its own. A Slint front end (or any other
//! toolkit) translates native input into [`EditorEvent`]s and renders the
//! [`Scene`], usually by binding its `VecModel`s through [`SceneSync`].
//!
//! ## Features
//!
//! - **Invariant-Safe Graph** - Exactly one root, no dangling, self or duplicate connections
//! - **Explicit State Machine** - Idle, panning, dragging, connecting and label editing
//! - **Deterministic Layouts** - Radial, org-chart and horizontal tree
//! - **Pluggable Persistence** - Saved layouts behind the [`LayoutStore`] trait
//! - **Export** - Standalone SVG and fixed-size PNG, optionally off-thread
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_mindmap_editor::{EditorEvent, LayoutKind, MindMapEditor, Point};
//!
//! let mut editor = MindMapEditor::new(Vec::new(), Vec::new(), "Ideas");
//! if let Some(root) = editor.graph().root_id().map(str::to_string) {
//!     editor.add_child_node(&root);
//! }
//! editor.apply_layout(LayoutKind::Radial);
//! editor.fit_to_view();
//! editor.handle_event(EditorEvent::Wheel { delta: Point::new(0.0, -1.0), zoom_modifier: true });
//! let svg = editor.export_svg()?;
//! ```
//!
//! ## Modules
//!
//! - [`graph`] - Nodes, connections and the invariant-enforcing [`Graph`]
//! - [`viewport`] - Screen/world transform, zoom, pan, center and fit
//! - [`interaction`] - Interaction states and abstract input events
//! - [`editor`] - The [`MindMapEditor`] session
//! - [`layout`] - Layout algorithms
//! - [`store`] - Named saved layouts
//! - [`export`] - SVG and PNG rendering
//! - [`scene`] - Render snapshot and Slint model sync

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod path;
pub mod scene;
pub mod store;
pub mod viewport;

pub use config::{
    EditorConfig, ExportConfig, LayoutConfig, MutationConfig, NodeMetrics, ViewportConfig,
};
pub use editor::{MindMapEditor, SaveCallback};
pub use error::{ConfigError, ExportError, StoreError};
pub use export::{ExportArtifact, RasterJob};
pub use graph::{
    Connection, Graph, GraphSnapshot, Node, NodeColor, NodeId, Point, ValidationError,
};
pub use hit_test::{find_node_at, NodeGeometry};
pub use interaction::{EditorEvent, InteractionState, Key};
pub use layout::{compute_layout, LayoutKind, NodePosition};
pub use path::generate_edge_path;
pub use scene::{display_label, EdgeView, NodeView, Scene, SceneSync};
pub use store::{
    FileBackend, KeyValueBackend, KeyValueLayoutStore, LayoutStore, MemoryBackend, SavedLayout,
    SavedLayoutSummary,
};
pub use viewport::{Bounds, Viewport};
