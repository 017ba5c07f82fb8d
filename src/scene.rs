//! Render snapshot of the editor and its synchronization to Slint models.
//!
//! [`Scene::build`] turns the graph, viewport and interaction state into
//! screen-space items. [`SceneSync`] pushes those items into `VecModel`s
//! owned by the UI, through constructor closures so applications keep their
//! own Slint struct types.
//!
//! # Example
//!
//! ```ignore
//! let nodes = Rc::new(VecModel::<UiNode>::default());
//! let mut sync = SceneSync::new();
//! sync.bind_nodes(nodes.clone(), |n| UiNode {
//!     id: n.id.clone(),
//!     label: n.label.clone(),
//!     x: n.x,
//!     y: n.y,
//!     color: n.color,
//!     selected: n.selected,
//! });
//! window.set_nodes(ModelRc::from(nodes));
//! editor.bind_scene(sync);
//! ```

use std::rc::Rc;

use slint::{Color, Model, SharedString, VecModel};

use crate::config::EditorConfig;
use crate::graph::{Graph, Point};
use crate::hit_test::node_box;
use crate::interaction::InteractionState;
use crate::path::generate_edge_path;
use crate::viewport::Viewport;

/// Minimum control point offset for on-screen connection curves.
const EDGE_CURVE_OFFSET: f32 = 30.0;

/// Shorten a label for display: the first `max_chars` characters followed
/// by `...` when the text is longer. The stored text is never touched.
pub fn display_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

/// Screen-space view of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: SharedString,
    pub label: SharedString,
    pub text: SharedString,
    /// Top-left corner and size, in screen pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub is_root: bool,
    pub selected: bool,
    pub editing: bool,
    pub connecting: bool,
}

/// Screen-space view of one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub id: SharedString,
    pub path: SharedString,
}

/// Everything a front end needs to draw the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub scale: f32,
    pub mode: &'static str,
    /// In-progress label text while editing.
    pub draft: Option<SharedString>,
}

impl Scene {
    pub fn build(
        graph: &Graph,
        viewport: &Viewport,
        state: &InteractionState,
        selected: Option<&str>,
        config: &EditorConfig,
    ) -> Scene {
        let scale = viewport.scale();
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| {
                let b = node_box(node, &config.nodes, config.label_max_chars);
                let top_left = viewport.world_to_screen(Point::new(b.x, b.y));
                NodeView {
                    id: node.id.as_str().into(),
                    label: display_label(&node.text, config.label_max_chars).into(),
                    text: node.text.as_str().into(),
                    x: top_left.x,
                    y: top_left.y,
                    width: b.width * scale,
                    height: b.height * scale,
                    color: node.color.to_slint(),
                    is_root: node.is_root,
                    selected: selected == Some(node.id.as_str()),
                    editing: state.editing_node() == Some(node.id.as_str()),
                    connecting: state.connection_source() == Some(node.id.as_str()),
                }
            })
            .collect();

        let edges = graph
            .connections()
            .iter()
            .filter_map(|c| {
                let from = viewport.world_to_screen(graph.node(&c.from)?.position());
                let to = viewport.world_to_screen(graph.node(&c.to)?.position());
                Some(EdgeView {
                    id: c.id.as_str().into(),
                    path: generate_edge_path(from, to, scale, EDGE_CURVE_OFFSET).into(),
                })
            })
            .collect();

        let draft = match state {
            InteractionState::EditingLabel { draft, .. } => Some(draft.as_str().into()),
            _ => None,
        };

        Scene { nodes, edges, scale, mode: state.name(), draft }
    }
}

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer<T> {
    fn sync(&self, items: &[T]);
}

/// Concrete implementation of ModelSyncer for a specific row type.
struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<T, P, F> ModelSyncer<T> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&T) -> P,
{
    fn sync(&self, items: &[T]) {
        // Update existing rows or add new ones
        for (i, item) in items.iter().enumerate() {
            let row = (self.constructor)(item);
            if i < self.model.row_count() {
                self.model.set_row_data(i, row);
            } else {
                self.model.push(row);
            }
        }
        // Remove excess rows
        while self.model.row_count() > items.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Keeps Slint node and edge models in step with the editor's [`Scene`].
#[derive(Default)]
pub struct SceneSync {
    nodes: Option<Box<dyn ModelSyncer<NodeView>>>,
    edges: Option<Box<dyn ModelSyncer<EdgeView>>>,
}

impl SceneSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the node model. `constructor` builds one row per [`NodeView`].
    pub fn bind_nodes<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&NodeView) -> P + 'static,
    {
        self.nodes = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Bind the edge model. `constructor` builds one row per [`EdgeView`].
    pub fn bind_edges<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&EdgeView) -> P + 'static,
    {
        self.edges = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    pub fn sync(&self, scene: &Scene) {
        if let Some(nodes) = &self.nodes {
            nodes.sync(&scene.nodes);
        }
        if let Some(edges) = &self.edges {
            edges.sync(&scene.edges);
        }
    }
}
