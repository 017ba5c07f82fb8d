//! Interaction modes and the abstract input events that drive them.
//!
//! Front ends translate their native pointer and keyboard events into
//! [`EditorEvent`]s; [`MindMapEditor::handle_event`](crate::MindMapEditor::handle_event)
//! runs the transitions. Pointer positions are always in screen space.
//!
//! ```text
//!              pointer-down (background)         pointer-up
//!   Idle ─────────────────────────────▶ Panning ───────────▶ Idle
//!    │  pointer-down (node)                         pointer-up
//!    ├──────────────────────────────▶ DraggingNode ──────────▶ Idle
//!    │  connect action                  click other node / Esc
//!    ├──────────────────────────────▶ ConnectingFrom ────────▶ Idle
//!    │  double-click / edit action      Enter (non-blank) / Esc
//!    └──────────────────────────────▶ EditingLabel ──────────▶ Idle
//! ```

use crate::graph::{NodeId, Point};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Background drag; `last` is the previous pointer position.
    Panning { last: Point },
    /// Node drag; `grab_offset` is pointer world position minus node position
    /// at pointer-down.
    DraggingNode { node_id: NodeId, grab_offset: Point },
    /// Waiting for a click on the node to connect `node_id` to.
    ConnectingFrom { node_id: NodeId },
    /// Label editor open on `node_id` with the in-progress text.
    EditingLabel { node_id: NodeId, draft: String },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Short name for logs and status bars.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Panning { .. } => "panning",
            InteractionState::DraggingNode { .. } => "dragging",
            InteractionState::ConnectingFrom { .. } => "connecting",
            InteractionState::EditingLabel { .. } => "editing",
        }
    }

    pub fn editing_node(&self) -> Option<&str> {
        match self {
            InteractionState::EditingLabel { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn connection_source(&self) -> Option<&str> {
        match self {
            InteractionState::ConnectingFrom { node_id } => Some(node_id),
            _ => None,
        }
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match self {
            InteractionState::DraggingNode { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Keys the editor reacts to. Everything else is the front end's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Commit a label edit.
    Enter,
    /// Cancel a label edit or a pending connection.
    Escape,
    /// Delete the selected node.
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    PointerDown { position: Point },
    PointerMove { position: Point },
    PointerUp { position: Point },
    /// Press and release without leaving the target.
    Click { position: Point },
    DoubleClick { position: Point },
    /// `delta` in wheel units; `zoom_modifier` is true while Ctrl/Cmd is held.
    Wheel { delta: Point, zoom_modifier: bool },
    Key(Key),
    /// The label editor's text changed.
    DraftChanged(String),
}
