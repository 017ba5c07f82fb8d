use serde::{Deserialize, Serialize};
use slint::Color;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Sub};
use tracing::debug;

/// Opaque, stable node identifier.
pub type NodeId = String;

/// A 2D point or vector. Used for both world and screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Point at `distance` from `self` in direction `angle` (radians).
    pub fn polar_offset(self, angle: f32, distance: f32) -> Point {
        Point::new(self.x + angle.cos() * distance, self.y + angle.sin() * distance)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ============================================================================
// Node colors
// ============================================================================

/// Node fill color: one of the fixed palette entries or a custom hex value.
///
/// Serialized as a `#rrggbb` string so saved layouts stay readable. Palette
/// entries are recognized again on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeColor {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Red,
    Pink,
    Teal,
    Custom(String),
}

impl NodeColor {
    pub const PALETTE: [NodeColor; 7] = [
        NodeColor::Blue,
        NodeColor::Green,
        NodeColor::Purple,
        NodeColor::Orange,
        NodeColor::Red,
        NodeColor::Pink,
        NodeColor::Teal,
    ];

    pub fn hex(&self) -> &str {
        match self {
            NodeColor::Blue => "#3b82f6",
            NodeColor::Green => "#10b981",
            NodeColor::Purple => "#8b5cf6",
            NodeColor::Orange => "#f59e0b",
            NodeColor::Red => "#ef4444",
            NodeColor::Pink => "#ec4899",
            NodeColor::Teal => "#14b8a6",
            NodeColor::Custom(hex) => hex,
        }
    }

    /// Convert to a Slint color. Unparseable custom values render gray.
    pub fn to_slint(&self) -> Color {
        parse_hex_color(self.hex()).unwrap_or_else(|| Color::from_rgb_u8(128, 128, 128))
    }
}

impl From<String> for NodeColor {
    fn from(value: String) -> Self {
        NodeColor::PALETTE
            .iter()
            .find(|c| c.hex().eq_ignore_ascii_case(&value))
            .cloned()
            .unwrap_or(NodeColor::Custom(value))
    }
}

impl From<NodeColor> for String {
    fn from(value: NodeColor) -> Self {
        value.hex().to_string()
    }
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').filter(|d| d.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some(Color::from_rgb_u8(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let expand = |s: &str| channel(s).map(|v| v * 17);
            Some(Color::from_rgb_u8(
                expand(&digits[0..1])?,
                expand(&digits[1..2])?,
                expand(&digits[2..3])?,
            ))
        }
        _ => None,
    }
}

// ============================================================================
// Nodes and connections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub color: NodeColor,
    #[serde(default)]
    pub is_root: bool,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            x: position.x,
            y: position.y,
            color: NodeColor::default(),
            is_root: false,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }
}

/// Undirected link between two nodes. `from`/`to` record creation order only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from: NodeId,
    pub to: NodeId,
}

impl Connection {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        let from = from.into();
        let to = to.into();
        Self { id: connection_id(&from, &to), from, to }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// True if this connection joins `a` and `b` in either direction.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// The endpoint opposite `node_id`, if this connection touches it.
    pub fn other(&self, node_id: &str) -> Option<&str> {
        if self.from == node_id {
            Some(&self.to)
        } else if self.to == node_id {
            Some(&self.from)
        } else {
            None
        }
    }
}

/// Connection ids are derived from the ordered endpoint pair.
pub fn connection_id(from: &str, to: &str) -> String {
    format!("{from}-{to}")
}

/// Owned copy of a graph's nodes and connections.
///
/// This is what `on_save` receives and what saved layouts store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

// ============================================================================
// Validation
// ============================================================================

/// Reasons a graph mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No node with this id exists
    NodeNotFound(NodeId),
    /// A node with this id already exists
    DuplicateNodeId(NodeId),
    /// Cannot connect a node to itself
    SelfLoop,
    /// The two nodes are already connected (in either direction)
    DuplicateConnection,
    /// Another pair already produced this connection id (node ids containing `-`)
    DuplicateConnectionId(String),
    /// The root node cannot be deleted
    RootNotDeletable,
    /// Labels must contain something other than whitespace
    EmptyLabel,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "Node {} not found", id),
            Self::DuplicateNodeId(id) => write!(f, "Node {} already exists", id),
            Self::SelfLoop => write!(f, "Cannot connect node to itself"),
            Self::DuplicateConnection => write!(f, "Connection already exists"),
            Self::DuplicateConnectionId(id) => write!(f, "Connection id {} is already taken", id),
            Self::RootNotDeletable => write!(f, "Root node cannot be deleted"),
            Self::EmptyLabel => write!(f, "Label cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// Graph
// ============================================================================

/// Node/connection collections with the mind map invariants enforced:
///
/// - exactly one node is the root
/// - every connection references existing nodes
/// - no self loops, no two connections between the same unordered pair
///
/// Connections keep their creation order, which the layout engine uses as
/// child order.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Graph {
    /// A graph holding a single root node at the origin.
    pub fn new_with_root(text: impl Into<String>) -> Self {
        let mut root = Node::new(new_node_id(), text, Point::ZERO);
        root.is_root = true;
        Self { nodes: vec![root], connections: Vec::new() }
    }

    /// Build a graph from external data, repairing anything that breaks the
    /// invariants.
    ///
    /// Duplicate node ids keep their first occurrence. Exactly one root is
    /// kept (the first flagged one, or the first node if none is flagged).
    /// Dangling, self and duplicate connections are dropped. An empty node
    /// list yields a fresh root labelled `root_text`.
    pub fn from_parts(nodes: Vec<Node>, connections: Vec<Connection>, root_text: &str) -> Self {
        let mut seen = HashSet::new();
        let mut nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .collect();

        if nodes.is_empty() {
            return Self::new_with_root(root_text);
        }

        let root_index = nodes.iter().position(|n| n.is_root).unwrap_or(0);
        for (i, node) in nodes.iter_mut().enumerate() {
            node.is_root = i == root_index;
        }

        let mut graph = Self { nodes, connections: Vec::with_capacity(connections.len()) };
        for connection in connections {
            let valid = graph
                .validate_connection(&connection.from, &connection.to)
                .and_then(|()| graph.check_connection_id(&connection.id));
            match valid {
                Ok(()) => graph.connections.push(connection),
                Err(reason) => {
                    debug!(id = %connection.id, %reason, "dropping invalid connection");
                }
            }
        }
        graph
    }

    pub fn from_snapshot(snapshot: GraphSnapshot, root_text: &str) -> Self {
        Self::from_parts(snapshot.nodes, snapshot.connections, root_text)
    }

    /// Deep copy of the current nodes and connections.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot { nodes: self.nodes.clone(), connections: self.connections.clone() }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_root)
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root().map(|n| n.id.as_str())
    }

    /// Mean position of all nodes.
    pub fn centroid(&self) -> Option<Point> {
        if self.nodes.is_empty() {
            return None;
        }
        let n = self.nodes.len() as f32;
        let sum = self.nodes.iter().fold(Point::ZERO, |acc, node| acc + node.position());
        Some(Point::new(sum.x / n, sum.y / n))
    }

    /// Nodes adjacent to `id`, in connection creation order.
    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.connections.iter().filter_map(move |c| c.other(id))
    }

    pub fn connection_between(&self, a: &str, b: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.joins(a, b))
    }

    /// Check whether `from` and `to` may be connected.
    pub fn validate_connection(&self, from: &str, to: &str) -> Result<(), ValidationError> {
        if from == to {
            return Err(ValidationError::SelfLoop);
        }
        for id in [from, to] {
            if !self.contains(id) {
                return Err(ValidationError::NodeNotFound(id.to_string()));
            }
        }
        if self.connection_between(from, to).is_some() {
            return Err(ValidationError::DuplicateConnection);
        }
        self.check_connection_id(&connection_id(from, to))
    }

    fn check_connection_id(&self, id: &str) -> Result<(), ValidationError> {
        if self.connections.iter().any(|c| c.id == id) {
            return Err(ValidationError::DuplicateConnectionId(id.to_string()));
        }
        Ok(())
    }

    /// Insert a non-root node. The `is_root` flag of the argument is ignored.
    pub fn insert_node(&mut self, mut node: Node) -> Result<(), ValidationError> {
        if self.contains(&node.id) {
            return Err(ValidationError::DuplicateNodeId(node.id));
        }
        node.is_root = false;
        self.nodes.push(node);
        Ok(())
    }

    pub fn connect(&mut self, from: &str, to: &str) -> Result<&Connection, ValidationError> {
        self.validate_connection(from, to)?;
        self.connections.push(Connection::new(from, to));
        let last = self.connections.len() - 1;
        Ok(&self.connections[last])
    }

    /// Remove a node and every connection touching it. The root is refused.
    pub fn delete_node(&mut self, id: &str) -> Result<Node, ValidationError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| ValidationError::NodeNotFound(id.to_string()))?;
        if self.nodes[index].is_root {
            return Err(ValidationError::RootNotDeletable);
        }
        self.connections.retain(|c| !c.touches(id));
        Ok(self.nodes.remove(index))
    }

    pub fn delete_connection(&mut self, connection_id: &str) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id == connection_id)?;
        Some(self.connections.remove(index))
    }

    /// Remove the connection joining `a` and `b`, whichever way it was made.
    pub fn disconnect(&mut self, a: &str, b: &str) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.joins(a, b))?;
        Some(self.connections.remove(index))
    }

    pub fn set_color(&mut self, id: &str, color: NodeColor) -> Result<(), ValidationError> {
        self.node_mut(id)?.color = color;
        Ok(())
    }

    /// Replace a node's label with `text`, trimmed. Blank text is refused.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        self.node_mut(id)?.text = trimmed.to_string();
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, position: Point) -> Result<(), ValidationError> {
        self.node_mut(id)?.set_position(position);
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, ValidationError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ValidationError::NodeNotFound(id.to_string()))
    }
}

pub fn new_node_id() -> NodeId {
    uuid::Uuid::new_v4().to_string()
}
