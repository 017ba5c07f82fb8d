//! Automatic mind map layouts.
//!
//! Three deterministic layouts recompute node positions from the connection
//! structure: [`LayoutKind::Radial`], [`LayoutKind::OrgChart`] and
//! [`LayoutKind::HorizontalTree`].
//!
//! The tree is read from the root outwards. Children are the root's
//! neighbours and grandchildren are the children's remaining neighbours,
//! both in connection creation order. Only these two levels are moved:
//! deeper descendants and nodes not reachable within two hops keep their
//! current positions. This is a known limitation of the layouts, not
//! something callers should work around.
//!
//! Every layout depends only on structure and [`LayoutConfig`], so running
//! one twice in a row gives identical positions.

use std::collections::HashSet;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::{Graph, Point};

/// Which layout to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// Root in the middle, children on a ring, grandchildren on an outer ring.
    #[default]
    Radial,
    /// Root at the top, one row per level.
    OrgChart,
    /// Root on the left, one column per level.
    HorizontalTree,
}

/// A positioned node returned by [`compute_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl NodePosition {
    fn at(id: &str, p: Point) -> Self {
        Self { id: id.to_string(), x: p.x, y: p.y }
    }
}

/// Root, children and grandchildren of a mind map, in creation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hierarchy {
    pub root: String,
    /// `(child, grandchildren)` pairs.
    pub children: Vec<(String, Vec<String>)>,
}

impl Hierarchy {
    /// Read the first two levels below the root.
    ///
    /// A node reachable from several children is assigned to the first of
    /// them. Returns `None` if the graph has no root.
    pub fn of(graph: &Graph) -> Option<Hierarchy> {
        let root = graph.root_id()?;
        let mut placed: HashSet<&str> = HashSet::new();
        placed.insert(root);

        let children: Vec<&str> = graph.neighbors(root).filter(|id| placed.insert(*id)).collect();

        let children = children
            .into_iter()
            .map(|child| {
                let grandchildren = graph
                    .neighbors(child)
                    .filter(|id| placed.insert(*id))
                    .map(str::to_string)
                    .collect();
                (child.to_string(), grandchildren)
            })
            .collect();

        Some(Hierarchy { root: root.to_string(), children })
    }
}

/// Compute new positions for the root, children and grandchildren.
pub fn compute_layout(graph: &Graph, kind: LayoutKind, config: &LayoutConfig) -> Vec<NodePosition> {
    let Some(tree) = Hierarchy::of(graph) else {
        return Vec::new();
    };
    match kind {
        LayoutKind::Radial => radial(&tree, config),
        LayoutKind::OrgChart => org_chart(&tree, config),
        LayoutKind::HorizontalTree => horizontal_tree(&tree, config),
    }
}

/// Compute a layout and write it into the graph. Returns the number of
/// nodes positioned.
pub fn apply_layout(graph: &mut Graph, kind: LayoutKind, config: &LayoutConfig) -> usize {
    let positions = compute_layout(graph, kind, config);
    for p in &positions {
        // Ids come from the graph itself, so this cannot miss.
        let _ = graph.set_position(&p.id, Point::new(p.x, p.y));
    }
    debug!(?kind, nodes = positions.len(), "applied layout");
    positions.len()
}

/// Offset of item `index` in a row of `count` items spaced `step` apart,
/// centered on zero.
fn centered(index: usize, count: usize, step: f32) -> f32 {
    (index as f32 - (count as f32 - 1.0) / 2.0) * step
}

fn radial(tree: &Hierarchy, config: &LayoutConfig) -> Vec<NodePosition> {
    let center = Point::new(config.radial_center.0, config.radial_center.1);
    let mut out = vec![NodePosition::at(&tree.root, center)];

    let n = tree.children.len();
    let outer = config.radial_radius + config.grandchild_ring;
    for (i, (child, grandchildren)) in tree.children.iter().enumerate() {
        let angle = 2.0 * PI * i as f32 / n as f32 - PI / 2.0;
        out.push(NodePosition::at(child, center.polar_offset(angle, config.radial_radius)));

        let m = grandchildren.len();
        for (j, grandchild) in grandchildren.iter().enumerate() {
            let a = angle + centered(j, m, config.grandchild_step);
            out.push(NodePosition::at(grandchild, center.polar_offset(a, outer)));
        }
    }
    out
}

fn org_chart(tree: &Hierarchy, config: &LayoutConfig) -> Vec<NodePosition> {
    let root = Point::new(config.org_root.0, config.org_root.1);
    let mut out = vec![NodePosition::at(&tree.root, root)];

    let n = tree.children.len();
    if n == 0 {
        return out;
    }
    let slot = (config.total_width / n as f32).max(config.min_slot);
    let child_y = root.y + config.level_gap;
    for (i, (child, grandchildren)) in tree.children.iter().enumerate() {
        let child_x = root.x + centered(i, n, slot);
        out.push(NodePosition::at(child, Point::new(child_x, child_y)));

        let m = grandchildren.len();
        if m == 0 {
            continue;
        }
        let sub_slot = (slot / m as f32).max(config.min_slot);
        for (j, grandchild) in grandchildren.iter().enumerate() {
            let x = child_x + centered(j, m, sub_slot);
            out.push(NodePosition::at(grandchild, Point::new(x, child_y + config.level_gap)));
        }
    }
    out
}

fn horizontal_tree(tree: &Hierarchy, config: &LayoutConfig) -> Vec<NodePosition> {
    let root = Point::new(config.horizontal_root.0, config.horizontal_root.1);
    let mut out = vec![NodePosition::at(&tree.root, root)];

    let n = tree.children.len();
    if n == 0 {
        return out;
    }
    let row = (config.total_height / n as f32).max(config.min_row);
    let child_x = root.x + config.column_gap;
    for (i, (child, grandchildren)) in tree.children.iter().enumerate() {
        let child_y = root.y + centered(i, n, row);
        out.push(NodePosition::at(child, Point::new(child_x, child_y)));

        let m = grandchildren.len();
        if m == 0 {
            continue;
        }
        let sub_row = (row / m as f32).max(config.min_row);
        for (j, grandchild) in grandchildren.iter().enumerate() {
            let y = child_y + centered(j, m, sub_row);
            out.push(NodePosition::at(grandchild, Point::new(child_x + config.column_gap, y)));
        }
    }
    out
}
