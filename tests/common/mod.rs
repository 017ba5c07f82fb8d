//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use slint_mindmap_editor::{Graph, GraphSnapshot};

/// Tracks callback invocations for testing.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// Every snapshot handed to `on_save`
    pub saves: Rc<RefCell<Vec<GraphSnapshot>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.borrow().len()
    }

    pub fn last_save(&self) -> Option<GraphSnapshot> {
        self.saves.borrow().last().cloned()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.saves.borrow_mut().clear();
    }
}

/// Assert the mind map invariants: one root, no dangling, self or duplicate
/// connections.
pub fn assert_graph_invariants(graph: &Graph) {
    let roots = graph.nodes().iter().filter(|n| n.is_root).count();
    assert_eq!(roots, 1, "expected exactly one root");

    let mut pairs = HashSet::new();
    for c in graph.connections() {
        assert_ne!(c.from, c.to, "self loop {}", c.id);
        assert!(graph.contains(&c.from), "dangling from {}", c.id);
        assert!(graph.contains(&c.to), "dangling to {}", c.id);
        let pair = if c.from < c.to {
            (c.from.clone(), c.to.clone())
        } else {
            (c.to.clone(), c.from.clone())
        };
        assert!(pairs.insert(pair), "duplicate connection {}", c.id);
    }
}
