//! Named saved layouts, kept in a client-local key-value store.
//!
//! The store is separate from whatever database the host application uses
//! for its own data. All layouts live as one JSON array under a single key
//! ([`SAVED_LAYOUTS_KEY`]); see [`KeyValueLayoutStore`].
//!
//! Unreadable or corrupted collections are treated as empty so the editor
//! keeps working. The underlying [`StoreError`] is logged.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::graph::{Connection, GraphSnapshot, Node};

/// Key the saved-layout collection is stored under.
pub const SAVED_LAYOUTS_KEY: &str = "mindmap-saved-layouts";

/// An immutable, named snapshot of a full graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLayout {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl SavedLayout {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot { nodes: self.nodes.clone(), connections: self.connections.clone() }
    }

    pub fn summary(&self) -> SavedLayoutSummary {
        SavedLayoutSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            node_count: self.nodes.len(),
            connection_count: self.connections.len(),
            created_at: self.created_at,
        }
    }
}

/// What a "saved layouts" list needs to show.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedLayoutSummary {
    pub id: String,
    pub name: String,
    pub node_count: usize,
    pub connection_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Save/list/load/delete of named layouts.
pub trait LayoutStore {
    /// Store a deep copy of `snapshot` under a new id.
    fn save(&mut self, name: &str, snapshot: &GraphSnapshot) -> Result<SavedLayout, StoreError>;
    /// All saved layouts, oldest first.
    fn list(&self) -> Vec<SavedLayoutSummary>;
    /// Deep copy of a saved layout's graph.
    fn load(&self, id: &str) -> Option<GraphSnapshot>;
    /// Remove a layout. Returns `false` if no layout had this id.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
}

/// One store shared by every editor in the process.
impl<S: LayoutStore> LayoutStore for Rc<RefCell<S>> {
    fn save(&mut self, name: &str, snapshot: &GraphSnapshot) -> Result<SavedLayout, StoreError> {
        self.borrow_mut().save(name, snapshot)
    }

    fn list(&self) -> Vec<SavedLayoutSummary> {
        self.borrow().list()
    }

    fn load(&self, id: &str) -> Option<GraphSnapshot> {
        self.borrow().load(id)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.borrow_mut().delete(id)
    }
}

// ============================================================================
// Key-value backends
// ============================================================================

/// Minimal string key-value storage.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Lives as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a client directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|source| StoreError::Io { path: dir.clone(), source })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Write to a temporary file in the same directory, then rename it over
    /// `<key>.json`. Readers never see a half-written collection.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let io_err = |source| StoreError::Io { path: path.clone(), source };

        let mut file = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

// ============================================================================
// LayoutStore over a key-value backend
// ============================================================================

/// [`LayoutStore`] keeping the whole collection as a JSON array under one key.
#[derive(Debug, Clone)]
pub struct KeyValueLayoutStore<B> {
    backend: B,
    key: String,
}

impl KeyValueLayoutStore<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: KeyValueBackend> KeyValueLayoutStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, SAVED_LAYOUTS_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Read the collection, reporting corruption as an error.
    pub fn try_read(&self) -> Result<Vec<SavedLayout>, StoreError> {
        match self.backend.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Read the collection, treating any failure as an empty one.
    pub fn layouts(&self) -> Vec<SavedLayout> {
        self.try_read().unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "ignoring unreadable saved layouts");
            Vec::new()
        })
    }

    fn write(&mut self, layouts: &[SavedLayout]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(layouts)?;
        self.backend.set(&self.key, &raw)
    }
}

impl<B: KeyValueBackend> LayoutStore for KeyValueLayoutStore<B> {
    fn save(&mut self, name: &str, snapshot: &GraphSnapshot) -> Result<SavedLayout, StoreError> {
        let layout = SavedLayout {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            nodes: snapshot.nodes.clone(),
            connections: snapshot.connections.clone(),
        };
        let mut layouts = self.layouts();
        layouts.push(layout.clone());
        self.write(&layouts)?;
        info!(id = %layout.id, name, nodes = layout.nodes.len(), "saved layout");
        Ok(layout)
    }

    fn list(&self) -> Vec<SavedLayoutSummary> {
        self.layouts().iter().map(SavedLayout::summary).collect()
    }

    fn load(&self, id: &str) -> Option<GraphSnapshot> {
        self.layouts().into_iter().find(|l| l.id == id).map(|l| l.snapshot())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut layouts = self.layouts();
        let before = layouts.len();
        layouts.retain(|l| l.id != id);
        if layouts.len() == before {
            return Ok(false);
        }
        self.write(&layouts)?;
        info!(id, "deleted layout");
        Ok(true)
    }
}
