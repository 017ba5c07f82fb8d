//! Error types for the fallible parts of the editor core.
//!
//! Graph invariant violations are not errors here: they are reported as
//! [`ValidationError`](crate::graph::ValidationError) by the graph and turned
//! into silent no-ops by the editor session.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the saved-layout store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access layout store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("saved layout collection is corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("saved layout {0} not found")]
    NotFound(String),
}

/// Failures producing an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the graph has no nodes")]
    EmptyGraph,
    #[error("generated SVG could not be parsed for rasterization: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("failed to allocate a {width}x{height} raster surface")]
    Surface { width: u32, height: u32 },
    #[error("failed to encode PNG output: {0}")]
    Encode(String),
    #[error("raster export worker stopped before producing a result")]
    WorkerLost,
    #[error("failed to write export to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures loading an [`EditorConfig`](crate::config::EditorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid editor config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid editor config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}
