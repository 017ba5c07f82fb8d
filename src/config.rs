//! Tunable constants for the editor core.
//!
//! Every section has working defaults, so an empty TOML document (or
//! [`EditorConfig::default`]) gives the stock editor. Partial documents only
//! override the keys they name.
//!
//! ```toml
//! label_max_chars = 20
//!
//! [viewport]
//! zoom_step = 0.25
//!
//! [export]
//! background = "#000000"
//! ```

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Labels longer than this are shortened for display (full text is kept).
    pub label_max_chars: usize,
    pub nodes: NodeMetrics,
    pub viewport: ViewportConfig,
    pub mutation: MutationConfig,
    pub layout: LayoutConfig,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            label_max_chars: 15,
            nodes: NodeMetrics::default(),
            viewport: ViewportConfig::default(),
            mutation: MutationConfig::default(),
            layout: LayoutConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from a TOML document and check its ranges.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values the editor cannot work with: non-positive sizes and
    /// inverted `min`/`max` pairs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nodes = &self.nodes;
        positive("nodes.char_width", nodes.char_width)?;
        positive("nodes.height", nodes.height)?;
        positive("nodes.min_width", nodes.min_width)?;
        ordered("nodes.min_width", nodes.min_width, "nodes.max_width", nodes.max_width)?;
        if !nodes.horizontal_padding.is_finite() {
            return Err(invalid("nodes.horizontal_padding", "must be finite"));
        }

        let vp = &self.viewport;
        positive("viewport.min_scale", vp.min_scale)?;
        ordered("viewport.min_scale", vp.min_scale, "viewport.max_scale", vp.max_scale)?;
        ordered("viewport.min_scale", vp.min_scale, "viewport.fit_max_scale", vp.fit_max_scale)?;
        positive("viewport.zoom_step", vp.zoom_step)?;
        positive("viewport.wheel_zoom_step", vp.wheel_zoom_step)?;
        positive("viewport.center_damping", vp.center_damping)?;
        positive("viewport.container_width", vp.container_width)?;
        positive("viewport.container_height", vp.container_height)?;
        if !(vp.fit_padding.is_finite() && vp.fit_padding >= 0.0) {
            return Err(invalid("viewport.fit_padding", "must be zero or more"));
        }

        if self.export.raster_width == 0 || self.export.raster_height == 0 {
            return Err(invalid("export.raster_width/raster_height", "must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

fn ordered(
    min_field: &'static str,
    min: f32,
    max_field: &'static str,
    max: f32,
) -> Result<(), ConfigError> {
    if max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(invalid(min_field, format!("({min}) must not exceed {max_field} ({max})")))
    }
}

/// Estimated on-canvas size of a node box, in world units.
///
/// Used for hit testing and export when the front end does not report
/// real sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub char_width: f32,
    pub horizontal_padding: f32,
    pub height: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            horizontal_padding: 32.0,
            height: 40.0,
            min_width: 80.0,
            max_width: 220.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Upper bound used by center/fit, lower than `max_scale` so small
    /// graphs are not blown up.
    pub fit_max_scale: f32,
    pub zoom_step: f32,
    pub wheel_zoom_step: f32,
    pub fit_padding: f32,
    pub center_damping: f32,
    pub container_width: f32,
    pub container_height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 3.0,
            fit_max_scale: 2.0,
            zoom_step: 0.2,
            wheel_zoom_step: 0.1,
            fit_padding: 50.0,
            center_damping: 0.85,
            container_width: 800.0,
            container_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Distance from the parent for nodes created by `add_node`.
    pub new_node_distance: f32,
    /// Distance from the parent for nodes created by `add_child_node`.
    pub child_distance: f32,
    /// Total angle (radians) siblings are spread across.
    pub child_spread: f32,
    pub new_node_text: String,
    pub root_text: String,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            new_node_distance: 150.0,
            child_distance: 120.0,
            child_spread: 2.0 * PI / 3.0,
            new_node_text: "New idea".to_string(),
            root_text: "Central idea".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub radial_center: (f32, f32),
    pub radial_radius: f32,
    /// Extra radius of the grandchild ring over `radial_radius`.
    pub grandchild_ring: f32,
    /// Angular step between grandchildren of the same parent (radians).
    pub grandchild_step: f32,

    pub org_root: (f32, f32),
    pub level_gap: f32,
    pub min_slot: f32,
    pub total_width: f32,

    pub horizontal_root: (f32, f32),
    pub column_gap: f32,
    pub min_row: f32,
    pub total_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radial_center: (400.0, 300.0),
            radial_radius: 200.0,
            grandchild_ring: 120.0,
            grandchild_step: 0.4,
            org_root: (400.0, 80.0),
            level_gap: 150.0,
            min_slot: 150.0,
            total_width: 800.0,
            horizontal_root: (100.0, 300.0),
            column_gap: 250.0,
            min_row: 80.0,
            total_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub raster_width: u32,
    pub raster_height: u32,
    /// Hex background used behind raster exports.
    pub background: String,
    pub file_prefix: String,
    /// Margin around the node bounding box in the SVG document.
    pub padding: f32,
    pub edge_color: String,
    pub text_color: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            raster_width: 1200,
            raster_height: 800,
            background: "#0f172a".to_string(),
            file_prefix: "mind-map".to_string(),
            padding: 40.0,
            edge_color: "#64748b".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }
}
