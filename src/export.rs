//! SVG and PNG export of the whole mind map.
//!
//! Exports are independent of the current zoom and pan: the SVG document is
//! sized to the bounding box of all node boxes plus a margin. The PNG is the
//! same document scaled to fit a fixed-size surface over a solid background.
//!
//! Rasterization can be slow (system font discovery, large graphs), so
//! [`spawn_raster_export`] runs it on a worker thread and hands back a
//! [`RasterJob`]. Failures come back as [`ExportError`] values instead of
//! silently producing nothing.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg;
use tracing::{debug, warn};

use crate::config::{EditorConfig, ExportConfig};
use crate::error::ExportError;
use crate::graph::{parse_hex_color, Graph, Point};
use crate::hit_test::{node_box, NodeBox};
use crate::path::generate_edge_path;
use crate::scene::display_label;

const SVG_MIME: &str = "image/svg+xml";
const PNG_MIME: &str = "image/png";
const ROOT_STROKE: &str = "#fbbf24";

/// A finished export, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|source| ExportError::Io { path: path.clone(), source })?;
        Ok(path)
    }
}

/// `<prefix>-<YYYYMMDD-HHMMSS>.<extension>`
pub fn export_file_name(prefix: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.{}", prefix, at.format("%Y%m%d-%H%M%S"), extension)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render the graph as a standalone SVG document.
pub fn render_svg(graph: &Graph, config: &EditorConfig) -> Result<String, ExportError> {
    let boxes: Vec<NodeBox> = graph
        .nodes()
        .iter()
        .map(|n| node_box(n, &config.nodes, config.label_max_chars))
        .collect();
    let first = boxes.first().ok_or(ExportError::EmptyGraph)?;

    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x + first.width, first.y + first.height);
    for b in &boxes[1..] {
        min_x = min_x.min(b.x);
        min_y = min_y.min(b.y);
        max_x = max_x.max(b.x + b.width);
        max_y = max_y.max(b.y + b.height);
    }
    let pad = config.export.padding;
    let (min_x, min_y) = (min_x - pad, min_y - pad);
    let width = (max_x + pad - min_x).max(1.0);
    let height = (max_y + pad - min_y).max(1.0);

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{min_x} {min_y} {width} {height}">"#
    );

    for c in graph.connections() {
        let (Some(from), Some(to)) = (graph.node(&c.from), graph.node(&c.to)) else {
            continue;
        };
        let d = generate_edge_path(from.position(), to.position(), 1.0, 30.0);
        let _ = writeln!(
            svg,
            r#"  <path d="{d}" fill="none" stroke="{}" stroke-width="2"/>"#,
            config.export.edge_color
        );
    }

    for (node, b) in graph.nodes().iter().zip(&boxes) {
        let stroke = if node.is_root {
            format!(r#" stroke="{ROOT_STROKE}" stroke-width="3""#)
        } else {
            String::new()
        };
        let _ = writeln!(
            svg,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="{}"{stroke}/>"#,
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(node.color.hex())
        );
        let Point { x: cx, y: cy } = b.center();
        let _ = writeln!(
            svg,
            r#"  <text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-size="14" fill="{}">{}</text>"#,
            config.export.text_color,
            escape_xml(&display_label(&node.text, config.label_max_chars))
        );
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Export the graph as an SVG download.
pub fn export_svg(
    graph: &Graph,
    config: &EditorConfig,
    at: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    let svg = render_svg(graph, config)?;
    let artifact = ExportArtifact {
        file_name: export_file_name(&config.export.file_prefix, "svg", at),
        mime_type: SVG_MIME,
        bytes: svg.into_bytes(),
    };
    debug!(file = %artifact.file_name, bytes = artifact.bytes.len(), "exported svg");
    Ok(artifact)
}

/// Rasterize an SVG document onto the configured background surface.
///
/// The drawing is scaled uniformly to fit and centered.
pub fn rasterize_svg(svg: &str, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (config.raster_width, config.raster_height);

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)?;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
    let background = parse_hex_color(&config.background).unwrap_or_else(|| {
        warn!(background = %config.background, "invalid export background, using black");
        slint::Color::from_rgb_u8(0, 0, 0)
    });
    pixmap.fill(tiny_skia::Color::from_rgba8(
        background.red(),
        background.green(),
        background.blue(),
        255,
    ));

    let size = tree.size();
    let scale = (width as f32 / size.width()).min(height as f32 / size.height());
    let tx = (width as f32 - size.width() * scale) / 2.0;
    let ty = (height as f32 - size.height() * scale) / 2.0;
    resvg::render(&tree, Transform::from_row(scale, 0.0, 0.0, scale, tx, ty), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|err| ExportError::Encode(err.to_string()))
}

/// Export the graph as a PNG download, on the calling thread.
pub fn export_png(
    graph: &Graph,
    config: &EditorConfig,
    at: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    let svg = render_svg(graph, config)?;
    raster_artifact(&svg, &config.export, at)
}

fn raster_artifact(
    svg: &str,
    config: &ExportConfig,
    at: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    let bytes = rasterize_svg(svg, config)?;
    let artifact = ExportArtifact {
        file_name: export_file_name(&config.file_prefix, "png", at),
        mime_type: PNG_MIME,
        bytes,
    };
    debug!(file = %artifact.file_name, bytes = artifact.bytes.len(), "exported png");
    Ok(artifact)
}

/// A PNG export running on a worker thread.
pub struct RasterJob {
    handle: JoinHandle<Result<ExportArtifact, ExportError>>,
}

impl RasterJob {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the export is done.
    pub fn wait(self) -> Result<ExportArtifact, ExportError> {
        self.handle.join().map_err(|_| ExportError::WorkerLost)?
    }
}

/// Start a PNG export of the graph in the background.
///
/// The SVG is rendered immediately from the current graph, so later edits
/// do not affect the running export.
pub fn spawn_raster_export(
    graph: &Graph,
    config: &EditorConfig,
    at: DateTime<Utc>,
) -> Result<RasterJob, ExportError> {
    let svg = render_svg(graph, config)?;
    let export_config = config.export.clone();
    let handle = std::thread::spawn(move || {
        let result = raster_artifact(&svg, &export_config, at);
        if let Err(err) = &result {
            warn!(error = %err, "raster export failed");
        }
        result
    });
    Ok(RasterJob { handle })
}
