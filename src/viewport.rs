//! Scale/offset view transform.
//!
//! Screen coordinates relate to world coordinates by
//! `screen = world * scale + offset`. The viewport never touches the graph;
//! functions that need node positions take them as arguments.

use crate::config::ViewportConfig;
use crate::graph::{Node, Point};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Bounding box of the node positions, or `None` for an empty slice.
    pub fn of_nodes(nodes: &[Node]) -> Option<Bounds> {
        let first = nodes.first()?.position();
        Some(nodes.iter().skip(1).fold(Bounds { min: first, max: first }, |b, n| Bounds {
            min: Point::new(b.min.x.min(n.x), b.min.y.min(n.y)),
            max: Point::new(b.max.x.max(n.x), b.max.y.max(n.y)),
        }))
    }

    pub fn padded(self, padding: f32) -> Bounds {
        Bounds {
            min: Point::new(self.min.x - padding, self.min.y - padding),
            max: Point::new(self.max.x + padding, self.max.y + padding),
        }
    }

    /// Width, never below 1 so it is always safe to divide by.
    pub fn width(&self) -> f32 {
        (self.max.x - self.min.x).max(1.0)
    }

    /// Height, never below 1 so it is always safe to divide by.
    pub fn height(&self) -> f32 {
        (self.max.y - self.min.y).max(1.0)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Point,
    container_width: f32,
    container_height: f32,
    config: ViewportConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            scale: 1.0,
            offset: Point::ZERO,
            container_width: config.container_width,
            container_height: config.container_height,
            config,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn container_size(&self) -> (f32, f32) {
        (self.container_width, self.container_height)
    }

    /// Update the size of the visible canvas (screen pixels).
    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.container_width = width.max(1.0);
        self.container_height = height.max(1.0);
    }

    /// Set scale and offset directly. Scale is clamped to the allowed range.
    pub fn set_transform(&mut self, scale: f32, offset: Point) {
        self.scale = self.clamp_scale(scale);
        self.offset = offset;
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.offset.x) / self.scale, (screen.y - self.offset.y) / self.scale)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.scale + self.offset.x, world.y * self.scale + self.offset.y)
    }

    pub fn zoom_in(&mut self) {
        self.scale = self.clamp_scale(self.scale + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.scale = self.clamp_scale(self.scale - self.config.zoom_step);
    }

    pub fn reset_view(&mut self) {
        self.scale = 1.0;
        self.offset = Point::ZERO;
    }

    /// Translate by a pointer delta (drag-to-pan).
    pub fn pan_by(&mut self, delta: Point) {
        self.offset = self.offset + delta;
    }

    /// Handle a wheel event.
    ///
    /// With the zoom modifier held, each notch changes scale by the wheel
    /// step (scrolling up zooms in). Otherwise the wheel scrolls the view.
    pub fn wheel(&mut self, delta: Point, zoom_modifier: bool) {
        if zoom_modifier {
            if delta.y < 0.0 {
                self.scale = self.clamp_scale(self.scale + self.config.wheel_zoom_step);
            } else if delta.y > 0.0 {
                self.scale = self.clamp_scale(self.scale - self.config.wheel_zoom_step);
            }
        } else {
            self.offset = self.offset - delta;
        }
    }

    /// Center the nodes in the container, leaving a margin around them.
    ///
    /// Empty graphs reset the view.
    pub fn center_view(&mut self, nodes: &[Node]) {
        self.frame_nodes(nodes, self.config.center_damping);
    }

    /// Scale the nodes (plus padding) to fill the container.
    ///
    /// Empty graphs reset the view.
    pub fn fit_to_view(&mut self, nodes: &[Node]) {
        self.frame_nodes(nodes, 1.0);
    }

    fn frame_nodes(&mut self, nodes: &[Node], damping: f32) {
        let Some(bounds) = Bounds::of_nodes(nodes) else {
            self.reset_view();
            return;
        };
        let bounds = bounds.padded(self.config.fit_padding);

        let fit = (self.container_width / bounds.width())
            .min(self.container_height / bounds.height());
        self.scale = (fit * damping).clamp(self.config.min_scale, self.config.fit_max_scale);

        let center = bounds.center();
        self.offset = Point::new(
            self.container_width / 2.0 - center.x * self.scale,
            self.container_height / 2.0 - center.y * self.scale,
        );
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }
}
