use crate::graph::Point;

/// Cubic bezier used to draw a connection between two node centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// Build the curve for a connection.
    ///
    /// Control points extend along the dominant axis of the connection, so
    /// side-by-side nodes get an S-curve bending horizontally and stacked
    /// nodes one bending vertically. Endpoints closer than `10 * zoom` get a
    /// degenerate (straight) curve.
    ///
    /// # Arguments
    /// * `start`, `end` - Node centers
    /// * `zoom` - Current zoom level (affects control point offset)
    /// * `min_offset` - Minimum control point offset
    pub fn between(start: Point, end: Point, zoom: f32, min_offset: f32) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let threshold = 10.0 * zoom;

        if dx * dx + dy * dy < threshold * threshold {
            return CubicBezier { p0: start, p1: start, p2: end, p3: end };
        }

        if dx.abs() >= dy.abs() {
            let offset = (dx.abs() * 0.5).max(min_offset * zoom) * dx.signum();
            CubicBezier {
                p0: start,
                p1: Point::new(start.x + offset, start.y),
                p2: Point::new(end.x - offset, end.y),
                p3: end,
            }
        } else {
            let offset = (dy.abs() * 0.5).max(min_offset * zoom) * dy.signum();
            CubicBezier {
                p0: start,
                p1: Point::new(start.x, start.y + offset),
                p2: Point::new(end.x, end.y - offset),
                p3: end,
            }
        }
    }

    pub fn is_straight(&self) -> bool {
        self.p1 == self.p0 && self.p2 == self.p3
    }

    /// SVG path commands, e.g. `"M 10 20 C 60 20 90 80 140 80"`.
    pub fn to_svg_path(&self) -> String {
        if self.is_straight() {
            return format!("M {} {} L {} {}", self.p0.x, self.p0.y, self.p3.x, self.p3.y);
        }
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Generate the SVG path for a connection between two node centers.
pub fn generate_edge_path(start: Point, end: Point, zoom: f32, min_offset: f32) -> String {
    CubicBezier::between(start, end, zoom, min_offset).to_svg_path()
}
