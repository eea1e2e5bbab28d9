#![forbid(unsafe_code)]

//! Connector curves.
//!
//! Edges render as cubic Béziers in the "elbow" shape: both control points
//! sit at the horizontal midpoint between the endpoints, one at the source
//! height and one at the target height, so the curve leaves its source and
//! enters its target horizontally.

use canopy_core::geometry::Point;

/// A cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Start point.
    pub p0: Point,
    /// First control point.
    pub p1: Point,
    /// Second control point.
    pub p2: Point,
    /// End point.
    pub p3: Point,
}

impl CubicBezier {
    /// Evaluate the curve at `t` in `[0, 1]` (clamped).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x + d * self.p3.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y + d * self.p3.y,
        )
    }

    /// Sample `n + 1` evenly spaced points along the curve (including both
    /// endpoints). Hosts without native curve primitives draw the polyline.
    #[must_use]
    pub fn flatten(&self, n: usize) -> Vec<Point> {
        let n = n.max(1);
        (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }

    /// SVG path data for this segment (`M x,y C x1,y1 x2,y2 x3,y3`).
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{} C{},{} {},{} {},{}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Build the elbow connector from `source` to `target`.
#[must_use]
pub fn elbow(source: Point, target: Point) -> CubicBezier {
    let mid_x = (source.x + target.x) / 2.0;
    CubicBezier {
        p0: source,
        p1: Point::new(mid_x, source.y),
        p2: Point::new(mid_x, target.y),
        p3: target,
    }
}
