//! Minimal 2-D polygon predicates shared by the exact crop mode and
//! the area-annotation coordinate mapping.

use nalgebra::Vector2;

/// Simple polygon (no holes). The last vertex need not repeat the
/// first; the closing edge is implied.
///
/// Coordinate-system agnostic: operates on whatever 2-D pairs it is
/// given (ENU meters, ortho pixels, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector2<f64>>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2<f64>>) -> Self {
        Self { vertices }
    }

    /// Build from parallel x/y arrays, truncating to the shorter one
    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        Self {
            vertices: x
                .iter()
                .zip(y.iter())
                .map(|(&x, &y)| Vector2::new(x, y))
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Even-odd (ray-crossing) containment test.
    ///
    /// Boundary rule is half-open: each edge counts crossings for the
    /// half-open y-interval of its endpoints, so a point exactly on
    /// an edge is classified by crossing parity alone. One rule is
    /// used everywhere so crops are reproducible at polygon edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let v = &self.vertices;
        let n = v.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (v[i].x, v[i].y);
            let (xj, yj) = (v[j].x, v[j].y);

            if (yi > y) != (yj > y) {
                let x_cross = xi + (y - yi) * (xj - xi) / (yj - yi);
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Axis-aligned bounds `(min_x, min_y, max_x, max_y)`, `None`
    /// when the polygon has no vertices
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.vertices.first()?;
        let mut bounds = (first.x, first.y, first.x, first.y);

        for v in &self.vertices[1..] {
            bounds.0 = bounds.0.min(v.x);
            bounds.1 = bounds.1.min(v.y);
            bounds.2 = bounds.2.max(v.x);
            bounds.3 = bounds.3.max(v.y);
        }
        Some(bounds)
    }
}
