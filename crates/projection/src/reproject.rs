//! Reprojection of region geometry into screen-space paths.

use atlas_common::{Geometry, Ring};

use crate::ScreenProjection;

/// One polygon in screen pixels. Ring 0 is the outer ring, the rest are holes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenPolygon {
    pub rings: Vec<Vec<(f32, f32)>>,
}

/// A feature's geometry projected for the current frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenPath {
    pub polygons: Vec<ScreenPolygon>,
}

/// Pixel-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ScreenBounds {
    pub fn intersects_viewport(&self, width: f32, height: f32) -> bool {
        self.max_x >= 0.0 && self.min_x <= width && self.max_y >= 0.0 && self.min_y <= height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Project every ring of `geometry`. Rings with fewer than three points are dropped.
pub fn project_geometry(geometry: &Geometry, projection: &ScreenProjection) -> ScreenPath {
    let polygons = geometry
        .polygons()
        .filter_map(|rings| project_polygon(rings, projection))
        .collect();
    ScreenPath { polygons }
}

fn project_polygon(rings: &[Ring], projection: &ScreenProjection) -> Option<ScreenPolygon> {
    let outer = rings.first()?;
    if outer.len() < 3 {
        return None;
    }

    let rings = rings
        .iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| ring.iter().map(|p| projection.project(p.x, p.y)).collect())
        .collect();
    Some(ScreenPolygon { rings })
}

impl ScreenPath {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn bounds(&self) -> Option<ScreenBounds> {
        let mut points = self
            .polygons
            .iter()
            .flat_map(|p| p.rings.first())
            .flatten();
        let &(x0, y0) = points.next()?;
        let mut b = ScreenBounds {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for &(x, y) in points {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Even-odd point-in-polygon test, so holes are excluded.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.polygons.iter().any(|polygon| {
            let mut inside = false;
            for ring in &polygon.rings {
                if ring_crossings(ring, x, y) {
                    inside = !inside;
                }
            }
            inside
        })
    }

    /// Area-weighted centroid of the outer rings.
    ///
    /// Falls back to the vertex average for degenerate (zero-area) shapes.
    pub fn centroid(&self) -> Option<(f32, f32)> {
        let mut area_sum = 0.0f64;
        let mut cx = 0.0f64;
        let mut cy = 0.0f64;

        for polygon in &self.polygons {
            let Some(ring) = polygon.rings.first() else {
                continue;
            };
            let n = ring.len();
            for i in 0..n {
                let (x0, y0) = ring[i];
                let (x1, y1) = ring[(i + 1) % n];
                let cross = x0 as f64 * y1 as f64 - x1 as f64 * y0 as f64;
                area_sum += cross;
                cx += (x0 as f64 + x1 as f64) * cross;
                cy += (y0 as f64 + y1 as f64) * cross;
            }
        }

        if area_sum.abs() > f64::EPSILON {
            let factor = 1.0 / (3.0 * area_sum);
            return Some(((cx * factor) as f32, (cy * factor) as f32));
        }

        let mut count = 0usize;
        let (mut sx, mut sy) = (0.0f64, 0.0f64);
        for &(x, y) in self.polygons.iter().flat_map(|p| p.rings.first()).flatten() {
            sx += x as f64;
            sy += y as f64;
            count += 1;
        }
        (count > 0).then(|| ((sx / count as f64) as f32, (sy / count as f64) as f32))
    }
}

/// True if a ray from (x, y) to +inf crosses the ring an odd number of times.
fn ring_crossings(ring: &[(f32, f32)], x: f32, y: f32) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
