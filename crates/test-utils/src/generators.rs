//! Synthetic region collections.
//!
//! These generators create predictable, verifiable layouts: square cells on
//! a regular grid, so a screen point can be mapped back to the region that
//! should be hit.

use atlas_common::{Feature, FeatureCollection, FeatureId, Geometry, Position, Ring};

use crate::fixtures::SampleProps;

/// Closed square ring with its lower-left corner at `(x, y)`.
pub fn square_ring(x: f64, y: f64, size: f64) -> Ring {
    vec![
        Position::new(x, y),
        Position::new(x + size, y),
        Position::new(x + size, y + size),
        Position::new(x, y + size),
        Position::new(x, y),
    ]
}

/// Square polygon geometry.
pub fn square(x: f64, y: f64, size: f64) -> Geometry {
    Geometry::polygon(vec![square_ring(x, y, size)])
}

/// Square with a centered square hole of `hole` size.
pub fn square_with_hole(x: f64, y: f64, size: f64, hole: f64) -> Geometry {
    let offset = (size - hole) / 2.0;
    Geometry::polygon(vec![
        square_ring(x, y, size),
        square_ring(x + offset, y + offset, hole),
    ])
}

/// `cols x rows` square cells of `cell` map units, starting at the origin.
///
/// Cell `(col, row)` gets id `row * cols + col` and the value returned by
/// `value(index)`.
pub fn grid_collection<F>(cols: usize, rows: usize, cell: f64, value: F) -> FeatureCollection<SampleProps>
where
    F: Fn(usize) -> Option<f64>,
{
    let mut features = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            features.push(Feature::new(
                FeatureId::Code(index as i64),
                square(col as f64 * cell, row as f64 * cell, cell),
                SampleProps::new(format!("region-{}", index), value(index)),
            ));
        }
    }
    FeatureCollection::new(features)
}

/// A row of `values.len()` square cells of 10 map units.
pub fn row_collection(values: &[Option<f64>]) -> FeatureCollection<SampleProps> {
    grid_collection(values.len(), 1, 10.0, |i| values[i])
}

/// Map-unit center of grid cell `index` in a [`grid_collection`].
pub fn cell_center(index: usize, cols: usize, cell: f64) -> (f64, f64) {
    let col = index % cols;
    let row = index / cols;
    ((col as f64 + 0.5) * cell, (row as f64 + 0.5) * cell)
}
