//! Projection memoization behaviour across render ticks.

use atlas_common::{Extent, FrameState, Geometry, Position};
use projection::{project_geometry, ProjectionCache};

fn region() -> Geometry {
    Geometry::polygon(vec![vec![
        Position::new(116.1, 39.7),
        Position::new(116.9, 39.8),
        Position::new(116.7, 40.3),
        Position::new(116.2, 40.1),
    ]])
}

#[test]
fn test_unchanged_frame_gives_bit_identical_coordinates() {
    let frame = FrameState::fit(Extent::new(116.0, 39.5, 117.0, 40.5), 640, 480);
    let mut cache = ProjectionCache::new();

    let first = project_geometry(&region(), &cache.get(&frame).unwrap());
    let second = project_geometry(&region(), &cache.get(&frame).unwrap());

    assert_eq!(cache.computations(), 1);
    let bits = |path: &projection::ScreenPath| -> Vec<(u32, u32)> {
        path.polygons[0].rings[0]
            .iter()
            .map(|(x, y)| (x.to_bits(), y.to_bits()))
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn test_zoom_changes_projection() {
    let mut frame = FrameState::fit(Extent::new(116.0, 39.5, 117.0, 40.5), 640, 480);
    let mut cache = ProjectionCache::new();
    let before = project_geometry(&region(), &cache.get(&frame).unwrap());

    frame.view_state.resolution /= 2.0;
    let after = project_geometry(&region(), &cache.get(&frame).unwrap());

    assert_eq!(cache.computations(), 2);
    assert_ne!(before, after);
}
