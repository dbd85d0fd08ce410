//! Painting projected regions and encoding the result.

use atlas_common::FrameState;
use projection::{project_geometry, ScreenProjection};
use renderer::png::{encode_rgba, encode_surface};
use renderer::{Color, FeatureStyle, Surface};
use test_utils::{extent, square, square_with_hole, unit_frame};

fn projection() -> ScreenProjection {
    let frame: FrameState = unit_frame(extent::UNIT_SQUARE_100);
    ScreenProjection::from_frame(&frame).unwrap()
}

#[test]
fn test_projected_square_is_filled() {
    let mut surface = Surface::new(100, 100).unwrap();
    let path = project_geometry(&square(10.0, 10.0, 30.0), &projection());
    let fill = Color::rgb(49, 163, 84);
    surface.draw_path(&path, &FeatureStyle::filled(fill).with_stroke(Color::transparent(), 0.0));

    // Map (25, 25) lands at screen (25, 75).
    assert_eq!(surface.pixel(25, 75), Some(fill));
    assert_eq!(surface.pixel(75, 25).map(|c| c.a), Some(0));
}

#[test]
fn test_hole_stays_transparent_after_encoding() {
    let mut surface = Surface::new(100, 100).unwrap();
    let path = project_geometry(&square_with_hole(0.0, 0.0, 100.0, 40.0), &projection());
    surface.draw_path(&path, &FeatureStyle::filled(Color::rgb(200, 10, 10)));

    let png = encode_surface(&surface).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (100, 100));
    assert_eq!(decoded.get_pixel(50, 50).0[3], 0);
    assert_eq!(decoded.get_pixel(10, 10).0, [200, 10, 10, 255]);
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let (w, h) = (64u32, 64u32);
    let pixels: Vec<u8> = (0..w * h).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255]).collect();
    let png = encode_rgba(&pixels, w, h).unwrap();
    // IHDR color type 6 = truecolor with alpha.
    assert_eq!(png[25], 6);

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_png_file_round_trip() {
    let mut surface = Surface::new(8, 8).unwrap();
    surface.fill_rect(0.0, 0.0, 8.0, 8.0, Color::rgb(1, 2, 3));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.png");
    std::fs::write(&path, encode_surface(&surface).unwrap()).unwrap();

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(4, 4).0, [1, 2, 3, 255]);
}
