//! Layer manager ordering, composition and hit testing.

use atlas_common::{AtlasError, Feature, FeatureCollection, FeatureId, LabelOptions, VisualizationSetting};
use layers::{ChoroplethLayer, FnStrategy, Granularity, LayerHit, LayerManager, MapLayer};
use test_utils::{assert_approx_eq, cell_center, grid_collection, pivot_setting, square_frame, SampleProps};

fn layer(id: &str, z: i32, collection: FeatureCollection<SampleProps>, opacity: f32) -> ChoroplethLayer<SampleProps, FnStrategy<SampleProps>> {
    let setting = VisualizationSetting {
        opacity,
        ..pivot_setting(&[0.0, 50.0, 100.0])
    };
    ChoroplethLayer::construct(
        id,
        collection,
        z,
        &setting,
        |f: &Feature<SampleProps>| f.properties.value,
        |f: &Feature<SampleProps>| f.properties.name.clone(),
        |_: &Feature<SampleProps>, _: &LabelOptions| Vec::new(),
    )
    .unwrap()
}

fn full_cover(value: f64) -> FeatureCollection<SampleProps> {
    grid_collection(1, 1, 100.0, move |_| Some(value))
}

#[test]
fn test_layers_sorted_by_z_index() {
    let mut manager = LayerManager::new();
    manager.add(layer("top", 10, full_cover(1.0), 1.0)).unwrap();
    manager.add(layer("bottom", -1, full_cover(1.0), 1.0)).unwrap();
    manager.add(layer("middle", 5, full_cover(1.0), 1.0)).unwrap();
    manager.add(layer("middle-2", 5, full_cover(1.0), 1.0)).unwrap();

    assert_eq!(manager.ids(), vec!["bottom", "middle", "middle-2", "top"]);
}

#[test]
fn test_duplicate_layer_id_rejected() {
    let mut manager = LayerManager::new();
    manager.add(layer("aging", 0, full_cover(1.0), 1.0)).unwrap();
    let err = manager.add(layer("aging", 1, full_cover(2.0), 1.0)).unwrap_err();
    assert!(matches!(err, AtlasError::DuplicateLayer(id) if id == "aging"));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_remove_unknown_layer() {
    let mut manager = LayerManager::new();
    assert!(matches!(manager.remove("ghost"), Err(AtlasError::LayerNotFound(_))));
    assert!(manager.set_visible("ghost", false).is_err());
}

#[test]
fn test_render_frame_counts_drawn_layers() {
    let mut manager = LayerManager::new();
    manager.add(layer("a", 0, full_cover(1.0), 1.0)).unwrap();
    manager.add(layer("b", 1, full_cover(1.0), 1.0)).unwrap();
    manager.add(layer("empty", 2, FeatureCollection::new(Vec::new()), 1.0)).unwrap();
    manager.set_visible("b", false).unwrap();

    assert_eq!(manager.render_frame(Some(&square_frame())), 1);
    assert_eq!(manager.render_frame(None), 0);
}

#[test]
fn test_compose_applies_layer_opacity() {
    let frame = square_frame();
    let mut manager = LayerManager::new();
    manager.add(layer("half", 0, full_cover(10.0), 0.5)).unwrap();
    manager.render_frame(Some(&frame));

    let composed = manager.compose(&frame).unwrap();
    let alpha = composed.pixel(50, 50).unwrap().a;
    assert_approx_eq!(alpha, 127.5, 2.0);
}

#[test]
fn test_compose_stacks_upper_layer_on_top() {
    let frame = square_frame();
    let mut manager = LayerManager::new();
    manager.add(layer("low", 0, full_cover(10.0), 1.0)).unwrap();
    manager.add(layer("high", 1, full_cover(90.0), 1.0)).unwrap();
    manager.render_frame(Some(&frame));

    let high_color = manager.get("high").unwrap().surface().unwrap().pixel(50, 50);
    let composed = manager.compose(&frame).unwrap();
    assert_eq!(composed.pixel(50, 50), high_color);

    manager.set_visible("high", false).unwrap();
    let low_color = manager.get("low").unwrap().surface().unwrap().pixel(50, 50);
    assert_eq!(manager.compose(&frame).unwrap().pixel(50, 50), low_color);
}

#[test]
fn test_topmost_hit_wins() {
    let frame = square_frame();
    let mut manager = LayerManager::new();
    manager.add(layer("regions", 0, full_cover(10.0), 1.0)).unwrap();
    manager
        .add(layer("parcels", 1, grid_collection(2, 2, 50.0, |i| Some(i as f64)), 1.0).with_granularity(Granularity::Parcel))
        .unwrap();
    manager.render_frame(Some(&frame));

    // Map y grows upwards; parcel 2 is the top-left cell on screen.
    let (x, y) = cell_center(2, 2, 50.0);
    let (sx, sy) = (x as f32, 100.0 - y as f32);
    assert_eq!(
        manager.hit_test_topmost(sx, sy, None),
        Some(LayerHit {
            layer_id: "parcels".to_string(),
            feature_id: FeatureId::Code(2),
        })
    );
    assert_eq!(
        manager.hit_test_topmost(25.0, 75.0, None),
        Some(LayerHit {
            layer_id: "parcels".to_string(),
            feature_id: FeatureId::Code(0),
        })
    );
    assert_eq!(
        manager.hit_test_topmost(25.0, 75.0, Some(Granularity::Region)).map(|h| h.layer_id),
        Some("regions".to_string())
    );
    assert_eq!(manager.hit_test_topmost(500.0, 500.0, None), None);
}

#[test]
fn test_remove_and_dispose() {
    let mut manager = LayerManager::new();
    manager.add(layer("a", 0, full_cover(1.0), 1.0)).unwrap();
    manager.render_frame(Some(&square_frame()));

    let mut removed = manager.remove("a").unwrap();
    assert!(removed.surface().is_some());
    removed.dispose();
    assert!(removed.surface().is_none());
    assert!(!removed.is_visible());

    manager.add(layer("b", 0, full_cover(1.0), 1.0)).unwrap();
    manager.remove_and_dispose("b").unwrap();
    assert!(manager.is_empty());
}

#[test]
fn test_legend_through_trait_object() {
    let mut manager = LayerManager::new();
    manager.add(layer("a", 0, full_cover(1.0), 1.0)).unwrap();
    let legend = manager.get("a").unwrap().legend().unwrap().unwrap();
    assert_eq!(legend.len(), 2);
    assert_eq!(legend.entries[0].lower, 50.0);
}
