//! Hover, selection, mode switching and teardown against mounted layers.

use std::cell::RefCell;
use std::rc::Rc;

use atlas_common::{AtlasResult, Feature, FeatureId, FrameState, Geometry, LabelOptions, VisualizationSetting};
use interaction::{HighlightCoordinator, ParcelHandler, PointerEvent, RegionHandler, Transition};
use layers::{ChoroplethLayer, Granularity, LayerHit, LayerManager, MapLayer, Tooltip};
use renderer::{Legend, StyleOverride, Surface};
use test_utils::{grid_collection, square_frame, SampleProps};

type StyleLog = Rc<RefCell<Vec<(FeatureId, Option<StyleOverride>)>>>;

/// Records every style override write before passing it on.
struct RecordingLayer {
    inner: Box<dyn MapLayer>,
    log: StyleLog,
}

impl MapLayer for RecordingLayer {
    fn id(&self) -> &str {
        self.inner.id()
    }
    fn z_index(&self) -> i32 {
        self.inner.z_index()
    }
    fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }
    fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible)
    }
    fn opacity(&self) -> f32 {
        self.inner.opacity()
    }
    fn granularity(&self) -> Granularity {
        self.inner.granularity()
    }
    fn render(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>> {
        self.inner.render(frame)
    }
    fn surface(&self) -> Option<&Surface> {
        self.inner.surface()
    }
    fn legend(&self) -> AtlasResult<Option<Legend>> {
        self.inner.legend()
    }
    fn hit_test(&self, x: f32, y: f32) -> Option<FeatureId> {
        self.inner.hit_test(x, y)
    }
    fn feature_geometry(&self, id: &FeatureId) -> Option<Geometry> {
        self.inner.feature_geometry(id)
    }
    fn style_override(&self, id: &FeatureId) -> Option<StyleOverride> {
        self.inner.style_override(id)
    }
    fn highlight_style(&self, id: &FeatureId) -> Option<StyleOverride> {
        self.inner.highlight_style(id)
    }
    fn set_style_override(&mut self, id: &FeatureId, style: Option<StyleOverride>) -> bool {
        self.log.borrow_mut().push((id.clone(), style));
        self.inner.set_style_override(id, style)
    }
    fn has_style_overrides(&self) -> bool {
        self.inner.has_style_overrides()
    }
    fn show_tooltip(&mut self, id: &FeatureId, pointer: (f32, f32)) -> bool {
        self.inner.show_tooltip(id, pointer)
    }
    fn move_tooltip(&mut self, pointer: (f32, f32)) {
        self.inner.move_tooltip(pointer)
    }
    fn hide_tooltip(&mut self) {
        self.inner.hide_tooltip()
    }
    fn tooltip(&self) -> &Tooltip {
        self.inner.tooltip()
    }
    fn dispose(&mut self) {
        self.inner.dispose()
    }
}

/// 2x2 grid of 50-unit cells covering the 100x100 test frame.
///
/// On screen cell 0 is bottom-left, 1 bottom-right, 2 top-left, 3 top-right.
fn grid_layer(id: &str, z: i32, granularity: Granularity) -> ChoroplethLayer<SampleProps, layers::FnStrategy<SampleProps>> {
    ChoroplethLayer::construct(
        id,
        grid_collection(2, 2, 50.0, |i| Some(i as f64 * 10.0)),
        z,
        &VisualizationSetting::default(),
        |f: &Feature<SampleProps>| f.properties.value,
        |f: &Feature<SampleProps>| f.properties.name.clone(),
        |_: &Feature<SampleProps>, _: &LabelOptions| Vec::new(),
    )
    .unwrap()
    .with_granularity(granularity)
}

fn mounted() -> (LayerManager, StyleLog) {
    let log = StyleLog::default();
    let mut manager = LayerManager::new();
    manager
        .add(RecordingLayer {
            inner: Box::new(grid_layer("regions", 0, Granularity::Region)),
            log: log.clone(),
        })
        .unwrap();
    manager.render_frame(Some(&square_frame()));
    (manager, log)
}

fn hit(layer: &str, feature: i64) -> LayerHit {
    LayerHit {
        layer_id: layer.to_string(),
        feature_id: FeatureId::Code(feature),
    }
}

#[test]
fn test_hover_a_then_b_restores_a_once() {
    let (mut manager, log) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));

    let a = FeatureId::Code(0);
    let b = FeatureId::Code(1);
    let highlight_a = manager.get("regions").unwrap().highlight_style(&a).unwrap();
    let highlight_b = manager.get("regions").unwrap().highlight_style(&b).unwrap();

    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager),
        Transition::HoverEntered(hit("regions", 0))
    );
    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(30.0, 70.0), &mut manager),
        Transition::HoverMoved
    );
    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(75.0, 75.0), &mut manager),
        Transition::HoverEntered(hit("regions", 1))
    );

    assert_eq!(
        *log.borrow(),
        vec![(a.clone(), Some(highlight_a)), (a.clone(), None), (b.clone(), Some(highlight_b))]
    );
    let layer = manager.get("regions").unwrap();
    assert_eq!(layer.style_override(&a), None);
    assert_eq!(layer.style_override(&b), Some(highlight_b));
    assert!(layer.tooltip().is_visible());
    assert_eq!(layer.tooltip().html(), "region-1");
}

#[test]
fn test_hover_keeps_existing_override() {
    let (mut manager, _) = mounted();
    let a = FeatureId::Code(0);
    let custom = StyleOverride::filled(renderer::Color::rgb(1, 2, 3));
    manager.get_mut("regions").unwrap().set_style_override(&a, Some(custom));

    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));
    coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager);
    let hovered = manager.get("regions").unwrap().style_override(&a).unwrap();
    assert_eq!(hovered.fill, custom.fill);
    assert_eq!(hovered.stroke, Some((layers::HIGHLIGHT_STROKE, layers::HIGHLIGHT_STROKE_WIDTH)));

    assert_eq!(
        coordinator.dispatch(PointerEvent::leave(), &mut manager),
        Transition::HoverLeft(hit("regions", 0))
    );
    assert_eq!(manager.get("regions").unwrap().style_override(&a), Some(custom));
    assert!(!manager.get("regions").unwrap().tooltip().is_visible());
}

#[test]
fn test_move_to_empty_space_goes_idle() {
    let (mut manager, _) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));

    coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager);
    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(500.0, 500.0), &mut manager),
        Transition::HoverLeft(hit("regions", 0))
    );
    assert!(coordinator.hovered().is_none());
    assert!(!manager.get("regions").unwrap().has_style_overrides());
    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(500.0, 500.0), &mut manager),
        Transition::None
    );
}

#[test]
fn test_unmount_mid_hover_leaves_nothing_highlighted() {
    let (mut manager, log) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));

    coordinator.dispatch(PointerEvent::moved(75.0, 25.0), &mut manager);
    coordinator.dispatch(PointerEvent::click(75.0, 25.0), &mut manager);
    assert_eq!(coordinator.hovered(), Some(&hit("regions", 3)));

    coordinator.unmount("regions", &mut manager).unwrap();

    assert!(coordinator.hovered().is_none());
    assert!(coordinator.selected().is_none());
    assert!(manager.is_empty());
    let writes = log.borrow();
    assert_eq!(writes.last(), Some(&(FeatureId::Code(3), None)));
    assert!(coordinator.unmount("regions", &mut manager).is_err());
}

#[test]
fn test_feature_removed_while_hovered_is_tolerated() {
    let (mut manager, _) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));
    coordinator.dispatch(PointerEvent::moved(75.0, 25.0), &mut manager);

    // The hovered layer disappears without going through the coordinator.
    manager.remove_and_dispose("regions").unwrap();
    assert_eq!(
        coordinator.dispatch(PointerEvent::leave(), &mut manager),
        Transition::HoverLeft(hit("regions", 3))
    );
}

#[test]
fn test_mode_switch_never_has_two_listeners() {
    let (mut manager, _) = mounted();
    manager.add(grid_layer("parcels", 1, Granularity::Parcel)).unwrap();
    manager.render_frame(Some(&square_frame()));

    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));
    coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager);
    assert_eq!(coordinator.hovered(), Some(&hit("regions", 0)));

    for _ in 0..3 {
        coordinator.switch_mode(Box::new(ParcelHandler), &mut manager);
        assert_eq!(coordinator.live_listeners(), 1);
        coordinator.switch_mode(Box::new(RegionHandler), &mut manager);
        assert_eq!(coordinator.live_listeners(), 1);
    }

    coordinator.switch_mode(Box::new(ParcelHandler), &mut manager);
    assert!(coordinator.hovered().is_none());
    assert!(!manager.get("regions").unwrap().has_style_overrides());

    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager),
        Transition::HoverEntered(hit("parcels", 0))
    );
}

#[test]
fn test_click_selects_without_touching_layer_styles() {
    let (mut manager, log) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));

    assert_eq!(
        coordinator.dispatch(PointerEvent::click(25.0, 25.0), &mut manager),
        Transition::Selected(hit("regions", 2))
    );
    assert!(log.borrow().is_empty());
    assert_eq!(coordinator.selected(), Some(&hit("regions", 2)));

    // A second click moves the single selection.
    coordinator.dispatch(PointerEvent::click(75.0, 75.0), &mut manager);
    assert_eq!(coordinator.selected(), Some(&hit("regions", 1)));
    assert_eq!(
        coordinator.overlay().geometry(),
        manager.get("regions").unwrap().feature_geometry(&FeatureId::Code(1)).as_ref()
    );

    assert_eq!(
        coordinator.dispatch(PointerEvent::click(500.0, 500.0), &mut manager),
        Transition::SelectionCleared
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn test_selection_overlay_is_composed_on_top() {
    let (mut manager, _) = mounted();
    let frame = square_frame();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));
    coordinator.dispatch(PointerEvent::click(25.0, 75.0), &mut manager);

    let composed = coordinator.compose(&manager, &frame).unwrap();
    // Cell 0 spans screen x 0..50, y 50..100; its right edge is outlined.
    assert_eq!(composed.pixel(50, 75), Some(interaction::overlay::SELECTION_STROKE));
}

#[test]
fn test_teardown_restores_and_detaches() {
    let (mut manager, _) = mounted();
    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(Box::new(RegionHandler));
    coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager);
    coordinator.dispatch(PointerEvent::click(25.0, 75.0), &mut manager);

    coordinator.teardown(&mut manager);

    assert_eq!(coordinator.live_listeners(), 0);
    assert!(coordinator.hovered().is_none());
    assert!(coordinator.selected().is_none());
    assert!(!manager.get("regions").unwrap().has_style_overrides());
    assert_eq!(
        coordinator.dispatch(PointerEvent::moved(25.0, 75.0), &mut manager),
        Transition::None
    );
}
