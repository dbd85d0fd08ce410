//! Layer registry: named layers, z-order, visibility and per-tick rendering.

use atlas_common::{AtlasError, AtlasResult, FeatureId, FrameState, Geometry};
use renderer::{Legend, StyleOverride, Surface};
use tracing::{debug, warn};

use crate::tooltip::Tooltip;

/// Pointer granularity a layer responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Coarse administrative regions.
    Region,
    /// Fine-grained parcels.
    Parcel,
}

/// Object-safe view of a layer so heterogeneous statistics share one manager.
pub trait MapLayer {
    fn id(&self) -> &str;
    fn z_index(&self) -> i32;
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn opacity(&self) -> f32;
    fn granularity(&self) -> Granularity;

    fn render(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>>;
    fn surface(&self) -> Option<&Surface>;
    fn legend(&self) -> AtlasResult<Option<Legend>>;

    fn hit_test(&self, x: f32, y: f32) -> Option<FeatureId>;
    fn feature_geometry(&self, id: &FeatureId) -> Option<Geometry>;

    fn style_override(&self, id: &FeatureId) -> Option<StyleOverride>;
    fn highlight_style(&self, id: &FeatureId) -> Option<StyleOverride>;
    fn set_style_override(&mut self, id: &FeatureId, style: Option<StyleOverride>) -> bool;
    fn has_style_overrides(&self) -> bool;

    fn show_tooltip(&mut self, id: &FeatureId, pointer: (f32, f32)) -> bool;
    fn move_tooltip(&mut self, pointer: (f32, f32));
    fn hide_tooltip(&mut self);
    fn tooltip(&self) -> &Tooltip;

    fn dispose(&mut self);
}

impl std::fmt::Debug for dyn MapLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MapLayer").field(&self.id()).finish()
    }
}

/// A hit on a feature of a specific layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerHit {
    pub layer_id: String,
    pub feature_id: FeatureId,
}

/// Owns the mounted layers, kept sorted by z-index (insertion order on ties).
#[derive(Default)]
pub struct LayerManager {
    layers: Vec<Box<dyn MapLayer>>,
}

impl std::fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.layers.iter().map(|l| l.id())).finish()
    }
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<L: MapLayer + 'static>(&mut self, layer: L) -> AtlasResult<()> {
        self.add_boxed(Box::new(layer))
    }

    pub fn add_boxed(&mut self, layer: Box<dyn MapLayer>) -> AtlasResult<()> {
        if self.contains(layer.id()) {
            return Err(AtlasError::DuplicateLayer(layer.id().to_string()));
        }
        let z = layer.z_index();
        let pos = self.layers.partition_point(|l| l.z_index() <= z);
        debug!(layer = layer.id(), z_index = z, "layer added");
        self.layers.insert(pos, layer);
        Ok(())
    }

    /// Unregister a layer and hand it back, undisposed.
    pub fn remove(&mut self, id: &str) -> AtlasResult<Box<dyn MapLayer>> {
        let pos = self
            .layers
            .iter()
            .position(|l| l.id() == id)
            .ok_or_else(|| AtlasError::LayerNotFound(id.to_string()))?;
        debug!(layer = id, "layer removed");
        Ok(self.layers.remove(pos))
    }

    /// Unregister and dispose a layer.
    pub fn remove_and_dispose(&mut self, id: &str) -> AtlasResult<()> {
        let mut layer = self.remove(id)?;
        layer.dispose();
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn MapLayer> {
        self.layers.iter().find(|l| l.id() == id).map(|l| l.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut dyn MapLayer> {
        match self.layers.iter_mut().find(|l| l.id() == id) {
            Some(layer) => Some(layer.as_mut()),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer ids bottom to top.
    pub fn ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id()).collect()
    }

    /// Layers bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &dyn MapLayer> {
        self.layers.iter().map(|l| l.as_ref())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> AtlasResult<()> {
        let layer = self
            .get_mut(id)
            .ok_or_else(|| AtlasError::LayerNotFound(id.to_string()))?;
        layer.set_visible(visible);
        Ok(())
    }

    /// Render every layer for one tick. A failing layer is logged and
    /// skipped; returns how many layers produced output.
    pub fn render_frame(&mut self, frame: Option<&FrameState>) -> usize {
        let mut rendered = 0;
        for layer in &mut self.layers {
            match layer.render(frame).map(|s| s.is_some()) {
                Ok(true) => rendered += 1,
                Ok(false) => {}
                Err(e) => warn!(layer = layer.id(), error = %e, "layer render failed"),
            }
        }
        rendered
    }

    /// Flatten the visible layers' last output into one surface, bottom to
    /// top, each at its own opacity.
    pub fn compose(&self, frame: &FrameState) -> AtlasResult<Surface> {
        let mut target = Surface::new(frame.width(), frame.height())?;
        for layer in self.layers.iter().filter(|l| l.is_visible()) {
            if let Some(surface) = layer.surface() {
                target.draw_surface(surface, layer.opacity());
            }
        }
        Ok(target)
    }

    /// Topmost visible feature under a screen point, optionally restricted
    /// to layers of one granularity.
    pub fn hit_test_topmost(&self, x: f32, y: f32, granularity: Option<Granularity>) -> Option<LayerHit> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.is_visible())
            .filter(|l| granularity.map_or(true, |g| l.granularity() == g))
            .find_map(|l| {
                l.hit_test(x, y).map(|feature_id| LayerHit {
                    layer_id: l.id().to_string(),
                    feature_id,
                })
            })
    }
}
