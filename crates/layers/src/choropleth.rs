//! Generic choropleth layer.
//!
//! Paints a feature collection on top of the viewport: reprojects every
//! region for the current frame, fills it via the statistic's coloring and
//! optionally labels it at its centroid. The projection, the screen paths,
//! the fills and the rank index are memoized by the version stamps of their
//! inputs, so unrelated re-renders never recompute geometry or color.

use std::collections::HashMap;
use std::sync::Arc;

use atlas_common::{
    AtlasError, AtlasResult, Feature, FeatureCollection, FeatureId, FrameKey, FrameState, Geometry,
    LabelOptions, VisualizationSetting, Versioned,
};
use projection::{project_geometry, ProjectionCache, ScreenPath};
use renderer::scale::{collect_values, create_color_scale};
use renderer::{
    rank_color, Color, FeatureStyle, LabelPainter, Legend, RankIndex, StyleOverride, Surface, TextLabel,
    NO_DATA_FILL,
};
use tracing::{debug, trace, warn};

use crate::manager::{Granularity, MapLayer};
use crate::strategy::{Coloring, FnStrategy, StatisticStrategy};
use crate::tooltip::Tooltip;

/// Outline width added while a region is highlighted.
pub const HIGHLIGHT_STROKE_WIDTH: f32 = 3.0;
/// Outline color while a region is highlighted.
pub const HIGHLIGHT_STROKE: Color = Color::rgb(51, 51, 51);

/// Recompute counters, exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub projections: u64,
    pub path_builds: u64,
    pub fill_builds: u64,
    pub rank_builds: u64,
    pub surface_allocations: u64,
}

#[derive(Debug)]
struct PathCache {
    features_version: u64,
    frame: FrameKey,
    paths: Vec<ScreenPath>,
}

#[derive(Debug)]
struct FillCache {
    features_version: u64,
    setting_version: u64,
    sort_version: u64,
    values: Vec<Option<f64>>,
    fills: Vec<Color>,
}

#[derive(Debug)]
struct RankCache {
    features_version: u64,
    sort_version: u64,
    index: RankIndex,
}

/// A choropleth overlay for one statistic.
pub struct ChoroplethLayer<P, S> {
    id: String,
    z_index: i32,
    visible: bool,
    disposed: bool,
    granularity: Granularity,
    features: Versioned<FeatureCollection<P>>,
    /// Position of every feature id in `features`.
    positions: HashMap<FeatureId, usize>,
    setting: Versioned<VisualizationSetting>,
    strategy: S,
    labels: Option<Arc<LabelPainter>>,
    projection: ProjectionCache,
    paths: Option<PathCache>,
    fills: Option<FillCache>,
    ranks: Option<RankCache>,
    overrides: HashMap<FeatureId, StyleOverride>,
    tooltip: Tooltip,
    surface: Option<Surface>,
    stats: CacheStats,
}

impl<P, S> std::fmt::Debug for ChoroplethLayer<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChoroplethLayer")
            .field("id", &self.id)
            .field("z_index", &self.z_index)
            .field("visible", &self.visible)
            .field("features", &self.features.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<P> ChoroplethLayer<P, FnStrategy<P>> {
    /// Build a layer from closures: value accessor, tooltip renderer and
    /// label renderer.
    pub fn construct(
        id: impl Into<String>,
        collection: FeatureCollection<P>,
        z_index: i32,
        setting: &VisualizationSetting,
        value_accessor: impl Fn(&Feature<P>) -> Option<f64> + 'static,
        tooltip_renderer: impl Fn(&Feature<P>) -> String + 'static,
        label_renderer: impl Fn(&Feature<P>, &LabelOptions) -> Vec<String> + 'static,
    ) -> AtlasResult<Self> {
        let id = id.into();
        let strategy = FnStrategy::new(id.clone(), value_accessor, tooltip_renderer, label_renderer);
        Self::new(id, collection, z_index, setting, strategy)
    }
}

impl<P, S: StatisticStrategy<P>> ChoroplethLayer<P, S> {
    /// Create a layer. Fails if the collection has duplicate ids or the
    /// setting is invalid.
    pub fn new(
        id: impl Into<String>,
        collection: FeatureCollection<P>,
        z_index: i32,
        setting: &VisualizationSetting,
        strategy: S,
    ) -> AtlasResult<Self> {
        let id = id.into();
        collection
            .validate()
            .and_then(|_| setting.validate())
            .map_err(|e| AtlasError::Construction(format!("layer '{}': {}", id, e)))?;

        debug!(layer = %id, features = collection.len(), statistic = strategy.name(), "layer created");
        Ok(Self {
            id,
            z_index,
            visible: true,
            disposed: false,
            granularity: Granularity::Region,
            positions: index_positions(&collection),
            features: Versioned::new(collection),
            setting: Versioned::new(setting.clone()),
            strategy,
            labels: None,
            projection: ProjectionCache::new(),
            paths: None,
            fills: None,
            ranks: None,
            overrides: HashMap::new(),
            tooltip: Tooltip::new(),
            surface: None,
            stats: CacheStats::default(),
        })
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_label_painter(mut self, painter: Arc<LabelPainter>) -> Self {
        self.labels = Some(painter);
        self
    }

    pub fn features(&self) -> &FeatureCollection<P> {
        &self.features
    }

    pub fn setting(&self) -> &VisualizationSetting {
        &self.setting
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Mutable access for strategies with switchable metrics. Changes are
    /// picked up through `sort_key_version`.
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Swap the data. The legend configuration is untouched; the next
    /// render recomputes paths and fills.
    pub fn update_features(&mut self, collection: FeatureCollection<P>) -> AtlasResult<()> {
        collection.validate()?;
        self.update_shared_features(Versioned::new(collection));
        Ok(())
    }

    /// Swap in a snapshot that may be shared with other layers.
    pub fn update_shared_features(&mut self, collection: Versioned<FeatureCollection<P>>) {
        self.positions = index_positions(&*collection);
        self.features = collection;
        let positions = &self.positions;
        self.overrides.retain(|id, _| positions.contains_key(id));
        debug!(layer = %self.id, features = self.features.len(), "features updated");
    }

    /// Store a copy of `setting`; later changes to the caller's value are
    /// not observed.
    pub fn update_visualization_setting(&mut self, setting: &VisualizationSetting) -> AtlasResult<()> {
        setting.validate()?;
        self.setting = Versioned::new(setting.clone());
        debug!(layer = %self.id, "visualization setting updated");
        Ok(())
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            projections: self.projection.computations(),
            ..self.stats
        }
    }

    /// Raw values per feature, in collection order.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.features
            .iter()
            .map(|f| self.strategy.value(f).filter(|v| v.is_finite()))
            .collect()
    }

    /// Legend for scale-colored statistics; `None` for rank coloring.
    pub fn legend(&self) -> AtlasResult<Option<Legend>> {
        match self.strategy.coloring() {
            Coloring::Scale => {
                let values = collect_values(self.values());
                Legend::build(&values, &self.setting).map(Some)
            }
            Coloring::Rank { .. } => Ok(None),
        }
    }

    /// Rank of a feature under rank coloring.
    pub fn rank_of(&mut self, id: &FeatureId) -> Option<usize> {
        self.ensure_rank_index();
        self.ranks.as_ref()?.index.rank(id)
    }

    /// Fill the feature gets before any style override.
    pub fn fill_of(&mut self, id: &FeatureId) -> AtlasResult<Option<Color>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        self.ensure_fills()?;
        Ok(self.fills.as_ref().and_then(|c| c.fills.get(index).copied()))
    }

    /// Draw the layer for `frame`.
    ///
    /// Returns `None`, after clearing earlier output, when there is nothing
    /// to draw: no or empty frame, hidden or disposed layer, or no features.
    pub fn render(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>> {
        let frame = match frame {
            Some(frame) if frame.is_renderable() && self.visible && !self.disposed && !self.features.is_empty() => {
                frame
            }
            _ => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.clear();
                }
                trace!(layer = %self.id, "render skipped");
                return Ok(None);
            }
        };

        self.ensure_paths(frame)?;
        self.ensure_fills()?;

        let (width, height) = (frame.width(), frame.height());
        match self.surface.as_mut() {
            Some(surface) => {
                if surface.ensure_size(width, height)? {
                    self.stats.surface_allocations += 1;
                }
                surface.clear();
            }
            None => {
                self.surface = Some(Surface::new(width, height)?);
                self.stats.surface_allocations += 1;
            }
        }

        let (Some(surface), Some(paths), Some(fills)) =
            (self.surface.as_mut(), self.paths.as_ref(), self.fills.as_ref())
        else {
            return Err(AtlasError::Render(format!("layer '{}' caches missing", self.id)));
        };

        let mut drawn = 0usize;
        for ((feature, path), fill) in self.features.iter().zip(&paths.paths).zip(&fills.fills) {
            let visible = path
                .bounds()
                .is_some_and(|b| b.intersects_viewport(width as f32, height as f32));
            if !visible {
                continue;
            }
            let base = FeatureStyle::filled(*fill);
            let style = self.overrides.get(&feature.id).map_or(base, |o| o.apply(base));
            surface.draw_path(path, &style);
            drawn += 1;
        }

        let label_options = self.setting.label_options;
        if label_options.any() {
            if let Some(painter) = self.labels.as_ref().filter(|p| p.has_font()) {
                let labels: Vec<TextLabel> = self
                    .features
                    .iter()
                    .zip(&paths.paths)
                    .filter_map(|(feature, path)| {
                        let anchor = path.centroid()?;
                        let lines = self.strategy.labels(feature, &label_options);
                        (!lines.is_empty()).then(|| TextLabel::centered(anchor, lines))
                    })
                    .collect();
                painter.draw(surface, &labels);
            }
        }

        trace!(layer = %self.id, drawn, "layer rendered");
        Ok(self.surface.as_ref())
    }

    /// Topmost feature under a screen point of the last rendered frame.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<FeatureId> {
        if !self.visible || self.disposed {
            return None;
        }
        let paths = self.paths.as_ref()?;
        if paths.features_version != self.features.version() {
            return None;
        }
        // Later features are drawn on top.
        self.features
            .iter()
            .zip(&paths.paths)
            .rev()
            .find(|(_, path)| path.bounds().is_some_and(|b| b.contains(x, y)) && path.contains(x, y))
            .map(|(feature, _)| feature.id.clone())
    }

    /// Style a feature is painted with for the current data and setting,
    /// override included.
    pub fn effective_style(&mut self, id: &FeatureId) -> AtlasResult<Option<FeatureStyle>> {
        let Some(fill) = self.fill_of(id)? else {
            return Ok(None);
        };
        let base = FeatureStyle::filled(fill);
        Ok(Some(self.overrides.get(id).map_or(base, |o| o.apply(base))))
    }

    /// Thick dark outline over whatever the feature currently shows. The
    /// fill is left to the coloring, so the highlight follows setting and
    /// data changes.
    pub fn highlight_style(&self, id: &FeatureId) -> Option<StyleOverride> {
        self.position(id)?;
        let current = self.overrides.get(id).copied().unwrap_or_default();
        Some(current.with_outline(HIGHLIGHT_STROKE, HIGHLIGHT_STROKE_WIDTH))
    }

    pub fn style_override(&self, id: &FeatureId) -> Option<StyleOverride> {
        self.overrides.get(id).copied()
    }

    /// Set or clear the style override of one feature. Returns `false` if
    /// the feature is not in the current collection.
    pub fn set_style_override(&mut self, id: &FeatureId, style: Option<StyleOverride>) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        match style {
            Some(style) => {
                self.overrides.insert(id.clone(), style);
            }
            None => {
                self.overrides.remove(id);
            }
        }
        true
    }

    pub fn has_style_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    pub fn feature_geometry(&self, id: &FeatureId) -> Option<&Geometry> {
        self.feature(id).map(|f| &f.geometry)
    }

    /// Show the tooltip for a feature at the pointer.
    pub fn show_tooltip(&mut self, id: &FeatureId, pointer: (f32, f32)) -> bool {
        let Some(feature) = self.feature(id) else {
            return false;
        };
        let html = self.strategy.tooltip_html(feature);
        self.tooltip.show(html, pointer);
        true
    }

    pub fn move_tooltip(&mut self, pointer: (f32, f32)) {
        self.tooltip.move_to(pointer);
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip.hide();
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the surface, tooltip, overrides and caches.
    pub fn dispose(&mut self) {
        self.surface = None;
        self.tooltip.reset();
        self.overrides.clear();
        self.paths = None;
        self.fills = None;
        self.ranks = None;
        self.projection.invalidate();
        self.disposed = true;
        debug!(layer = %self.id, "layer disposed");
    }

    fn position(&self, id: &FeatureId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn feature(&self, id: &FeatureId) -> Option<&Feature<P>> {
        self.features.features.get(self.position(id)?)
    }

    fn ensure_paths(&mut self, frame: &FrameState) -> AtlasResult<()> {
        let projection = self
            .projection
            .get(frame)
            .map_err(|e| AtlasError::Render(e.to_string()))?;

        let key = frame.key();
        let version = self.features.version();
        if let Some(cache) = &self.paths {
            if cache.features_version == version && cache.frame == key {
                return Ok(());
            }
        }

        let paths = self
            .features
            .iter()
            .map(|f| project_geometry(&f.geometry, &projection))
            .collect();
        self.paths = Some(PathCache {
            features_version: version,
            frame: key,
            paths,
        });
        self.stats.path_builds += 1;
        trace!(layer = %self.id, "screen paths rebuilt");
        Ok(())
    }

    fn ensure_rank_index(&mut self) {
        let version = self.features.version();
        let sort_version = self.strategy.sort_key_version();
        if let Some(cache) = &self.ranks {
            if cache.features_version == version && cache.sort_version == sort_version {
                return;
            }
        }

        let values = self.values();
        let index = RankIndex::build(self.features.iter().map(|f| &f.id).zip(values));
        self.ranks = Some(RankCache {
            features_version: version,
            sort_version,
            index,
        });
        self.stats.rank_builds += 1;
        debug!(layer = %self.id, "rank index rebuilt");
    }

    fn ensure_fills(&mut self) -> AtlasResult<()> {
        let features_version = self.features.version();
        let setting_version = self.setting.version();
        let sort_version = self.strategy.sort_key_version();
        if let Some(cache) = &self.fills {
            if cache.features_version == features_version
                && cache.setting_version == setting_version
                && cache.sort_version == sort_version
            {
                return Ok(());
            }
        }

        let values = self.values();
        let fills = match self.strategy.coloring() {
            Coloring::Scale => {
                let scale = create_color_scale(&collect_values(values.iter().copied()), &self.setting)?;
                values
                    .iter()
                    .map(|v| v.map_or(NO_DATA_FILL, |v| scale.color(v)))
                    .collect()
            }
            Coloring::Rank { palette, policy } => {
                self.ensure_rank_index();
                let index = match &self.ranks {
                    Some(cache) => &cache.index,
                    None => return Err(AtlasError::Render("rank index missing".to_string())),
                };
                if index.is_empty() {
                    warn!(layer = %self.id, "no region has a value, everything renders as no data");
                }
                self.features
                    .iter()
                    .map(|f| {
                        index
                            .rank(&f.id)
                            .and_then(|r| rank_color(r, index.valid_count(), palette, &policy))
                            .unwrap_or(NO_DATA_FILL)
                    })
                    .collect()
            }
        };

        self.fills = Some(FillCache {
            features_version,
            setting_version,
            sort_version,
            values,
            fills,
        });
        self.stats.fill_builds += 1;
        debug!(layer = %self.id, "fills recomputed");
        Ok(())
    }

    /// Values used for the current fills, if computed.
    pub fn cached_values(&self) -> Option<&[Option<f64>]> {
        self.fills.as_ref().map(|c| c.values.as_slice())
    }
}

fn index_positions<P>(collection: &FeatureCollection<P>) -> HashMap<FeatureId, usize> {
    collection
        .iter()
        .enumerate()
        .map(|(index, feature)| (feature.id.clone(), index))
        .collect()
}

impl<P: 'static, S: StatisticStrategy<P> + 'static> MapLayer for ChoroplethLayer<P, S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn is_visible(&self) -> bool {
        self.visible && !self.disposed
    }

    fn set_visible(&mut self, visible: bool) {
        ChoroplethLayer::set_visible(self, visible);
    }

    fn opacity(&self) -> f32 {
        self.setting.opacity
    }

    fn granularity(&self) -> Granularity {
        self.granularity
    }

    fn render(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>> {
        ChoroplethLayer::render(self, frame)
    }

    fn surface(&self) -> Option<&Surface> {
        ChoroplethLayer::surface(self)
    }

    fn legend(&self) -> AtlasResult<Option<Legend>> {
        ChoroplethLayer::legend(self)
    }

    fn hit_test(&self, x: f32, y: f32) -> Option<FeatureId> {
        ChoroplethLayer::hit_test(self, x, y)
    }

    fn feature_geometry(&self, id: &FeatureId) -> Option<Geometry> {
        ChoroplethLayer::feature_geometry(self, id).cloned()
    }

    fn style_override(&self, id: &FeatureId) -> Option<StyleOverride> {
        ChoroplethLayer::style_override(self, id)
    }

    fn highlight_style(&self, id: &FeatureId) -> Option<StyleOverride> {
        ChoroplethLayer::highlight_style(self, id)
    }

    fn set_style_override(&mut self, id: &FeatureId, style: Option<StyleOverride>) -> bool {
        ChoroplethLayer::set_style_override(self, id, style)
    }

    fn has_style_overrides(&self) -> bool {
        ChoroplethLayer::has_style_overrides(self)
    }

    fn show_tooltip(&mut self, id: &FeatureId, pointer: (f32, f32)) -> bool {
        ChoroplethLayer::show_tooltip(self, id, pointer)
    }

    fn move_tooltip(&mut self, pointer: (f32, f32)) {
        ChoroplethLayer::move_tooltip(self, pointer)
    }

    fn hide_tooltip(&mut self) {
        ChoroplethLayer::hide_tooltip(self)
    }

    fn tooltip(&self) -> &Tooltip {
        ChoroplethLayer::tooltip(self)
    }

    fn dispose(&mut self) {
        ChoroplethLayer::dispose(self)
    }
}
