//! The shared selection overlay drawn above every layer.

use atlas_common::{AtlasError, AtlasResult, FrameState, Geometry};
use layers::LayerHit;
use projection::{project_geometry, ProjectionCache};
use renderer::{Color, FeatureStyle, Surface};
use tracing::trace;

/// Outline of the selected feature.
pub const SELECTION_STROKE: Color = Color::rgb(255, 196, 0);
pub const SELECTION_STROKE_WIDTH: f32 = 3.0;

/// Holds at most one selected geometry and paints only its outline, so the
/// owning layer's own styles stay untouched.
#[derive(Debug)]
pub struct HighlightOverlay {
    selection: Option<(LayerHit, Geometry)>,
    style: FeatureStyle,
    projection: ProjectionCache,
    surface: Option<Surface>,
}

impl Default for HighlightOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightOverlay {
    pub fn new() -> Self {
        Self {
            selection: None,
            style: FeatureStyle::filled(Color::transparent()).with_stroke(SELECTION_STROKE, SELECTION_STROKE_WIDTH),
            projection: ProjectionCache::new(),
            surface: None,
        }
    }

    pub fn with_style(mut self, style: FeatureStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the overlay content with one feature's geometry.
    pub fn set(&mut self, hit: LayerHit, geometry: Geometry) {
        self.selection = Some((hit, geometry));
    }

    pub fn clear(&mut self) {
        self.selection = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }

    pub fn selection(&self) -> Option<&LayerHit> {
        self.selection.as_ref().map(|(hit, _)| hit)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.selection.as_ref().map(|(_, g)| g)
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_none()
    }

    /// Draw the selected outline for `frame`; `None` when nothing is selected.
    pub fn render(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>> {
        let (Some(frame), Some((_, geometry))) = (frame.filter(|f| f.is_renderable()), self.selection.as_ref())
        else {
            if let Some(surface) = self.surface.as_mut() {
                surface.clear();
            }
            return Ok(None);
        };

        let projection = self
            .projection
            .get(frame)
            .map_err(|e| AtlasError::Render(e.to_string()))?;
        let path = project_geometry(geometry, &projection);

        match self.surface.as_mut() {
            Some(surface) => {
                surface.ensure_size(frame.width(), frame.height())?;
                surface.clear();
            }
            None => self.surface = Some(Surface::new(frame.width(), frame.height())?),
        }
        let surface = self.surface.as_mut().expect("surface initialized above");
        surface.draw_path(&path, &self.style);
        trace!("highlight overlay rendered");
        Ok(Some(&*surface))
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }
}
