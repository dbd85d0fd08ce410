//! Raster surfaces that layers paint into.
//!
//! A surface wraps one `tiny_skia::Pixmap`. Layers create it lazily on the
//! first renderable frame and reuse it afterwards; it is only reallocated
//! when the viewport size changes.

use projection::ScreenPath;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::gradient::{Color, DEFAULT_STROKE};
use crate::RenderError;

/// Fill and outline of one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

impl FeatureStyle {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            stroke: DEFAULT_STROKE,
            stroke_width: 1.0,
        }
    }

    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = stroke;
        self.stroke_width = width;
        self
    }
}

/// Partial style laid over a region's computed style at paint time.
///
/// Unset parts follow the layer's current coloring, so an outline-only
/// override never pins a fill from an earlier setting or dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleOverride {
    pub fill: Option<Color>,
    /// Outline color and width.
    pub stroke: Option<(Color, f32)>,
}

impl StyleOverride {
    pub fn outline(stroke: Color, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some((stroke, width)),
        }
    }

    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            stroke: None,
        }
    }

    /// This override with its outline replaced.
    pub fn with_outline(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = Some((stroke, width));
        self
    }

    pub fn apply(&self, base: FeatureStyle) -> FeatureStyle {
        let mut style = base;
        if let Some(fill) = self.fill {
            style.fill = fill;
        }
        if let Some((stroke, width)) = self.stroke {
            style = style.with_stroke(stroke, width);
        }
        style
    }
}

/// An owned RGBA drawing surface.
#[derive(Debug)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Match the viewport size. Returns `true` when the pixmap was reallocated.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> Result<bool, RenderError> {
        if self.width() == width && self.height() == height {
            return Ok(false);
        }
        *self = Self::new(width, height)?;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// True when nothing visible has been drawn.
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Fill a projected region (even-odd, so holes stay empty) and stroke its rings.
    pub fn draw_path(&mut self, path: &ScreenPath, style: &FeatureStyle) {
        let Some(skia_path) = build_path(path) else {
            return;
        };

        if style.fill.a > 0 {
            let paint = solid_paint(style.fill);
            self.pixmap
                .fill_path(&skia_path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }

        if style.stroke.a > 0 && style.stroke_width > 0.0 {
            let paint = solid_paint(style.stroke);
            let stroke = Stroke {
                width: style.stroke_width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&skia_path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, width, height) {
            let paint = solid_paint(color);
            self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    /// Composite another surface on top of this one.
    pub fn draw_surface(&mut self, other: &Surface, opacity: f32) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, other.pixmap.as_ref(), &paint, Transform::identity(), None);
    }

    /// Demultiplied color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::new(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Demultiplied RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn build_path(path: &ScreenPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for polygon in &path.polygons {
        for ring in &polygon.rings {
            let Some((&(x0, y0), rest)) = ring.split_first() else {
                continue;
            };
            pb.move_to(x0, y0);
            for &(x, y) in rest {
                pb.line_to(x, y);
            }
            pb.close();
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::ScreenPolygon;

    fn square(x: f32, y: f32, size: f32) -> Vec<(f32, f32)> {
        vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]
    }

    #[test]
    fn test_fill_and_hole() {
        let mut surface = Surface::new(50, 50).unwrap();
        let path = ScreenPath {
            polygons: vec![ScreenPolygon {
                rings: vec![square(0.0, 0.0, 40.0), square(10.0, 10.0, 20.0)],
            }],
        };
        let style = FeatureStyle::filled(Color::rgb(200, 0, 0)).with_stroke(Color::transparent(), 0.0);
        surface.draw_path(&path, &style);

        assert_eq!(surface.pixel(5, 5), Some(Color::rgb(200, 0, 0)));
        assert_eq!(surface.pixel(20, 20).map(|c| c.a), Some(0));
        assert_eq!(surface.pixel(45, 45).map(|c| c.a), Some(0));
    }

    #[test]
    fn test_ensure_size_reuses_pixmap() {
        let mut surface = Surface::new(10, 10).unwrap();
        assert!(!surface.ensure_size(10, 10).unwrap());
        assert!(surface.ensure_size(20, 10).unwrap());
        assert_eq!(surface.width(), 20);
    }

    #[test]
    fn test_outline_override_keeps_base_fill() {
        let base = FeatureStyle::filled(Color::rgb(8, 69, 148));
        let style = StyleOverride::outline(Color::rgb(51, 51, 51), 3.0).apply(base);
        assert_eq!(style.fill, base.fill);
        assert_eq!(style.stroke, Color::rgb(51, 51, 51));
        assert_eq!(style.stroke_width, 3.0);

        let filled = StyleOverride::filled(Color::rgb(1, 2, 3)).apply(base);
        assert_eq!(filled.fill, Color::rgb(1, 2, 3));
        assert_eq!(filled.stroke_width, base.stroke_width);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(RenderError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_clear_blanks_surface() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.fill_rect(0.0, 0.0, 10.0, 10.0, Color::rgb(0, 0, 255));
        assert!(!surface.is_blank());
        surface.clear();
        assert!(surface.is_blank());
    }

    #[test]
    fn test_draw_surface_with_opacity() {
        let mut base = Surface::new(4, 4).unwrap();
        let mut top = Surface::new(4, 4).unwrap();
        top.fill_rect(0.0, 0.0, 4.0, 4.0, Color::rgb(255, 255, 255));
        base.draw_surface(&top, 0.5);
        let alpha = base.pixel(1, 1).unwrap().a;
        assert!((126..=129).contains(&alpha), "alpha {}", alpha);
    }
}
