//! Text labels drawn at region centroids.
//!
//! The font is loaded at runtime. Without one, label drawing is a no-op and a
//! warning is logged once at load time; the rest of the map renders as usual.

use std::path::Path;

use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size, Canvas};
use rusttype::{Font, Scale};
use tiny_skia::{ColorU8, Pixmap};
use tracing::{debug, warn};

use crate::gradient::Color;
use crate::surface::Surface;
use crate::RenderError;

/// Padding around the label background box, in pixels.
const BOX_PADDING: i32 = 2;

/// How a label is placed relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Box centered on the anchor.
    Center,
    /// Box starts at the anchor, vertically centered.
    Left,
}

/// One or more lines of text anchored at a screen position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub anchor: (f32, f32),
    pub lines: Vec<String>,
    pub alignment: Alignment,
}

impl TextLabel {
    pub fn centered(anchor: (f32, f32), lines: Vec<String>) -> Self {
        Self {
            anchor,
            lines,
            alignment: Alignment::Center,
        }
    }

    pub fn left_aligned(anchor: (f32, f32), line: String) -> Self {
        Self {
            anchor,
            lines: vec![line],
            alignment: Alignment::Left,
        }
    }
}

/// Pixel-space box of a placed label.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LabelBox {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl LabelBox {
    fn overlaps(&self, other: &LabelBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Draws label text onto surfaces.
pub struct LabelPainter {
    font: Option<Font<'static>>,
    font_size: f32,
    text_color: Color,
    background: Color,
}

impl std::fmt::Debug for LabelPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelPainter")
            .field("has_font", &self.font.is_some())
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl Default for LabelPainter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl LabelPainter {
    /// A painter that never draws anything.
    pub fn disabled() -> Self {
        Self {
            font: None,
            font_size: 12.0,
            text_color: Color::rgb(33, 33, 33),
            background: Color::new(255, 255, 255, 200),
        }
    }

    /// Load a TrueType/OpenType font from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| RenderError::Font("unsupported font data".to_string()))?;
        Ok(Self {
            font: Some(font),
            ..Self::disabled()
        })
    }

    /// Load the font at `path` if given; otherwise, or on failure, return a
    /// disabled painter.
    pub fn load_or_disabled(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No label font configured, region labels will be skipped");
            return Self::disabled();
        };
        match Self::from_file(path) {
            Ok(painter) => painter,
            Err(e) => {
                warn!(error = %e, "Failed to load label font, region labels will be skipped");
                Self::disabled()
            }
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size.max(1.0);
        self
    }

    pub fn with_colors(mut self, text: Color, background: Color) -> Self {
        self.text_color = text;
        self.background = background;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn line_height(&self) -> i32 {
        (self.font_size * 1.2).ceil() as i32
    }

    /// Width and height of a text block, or `None` without a font.
    pub fn measure(&self, lines: &[String]) -> Option<(i32, i32)> {
        let font = self.font.as_ref()?;
        let scale = Scale::uniform(self.font_size);
        let width = lines
            .iter()
            .map(|line| text_size(scale, font, line).0)
            .max()
            .unwrap_or(0);
        Some((width, lines.len() as i32 * self.line_height()))
    }

    /// Draw labels in order, skipping any whose box overlaps one already
    /// drawn. Returns how many were drawn.
    pub fn draw(&self, surface: &mut Surface, labels: &[TextLabel]) -> usize {
        let Some(font) = self.font.as_ref() else {
            return 0;
        };
        let scale = Scale::uniform(self.font_size);
        let line_height = self.line_height();
        let mut placed: Vec<LabelBox> = Vec::with_capacity(labels.len());

        for label in labels {
            let lines: Vec<&String> = label.lines.iter().filter(|l| !l.is_empty()).collect();
            if lines.is_empty() {
                continue;
            }

            let sizes: Vec<i32> = lines.iter().map(|l| text_size(scale, font, l).0).collect();
            let width = sizes.iter().copied().max().unwrap_or(0);
            let height = lines.len() as i32 * line_height;
            let (ax, ay) = (label.anchor.0.round() as i32, label.anchor.1.round() as i32);
            let x = match label.alignment {
                Alignment::Center => ax - width / 2,
                Alignment::Left => ax,
            };
            let bbox = LabelBox {
                x: x - BOX_PADDING,
                y: ay - height / 2 - BOX_PADDING,
                width: width + 2 * BOX_PADDING,
                height: height + 2 * BOX_PADDING,
            };

            if placed.iter().any(|p| p.overlaps(&bbox)) {
                continue;
            }

            surface.fill_rect(
                bbox.x as f32,
                bbox.y as f32,
                bbox.width as f32,
                bbox.height as f32,
                self.background,
            );

            let mut canvas = PixmapCanvas {
                pixmap: surface.pixmap_mut(),
            };
            let color = Rgba(self.text_color.to_array());
            for (i, (line, line_width)) in lines.iter().zip(&sizes).enumerate() {
                let lx = match label.alignment {
                    Alignment::Center => ax - line_width / 2,
                    Alignment::Left => ax,
                };
                let ly = ay - height / 2 + i as i32 * line_height;
                draw_text_mut(&mut canvas, color, lx, ly, scale, font, line);
            }
            placed.push(bbox);
        }

        debug!(requested = labels.len(), drawn = placed.len(), "labels drawn");
        placed.len()
    }
}

/// Lets imageproc draw glyphs straight into a premultiplied pixmap.
struct PixmapCanvas<'a> {
    pixmap: &'a mut Pixmap,
}

impl Canvas for PixmapCanvas<'_> {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        match self.pixmap.pixel(x, y) {
            Some(p) => {
                let c = p.demultiply();
                Rgba([c.red(), c.green(), c.blue(), c.alpha()])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        let width = self.pixmap.width();
        let idx = (y * width + x) as usize;
        let [r, g, b, a] = color.0;
        if let Some(pixel) = self.pixmap.pixels_mut().get_mut(idx) {
            *pixel = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }
}
