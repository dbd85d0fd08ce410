//! Map-units to screen-pixels projection for a single frame.
//!
//! The viewport provider already works in a projected CRS, so per-frame
//! projection is an affine transform:
//!
//! ```text
//! screen_x = width/2  + (geo_x - center_x) / resolution
//! screen_y = height/2 - (geo_y - center_y) / resolution
//! ```
//!
//! The y axis is inverted because screen rows grow downwards.

use atlas_common::FrameState;

use crate::ProjectionError;

/// Affine projection derived from one [`FrameState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenProjection {
    center_x: f64,
    center_y: f64,
    half_width: f64,
    half_height: f64,
    resolution: f64,
}

impl ScreenProjection {
    /// Build the projection for a frame.
    pub fn from_frame(frame: &FrameState) -> Result<Self, ProjectionError> {
        let resolution = frame.resolution();
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(ProjectionError::InvalidResolution(resolution));
        }
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ProjectionError::EmptyViewport {
                width: frame.width(),
                height: frame.height(),
            });
        }

        let (center_x, center_y) = frame.extent.center();
        if !center_x.is_finite() || !center_y.is_finite() {
            return Err(ProjectionError::InvalidExtent);
        }

        Ok(Self {
            center_x,
            center_y,
            half_width: frame.width() as f64 / 2.0,
            half_height: frame.height() as f64 / 2.0,
            resolution,
        })
    }

    /// Project map coordinates to screen pixels.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> (f32, f32) {
        let sx = self.half_width + (x - self.center_x) / self.resolution;
        let sy = self.half_height - (y - self.center_y) / self.resolution;
        (sx as f32, sy as f32)
    }

    /// Map screen pixels back to map coordinates.
    #[inline]
    pub fn unproject(&self, sx: f32, sy: f32) -> (f64, f64) {
        let x = self.center_x + (sx as f64 - self.half_width) * self.resolution;
        let y = self.center_y - (sy as f64 - self.half_height) * self.resolution;
        (x, y)
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }
}
