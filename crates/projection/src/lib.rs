//! Screen projection for choropleth overlays.
//!
//! Converts the viewport provider's per-tick frame state into an affine
//! map-to-pixel transform, memoizes it by the frame fields it depends on,
//! and reprojects polygon geometry into screen paths.

pub mod cache;
pub mod reproject;
pub mod screen;

pub use cache::ProjectionCache;
pub use reproject::{project_geometry, ScreenBounds, ScreenPath, ScreenPolygon};
pub use screen::ScreenProjection;

/// Reasons a frame cannot be projected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Invalid resolution: {0}")]
    InvalidResolution(f64),

    #[error("Empty viewport: {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Invalid extent")]
    InvalidExtent,
}
