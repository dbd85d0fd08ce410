//! Rendering for choropleth overlays.
//!
//! - Named gradients and rank palettes
//! - Color scales (continuous and bucketed) shared by map and legend
//! - Rank-based coloring for sparse statistics
//! - Legend entries and the pivot editor
//! - Surface painting, region labels and PNG encoding

pub mod gradient;
pub mod labels;
pub mod legend;
pub mod png;
pub mod rank;
pub mod scale;
pub mod surface;

use atlas_common::AtlasError;
use thiserror::Error;

pub use gradient::{Color, Gradient, NO_DATA_FILL};
pub use labels::{Alignment, LabelPainter, TextLabel};
pub use legend::{render_legend, Legend, LegendChange, LegendEntry, PivotEditor};
pub use rank::{rank_color, RankIndex, RankPolicy};
pub use scale::{create_color_scale, BucketScheme, ColorScale};
pub use surface::{FeatureStyle, StyleOverride, Surface};

/// Errors raised while painting or encoding.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Font error: {0}")]
    Font(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for AtlasError {
    fn from(err: RenderError) -> Self {
        AtlasError::Render(err.to_string())
    }
}
