//! Per-tick viewport snapshot supplied by the map viewport provider.

use serde::{Deserialize, Serialize};

use crate::extent::Extent;

/// View parameters of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Map units per pixel.
    pub resolution: f64,
}

/// Snapshot of the viewport for one render tick.
///
/// Read-only and never retained past the render it was passed to; caches keep
/// only the derived [`FrameKey`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    pub extent: Extent,
    /// Pixel size `[width, height]`.
    pub size: [u32; 2],
    pub view_state: ViewState,
}

impl FrameState {
    pub fn new(extent: Extent, size: [u32; 2], resolution: f64) -> Self {
        Self {
            extent,
            size,
            view_state: ViewState { resolution },
        }
    }

    /// Build a frame that shows `extent` in a `width x height` viewport,
    /// fitting the larger axis.
    pub fn fit(extent: Extent, width: u32, height: u32) -> Self {
        let rx = extent.width() / width.max(1) as f64;
        let ry = extent.height() / height.max(1) as f64;
        let resolution = rx.max(ry);
        Self::new(extent, [width, height], resolution)
    }

    pub fn width(&self) -> u32 {
        self.size[0]
    }

    pub fn height(&self) -> u32 {
        self.size[1]
    }

    pub fn resolution(&self) -> f64 {
        self.view_state.resolution
    }

    /// A frame with zero pixels or a degenerate resolution draws nothing.
    pub fn is_renderable(&self) -> bool {
        self.size[0] > 0
            && self.size[1] > 0
            && self.view_state.resolution.is_finite()
            && self.view_state.resolution > 0.0
            && !self.extent.is_empty()
    }

    /// Memoization key covering every field the projection depends on.
    pub fn key(&self) -> FrameKey {
        FrameKey {
            extent: [
                self.extent.min_x.to_bits(),
                self.extent.min_y.to_bits(),
                self.extent.max_x.to_bits(),
                self.extent.max_y.to_bits(),
            ],
            size: self.size,
            resolution: self.view_state.resolution.to_bits(),
        }
    }
}

/// Bit-exact identity of the projection-relevant frame fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey {
    extent: [u64; 4],
    size: [u32; 2],
    resolution: u64,
}
