//! Common test fixtures for choropleth tests.
//!
//! Pre-defined extents, frames, settings and a small hand-written feature
//! collection in the JSON shape the dashboard backend serves.

use atlas_common::{Extent, FrameState, VisualizationSetting};
use serde::{Deserialize, Serialize};

/// Common extents for testing.
pub mod extent {
    use atlas_common::Extent;

    /// 100 x 100 map units starting at the origin.
    pub const UNIT_SQUARE_100: Extent = Extent {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 100.0,
        max_y: 100.0,
    };
}

/// Properties used by the generic test collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProps {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl SampleProps {
    pub fn new(name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Frame showing `extent` at one map unit per pixel.
pub fn unit_frame(extent: Extent) -> FrameState {
    FrameState::new(
        extent,
        [extent.width().round() as u32, extent.height().round() as u32],
        1.0,
    )
}

/// 100x100 pixel frame over [`extent::UNIT_SQUARE_100`].
pub fn square_frame() -> FrameState {
    unit_frame(extent::UNIT_SQUARE_100)
}

/// Setting with custom pivots and full opacity.
pub fn pivot_setting(pivots: &[f64]) -> VisualizationSetting {
    VisualizationSetting {
        opacity: 1.0,
        ..VisualizationSetting::default()
    }
    .with_pivots(pivots.to_vec())
}

/// Two adjacent provinces, one with a hole, one without a value.
pub const SAMPLE_COLLECTION_JSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "id": 11,
      "type": "Feature",
      "geometry": {
        "type": "Polygon",
        "coordinates": [
          [[0, 0], [50, 0], [50, 50], [0, 50], [0, 0]],
          [[20, 20], [30, 20], [30, 30], [20, 30], [20, 20]]
        ]
      },
      "properties": {"name": "North", "value": 42.5}
    },
    {
      "id": "east-12",
      "type": "Feature",
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[[50, 0], [100, 0], [100, 50], [50, 50], [50, 0]]],
          [[[60, 60], [90, 60], [90, 90], [60, 90], [60, 60]]]
        ]
      },
      "properties": {"name": "East", "value": null}
    }
  ]
}"#;

/// Page-default visualization setting as JSON.
pub const SAMPLE_SETTING_JSON: &str = r#"{
  "opacity": 0.7,
  "legendOptions": {"level": 5, "color": "greens", "pivotPoints": []},
  "labelOptions": {"isShowRegion": true, "isShowValue": true}
}"#;
