//! Common types shared by the choropleth crates.
//!
//! Covers the input side of the engine: region feature collections,
//! visualization settings, per-tick frame states, and the error type.

pub mod error;
pub mod extent;
pub mod feature;
pub mod frame;
pub mod setting;
pub mod version;

pub use error::{AtlasError, AtlasResult};
pub use extent::Extent;
pub use feature::{Feature, FeatureCollection, FeatureId, Geometry, Position, Ring};
pub use frame::{FrameKey, FrameState, ViewState};
pub use setting::{LabelOptions, LegendOptions, ScaleMode, VisualizationSetting, LEVEL_MAX, LEVEL_MIN};
pub use version::{next_version, Versioned};
