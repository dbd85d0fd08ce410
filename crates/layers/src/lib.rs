//! Choropleth layers for the agricultural statistics dashboard.
//!
//! A [`ChoroplethLayer`] is one generic engine; what differs between
//! statistics lives in a [`StatisticStrategy`]. Layers are mounted in a
//! [`LayerManager`], which renders them once per viewport tick and composes
//! their surfaces.

pub mod choropleth;
pub mod manager;
pub mod statistics;
pub mod strategy;
pub mod tooltip;

pub use choropleth::{CacheStats, ChoroplethLayer, HIGHLIGHT_STROKE, HIGHLIGHT_STROKE_WIDTH};
pub use manager::{Granularity, LayerHit, LayerManager, MapLayer};
pub use statistics::StatisticKind;
pub use strategy::{Coloring, FnStrategy, StatisticStrategy};
pub use tooltip::Tooltip;
