//! Concrete statistics shown on the dashboard.
//!
//! Each module pairs a properties struct (the `properties` object served by
//! the backend) with a [`StatisticStrategy`](crate::StatisticStrategy).

pub mod aging;
pub mod cultivation;
pub mod export;
pub mod groundwater;
pub mod growth;
pub mod production;
pub mod quality;
pub mod tree_age;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use atlas_common::{AtlasError, AtlasResult, FeatureCollection, VisualizationSetting};
use renderer::LabelPainter;
use serde::de::DeserializeOwned;

use crate::choropleth::ChoroplethLayer;
use crate::manager::{Granularity, MapLayer};
use crate::strategy::StatisticStrategy;

pub use aging::{AgingProps, AgingStrategy};
pub use cultivation::{CultivationProps, CultivationStrategy};
pub use export::{ExportProps, ExportStrategy};
pub use groundwater::{GroundwaterProps, GroundwaterStrategy};
pub use growth::{GrowthComparisonStrategy, GrowthMetric, GrowthProps};
pub use production::{ProductionProps, ProductionStrategy};
pub use quality::{QualityProps, QualityStrategy};
pub use tree_age::{TreeAgeProps, TreeAgeStrategy};

/// Statistic selector, e.g. from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticKind {
    Aging,
    Groundwater,
    Cultivation,
    Export,
    Growth,
    TreeAge,
    Quality,
    Production,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 8] = [
        StatisticKind::Aging,
        StatisticKind::Groundwater,
        StatisticKind::Cultivation,
        StatisticKind::Export,
        StatisticKind::Growth,
        StatisticKind::TreeAge,
        StatisticKind::Quality,
        StatisticKind::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticKind::Aging => "aging",
            StatisticKind::Groundwater => "groundwater",
            StatisticKind::Cultivation => "cultivation",
            StatisticKind::Export => "export",
            StatisticKind::Growth => "growth",
            StatisticKind::TreeAge => "tree_age",
            StatisticKind::Quality => "quality",
            StatisticKind::Production => "production",
        }
    }

    /// Cultivation is surveyed per parcel; everything else per region.
    pub fn granularity(&self) -> Granularity {
        match self {
            StatisticKind::Cultivation => Granularity::Parcel,
            _ => Granularity::Region,
        }
    }

    /// Parse a feature collection JSON for this statistic and wrap it in a layer.
    pub fn build_layer(
        &self,
        id: &str,
        json: &str,
        z_index: i32,
        setting: &VisualizationSetting,
        labels: Option<Arc<LabelPainter>>,
    ) -> AtlasResult<Box<dyn MapLayer>> {
        let spec = LayerSpec {
            id,
            json,
            z_index,
            setting,
            labels,
            granularity: self.granularity(),
        };
        match self {
            StatisticKind::Aging => spec.build::<AgingProps, _>(AgingStrategy),
            StatisticKind::Groundwater => spec.build::<GroundwaterProps, _>(GroundwaterStrategy),
            StatisticKind::Cultivation => spec.build::<CultivationProps, _>(CultivationStrategy),
            StatisticKind::Export => spec.build::<ExportProps, _>(ExportStrategy),
            StatisticKind::Growth => spec.build::<GrowthProps, _>(GrowthComparisonStrategy::default()),
            StatisticKind::TreeAge => spec.build::<TreeAgeProps, _>(TreeAgeStrategy),
            StatisticKind::Quality => spec.build::<QualityProps, _>(QualityStrategy),
            StatisticKind::Production => spec.build::<ProductionProps, _>(ProductionStrategy),
        }
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatisticKind {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| AtlasError::Parse {
                what: "statistic".to_string(),
                message: format!(
                    "unknown statistic '{}', expected one of: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                ),
            })
    }
}

struct LayerSpec<'a> {
    id: &'a str,
    json: &'a str,
    z_index: i32,
    setting: &'a VisualizationSetting,
    labels: Option<Arc<LabelPainter>>,
    granularity: Granularity,
}

impl LayerSpec<'_> {
    fn build<P, S>(self, strategy: S) -> AtlasResult<Box<dyn MapLayer>>
    where
        P: DeserializeOwned + 'static,
        S: StatisticStrategy<P> + 'static,
    {
        let collection = FeatureCollection::<P>::from_json(self.json)?;
        let mut layer = ChoroplethLayer::new(self.id, collection, self.z_index, self.setting, strategy)?
            .with_granularity(self.granularity);
        if let Some(painter) = self.labels {
            layer = layer.with_label_painter(painter);
        }
        Ok(Box::new(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in StatisticKind::ALL {
            assert_eq!(kind.as_str().parse::<StatisticKind>().unwrap(), kind);
        }
        assert_eq!("Tree-Age".parse::<StatisticKind>().unwrap(), StatisticKind::TreeAge);
        assert!("rainfall".parse::<StatisticKind>().is_err());
    }
}
