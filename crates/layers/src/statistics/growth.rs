//! Growth survey comparison between the current and the previous survey.
//!
//! The compared metric can be switched at runtime; each switch bumps the
//! sort key version so the layer re-ranks.

use atlas_common::{next_version, Feature};
use renderer::gradient::rank_palettes;
use renderer::RankPolicy;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, Coloring, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProps {
    pub name: String,
    /// Surveyed measurement this season, e.g. plant height in cm.
    #[serde(default)]
    pub current: Option<f64>,
    /// Same measurement in the previous survey.
    #[serde(default)]
    pub previous: Option<f64>,
}

/// What the comparison ranks by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMetric {
    #[default]
    PercentChange,
    AbsoluteChange,
}

impl GrowthProps {
    pub fn change(&self, metric: GrowthMetric) -> Option<f64> {
        let (current, previous) = (self.current?, self.previous?);
        match metric {
            GrowthMetric::AbsoluteChange => Some(current - previous),
            GrowthMetric::PercentChange => {
                (previous.abs() > f64::EPSILON).then(|| (current - previous) / previous * 100.0)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GrowthComparisonStrategy {
    metric: GrowthMetric,
    version: u64,
}

impl Default for GrowthComparisonStrategy {
    fn default() -> Self {
        Self::new(GrowthMetric::default())
    }
}

impl GrowthComparisonStrategy {
    pub fn new(metric: GrowthMetric) -> Self {
        Self {
            metric,
            version: next_version(),
        }
    }

    pub fn metric(&self) -> GrowthMetric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: GrowthMetric) {
        if self.metric != metric {
            self.metric = metric;
            self.version = next_version();
        }
    }
}

impl StatisticStrategy<GrowthProps> for GrowthComparisonStrategy {
    fn name(&self) -> &str {
        "growth"
    }

    fn value(&self, feature: &Feature<GrowthProps>) -> Option<f64> {
        feature.properties.change(self.metric)
    }

    fn region_name(&self, feature: &Feature<GrowthProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<GrowthProps>) -> String {
        let p = &feature.properties;
        tooltip_table(
            &p.name,
            &[
                ("This survey", display_or_na(p.current, 1, "")),
                ("Previous survey", display_or_na(p.previous, 1, "")),
                ("Change", display_or_na(p.change(GrowthMetric::AbsoluteChange), 1, "")),
                ("Change rate", display_or_na(p.change(GrowthMetric::PercentChange), 1, "%")),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        let sign = if value > 0.0 { "+" } else { "" };
        match self.metric {
            GrowthMetric::PercentChange => format!("{}{}%", sign, format_decimal(value, 1)),
            GrowthMetric::AbsoluteChange => format!("{}{}", sign, format_decimal(value, 1)),
        }
    }

    /// Two compared regions take the inner colors so neither reads as an
    /// extreme gain or loss.
    fn coloring(&self) -> Coloring {
        Coloring::Rank {
            palette: &rank_palettes::DIVERGING,
            policy: RankPolicy::default().with_pair(1, 3),
        }
    }

    fn sort_key_version(&self) -> u64 {
        self.version
    }
}
