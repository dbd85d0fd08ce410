//! Quality analysis: mean sugar content (Brix) of sampled produce.

use atlas_common::Feature;
use renderer::gradient::rank_palettes;
use renderer::RankPolicy;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, tooltip_table, Coloring, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProps {
    pub name: String,
    #[serde(default)]
    pub samples: u32,
    #[serde(default)]
    pub sugar_brix: Option<f64>,
    #[serde(default)]
    pub firmness_n: Option<f64>,
    #[serde(default)]
    pub acidity_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityStrategy;

impl StatisticStrategy<QualityProps> for QualityStrategy {
    fn name(&self) -> &str {
        "quality"
    }

    fn value(&self, feature: &Feature<QualityProps>) -> Option<f64> {
        let p = &feature.properties;
        if p.samples == 0 {
            return None;
        }
        p.sugar_brix
    }

    fn region_name(&self, feature: &Feature<QualityProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<QualityProps>) -> String {
        let p = &feature.properties;
        tooltip_table(
            &p.name,
            &[
                ("Samples", p.samples.to_string()),
                ("Sugar content", display_or_na(p.sugar_brix, 1, "°Bx")),
                ("Firmness", display_or_na(p.firmness_n, 1, "N")),
                ("Acidity", display_or_na(p.acidity_pct, 2, "%")),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{:.1}°Bx", value)
    }

    fn coloring(&self) -> Coloring {
        Coloring::Rank {
            palette: &rank_palettes::GREEN,
            policy: RankPolicy::default(),
        }
    }
}
