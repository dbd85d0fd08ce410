//! Cultivation distribution: planted area of the selected crop.

use atlas_common::Feature;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultivationProps {
    pub name: String,
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub area_ha: Option<f64>,
    #[serde(default)]
    pub farms: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CultivationStrategy;

impl StatisticStrategy<CultivationProps> for CultivationStrategy {
    fn name(&self) -> &str {
        "cultivation"
    }

    fn value(&self, feature: &Feature<CultivationProps>) -> Option<f64> {
        feature.properties.area_ha.filter(|a| *a >= 0.0)
    }

    fn region_name(&self, feature: &Feature<CultivationProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<CultivationProps>) -> String {
        let p = &feature.properties;
        let crop = if p.crop.is_empty() { "-".to_string() } else { p.crop.clone() };
        tooltip_table(
            &p.name,
            &[
                ("Crop", crop),
                ("Area", display_or_na(p.area_ha, 1, "ha")),
                ("Farms", p.farms.map_or("N/A".to_string(), |f| format_decimal(f as f64, 0))),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{} ha", format_decimal(value, 0))
    }
}
