//! Aging of farm households: share of household heads aged 65 or over.

use atlas_common::Feature;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingProps {
    pub name: String,
    #[serde(default)]
    pub farm_households: Option<u64>,
    #[serde(default)]
    pub aged_households: Option<u64>,
}

impl AgingProps {
    /// Percentage of aged households; `None` without a positive total.
    pub fn aged_ratio(&self) -> Option<f64> {
        let total = self.farm_households.filter(|&t| t > 0)?;
        let aged = self.aged_households?;
        Some(aged as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AgingStrategy;

impl StatisticStrategy<AgingProps> for AgingStrategy {
    fn name(&self) -> &str {
        "aging"
    }

    fn value(&self, feature: &Feature<AgingProps>) -> Option<f64> {
        feature.properties.aged_ratio()
    }

    fn region_name(&self, feature: &Feature<AgingProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<AgingProps>) -> String {
        let p = &feature.properties;
        let count = |v: Option<u64>| v.map_or("N/A".to_string(), |v| format_decimal(v as f64, 0));
        tooltip_table(
            &p.name,
            &[
                ("Farm households", count(p.farm_households)),
                ("Aged 65+", count(p.aged_households)),
                ("Aging ratio", display_or_na(p.aged_ratio(), 1, "%")),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{}%", format_decimal(value, 1))
    }
}
