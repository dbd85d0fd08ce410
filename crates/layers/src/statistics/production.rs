//! Production output in tonnes.

use atlas_common::Feature;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionProps {
    pub name: String,
    #[serde(default)]
    pub production_tonnes: Option<f64>,
    /// Yield in kg per 10 are.
    #[serde(default)]
    pub yield_kg_per_10a: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionStrategy;

impl StatisticStrategy<ProductionProps> for ProductionStrategy {
    fn name(&self) -> &str {
        "production"
    }

    fn value(&self, feature: &Feature<ProductionProps>) -> Option<f64> {
        feature.properties.production_tonnes
    }

    fn region_name(&self, feature: &Feature<ProductionProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<ProductionProps>) -> String {
        let p = &feature.properties;
        tooltip_table(
            &p.name,
            &[
                ("Production", display_or_na(p.production_tonnes, 0, "t")),
                ("Yield", display_or_na(p.yield_kg_per_10a, 0, "kg/10a")),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{} t", format_decimal(value, 0))
    }
}
