//! Export flows: export value per region in thousand USD.

use atlas_common::Feature;
use renderer::gradient::rank_palettes;
use renderer::RankPolicy;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, Coloring, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProps {
    pub name: String,
    #[serde(default)]
    pub export_tonnes: Option<f64>,
    #[serde(default)]
    pub export_usd_thousand: Option<f64>,
    #[serde(default)]
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportStrategy;

impl StatisticStrategy<ExportProps> for ExportStrategy {
    fn name(&self) -> &str {
        "export"
    }

    /// Regions that exported nothing have no rank.
    fn value(&self, feature: &Feature<ExportProps>) -> Option<f64> {
        feature.properties.export_usd_thousand.filter(|v| *v > 0.0)
    }

    fn region_name(&self, feature: &Feature<ExportProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<ExportProps>) -> String {
        let p = &feature.properties;
        let destinations = if p.destinations.is_empty() {
            "-".to_string()
        } else {
            p.destinations.join(", ")
        };
        tooltip_table(
            &p.name,
            &[
                ("Export volume", display_or_na(p.export_tonnes, 1, "t")),
                ("Export value", display_or_na(p.export_usd_thousand, 0, "k USD")),
                ("Destinations", destinations),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("${}k", format_decimal(value, 0))
    }

    fn coloring(&self) -> Coloring {
        Coloring::Rank {
            palette: &rank_palettes::WARM,
            policy: RankPolicy::default(),
        }
    }
}
