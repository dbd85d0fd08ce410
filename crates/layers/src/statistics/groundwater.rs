//! Groundwater quality: mean nitrate-nitrogen of monitored wells.
//!
//! Only a few regions run monitoring wells, so regions are colored by rank.

use atlas_common::Feature;
use renderer::gradient::rank_palettes;
use renderer::RankPolicy;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, tooltip_table, Coloring, StatisticStrategy};

/// Drinking water limit for nitrate-nitrogen, mg/L.
pub const NITRATE_LIMIT_MG_L: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundwaterProps {
    pub name: String,
    #[serde(default)]
    pub wells: u32,
    #[serde(default)]
    pub nitrate_mg_l: Option<f64>,
    #[serde(default)]
    pub wells_over_limit: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroundwaterStrategy;

impl StatisticStrategy<GroundwaterProps> for GroundwaterStrategy {
    fn name(&self) -> &str {
        "groundwater"
    }

    fn value(&self, feature: &Feature<GroundwaterProps>) -> Option<f64> {
        let p = &feature.properties;
        if p.wells == 0 {
            return None;
        }
        p.nitrate_mg_l
    }

    fn region_name(&self, feature: &Feature<GroundwaterProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<GroundwaterProps>) -> String {
        let p = &feature.properties;
        let status = match p.nitrate_mg_l {
            Some(v) if v > NITRATE_LIMIT_MG_L => "Over limit",
            Some(_) => "Within limit",
            None => "N/A",
        };
        tooltip_table(
            &p.name,
            &[
                ("Monitoring wells", p.wells.to_string()),
                ("Nitrate-N", display_or_na(p.nitrate_mg_l, 2, "mg/L")),
                ("Wells over limit", p.wells_over_limit.to_string()),
                ("Status", status.to_string()),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{:.2}", value)
    }

    /// A single monitored region is shown one step above the middle so it
    /// does not read as "average".
    fn coloring(&self) -> Coloring {
        Coloring::Rank {
            palette: &rank_palettes::COOL,
            policy: RankPolicy::default().with_single(1),
        }
    }
}
