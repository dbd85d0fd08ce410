//! Orchard tree-age distribution: share of trees older than twenty years.

use atlas_common::Feature;
use serde::{Deserialize, Serialize};

use crate::strategy::{display_or_na, format_decimal, tooltip_table, StatisticStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeAgeProps {
    pub name: String,
    /// Trees under 5 years.
    #[serde(default)]
    pub young: u64,
    /// Trees from 5 to 20 years.
    #[serde(default)]
    pub mature: u64,
    /// Trees over 20 years.
    #[serde(default)]
    pub old: u64,
}

impl TreeAgeProps {
    pub fn total(&self) -> u64 {
        self.young + self.mature + self.old
    }

    fn share(&self, count: u64) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| count as f64 / total as f64 * 100.0)
    }

    pub fn old_share(&self) -> Option<f64> {
        self.share(self.old)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeAgeStrategy;

impl StatisticStrategy<TreeAgeProps> for TreeAgeStrategy {
    fn name(&self) -> &str {
        "tree_age"
    }

    fn value(&self, feature: &Feature<TreeAgeProps>) -> Option<f64> {
        feature.properties.old_share()
    }

    fn region_name(&self, feature: &Feature<TreeAgeProps>) -> String {
        feature.properties.name.clone()
    }

    fn tooltip_html(&self, feature: &Feature<TreeAgeProps>) -> String {
        let p = &feature.properties;
        let row = |count: u64| {
            format!(
                "{} ({})",
                format_decimal(count as f64, 0),
                display_or_na(p.share(count), 1, "%")
            )
        };
        tooltip_table(
            &p.name,
            &[
                ("Under 5 years", row(p.young)),
                ("5-20 years", row(p.mature)),
                ("Over 20 years", row(p.old)),
                ("Total trees", format_decimal(p.total() as f64, 0)),
            ],
        )
    }

    fn format_value(&self, value: f64) -> String {
        format!("{}%", format_decimal(value, 1))
    }
}
