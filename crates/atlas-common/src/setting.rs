//! Visualization settings for a choropleth layer.
//!
//! Settings originate from the surrounding page (defaults or the legend
//! editor) and are passed in whole; the engine never persists them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, AtlasResult};

/// Smallest bucket count the legend offers.
pub const LEVEL_MIN: u32 = 5;
/// Largest bucket count the legend offers.
pub const LEVEL_MAX: u32 = 10;

/// How values map onto the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Discrete buckets from custom or evenly spaced pivot points.
    #[default]
    Stepped,
    /// Continuous gradient over the value domain.
    Continuous,
}

/// Legend configuration: bucket count, palette and optional custom breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendOptions {
    #[serde(default = "default_level")]
    pub level: u32,

    /// Palette name, resolved by the renderer.
    #[serde(default = "default_palette")]
    pub color: String,

    /// Custom breakpoints; empty means "derive evenly spaced from `level`".
    #[serde(default)]
    pub pivot_points: Vec<f64>,

    #[serde(default)]
    pub scale: ScaleMode,
}

fn default_level() -> u32 {
    LEVEL_MIN
}

fn default_palette() -> String {
    "reds".to_string()
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            level: default_level(),
            color: default_palette(),
            pivot_points: Vec::new(),
            scale: ScaleMode::default(),
        }
    }
}

impl LegendOptions {
    /// True when the caller supplied usable custom breakpoints.
    pub fn has_custom_pivots(&self) -> bool {
        self.normalized_pivots().len() > 1
    }

    /// Pivot points with non-finite values dropped, sorted and deduplicated.
    pub fn normalized_pivots(&self) -> Vec<f64> {
        let mut pivots: Vec<f64> = self
            .pivot_points
            .iter()
            .copied()
            .filter(|p| p.is_finite())
            .collect();
        pivots.sort_by(|a, b| a.total_cmp(b));
        pivots.dedup();
        pivots
    }
}

/// Which text lines are drawn at each region centroid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOptions {
    #[serde(default)]
    pub is_show_region: bool,
    #[serde(default)]
    pub is_show_value: bool,
}

impl LabelOptions {
    pub fn any(&self) -> bool {
        self.is_show_region || self.is_show_value
    }
}

/// Complete visualization setting for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationSetting {
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub legend_options: LegendOptions,
    #[serde(default)]
    pub label_options: LabelOptions,
}

fn default_opacity() -> f32 {
    0.8
}

impl Default for VisualizationSetting {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            legend_options: LegendOptions::default(),
            label_options: LabelOptions::default(),
        }
    }
}

impl VisualizationSetting {
    /// Parse a setting from JSON and validate it.
    pub fn from_json(json: &str) -> AtlasResult<Self> {
        let setting: Self = serde_json::from_str(json).map_err(|e| AtlasError::Parse {
            what: "visualization setting".to_string(),
            message: e.to_string(),
        })?;
        setting.validate()?;
        Ok(setting)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AtlasResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.legend_options.color = palette.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.legend_options.level = level;
        self
    }

    pub fn with_pivots(mut self, pivots: Vec<f64>) -> Self {
        self.legend_options.pivot_points = pivots;
        self
    }

    pub fn with_labels(mut self, region: bool, value: bool) -> Self {
        self.label_options = LabelOptions {
            is_show_region: region,
            is_show_value: value,
        };
        self
    }

    /// Check value ranges. Unsorted pivots are accepted; they are sorted before use.
    pub fn validate(&self) -> AtlasResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(AtlasError::invalid_setting(
                "opacity",
                format!("{} is outside [0, 1]", self.opacity),
            ));
        }

        let level = self.legend_options.level;
        if !(LEVEL_MIN..=LEVEL_MAX).contains(&level) {
            return Err(AtlasError::invalid_setting(
                "legendOptions.level",
                format!("{} is outside [{}, {}]", level, LEVEL_MIN, LEVEL_MAX),
            ));
        }

        if self.legend_options.color.trim().is_empty() {
            return Err(AtlasError::invalid_setting(
                "legendOptions.color",
                "palette name is empty",
            ));
        }

        if self.legend_options.pivot_points.iter().any(|p| !p.is_finite()) {
            return Err(AtlasError::invalid_setting(
                "legendOptions.pivotPoints",
                "pivot points must be finite numbers",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_default() {
        let json = r#"{
            "opacity": 0.7,
            "legendOptions": {"level": 6, "color": "greens", "pivotPoints": []},
            "labelOptions": {"isShowRegion": true, "isShowValue": false}
        }"#;
        let setting = VisualizationSetting::from_json(json).unwrap();
        assert_eq!(setting.legend_options.level, 6);
        assert_eq!(setting.legend_options.scale, ScaleMode::Stepped);
        assert!(setting.label_options.is_show_region);
        assert!(!setting.legend_options.has_custom_pivots());
    }

    #[test]
    fn test_level_out_of_range() {
        let setting = VisualizationSetting::default().with_level(4);
        assert!(setting.validate().is_err());
        let setting = VisualizationSetting::default().with_level(11);
        assert!(setting.validate().is_err());
        let setting = VisualizationSetting::default().with_level(10);
        assert!(setting.validate().is_ok());
    }

    #[test]
    fn test_pivots_sorted_and_deduplicated() {
        let setting = VisualizationSetting::default().with_pivots(vec![30.0, 10.0, 20.0, 10.0]);
        assert_eq!(setting.legend_options.normalized_pivots(), vec![10.0, 20.0, 30.0]);
        assert!(setting.legend_options.has_custom_pivots());
    }

    #[test]
    fn test_non_finite_pivots_rejected() {
        let setting = VisualizationSetting::default().with_pivots(vec![0.0, f64::NAN]);
        assert!(setting.validate().is_err());
    }
}
