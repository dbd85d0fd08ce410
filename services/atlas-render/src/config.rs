//! Dashboard defaults loaded from YAML.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use atlas_common::VisualizationSetting;
use serde::Deserialize;
use tracing::{debug, info};

/// Page-level defaults shared by every rendered statistic.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Setting used when no `--setting` file is given.
    #[serde(default)]
    pub default_setting: Option<VisualizationSetting>,

    /// Label font; labels are skipped without one.
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Output size as `WIDTHxHEIGHT`.
    #[serde(default)]
    pub size: Option<String>,

    #[serde(default = "default_legend_width")]
    pub legend_width: u32,
}

fn default_legend_width() -> u32 {
    220
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_setting: None,
            font_path: None,
            size: None,
            legend_width: default_legend_width(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid dashboard config {}", path.display()))?;
        info!(path = %path.display(), "Loaded dashboard config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        if let Some(setting) = &config.default_setting {
            setting.validate().context("default_setting")?;
        }
        if let Some(size) = &config.size {
            parse_size(size).context("size")?;
        }
        if config.legend_width == 0 {
            bail!("legend_width must be positive");
        }
        debug!(?config, "dashboard config");
        Ok(config)
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .trim()
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w.trim().parse().with_context(|| format!("bad width '{}'", w))?;
    let height: u32 = h.trim().parse().with_context(|| format!("bad height '{}'", h))?;
    if width == 0 || height == 0 {
        bail!("size must be positive, got {}x{}", width, height);
    }
    Ok((width, height))
}

/// Parse a screen point `X,Y`.
pub fn parse_point(s: &str) -> Result<(f32, f32)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected X,Y, got '{}'", s))?;
    Ok((
        x.trim().parse().with_context(|| format!("bad x '{}'", x))?,
        y.trim().parse().with_context(|| format!("bad y '{}'", y))?,
    ))
}
