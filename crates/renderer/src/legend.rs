//! Legend entries and the pivot editor.
//!
//! Entries come from [`BucketScheme::derive`], the same derivation the map
//! fill uses, so a swatch always matches the regions it describes.

use atlas_common::{AtlasResult, ScaleMode, VisualizationSetting, LEVEL_MAX, LEVEL_MIN};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gradient::{Color, Gradient};
use crate::labels::{LabelPainter, TextLabel};
use crate::scale::{even_breaks, value_domain, BucketScheme, DEFAULT_DOMAIN};
use crate::surface::Surface;
use crate::RenderError;

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub lower: f64,
    pub upper: f64,
    pub color: Color,
    pub label: String,
}

/// Legend for one layer, strongest bucket first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub mode: ScaleMode,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Build the legend for the current values and setting.
    ///
    /// In continuous mode the rows sample the gradient at the midpoint of
    /// `level` even steps across the value domain.
    pub fn build(values: &[f64], setting: &VisualizationSetting) -> AtlasResult<Self> {
        let legend = &setting.legend_options;
        let mut entries = match legend.scale {
            ScaleMode::Stepped => {
                let scheme = BucketScheme::derive(values, legend)?;
                Self::from_scheme(&scheme)
            }
            ScaleMode::Continuous => {
                let gradient = Gradient::named(&legend.color)?;
                let (min, max) = value_domain(values).unwrap_or(DEFAULT_DOMAIN);
                let breaks = even_breaks(min, max, legend.level as usize);
                let range = max - min;
                breaks
                    .windows(2)
                    .map(|w| {
                        let mid = (w[0] + w[1]) / 2.0;
                        let t = if range.abs() < f64::EPSILON {
                            0.5
                        } else {
                            (mid - min) / range
                        };
                        LegendEntry {
                            lower: w[0],
                            upper: w[1],
                            color: gradient.sample(t),
                            label: range_label(w[0], w[1]),
                        }
                    })
                    .collect()
            }
        };
        entries.reverse();

        debug!(entries = entries.len(), mode = ?legend.scale, "legend built");
        Ok(Self {
            mode: legend.scale,
            entries,
        })
    }

    /// Lowest bucket first.
    pub fn from_scheme(scheme: &BucketScheme) -> Vec<LegendEntry> {
        (0..scheme.bucket_count())
            .filter_map(|i| {
                let (lower, upper) = scheme.bucket_range(i)?;
                Some(LegendEntry {
                    lower,
                    upper,
                    color: scheme.colors()[i],
                    label: range_label(lower, upper),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a legend bound; whole numbers drop their decimals.
pub fn format_bound(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn range_label(lower: f64, upper: f64) -> String {
    format!("{} - {}", format_bound(lower), format_bound(upper))
}

/// Result of applying the pivot editor, handed back to the owning page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendChange {
    pub level: u32,
    /// Empty means auto mode.
    pub pivot_points: Vec<f64>,
}

impl LegendChange {
    /// Store the change in a setting. The caller triggers the recompute.
    pub fn apply_to(&self, setting: &mut VisualizationSetting) {
        setting.legend_options.level = self.level;
        setting.legend_options.pivot_points = self.pivot_points.clone();
    }
}

/// Draggable breakpoint markers over a gradient bar.
///
/// Markers start as `level + 1` even breaks (or the custom pivots being
/// edited) and always number `level + 1`. The first and last sit at the
/// domain ends and cannot move; interior markers are clamped into the domain
/// and the list is re-sorted after every drag.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotEditor {
    domain: (f64, f64),
    level: u32,
    markers: Vec<f64>,
}

impl PivotEditor {
    /// Non-finite domain ends fall back to the default domain.
    pub fn new(domain: (f64, f64), level: u32) -> Self {
        let (a, b) = match domain {
            (a, b) if a.is_finite() && b.is_finite() => (a, b),
            _ => DEFAULT_DOMAIN,
        };
        let domain = if a <= b { (a, b) } else { (b, a) };
        let level = level.clamp(LEVEL_MIN, LEVEL_MAX);
        Self {
            domain,
            level,
            markers: even_breaks(domain.0, domain.1, level as usize),
        }
    }

    /// Start from a setting: custom pivots if present, otherwise even breaks
    /// over the value domain. Custom pivots whose bucket count the level
    /// selector cannot express restart as even breaks over the same range.
    pub fn from_setting(values: &[f64], setting: &VisualizationSetting) -> Self {
        let legend = &setting.legend_options;
        let pivots = legend.normalized_pivots();
        if pivots.len() > 1 {
            let domain = (pivots[0], pivots[pivots.len() - 1]);
            let buckets = (pivots.len() - 1) as u32;
            if !(LEVEL_MIN..=LEVEL_MAX).contains(&buckets) {
                return Self::new(domain, legend.level);
            }
            return Self {
                domain,
                level: buckets,
                markers: pivots,
            };
        }
        Self::new(value_domain(values).unwrap_or(DEFAULT_DOMAIN), legend.level)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn markers(&self) -> &[f64] {
        &self.markers
    }

    /// Change the bucket count; markers reset to even spacing.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(LEVEL_MIN, LEVEL_MAX);
        self.markers = even_breaks(self.domain.0, self.domain.1, self.level as usize);
    }

    /// Move an interior marker. Returns its index after re-sorting, or
    /// `None` if the marker is fixed or out of range.
    pub fn drag(&mut self, index: usize, value: f64) -> Option<usize> {
        let last = self.markers.len().checked_sub(1)?;
        if index == 0 || index >= last || !value.is_finite() {
            return None;
        }
        let value = value.clamp(self.domain.0, self.domain.1);
        self.markers[index] = value;
        self.markers.sort_by(|a, b| a.total_cmp(b));
        // Ends stay pinned even if an interior marker was dragged onto them.
        self.markers[0] = self.domain.0;
        self.markers[last] = self.domain.1;
        self.markers[1..last]
            .iter()
            .position(|&m| m == value)
            .map(|i| i + 1)
    }

    /// Drag to a position along the bar, `0.0` = left end, `1.0` = right end.
    pub fn drag_to_fraction(&mut self, index: usize, fraction: f64) -> Option<usize> {
        let (min, max) = self.domain;
        let value = min + (max - min) * fraction.clamp(0.0, 1.0);
        self.drag(index, value)
    }

    /// Custom mode: emit the current markers.
    pub fn apply(&self) -> LegendChange {
        LegendChange {
            level: self.level,
            pivot_points: self.markers.clone(),
        }
    }

    /// Auto mode: emit an empty pivot list.
    pub fn auto(&self) -> LegendChange {
        LegendChange {
            level: self.level,
            pivot_points: Vec::new(),
        }
    }
}

const LEGEND_PADDING: f32 = 4.0;
const SWATCH_WIDTH: f32 = 24.0;

/// Paint legend rows top to bottom: a swatch plus its range label.
///
/// Labels are skipped if `labels` has no font.
pub fn render_legend(
    legend: &Legend,
    width: u32,
    swatch_height: u32,
    labels: &LabelPainter,
) -> Result<Surface, RenderError> {
    let rows = legend.entries.len().max(1) as u32;
    let height = rows * swatch_height + 2 * LEGEND_PADDING as u32;
    let mut surface = Surface::new(width, height)?;
    surface.fill_rect(0.0, 0.0, width as f32, height as f32, Color::new(255, 255, 255, 230));

    let mut texts = Vec::with_capacity(legend.entries.len());
    for (row, entry) in legend.entries.iter().enumerate() {
        let y = LEGEND_PADDING + (row as u32 * swatch_height) as f32;
        surface.fill_rect(
            LEGEND_PADDING,
            y,
            SWATCH_WIDTH,
            swatch_height as f32 - 1.0,
            entry.color,
        );
        texts.push(TextLabel::left_aligned(
            (2.0 * LEGEND_PADDING + SWATCH_WIDTH, y + swatch_height as f32 / 2.0),
            entry.label.clone(),
        ));
    }
    labels.draw(&mut surface, &texts);

    Ok(surface)
}
