//! Color scales mapping statistic values to fills.
//!
//! [`BucketScheme`] is the single derivation of bucket boundaries and
//! bucket colors. The map fill ([`ColorScale::Threshold`]) and the legend
//! both read from it, so a value sitting exactly on a boundary gets the same
//! color in both places.

use atlas_common::{AtlasResult, LegendOptions, ScaleMode, VisualizationSetting};
use tracing::debug;

use crate::gradient::{Color, Gradient};

/// Domain used when no feature has a usable value.
pub const DEFAULT_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Keep finite values only; `None` and NaN/inf are "no data".
pub fn collect_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect()
}

/// `[min, max]` of the values, or `None` when empty.
pub fn value_domain(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// `n + 1` evenly spaced breakpoints across `[min, max]`.
pub fn even_breaks(min: f64, max: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    let mut breaks: Vec<f64> = (0..=n)
        .map(|i| min + (max - min) * i as f64 / n as f64)
        .collect();
    breaks[n] = max;
    breaks
}

/// Bucket boundaries plus one color per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketScheme {
    /// `N + 1` ascending breakpoints; the first and last span the domain.
    breaks: Vec<f64>,
    /// `N` colors, lowest bucket first.
    colors: Vec<Color>,
}

impl BucketScheme {
    /// Derive buckets from the legend options and the current values.
    ///
    /// Custom pivots win when more than one usable pivot is given; otherwise
    /// `level` evenly spaced buckets cover the value domain.
    pub fn derive(values: &[f64], legend: &LegendOptions) -> AtlasResult<Self> {
        let gradient = Gradient::named(&legend.color)?;

        let pivots = legend.normalized_pivots();
        let breaks = if pivots.len() > 1 {
            pivots
        } else {
            let (min, max) = value_domain(values).unwrap_or(DEFAULT_DOMAIN);
            even_breaks(min, max, legend.level as usize)
        };

        let n = breaks.len() - 1;
        let mut colors = gradient.sample_discrete(n);
        colors.reverse();

        Ok(Self { breaks, colors })
    }

    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    /// Interior boundaries, excluding the domain ends.
    pub fn interior(&self) -> &[f64] {
        &self.breaks[1..self.breaks.len() - 1]
    }

    pub fn bucket_count(&self) -> usize {
        self.colors.len()
    }

    /// Bucket colors, lowest bucket first.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// `(lower, upper)` bounds of bucket `i`.
    pub fn bucket_range(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.breaks.get(i)?, *self.breaks.get(i + 1)?))
    }

    /// Bucket index for a value.
    ///
    /// A value equal to an interior boundary belongs to the upper bucket;
    /// values beyond either end clamp to the extreme bucket.
    pub fn bucket_of(&self, value: f64) -> usize {
        self.interior().partition_point(|&b| b <= value)
    }

    pub fn color_of(&self, value: f64) -> Color {
        self.colors[self.bucket_of(value)]
    }
}

/// Function from value to color.
#[derive(Debug, Clone)]
pub enum ColorScale {
    /// Gradient sampled continuously over `[min, max]`.
    Continuous {
        domain: (f64, f64),
        gradient: &'static Gradient,
    },
    /// Step function over discrete buckets.
    Threshold(BucketScheme),
}

impl ColorScale {
    pub fn color(&self, value: f64) -> Color {
        match self {
            ColorScale::Continuous { domain, gradient } => {
                let (min, max) = *domain;
                let range = max - min;
                let t = if range.abs() < f64::EPSILON {
                    0.5
                } else {
                    ((value - min) / range).clamp(0.0, 1.0)
                };
                gradient.sample(t)
            }
            ColorScale::Threshold(scheme) => scheme.color_of(value),
        }
    }

    pub fn buckets(&self) -> Option<&BucketScheme> {
        match self {
            ColorScale::Threshold(scheme) => Some(scheme),
            ColorScale::Continuous { .. } => None,
        }
    }
}

/// Build the color scale for a set of values under a setting.
pub fn create_color_scale(values: &[f64], setting: &VisualizationSetting) -> AtlasResult<ColorScale> {
    let legend = &setting.legend_options;
    let scale = match legend.scale {
        ScaleMode::Continuous => ColorScale::Continuous {
            domain: value_domain(values).unwrap_or(DEFAULT_DOMAIN),
            gradient: Gradient::named(&legend.color)?,
        },
        ScaleMode::Stepped => ColorScale::Threshold(BucketScheme::derive(values, legend)?),
    };
    debug!(
        values = values.len(),
        palette = %legend.color,
        mode = ?legend.scale,
        "color scale created"
    );
    Ok(scale)
}
