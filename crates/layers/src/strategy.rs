//! Per-statistic capabilities composed into the generic choropleth layer.

use atlas_common::{Feature, LabelOptions};
use renderer::{Color, RankPolicy};

/// How a statistic maps values to fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    /// Color scale from the visualization setting (stepped or continuous).
    Scale,
    /// Fixed palette distributed over regions sorted by value.
    Rank {
        /// Strongest color first.
        palette: &'static [Color],
        policy: RankPolicy,
    },
}

/// What a concrete statistic supplies to the layer.
pub trait StatisticStrategy<P> {
    /// Short identifier, e.g. `"aging"`.
    fn name(&self) -> &str;

    /// The statistic for a region; `None` renders as "no data".
    fn value(&self, feature: &Feature<P>) -> Option<f64>;

    /// Display name of a region.
    fn region_name(&self, feature: &Feature<P>) -> String;

    /// Tooltip markup for a region.
    fn tooltip_html(&self, feature: &Feature<P>) -> String;

    fn format_value(&self, value: f64) -> String {
        format_decimal(value, 1)
    }

    /// Label lines drawn at the region centroid.
    fn labels(&self, feature: &Feature<P>, options: &LabelOptions) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if options.is_show_region {
            lines.push(self.region_name(feature));
        }
        if options.is_show_value {
            if let Some(v) = self.value(feature) {
                lines.push(self.format_value(v));
            }
        }
        lines
    }

    fn coloring(&self) -> Coloring {
        Coloring::Scale
    }

    /// Changes whenever the strategy starts ranking or valuing regions
    /// differently, so cached fills and rank indices are rebuilt.
    fn sort_key_version(&self) -> u64 {
        0
    }
}

type ValueFn<P> = Box<dyn Fn(&Feature<P>) -> Option<f64>>;
type TooltipFn<P> = Box<dyn Fn(&Feature<P>) -> String>;
type LabelFn<P> = Box<dyn Fn(&Feature<P>, &LabelOptions) -> Vec<String>>;

/// Strategy assembled from closures.
pub struct FnStrategy<P> {
    name: String,
    value: ValueFn<P>,
    tooltip: TooltipFn<P>,
    labels: LabelFn<P>,
    coloring: Coloring,
}

impl<P> FnStrategy<P> {
    pub fn new(
        name: impl Into<String>,
        value: impl Fn(&Feature<P>) -> Option<f64> + 'static,
        tooltip: impl Fn(&Feature<P>) -> String + 'static,
        labels: impl Fn(&Feature<P>, &LabelOptions) -> Vec<String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
            tooltip: Box::new(tooltip),
            labels: Box::new(labels),
            coloring: Coloring::Scale,
        }
    }

    pub fn with_coloring(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }
}

impl<P> std::fmt::Debug for FnStrategy<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStrategy")
            .field("name", &self.name)
            .field("coloring", &self.coloring)
            .finish()
    }
}

impl<P> StatisticStrategy<P> for FnStrategy<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, feature: &Feature<P>) -> Option<f64> {
        (self.value)(feature)
    }

    fn region_name(&self, feature: &Feature<P>) -> String {
        feature.id.to_string()
    }

    fn tooltip_html(&self, feature: &Feature<P>) -> String {
        (self.tooltip)(feature)
    }

    fn labels(&self, feature: &Feature<P>, options: &LabelOptions) -> Vec<String> {
        (self.labels)(feature, options)
    }

    fn coloring(&self) -> Coloring {
        self.coloring
    }
}

/// Escape text for inclusion in tooltip markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Tooltip body: a title and a two-column table. Row values are escaped.
pub fn tooltip_table(title: &str, rows: &[(&str, String)]) -> String {
    let mut html = format!(
        "<div class=\"map-tooltip\"><strong>{}</strong><table>",
        escape_html(title)
    );
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(label),
            escape_html(value)
        ));
    }
    html.push_str("</table></div>");
    html
}

/// Fixed decimals with thousands separators, e.g. `12,345.6`.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Optional value for tooltips; missing values read "N/A".
pub fn display_or_na(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if unit.is_empty() {
                format_decimal(v, decimals)
            } else {
                format!("{} {}", format_decimal(v, decimals), unit)
            }
        }
        _ => "N/A".to_string(),
    }
}
