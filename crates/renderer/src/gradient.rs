//! Colors, named gradients and fixed rank palettes.
//!
//! Gradients are defined by evenly spaced sRGB control points from the
//! weakest (t = 0) to the strongest (t = 1) color and sampled with linear
//! interpolation between neighbouring points.

use std::fmt;

use atlas_common::{AtlasError, AtlasResult};
use serde::{Serialize, Serializer};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA" (leading '#' optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by an opacity in [0, 1].
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    /// CSS notation, e.g. `rgba(255,0,0,1.00)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{:.2})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

// Legend output is consumed as JSON by the page; colors travel as hex.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Fill for regions without a usable statistic.
pub const NO_DATA_FILL: Color = Color::rgb(221, 221, 221);

/// Default region outline.
pub const DEFAULT_STROKE: Color = Color::rgb(255, 255, 255);

/// A named sequential gradient.
#[derive(Debug)]
pub struct Gradient {
    pub name: &'static str,
    /// Control points, weakest first.
    points: &'static [[u8; 3]],
}

impl Gradient {
    /// Look up a gradient by (case-insensitive) name.
    pub fn named(name: &str) -> AtlasResult<&'static Gradient> {
        let wanted = name.trim().to_ascii_lowercase();
        GRADIENTS
            .iter()
            .copied()
            .find(|g| g.name == wanted)
            .ok_or_else(|| AtlasError::UnknownPalette(name.to_string()))
    }

    /// Names of every built-in gradient.
    pub fn names() -> impl Iterator<Item = &'static str> {
        GRADIENTS.iter().map(|g| g.name)
    }

    /// Sample at `t` in [0, 1]; 0 is the weakest color, 1 the strongest.
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.points.len();
        if n == 1 {
            let [r, g, b] = self.points[0];
            return Color::rgb(r, g, b);
        }

        let scaled = t * (n - 1) as f64;
        let lo = (scaled.floor() as usize).min(n - 2);
        let frac = (scaled - lo as f64) as f32;
        let [r0, g0, b0] = self.points[lo];
        let [r1, g1, b1] = self.points[lo + 1];
        interpolate_color(Color::rgb(r0, g0, b0), Color::rgb(r1, g1, b1), frac)
    }

    /// `n` colors at evenly spaced stops from strongest to weakest.
    ///
    /// A single color samples the strongest end.
    pub fn sample_discrete(&self, n: usize) -> Vec<Color> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(1.0)],
            _ => (0..n)
                .map(|k| self.sample(1.0 - k as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

static REDS: Gradient = Gradient {
    name: "reds",
    points: &[
        [255, 245, 240],
        [254, 224, 210],
        [252, 187, 161],
        [252, 146, 114],
        [251, 106, 74],
        [239, 59, 44],
        [203, 24, 29],
        [153, 0, 13],
    ],
};

static BLUES: Gradient = Gradient {
    name: "blues",
    points: &[
        [247, 251, 255],
        [222, 235, 247],
        [198, 219, 239],
        [158, 202, 225],
        [107, 174, 214],
        [66, 146, 198],
        [33, 113, 181],
        [8, 69, 148],
    ],
};

static GREENS: Gradient = Gradient {
    name: "greens",
    points: &[
        [247, 252, 245],
        [229, 245, 224],
        [199, 233, 192],
        [161, 217, 155],
        [116, 196, 118],
        [65, 171, 93],
        [35, 139, 69],
        [0, 90, 50],
    ],
};

static ORANGES: Gradient = Gradient {
    name: "oranges",
    points: &[
        [255, 245, 235],
        [254, 230, 206],
        [253, 208, 162],
        [253, 174, 107],
        [253, 141, 60],
        [241, 105, 19],
        [217, 72, 1],
        [140, 45, 4],
    ],
};

static PURPLES: Gradient = Gradient {
    name: "purples",
    points: &[
        [252, 251, 253],
        [239, 237, 245],
        [218, 218, 235],
        [188, 189, 220],
        [158, 154, 200],
        [128, 125, 186],
        [106, 81, 163],
        [74, 20, 134],
    ],
};

static YLORRD: Gradient = Gradient {
    name: "ylorrd",
    points: &[
        [255, 255, 204],
        [255, 237, 160],
        [254, 217, 118],
        [254, 178, 76],
        [253, 141, 60],
        [252, 78, 42],
        [227, 26, 28],
        [177, 0, 38],
    ],
};

static YLGN: Gradient = Gradient {
    name: "ylgn",
    points: &[
        [255, 255, 229],
        [247, 252, 185],
        [217, 240, 163],
        [173, 221, 142],
        [120, 198, 121],
        [65, 171, 93],
        [35, 132, 67],
        [0, 90, 50],
    ],
};

static VIRIDIS: Gradient = Gradient {
    name: "viridis",
    points: &[
        [253, 231, 37],
        [170, 220, 50],
        [94, 201, 98],
        [39, 173, 129],
        [33, 145, 140],
        [44, 114, 142],
        [59, 82, 139],
        [72, 40, 120],
        [68, 1, 84],
    ],
};

static SPECTRAL: Gradient = Gradient {
    name: "spectral",
    points: &[
        [50, 136, 189],
        [102, 194, 165],
        [171, 221, 164],
        [230, 245, 152],
        [254, 224, 139],
        [253, 174, 97],
        [244, 109, 67],
        [213, 62, 79],
    ],
};

static GRADIENTS: &[&Gradient] = &[
    &REDS, &BLUES, &GREENS, &ORANGES, &PURPLES, &YLORRD, &YLGN, &VIRIDIS, &SPECTRAL,
];

/// Small fixed palettes for rank-based coloring, strongest first.
pub mod rank_palettes {
    use super::Color;

    pub const WARM: [Color; 5] = [
        Color::rgb(189, 0, 38),
        Color::rgb(240, 59, 32),
        Color::rgb(253, 141, 60),
        Color::rgb(254, 204, 92),
        Color::rgb(255, 255, 178),
    ];

    pub const COOL: [Color; 5] = [
        Color::rgb(8, 81, 156),
        Color::rgb(49, 130, 189),
        Color::rgb(107, 174, 214),
        Color::rgb(189, 215, 231),
        Color::rgb(239, 243, 255),
    ];

    pub const GREEN: [Color; 5] = [
        Color::rgb(0, 109, 44),
        Color::rgb(49, 163, 84),
        Color::rgb(116, 196, 118),
        Color::rgb(186, 228, 179),
        Color::rgb(237, 248, 233),
    ];

    /// Diverging palette for gain/loss comparisons.
    pub const DIVERGING: [Color; 5] = [
        Color::rgb(26, 150, 65),
        Color::rgb(166, 217, 106),
        Color::rgb(255, 255, 191),
        Color::rgb(253, 174, 97),
        Color::rgb(215, 25, 28),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("00ff0080"), Some(Color::new(0, 255, 0, 128)));
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex("#FFF"), None);
        assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203");
    }

    #[test]
    fn test_css_display() {
        assert_eq!(Color::new(10, 20, 30, 255).to_string(), "rgba(10,20,30,1.00)");
    }

    #[test]
    fn test_gradient_endpoints() {
        let reds = Gradient::named("Reds").unwrap();
        assert_eq!(reds.sample(0.0), Color::rgb(255, 245, 240));
        assert_eq!(reds.sample(1.0), Color::rgb(153, 0, 13));
        assert_eq!(reds.sample(7.0), reds.sample(1.0));
    }

    #[test]
    fn test_unknown_gradient() {
        assert!(matches!(
            Gradient::named("rainbow"),
            Err(AtlasError::UnknownPalette(_))
        ));
    }

    #[test]
    fn test_discrete_samples_strongest_first() {
        let blues = Gradient::named("blues").unwrap();
        let colors = blues.sample_discrete(5);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], blues.sample(1.0));
        assert_eq!(colors[4], blues.sample(0.0));
        assert_eq!(blues.sample_discrete(1), vec![blues.sample(1.0)]);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        assert_eq!(Color::rgb(0, 0, 0).with_opacity(0.5).a, 128);
        assert_eq!(Color::rgb(0, 0, 0).with_opacity(2.0).a, 255);
    }
}
