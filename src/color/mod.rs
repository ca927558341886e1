// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color value model and colorimetric conversions
//!
//! Every color literal found in source text is normalized into a [`ColorValue`]:
//! an upper-case `#RRGGBB` string for anything that resolves to sRGB, or the
//! compacted literal for HSL and unresolved `var()` references. Only the
//! former take part in luminance, contrast and distance computations.
//!
//! Luminance follows WCAG 2.x:
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

mod parse;

pub use parse::{named_hex, normalize, NAMED_COLORS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Channel values at or below this are linearized by a straight division.
const LINEARIZE_THRESHOLD: f64 = 0.03928;

/// How a color was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// `#rgb` / `#rrggbb`
    Hex,
    /// `rgb()` / `rgba()`
    Rgb,
    /// `hsl()` / `hsla()`, kept but never measured
    Hsl,
    /// A CSS named color from the fixed set
    Named,
    /// A `var(--name)` reference
    CssVariable,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Hex => write!(f, "hex"),
            SourceFormat::Rgb => write!(f, "rgb"),
            SourceFormat::Hsl => write!(f, "hsl"),
            SourceFormat::Named => write!(f, "named"),
            SourceFormat::CssVariable => write!(f, "css_variable"),
        }
    }
}

/// An sRGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Canonical representation of one color.
///
/// Equality and hashing consider only the normalized value, so `#abc`,
/// `#AABBCC`, `rgb(170, 187, 204)` all compare equal regardless of the
/// format they were written in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorValue {
    value: String,
    source_format: SourceFormat,
}

impl ColorValue {
    /// Parse and normalize a color literal. Returns `None` for anything that is
    /// not a color.
    pub fn parse(literal: &str) -> Option<Self> {
        normalize(literal)
    }

    /// Build a resolved color from channels
    pub fn from_rgb(rgb: Rgb, source_format: SourceFormat) -> Self {
        Self {
            value: rgb.to_hex(),
            source_format,
        }
    }

    pub(crate) fn from_normalized(value: String, source_format: SourceFormat) -> Self {
        Self {
            value,
            source_format,
        }
    }

    /// The normalized value (`#RRGGBB`, or the compact literal when unresolved)
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source_format(&self) -> SourceFormat {
        self.source_format
    }

    /// Channels, when this color resolved to sRGB
    pub fn rgb(&self) -> Option<Rgb> {
        let hex = self.value.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::new(r, g, b))
    }

    /// Whether luminance, contrast and distance are defined for this color
    pub fn is_resolvable(&self) -> bool {
        self.rgb().is_some()
    }

    /// WCAG relative luminance in [0, 1]
    pub fn relative_luminance(&self) -> Option<f64> {
        let rgb = self.rgb()?;
        let [r, g, b] = rgb.channels().map(|c| {
            let v = c as f64 / 255.0;
            if v <= LINEARIZE_THRESHOLD {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        });
        Some(0.2126 * r + 0.7152 * g + 0.0722 * b)
    }
}

impl PartialEq for ColorValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ColorValue {}

impl Hash for ColorValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// WCAG contrast ratio between two colors, in [1, 21].
///
/// Order independent. `None` when either side has no luminance.
pub fn contrast_ratio(a: &ColorValue, b: &ColorValue) -> Option<f64> {
    let la = a.relative_luminance()?;
    let lb = b.relative_luminance()?;
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };

    let denominator = darker + 0.05;
    if !denominator.is_finite() || denominator <= 0.0 {
        return None;
    }
    Some((lighter + 0.05) / denominator)
}

/// Euclidean distance in 0-255 RGB space.
///
/// A cheap similarity heuristic for token matching and clustering, never used
/// for accessibility judgments.
pub fn color_distance(a: &ColorValue, b: &ColorValue) -> Option<f64> {
    let a = a.rgb()?;
    let b = b.rgb()?;
    let sum: f64 = a
        .channels()
        .iter()
        .zip(b.channels().iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    Some(sum.sqrt())
}

/// Composite `foreground` at `alpha` opacity over an opaque `background`.
///
/// Channels are truncated, not rounded.
pub fn blend(foreground: &ColorValue, background: &ColorValue, alpha: f64) -> Option<ColorValue> {
    let fg = foreground.rgb()?;
    let bg = background.rgb()?;
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f as f64 * alpha + b as f64 * (1.0 - alpha)) as u8;
    Some(ColorValue::from_rgb(
        Rgb::new(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b)),
        SourceFormat::Hex,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> ColorValue {
        ColorValue::parse(s).expect("valid color")
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(c("#000000").relative_luminance(), Some(0.0));
        let white = c("#FFFFFF").relative_luminance().unwrap();
        assert!((white - 1.0).abs() < 1e-9, "white luminance was {}", white);
    }

    #[test]
    fn test_luminance_undefined_for_hsl() {
        assert!(c("hsl(210, 50%, 40%)").relative_luminance().is_none());
        assert!(c("var(--color-trust-800)").relative_luminance().is_none());
    }

    #[test]
    fn test_black_white_contrast_is_21() {
        let ratio = contrast_ratio(&c("#000000"), &c("#FFFFFF")).unwrap();
        assert!((ratio - 21.0).abs() < 1e-6, "got {}", ratio);
    }

    #[test]
    fn test_contrast_symmetric() {
        let pairs = [("#767676", "#ffffff"), ("#1E3A8A", "#C7D2FE"), ("red", "#0F172A")];
        for (a, b) in pairs {
            let ab = contrast_ratio(&c(a), &c(b)).unwrap();
            let ba = contrast_ratio(&c(b), &c(a)).unwrap();
            assert_eq!(ab, ba, "{} / {}", a, b);
        }
    }

    #[test]
    fn test_known_gray_on_white() {
        let ratio = contrast_ratio(&c("#767676"), &c("#ffffff")).unwrap();
        assert!((ratio - 4.54).abs() < 0.01, "got {:.3}", ratio);
    }

    #[test]
    fn test_same_color_contrast_is_one() {
        let ratio = contrast_ratio(&c("#808080"), &c("gray")).unwrap();
        assert!((ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contrast_fails_for_unresolved() {
        assert!(contrast_ratio(&c("hsl(0, 0%, 0%)"), &c("#fff")).is_none());
    }

    #[test]
    fn test_distance() {
        let d = color_distance(&c("#101010"), &c("#111111")).unwrap();
        assert!((d - 3f64.sqrt()).abs() < 1e-9);
        assert_eq!(color_distance(&c("#000"), &c("#000")), Some(0.0));
        assert!(color_distance(&c("#000"), &c("hsl(0, 0%, 0%)")).is_none());
    }

    #[test]
    fn test_blend_white_over_light_blue() {
        let mixed = blend(&c("#FFFFFF"), &c("#F0F4FF"), 0.5).unwrap();
        // 127.5 + 120 = 247.5 -> 247, truncated
        assert_eq!(mixed.as_str(), "#F7F9FF");
    }

    #[test]
    fn test_equality_ignores_source_format() {
        assert_eq!(c("rgb(255, 255, 255)"), c("white"));
        assert_eq!(c("rgb(255, 255, 255)").source_format(), SourceFormat::Rgb);
        assert_eq!(c("white").source_format(), SourceFormat::Named);
    }
}
