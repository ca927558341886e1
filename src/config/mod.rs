// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration for palettebot
//!
//! The design-token tables (palette, spacing scale, font-size scale,
//! deprecated tokens) live here as plain data. They are loaded once, validated
//! when the engine is built, and never mutated during a run.

use crate::error::{PaletteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Color tokens: name -> hex value
    #[serde(default = "default_palette")]
    pub palette: BTreeMap<String, String>,

    #[serde(default)]
    pub spacing: SpacingConfig,

    #[serde(default)]
    pub typography: TypographyConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub weights: ScoreWeights,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Deprecated color tokens: name -> replacement token
    #[serde(default = "default_deprecated")]
    pub deprecated: BTreeMap<String, String>,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingConfig {
    /// Base rhythm in px; spacing lengths should be multiples of it
    pub rhythm_px: f64,
    /// px per rem/em when converting lengths
    pub root_font_px: f64,
    /// Utility spacing scale: step -> length
    pub scale: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypographyConfig {
    /// Font-size tokens: name -> length
    pub font_sizes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// RGB distance under which a color counts as a palette token
    pub token_match_distance: f64,
    /// RGB distance under which undefined colors join a cluster
    pub cluster_distance: f64,
    /// Characters of context kept either side of a match
    pub context_radius: usize,
    /// Characters scanned before a named color for `:` or `=`
    pub named_color_lookback: usize,
    /// Occurrences retained per undefined color
    pub max_record_occurrences: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub color: f64,
    pub spacing: f64,
    pub typography: f64,
    /// Fixed score reported for the components category
    pub components_placeholder: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Context fragments marking third-party embed markup (case-insensitive)
    pub third_party_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions collected from the source tree
    pub extensions: Vec<String>,
    /// Extensions parsed into declaration blocks
    pub stylesheet_extensions: Vec<String>,
    /// Extensions scanned for `class` and `style` attributes
    pub markup_extensions: Vec<String>,
    /// Directory names skipped during traversal
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            spacing: SpacingConfig::default(),
            typography: TypographyConfig::default(),
            thresholds: Thresholds::default(),
            weights: ScoreWeights::default(),
            extraction: ExtractionConfig::default(),
            deprecated: default_deprecated(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            rhythm_px: 4.0,
            root_font_px: 16.0,
            scale: string_map(&[
                ("1", "0.25rem"),
                ("2", "0.5rem"),
                ("3", "0.75rem"),
                ("4", "1rem"),
                ("5", "1.25rem"),
                ("6", "1.5rem"),
                ("7", "1.75rem"),
                ("8", "2rem"),
                ("9", "2.5rem"),
                ("10", "3rem"),
                ("12", "4rem"),
            ]),
        }
    }
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            font_sizes: string_map(&[
                ("xxs", "0.625rem"),
                ("xs", "0.75rem"),
                ("sm", "0.875rem"),
                ("base", "1rem"),
                ("lg", "1.125rem"),
                ("xl", "1.25rem"),
                ("2xl", "1.5rem"),
                ("3xl", "1.875rem"),
                ("4xl", "2.25rem"),
            ]),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            token_match_distance: 10.0,
            cluster_distance: 5.0,
            context_radius: 50,
            named_color_lookback: 10,
            max_record_occurrences: 10,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            color: 0.3,
            spacing: 0.3,
            typography: 0.4,
            components_placeholder: 75.0,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            third_party_markers: [
                "instagram-media",
                "data-instgrm",
                "instagram.com",
                "facebook.com",
                "twitter.com",
                "youtube.com",
                "embed",
                "iframe",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            extensions: list(&[
                "css", "scss", "less", "html", "htm", "njk", "js", "jsx", "tsx", "vue", "svelte",
            ]),
            stylesheet_extensions: list(&["css", "scss", "less"]),
            markup_extensions: list(&["html", "htm", "njk", "jsx", "tsx", "vue", "svelte"]),
            exclude: list(&[
                "node_modules",
                ".git",
                "target",
                "dist",
                "build",
                "_site",
                "vendor",
                "coverage",
            ]),
        }
    }
}

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_palette() -> BTreeMap<String, String> {
    string_map(&[
        ("trust-50", "#F0F4FF"),
        ("trust-100", "#E0E7FF"),
        ("trust-200", "#C7D2FE"),
        ("trust-500", "#6366F1"),
        ("trust-600", "#4F46E5"),
        ("trust-700", "#4338CA"),
        ("trust-800", "#1E3A8A"),
        ("trust-900", "#0F172A"),
        ("trust-950", "#020617"),
        ("sand-50", "#FDFBF7"),
        ("sand-100", "#F7F4EF"),
        ("sand-200", "#E2DCD3"),
        ("sand-300", "#D6CCC2"),
        ("slate-300", "#CBD5E1"),
        ("slate-400", "#94A3B8"),
        ("slate-500", "#64748B"),
        ("slate-600", "#475569"),
        ("white", "#FFFFFF"),
        ("black", "#000000"),
    ])
}

fn default_deprecated() -> BTreeMap<String, String> {
    string_map(&[
        ("brand-primary", "trust-950"),
        ("brand-accent", "trust-800"),
        ("brand-cta", "trust-200"),
        ("brand-cta-hover", "trust-800"),
        ("accent", "trust-800"),
        ("accent-weak", "trust-600"),
        ("accent-strong", "trust-950"),
        ("neutral-50", "sand-50"),
        ("neutral-100", "sand-100"),
        ("neutral-200", "sand-200"),
        ("neutral-300", "sand-200"),
        ("neutral-400", "slate-500"),
        ("neutral-900", "trust-900"),
        ("neutral-950", "trust-950"),
        ("surface", "white"),
        ("surface-alt", "sand-100"),
        ("surface-2", "sand-50"),
        ("surface-3", "trust-950"),
        ("surface-elevated", "white"),
        ("text", "slate-600"),
        ("text-main", "trust-900"),
        ("text-subtle", "slate-500"),
        ("text-on-dark", "trust-50"),
        ("text-on-accent", "white"),
        ("text-link", "trust-600"),
        ("text-link-hover", "trust-800"),
        ("border", "sand-200"),
        ("border-strong", "sand-300"),
        ("border-subtle", "sand-100"),
        ("border-dark", "trust-900"),
        ("dark", "trust-950"),
        ("cta", "trust-200"),
        ("primary-accent", "trust-800"),
        ("gray-bg", "sand-200"),
        ("light-bg", "sand-50"),
        ("text-dark", "trust-900"),
        ("text-light", "trust-50"),
        ("dawn-orange", "sand-50"),
        ("dawn-blue", "trust-50"),
        ("dawn-accent", "trust-600"),
    ])
}

impl Config {
    /// Reject values that would make scoring or matching meaningless
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.color", w.color),
            ("weights.spacing", w.spacing),
            ("weights.typography", w.typography),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PaletteError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=100.0).contains(&w.components_placeholder) {
            return Err(PaletteError::Config(format!(
                "weights.components_placeholder must be within 0-100, got {}",
                w.components_placeholder
            )));
        }
        let t = &self.thresholds;
        if t.token_match_distance < 0.0 || t.cluster_distance < 0.0 {
            return Err(PaletteError::Config(
                "distance thresholds must be non-negative".to_string(),
            ));
        }
        if self.spacing.rhythm_px <= 0.0 || self.spacing.root_font_px <= 0.0 {
            return Err(PaletteError::Config(
                "spacing.rhythm_px and spacing.root_font_px must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("palettebot")
        .join("config.yml")
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: Config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    config.validate()?;
    Ok(config)
}

pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::to_string_pretty(&config)
            .map_err(|e| PaletteError::Config(format!("TOML serialize error: {}", e)))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}
