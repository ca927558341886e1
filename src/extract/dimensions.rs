// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Spacing, radius, shadow and component-class usage

use crate::config::SpacingConfig;
use crate::error::Result;
use crate::extract::LineIndex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tolerance when testing a length against the rhythm or a token
const PX_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingSource {
    /// `margin`/`padding`/`gap` declarations
    Declaration,
    /// Utility classes such as `p-4` or `space-y-6`
    Utility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpacingHit {
    pub value: String,
    pub line: usize,
    pub standard: bool,
    pub source: SpacingSource,
}

/// A property value and the line it sits on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueHit {
    pub value: String,
    pub line: usize,
}

/// Component classes that appear together in one `class` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHit {
    pub classes: Vec<String>,
    pub line: usize,
}

/// The spacing scale a length is judged against
#[derive(Debug, Clone)]
pub struct SpacingScale {
    rhythm_px: f64,
    root_font_px: f64,
    token_px: Vec<f64>,
    steps: BTreeSet<String>,
}

impl SpacingScale {
    pub fn from_config(config: &SpacingConfig) -> Self {
        let mut scale = Self {
            rhythm_px: config.rhythm_px,
            root_font_px: config.root_font_px,
            token_px: Vec::new(),
            steps: config.scale.keys().cloned().collect(),
        };
        scale.token_px = config
            .scale
            .values()
            .filter_map(|v| scale.length_px(v))
            .collect();
        scale
    }

    /// Convert `12px`, `0.75rem` or `1em` to px. Percentages and bare numbers
    /// have no absolute size.
    pub fn length_px(&self, value: &str) -> Option<f64> {
        let value = value.trim().to_ascii_lowercase();
        let (number, factor) = if let Some(n) = value.strip_suffix("px") {
            (n, 1.0)
        } else if let Some(n) = value.strip_suffix("rem") {
            (n, self.root_font_px)
        } else if let Some(n) = value.strip_suffix("em") {
            (n, self.root_font_px)
        } else {
            return None;
        };
        let number: f64 = number.parse().ok()?;
        Some(number * factor)
    }

    /// On the rhythm grid or equal to a spacing token
    pub fn is_standard_px(&self, px: f64) -> bool {
        let steps = px / self.rhythm_px;
        if (steps - steps.round()).abs() < PX_EPSILON {
            return true;
        }
        self.token_px.iter().any(|t| (t - px).abs() < PX_EPSILON)
    }

    pub fn is_standard_step(&self, step: &str) -> bool {
        self.steps.contains(step)
    }
}

pub struct DimensionPatterns {
    scale: SpacingScale,
    spacing_decl: Regex,
    length: Regex,
    spacing_utility: Regex,
    radius: Regex,
    shadow: Regex,
    class_attribute: Regex,
    component: Regex,
}

impl DimensionPatterns {
    pub fn new(config: &SpacingConfig) -> Result<Self> {
        Ok(Self {
            scale: SpacingScale::from_config(config),
            spacing_decl: Regex::new(
                r"(?i)(?:^|[^-\w])(?:margin|padding|gap|row-gap|column-gap)(?:-(?:top|right|bottom|left|inline|block)(?:-(?:start|end))?)?\s*:\s*([^;}\n]+)",
            )?,
            length: Regex::new(r"(?i)(?:^|[\s,(])(-?[\d.]+(?:px|rem|em|%))")?,
            spacing_utility: Regex::new(
                r"(?:^|[\s:'\x22])-?(?:p[xytrbl]?|m[xytrbl]?|gap(?:-[xy])?|space-[xy])-(\d+(?:\.\d+)?)\b",
            )?,
            radius: Regex::new(r"(?i)border-radius\s*:\s*([^;}\n]+)")?,
            shadow: Regex::new(r"(?i)box-shadow\s*:\s*([^;}\n]+)")?,
            class_attribute: Regex::new(r#"\bclass(?:Name)?\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            component: Regex::new(r"^(?:btn|button|card|bento-card)(?:[-_][\w-]*)?$")?,
        })
    }

    /// Spacing lengths from declarations and utility classes.
    ///
    /// Zero lengths and percentages are not counted.
    pub fn spacing(&self, text: &str) -> Vec<SpacingHit> {
        let lines = LineIndex::new(text);
        let mut hits = Vec::new();

        for caps in self.spacing_decl.captures_iter(text) {
            let Some(value) = caps.get(1) else { continue };
            let line = lines.line_of(value.start());
            for length in self.length.captures_iter(value.as_str()) {
                let raw = length[1].trim_start_matches('-');
                let Some(px) = self.scale.length_px(raw) else {
                    continue;
                };
                if px == 0.0 {
                    continue;
                }
                hits.push(SpacingHit {
                    value: raw.to_string(),
                    line,
                    standard: self.scale.is_standard_px(px),
                    source: SpacingSource::Declaration,
                });
            }
        }

        for caps in self.spacing_utility.captures_iter(text) {
            let Some(step) = caps.get(1) else { continue };
            let Some(whole) = caps.get(0) else { continue };
            let class = whole
                .as_str()
                .trim_start_matches(|c: char| !c.is_ascii_alphabetic() && c != '-');
            hits.push(SpacingHit {
                value: class.to_string(),
                line: lines.line_of(step.start()),
                standard: self.scale.is_standard_step(step.as_str()),
                source: SpacingSource::Utility,
            });
        }

        hits
    }

    pub fn radii(&self, text: &str) -> Vec<ValueHit> {
        value_hits(&self.radius, text)
    }

    pub fn shadows(&self, text: &str) -> Vec<ValueHit> {
        value_hits(&self.shadow, text)
    }

    /// Button and card classes per `class` attribute
    pub fn components(&self, text: &str) -> Vec<ComponentHit> {
        let lines = LineIndex::new(text);
        let mut hits = Vec::new();

        for caps in self.class_attribute.captures_iter(text) {
            let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let classes: Vec<String> = value
                .as_str()
                .split_whitespace()
                .filter(|class| self.component.is_match(class))
                .map(str::to_string)
                .collect();
            if !classes.is_empty() {
                hits.push(ComponentHit {
                    classes,
                    line: lines.line_of(value.start()),
                });
            }
        }

        hits
    }
}

fn value_hits(re: &Regex, text: &str) -> Vec<ValueHit> {
    let lines = LineIndex::new(text);
    re.captures_iter(text)
        .filter_map(|caps| {
            let value = caps.get(1)?;
            let trimmed = value
                .as_str()
                .trim()
                .trim_end_matches("!important")
                .trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(ValueHit {
                value: trimmed.to_string(),
                line: lines.line_of(value.start()),
            })
        })
        .collect()
}
