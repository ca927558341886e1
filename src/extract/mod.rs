// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color extraction from source text
//!
//! Four patterns run over each file in turn (hex, `rgb()`, `hsl()`, named
//! colors). A position matched by more than one pattern is reported once per
//! pattern. Matches are dropped when their context window mentions a
//! third-party embed, or when they sit on the value side of a custom-property
//! definition (`--token: #xxxxxx;`), since those are token definitions rather
//! than usages.

pub mod dimensions;
pub mod typography;
pub mod utility;

use crate::color::{normalize, ColorValue, NAMED_COLORS};
use crate::config::Config;
use crate::error::Result;
use regex::{Matches, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One sighting of a color literal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorOccurrence {
    pub color: ColorValue,
    pub file: PathBuf,
    /// 1-based
    pub line: usize,
    pub context: String,
}

/// Byte offset to 1-based line lookup
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// The slice of `text` within `radius` characters of `start..end`.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let from = if radius == 0 { start } else { from };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

/// Collapse a context slice onto one line for reporting
pub fn flatten_context(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `offset` sits on the value side of a `--name: value` declaration
pub fn in_custom_property_definition(text: &str, offset: usize) -> bool {
    let head = &text[..offset];
    let decl_start = head
        .rfind(|c| matches!(c, ';' | '{' | '}' | '\n'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let declaration = head[decl_start..].trim_start();
    declaration.starts_with("--") && declaration.contains(':')
}

/// Drops matches whose surroundings mention a third-party embed
#[derive(Debug, Clone)]
pub struct EmbedFilter {
    markers: Vec<String>,
    radius: usize,
}

impl EmbedFilter {
    pub fn new(config: &Config) -> Self {
        Self {
            markers: config
                .extraction
                .third_party_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            radius: config.thresholds.context_radius,
        }
    }

    /// Context window around `start..end`
    pub fn window<'t>(&self, text: &'t str, start: usize, end: usize) -> &'t str {
        context_window(text, start, end, self.radius)
    }

    /// Whether a context slice mentions a third-party embed (case-insensitive)
    pub fn is_third_party(&self, context: &str) -> bool {
        let lower = context.to_lowercase();
        self.markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// Whether the match at `start..end` is embed noise
    pub fn excludes(&self, text: &str, start: usize, end: usize) -> bool {
        self.is_third_party(self.window(text, start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Hex,
    Rgb,
    Hsl,
    Named,
}

impl Stage {
    const ORDER: [Stage; 4] = [Stage::Hex, Stage::Rgb, Stage::Hsl, Stage::Named];
}

/// Compiled color patterns and exclusion settings, shared by every file in a run
#[derive(Debug)]
pub struct ColorPatterns {
    hex: Regex,
    rgb: Regex,
    hsl: Regex,
    named: Regex,
    embeds: EmbedFilter,
    named_lookback: usize,
}

impl ColorPatterns {
    pub fn new(config: &Config) -> Result<Self> {
        let names = NAMED_COLORS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            hex: Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b")?,
            rgb: Regex::new(
                r"(?i)rgba?\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*(?:,\s*[\d.]+%?\s*)?\)",
            )?,
            hsl: Regex::new(
                r"(?i)hsla?\(\s*[\d.]+(?:deg)?\s*,\s*[\d.]+%\s*,\s*[\d.]+%\s*(?:,\s*[\d.]+%?\s*)?\)",
            )?,
            named: Regex::new(&format!(r"(?i)\b(?:{})\b", names))?,
            embeds: EmbedFilter::new(config),
            named_lookback: config.thresholds.named_color_lookback,
        })
    }

    /// Lazily iterate the color occurrences in one file.
    pub fn occurrences<'a>(&'a self, file: &'a Path, text: &'a str) -> Occurrences<'a> {
        Occurrences {
            patterns: self,
            file,
            text,
            lines: LineIndex::new(text),
            stage: 0,
            current: None,
        }
    }

    pub fn embeds(&self) -> &EmbedFilter {
        &self.embeds
    }

    fn regex(&self, stage: Stage) -> &Regex {
        match stage {
            Stage::Hex => &self.hex,
            Stage::Rgb => &self.rgb,
            Stage::Hsl => &self.hsl,
            Stage::Named => &self.named,
        }
    }

    /// Named colors count only in value position and never as part of a
    /// longer identifier such as `text-white` or `white-space`.
    fn named_in_value_position(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let joined = |c: Option<char>| matches!(c, Some(c) if c == '-' || c == '_');
        if joined(before) || joined(after) {
            return false;
        }
        text[..start]
            .chars()
            .rev()
            .take(self.named_lookback)
            .any(|c| c == ':' || c == '=')
    }
}

/// Iterator over the color occurrences of a single file.
///
/// Finite and not restartable; obtain a fresh one from
/// [`ColorPatterns::occurrences`] to scan again.
pub struct Occurrences<'a> {
    patterns: &'a ColorPatterns,
    file: &'a Path,
    text: &'a str,
    lines: LineIndex,
    stage: usize,
    current: Option<Matches<'a, 'a>>,
}

impl<'a> Occurrences<'a> {
    fn accept(&self, stage: Stage, start: usize, end: usize) -> Option<ColorOccurrence> {
        let text = self.text;
        let patterns = self.patterns;

        if stage == Stage::Named && !patterns.named_in_value_position(text, start, end) {
            return None;
        }

        let window = patterns.embeds.window(text, start, end);
        if patterns.embeds.is_third_party(window) {
            return None;
        }
        if in_custom_property_definition(text, start) {
            return None;
        }

        let color = normalize(&text[start..end])?;
        Some(ColorOccurrence {
            color,
            file: self.file.to_path_buf(),
            line: self.lines.line_of(start),
            context: flatten_context(window),
        })
    }
}

impl<'a> Iterator for Occurrences<'a> {
    type Item = ColorOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(matches) = self.current.as_mut() {
                if let Some(m) = matches.next() {
                    let stage = Stage::ORDER[self.stage - 1];
                    if let Some(occurrence) = self.accept(stage, m.start(), m.end()) {
                        return Some(occurrence);
                    }
                    continue;
                }
            }

            let stage = *Stage::ORDER.get(self.stage)?;
            self.stage += 1;
            self.current = Some(self.patterns.regex(stage).find_iter(self.text));
        }
    }
}
