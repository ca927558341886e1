// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Font-size, weight, line-height and family declarations

use crate::config::TypographyConfig;
use crate::error::Result;
use crate::extract::dimensions::ValueHit;
use crate::extract::{EmbedFilter, LineIndex};
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct FontSizeHit {
    pub value: String,
    pub line: usize,
    /// Equal to a font-size token
    pub standard: bool,
}

pub struct TypographyPatterns {
    token_sizes: BTreeSet<String>,
    font_size: Regex,
    font_weight: Regex,
    line_height: Regex,
    font_family: Regex,
}

impl TypographyPatterns {
    pub fn new(config: &TypographyConfig) -> Result<Self> {
        Ok(Self {
            token_sizes: config
                .font_sizes
                .values()
                .map(|v| v.trim().to_ascii_lowercase())
                .collect(),
            font_size: Regex::new(r"(?i)font-size\s*:\s*([\d.]+(?:px|rem|em|%))")?,
            font_weight: Regex::new(
                r"(?i)font-weight\s*:\s*(\d+|normal|bold|bolder|lighter|medium|semibold)",
            )?,
            line_height: Regex::new(r"(?i)line-height\s*:\s*([\d.]+(?:px|rem|em|%)?|normal)")?,
            font_family: Regex::new(r"(?i)font-family\s*:\s*([^;}\n]+)")?,
        })
    }

    /// Literal font sizes, skipping third-party embed markup
    pub fn font_sizes(&self, text: &str, embeds: &EmbedFilter) -> Vec<FontSizeHit> {
        let lines = LineIndex::new(text);
        self.font_size
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps.get(1)?;
                if embeds.excludes(text, whole.start(), whole.end()) {
                    return None;
                }
                let normalized = value.as_str().to_ascii_lowercase();
                Some(FontSizeHit {
                    standard: self.token_sizes.contains(&normalized),
                    value: normalized,
                    line: lines.line_of(value.start()),
                })
            })
            .collect()
    }

    pub fn font_weights(&self, text: &str) -> Vec<ValueHit> {
        hits(&self.font_weight, text, |v| v.to_ascii_lowercase())
    }

    pub fn line_heights(&self, text: &str) -> Vec<ValueHit> {
        hits(&self.line_height, text, |v| v.to_ascii_lowercase())
    }

    pub fn font_families(&self, text: &str) -> Vec<ValueHit> {
        hits(&self.font_family, text, |v| {
            v.trim().trim_end_matches("!important").trim().to_string()
        })
    }
}

fn hits(re: &Regex, text: &str, clean: impl Fn(&str) -> String) -> Vec<ValueHit> {
    let lines = LineIndex::new(text);
    re.captures_iter(text)
        .filter_map(|caps| {
            let value = caps.get(1)?;
            let cleaned = clean(value.as_str());
            (!cleaned.is_empty()).then(|| ValueHit {
                value: cleaned,
                line: lines.line_of(value.start()),
            })
        })
        .collect()
}
