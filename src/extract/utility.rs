// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Utility-class color references in markup (`bg-trust-50`, `text-white/80`)

use crate::error::Result;
use crate::extract::LineIndex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityKind {
    Background,
    Text,
    Border,
}

impl UtilityKind {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "bg" => Some(UtilityKind::Background),
            "text" => Some(UtilityKind::Text),
            "border" => Some(UtilityKind::Border),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            UtilityKind::Background => "bg",
            UtilityKind::Text => "text",
            UtilityKind::Border => "border",
        }
    }
}

impl fmt::Display for UtilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One `bg-`/`text-`/`border-` class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityRef {
    pub kind: UtilityKind,
    /// Token name after the prefix; may not be a color at all (`text-lg`)
    pub token: String,
    /// Percentage from a `/NN` modifier
    pub opacity: Option<u8>,
    /// State or breakpoint prefix such as `hover` or `md`
    pub variant: Option<String>,
}

impl UtilityRef {
    pub fn alpha(&self) -> f64 {
        self.opacity.map(|o| o as f64 / 100.0).unwrap_or(1.0)
    }
}

/// A `class="..."` attribute with its color references
#[derive(Debug, Clone)]
pub struct ClassAttribute {
    /// Attribute text as written, e.g. `class="bg-trust-50 text-white"`
    pub raw: String,
    pub line: usize,
    pub refs: Vec<UtilityRef>,
}

impl ClassAttribute {
    /// References that apply without any state or breakpoint variant
    pub fn base_refs(&self, kind: UtilityKind) -> impl Iterator<Item = &UtilityRef> {
        self.refs
            .iter()
            .filter(move |r| r.kind == kind && r.variant.is_none())
    }
}

pub struct UtilityPatterns {
    attribute: Regex,
    class: Regex,
}

impl UtilityPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            attribute: Regex::new(r#"\bclass(?:Name)?\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            class: Regex::new(
                r"^(bg|text|border)-([a-z][a-z0-9]*(?:-[a-z0-9]+)*)(?:/(\d{1,3}))?$",
            )?,
        })
    }

    /// Class attributes in `text` that carry at least one color reference
    pub fn class_attributes(&self, text: &str) -> Vec<ClassAttribute> {
        let lines = LineIndex::new(text);
        let mut found = Vec::new();

        for caps in self.attribute.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };

            let refs: Vec<UtilityRef> = value
                .as_str()
                .split_whitespace()
                .filter_map(|class| self.parse_class(class))
                .collect();

            if refs.is_empty() {
                continue;
            }

            found.push(ClassAttribute {
                raw: whole.as_str().to_string(),
                line: lines.line_of(whole.start()),
                refs,
            });
        }

        found
    }

    fn parse_class(&self, class: &str) -> Option<UtilityRef> {
        let (variant, base) = match class.rsplit_once(':') {
            Some((variant, base)) => (Some(variant.to_string()), base),
            None => (None, class),
        };
        let caps = self.class.captures(base)?;
        let kind = UtilityKind::from_prefix(&caps[1])?;
        let opacity = match caps.get(3) {
            Some(m) => {
                let pct: u8 = m.as_str().parse().ok()?;
                if pct > 100 {
                    return None;
                }
                Some(pct)
            }
            None => None,
        };
        Some(UtilityRef {
            kind,
            token: caps[2].to_string(),
            opacity,
            variant,
        })
    }
}
