// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! WCAG contrast evaluation
//!
//! - AAA: 7:1 for normal text
//! - AA: 4.5:1 for normal text

use crate::color::{blend, contrast_ratio, ColorValue};
use crate::extract::utility::{ClassAttribute, UtilityKind};
use crate::rules::{ColorPair, VariableTable};
use crate::tokens::TokenPalette;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub const AAA_NORMAL_TEXT: f64 = 7.0;
pub const AA_NORMAL_TEXT: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WcagStatus {
    /// Meets AAA
    Pass,
    /// Meets AA but not AAA
    FailAaa,
    /// Below AA
    FailAa,
}

impl WcagStatus {
    pub fn classify(ratio: f64) -> Self {
        if ratio >= AAA_NORMAL_TEXT {
            WcagStatus::Pass
        } else if ratio >= AA_NORMAL_TEXT {
            WcagStatus::FailAaa
        } else {
            WcagStatus::FailAa
        }
    }
}

impl fmt::Display for WcagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WcagStatus::Pass => write!(f, "pass"),
            WcagStatus::FailAaa => write!(f, "fail_aaa"),
            WcagStatus::FailAa => write!(f, "fail_aa"),
        }
    }
}

/// Where a pair was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairSource {
    RuleBlock,
    InlineStyle,
    UtilityClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastFinding {
    pub selector: String,
    pub foreground: ColorValue,
    pub background: ColorValue,
    pub ratio: f64,
    pub status: WcagStatus,
    pub file: PathBuf,
    pub line: usize,
    pub context: String,
    pub source: PairSource,
}

/// Turns pairs into findings, keeping one finding per
/// (selector, foreground, background) across the whole run
#[derive(Debug, Default)]
pub struct ContrastEvaluator {
    seen: HashSet<(String, ColorValue, ColorValue)>,
    findings: Vec<ContrastFinding>,
}

impl ContrastEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and measure a declared pair. Pairs with a side that does not
    /// resolve to sRGB are dropped.
    pub fn evaluate_pair(
        &mut self,
        pair: &ColorPair,
        variables: &VariableTable,
        file: &Path,
        source: PairSource,
    ) -> Option<&ContrastFinding> {
        let foreground = variables.resolve(&pair.foreground)?;
        let background = variables.resolve(&pair.background)?;
        self.record(Candidate {
            selector: &pair.selector,
            foreground,
            background,
            file,
            line: pair.line,
            context: &pair.context,
            source,
        })
    }

    /// Measure every `bg-*` x `text-*` combination of one class attribute.
    ///
    /// Token names resolve through the palette; an opacity modifier on the
    /// text class blends it over the background first. A text token equal to
    /// the background token is not a pair.
    pub fn evaluate_utilities(
        &mut self,
        attribute: &ClassAttribute,
        palette: &TokenPalette,
        file: &Path,
    ) -> usize {
        let mut added = 0;
        for bg in attribute.base_refs(UtilityKind::Background) {
            let Some(background) = palette.get(&bg.token) else {
                continue;
            };
            for text in attribute.base_refs(UtilityKind::Text) {
                if text.token.eq_ignore_ascii_case(&bg.token) {
                    continue;
                }
                let Some(color) = palette.get(&text.token) else {
                    continue;
                };
                let Some(foreground) = (match text.opacity {
                    Some(_) => blend(color, background, text.alpha()),
                    None => Some(color.clone()),
                }) else {
                    continue;
                };

                let selector = format!(
                    "{}-{} + {}-{}{}",
                    bg.kind,
                    bg.token,
                    text.kind,
                    text.token,
                    text.opacity.map(|o| format!("/{}", o)).unwrap_or_default()
                );
                let recorded = self.record(Candidate {
                    selector: &selector,
                    foreground,
                    background: background.clone(),
                    file,
                    line: attribute.line,
                    context: &attribute.raw,
                    source: PairSource::UtilityClass,
                });
                if recorded.is_some() {
                    added += 1;
                }
            }
        }
        added
    }

    fn record(&mut self, candidate: Candidate<'_>) -> Option<&ContrastFinding> {
        let ratio = contrast_ratio(&candidate.foreground, &candidate.background)?;
        if !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }

        let key = (
            candidate.selector.to_string(),
            candidate.foreground.clone(),
            candidate.background.clone(),
        );
        if !self.seen.insert(key) {
            return None;
        }

        self.findings.push(ContrastFinding {
            selector: candidate.selector.to_string(),
            foreground: candidate.foreground,
            background: candidate.background,
            ratio,
            status: WcagStatus::classify(ratio),
            file: candidate.file.to_path_buf(),
            line: candidate.line,
            context: candidate.context.to_string(),
            source: candidate.source,
        });
        self.findings.last()
    }

    pub fn findings(&self) -> &[ContrastFinding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<ContrastFinding> {
        self.findings
    }
}

struct Candidate<'a> {
    selector: &'a str,
    foreground: ColorValue,
    background: ColorValue,
    file: &'a Path,
    line: usize,
    context: &'a str,
    source: PairSource,
}
