// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Deprecated color token usage

use crate::error::Result;
use crate::extract::{context_window, flatten_context, LineIndex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONTEXT_RADIUS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// `bg-`/`text-`/`border-<token>`
    UtilityClass,
    /// `var(--color-<token>)`
    CssVariable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeprecatedUsage {
    pub token: String,
    pub replacement: String,
    pub kind: UsageKind,
    pub file: PathBuf,
    pub line: usize,
    pub context: String,
}

/// Matcher for the configured deprecated-token table
#[derive(Debug)]
pub struct DeprecatedTokens {
    replacements: BTreeMap<String, String>,
    patterns: Option<(Regex, Regex)>,
}

impl DeprecatedTokens {
    pub fn new(table: &BTreeMap<String, String>) -> Result<Self> {
        let patterns = if table.is_empty() {
            None
        } else {
            // Longest first so `surface-alt` wins over `surface`
            let mut names: Vec<&String> = table.keys().collect();
            names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some((
                // Not after `-`, so `--color-text-dark` is not read as a class
                Regex::new(&format!(
                    r"(?i)(?:^|[^\w-])(?:bg|text|border)-({})(?:/\d{{1,3}})?",
                    alternation
                ))?,
                Regex::new(&format!(r"(?i)var\(\s*--color-({})\s*[,)]", alternation))?,
            ))
        };
        Ok(Self {
            replacements: table
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                .collect(),
            patterns,
        })
    }

    pub fn replacement(&self, token: &str) -> Option<&str> {
        self.replacements
            .get(&token.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deprecated tokens referenced in one file
    pub fn scan(&self, file: &Path, text: &str) -> Vec<DeprecatedUsage> {
        let Some((utility, variable)) = &self.patterns else {
            return Vec::new();
        };
        let lines = LineIndex::new(text);
        let mut usages = Vec::new();

        for (re, kind) in [(utility, UsageKind::UtilityClass), (variable, UsageKind::CssVariable)] {
            for caps in re.captures_iter(text) {
                let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                // `bg-surface` must not match inside `bg-surface-muted`
                if kind == UsageKind::UtilityClass {
                    let next = text[whole.end()..].chars().next();
                    if matches!(next, Some(c) if c == '-' || c == '_' || c.is_alphanumeric()) {
                        continue;
                    }
                }
                let at = token.start();
                let token = token.as_str().to_ascii_lowercase();
                let Some(replacement) = self.replacement(&token) else {
                    continue;
                };
                usages.push(DeprecatedUsage {
                    replacement: replacement.to_string(),
                    token,
                    kind,
                    file: file.to_path_buf(),
                    line: lines.line_of(at),
                    context: flatten_context(context_window(
                        text,
                        whole.start(),
                        whole.end(),
                        CONTEXT_RADIUS,
                    )),
                });
            }
        }

        usages.sort_by_key(|u| u.line);
        usages
    }
}
