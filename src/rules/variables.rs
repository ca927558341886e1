// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Custom-property table and `var()` resolution

use crate::color::{normalize, ColorValue, SourceFormat};
use crate::error::Result;
use regex::Regex;
use std::collections::HashMap;

/// Alias hops followed before a reference is treated as unresolvable
const MAX_ALIAS_DEPTH: usize = 8;

/// Custom-property definitions gathered across every input file.
///
/// The first definition of a name wins; later redefinitions (theme overrides,
/// media-query variants) are ignored.
#[derive(Debug, Clone)]
pub struct VariableTable {
    definition: Regex,
    values: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Result<Self> {
        Ok(Self {
            definition: Regex::new(r"(?:^|[\s;{])(--[\w-]+)\s*:\s*([^;}]+)")?,
            values: HashMap::new(),
        })
    }

    /// Record every `--name: value` definition in `text`
    pub fn collect(&mut self, text: &str) {
        for caps in self.definition.captures_iter(text) {
            let value = caps[2].trim();
            if value.is_empty() {
                continue;
            }
            self.values
                .entry(caps[1].to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Resolve a raw declaration value to an sRGB color.
    ///
    /// `var(--name)` follows the table (and alias chains); `var(--name, x)`
    /// falls back to `x` when `--name` is undefined. Returns `None` for
    /// anything that does not end in a resolvable color.
    pub fn resolve(&self, raw: &str) -> Option<ColorValue> {
        self.resolve_depth(raw.trim(), 0)
    }

    fn resolve_depth(&self, raw: &str, depth: usize) -> Option<ColorValue> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        match split_var(raw) {
            Some((name, fallback)) => match self.get(name) {
                Some(value) => self.resolve_depth(value, depth + 1),
                None => self.resolve_depth(fallback?, depth + 1),
            },
            None => {
                let color = normalize(raw)?;
                match color.source_format() {
                    SourceFormat::Hsl | SourceFormat::CssVariable => None,
                    _ => Some(color),
                }
            }
        }
    }
}

/// Split `var(--name, fallback)` into its name and optional fallback
fn split_var(raw: &str) -> Option<(&str, Option<&str>)> {
    let lower = raw.get(..4)?;
    if !lower.eq_ignore_ascii_case("var(") {
        return None;
    }
    let inner = raw[4..].trim_end().strip_suffix(')')?;

    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let fallback = inner[i + 1..].trim();
                return Some((
                    inner[..i].trim(),
                    (!fallback.is_empty()).then_some(fallback),
                ));
            }
            _ => {}
        }
    }
    Some((inner.trim(), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(css: &str) -> VariableTable {
        let mut table = VariableTable::new().unwrap();
        table.collect(css);
        table
    }

    #[test]
    fn test_collect_first_definition_wins() {
        let t = table(":root { --bg: #fff; --fg: #000; }\n.dark { --bg: #111; }");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("--bg"), Some("#fff"));
    }

    #[test]
    fn test_resolve_direct_and_alias() {
        let t = table(":root {\n  --color-trust-800: #1E3A8A;\n  --brand: var(--color-trust-800);\n}");
        assert_eq!(t.resolve("var(--brand)").unwrap().as_str(), "#1E3A8A");
        assert_eq!(t.resolve("#abc").unwrap().as_str(), "#AABBCC");
    }

    #[test]
    fn test_resolve_fallback() {
        let t = table("");
        assert_eq!(t.resolve("var(--missing, #000)").unwrap().as_str(), "#000000");
        assert_eq!(
            t.resolve("var(--missing, var(--also-missing, white))").unwrap().as_str(),
            "#FFFFFF"
        );
        assert!(t.resolve("var(--missing)").is_none());
    }

    #[test]
    fn test_alias_cycle_is_unresolvable() {
        let t = table(":root { --a: var(--b); --b: var(--a); }");
        assert!(t.resolve("var(--a)").is_none());
    }

    #[test]
    fn test_hsl_is_unresolvable() {
        let t = table(":root { --muted: hsl(210, 40%, 96%); }");
        assert!(t.resolve("var(--muted)").is_none());
    }

    #[test]
    fn test_split_var() {
        assert_eq!(split_var("var(--a)"), Some(("--a", None)));
        assert_eq!(
            split_var("var(--a, rgb(1, 2, 3))"),
            Some(("--a", Some("rgb(1, 2, 3)")))
        );
        assert_eq!(split_var("#fff"), None);
    }
}
