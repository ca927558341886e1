// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Palette reconciliation and near-duplicate clustering

pub mod deprecated;

use crate::color::{color_distance, ColorValue};
use crate::config::Config;
use crate::error::{PaletteError, Result};
use crate::extract::ColorOccurrence;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A palette token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub color: ColorValue,
}

/// Canonical design-token colors, in configuration order.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TokenPalette {
    tokens: Vec<Token>,
    by_name: HashMap<String, usize>,
}

impl TokenPalette {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_map(&config.palette)
    }

    /// Every value must resolve to sRGB
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let mut palette = Self::default();
        for (name, value) in map {
            let color = ColorValue::parse(value)
                .filter(ColorValue::is_resolvable)
                .ok_or_else(|| PaletteError::InvalidToken {
                    name: name.clone(),
                    value: value.clone(),
                })?;
            palette.by_name.insert(name.clone(), palette.tokens.len());
            palette.tokens.push(Token {
                name: name.clone(),
                color,
            });
        }
        Ok(palette)
    }

    pub fn get(&self, name: &str) -> Option<&ColorValue> {
        self.by_name.get(name).map(|&i| &self.tokens[i].color)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Exact match first (first token in palette order), then the closest
    /// token strictly within `epsilon`.
    pub fn match_color(&self, color: &ColorValue, epsilon: f64) -> TokenMatch {
        if let Some(token) = self.tokens.iter().find(|t| &t.color == color) {
            return TokenMatch::Exact(token.name.clone());
        }

        match self.nearest(color) {
            Some((token, distance)) if distance < epsilon => TokenMatch::Near {
                token: token.name.clone(),
                distance,
            },
            _ => TokenMatch::Undefined,
        }
    }

    /// Closest token by RGB distance; the earliest wins a tie
    pub fn nearest(&self, color: &ColorValue) -> Option<(&Token, f64)> {
        self.tokens
            .iter()
            .filter_map(|t| color_distance(color, &t.color).map(|d| (t, d)))
            .fold(None, |best, (t, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((t, d)),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenMatch {
    Exact(String),
    Near { token: String, distance: f64 },
    Undefined,
}

/// A color with no palette token at or near it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndefinedColorRecord {
    pub color: ColorValue,
    pub count: usize,
    /// The first occurrences, capped
    pub occurrences: Vec<ColorOccurrence>,
}

/// Near-duplicate undefined colors grouped around a representative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorCluster {
    pub representative: ColorValue,
    pub members: Vec<ColorValue>,
    pub total_count: usize,
}

/// Result of reconciling one run's occurrences against the palette
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Resolvable occurrences considered
    pub total_usages: usize,
    pub exact_usages: usize,
    pub near_usages: usize,
    pub undefined_usages: usize,
    /// Usage count per palette token (exact and near)
    pub token_usage: BTreeMap<String, usize>,
    /// In discovery order
    pub undefined: Vec<UndefinedColorRecord>,
}

/// Accumulates occurrences as they stream out of the extractor
#[derive(Debug)]
pub struct Reconciler<'p> {
    palette: &'p TokenPalette,
    epsilon: f64,
    max_occurrences: usize,
    index: HashMap<ColorValue, usize>,
    result: Reconciliation,
}

impl<'p> Reconciler<'p> {
    pub fn new(palette: &'p TokenPalette, epsilon: f64, max_occurrences: usize) -> Self {
        Self {
            palette,
            epsilon,
            max_occurrences,
            index: HashMap::new(),
            result: Reconciliation::default(),
        }
    }

    /// HSL and unresolved variable colors have no distance and are not counted.
    pub fn add(&mut self, occurrence: ColorOccurrence) {
        if !occurrence.color.is_resolvable() {
            return;
        }
        self.result.total_usages += 1;

        match self.palette.match_color(&occurrence.color, self.epsilon) {
            TokenMatch::Exact(name) => {
                self.result.exact_usages += 1;
                *self.result.token_usage.entry(name).or_insert(0) += 1;
            }
            TokenMatch::Near { token, .. } => {
                self.result.near_usages += 1;
                *self.result.token_usage.entry(token).or_insert(0) += 1;
            }
            TokenMatch::Undefined => {
                self.result.undefined_usages += 1;
                let records = &mut self.result.undefined;
                let slot = *self
                    .index
                    .entry(occurrence.color.clone())
                    .or_insert_with(|| {
                        records.push(UndefinedColorRecord {
                            color: occurrence.color.clone(),
                            count: 0,
                            occurrences: Vec::new(),
                        });
                        records.len() - 1
                    });
                let record = &mut records[slot];
                record.count += 1;
                if record.occurrences.len() < self.max_occurrences {
                    record.occurrences.push(occurrence);
                }
            }
        }
    }

    pub fn finish(self) -> Reconciliation {
        self.result
    }
}

/// Single-pass greedy clustering of undefined colors.
///
/// Each record joins the first existing cluster whose representative is
/// strictly within `threshold`, otherwise it starts a new cluster. Results
/// depend on discovery order and clusters are never merged afterwards.
pub fn cluster(records: &[UndefinedColorRecord], threshold: f64) -> Vec<ColorCluster> {
    let mut clusters: Vec<ColorCluster> = Vec::new();

    for record in records {
        let home = clusters.iter_mut().find(|c| {
            color_distance(&c.representative, &record.color).is_some_and(|d| d < threshold)
        });
        match home {
            Some(cluster) => {
                cluster.members.push(record.color.clone());
                cluster.total_count += record.count;
            }
            None => clusters.push(ColorCluster {
                representative: record.color.clone(),
                members: vec![record.color.clone()],
                total_count: record.count,
            }),
        }
    }

    clusters
}
