// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Usage counters for spacing, typography and secondary statistics

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A value and how often it was used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct TallyEntry {
    pub value: String,
    pub count: usize,
    pub standard: bool,
    /// First place the value was seen
    pub file: PathBuf,
    pub line: usize,
}

/// Counts values in discovery order, remembering where each was first seen
#[derive(Debug, Clone, Default)]
pub struct UsageTally {
    entries: Vec<TallyEntry>,
    index: HashMap<String, usize>,
}

impl UsageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: &str, standard: bool, file: &Path, line: usize) {
        match self.index.get(value) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push(TallyEntry {
                    value: value.to_string(),
                    count: 1,
                    standard,
                    file: file.to_path_buf(),
                    line,
                });
            }
        }
    }

    /// Total usages
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Usages of non-standard values
    pub fn non_standard_total(&self) -> usize {
        self.non_standard().map(|e| e.count).sum()
    }

    pub fn unique(&self) -> usize {
        self.entries.len()
    }

    pub fn non_standard(&self) -> impl Iterator<Item = &TallyEntry> {
        self.entries.iter().filter(|e| !e.standard)
    }

    /// Most used first; ties keep discovery order
    pub fn ranked(&self) -> Vec<ValueCount> {
        rank(self.entries.iter())
    }

    pub fn ranked_non_standard(&self) -> Vec<ValueCount> {
        rank(self.non_standard())
    }
}

fn rank<'a>(entries: impl Iterator<Item = &'a TallyEntry>) -> Vec<ValueCount> {
    let mut counts: Vec<ValueCount> = entries
        .map(|e| ValueCount {
            value: e.value.clone(),
            count: e.count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
