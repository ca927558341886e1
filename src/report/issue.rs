// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Issue and recommendation records

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contrast below AA
pub const RULE_CONTRAST_AA: &str = "PAL-CON-001";
/// Contrast below AAA
pub const RULE_CONTRAST_AAA: &str = "PAL-CON-002";
pub const RULE_UNDEFINED_COLOR: &str = "PAL-TOK-001";
pub const RULE_DEPRECATED_TOKEN: &str = "PAL-TOK-002";
pub const RULE_SPACING: &str = "PAL-SPC-001";
pub const RULE_FONT_SIZE: &str = "PAL-TYP-001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the run
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// e.g. `PAL-CON-001`
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    /// `color`, `spacing`, `typography`
    pub category: String,
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    /// Selector or markup the issue refers to
    pub element: Option<String>,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            severity,
            message: message.to_string(),
            category: String::new(),
            file: None,
            line: None,
            element: None,
            suggestion: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_rule_name(mut self, name: &str) -> Self {
        self.rule_name = name.to_string();
        self
    }

    pub fn with_file(mut self, file: PathBuf) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn location_string(&self) -> String {
        match (&self.file, self.line) {
            (Some(f), Some(l)) => format!("{}:{}", f.display(), l),
            (Some(f), None) => f.display().to_string(),
            _ => "<unknown>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub detail: String,
}

impl Recommendation {
    pub fn new(priority: Priority, category: &str, title: &str, detail: &str) -> Self {
        Self {
            priority,
            category: category.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
        }
    }
}
