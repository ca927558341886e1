// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Category and overall scoring

use crate::config::ScoreWeights;
use serde::{Deserialize, Serialize};

/// `100 - offending / total * 100`, floored at 0. An empty category scores 100.
pub fn category_score(offending: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let raw = 100.0 - offending as f64 / total as f64 * 100.0;
    round1(raw.max(0.0))
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Status label shown next to a score
pub fn status_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "good"
    } else if score >= 60.0 {
        "needs improvement"
    } else {
        "critical"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub color: f64,
    pub spacing: f64,
    pub typography: f64,
    /// Fixed placeholder, not part of the overall score
    pub components: f64,
}

impl CategoryScores {
    /// Weighted sum of color, spacing and typography, clamped to 0-100
    pub fn overall(&self, weights: &ScoreWeights) -> f64 {
        let total = self.color * weights.color
            + self.spacing * weights.spacing
            + self.typography * weights.typography;
        round1(total.clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_category_is_perfect() {
        assert_eq!(category_score(0, 0), 100.0);
    }

    #[test]
    fn test_category_score_rounding() {
        assert_eq!(category_score(1, 3), 66.7);
        assert_eq!(category_score(0, 7), 100.0);
        assert_eq!(category_score(7, 7), 0.0);
    }

    #[test]
    fn test_score_never_negative() {
        assert_eq!(category_score(9, 3), 0.0);
    }

    #[test]
    fn test_overall_weights() {
        let scores = CategoryScores {
            color: 50.0,
            spacing: 100.0,
            typography: 75.0,
            components: 75.0,
        };
        // 15 + 30 + 30
        assert_eq!(scores.overall(&ScoreWeights::default()), 75.0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(80.0), "good");
        assert_eq!(status_label(79.9), "needs improvement");
        assert_eq!(status_label(59.9), "critical");
    }
}
