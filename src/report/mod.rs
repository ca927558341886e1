// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Consistency report: scores, findings, issues and recommendations
//!
//! The report is assembled once at the end of a run from the engine's
//! accumulated counts and rendered by [`generate_report`] as:
//! - Markdown: human-readable audit with a section per category
//! - JSON: the full report for programmatic consumption
//! - SARIF: issues as results for IDE/CI integration

pub mod issue;
mod render;
pub mod score;
pub mod tally;

pub use issue::{Issue, Priority, Recommendation, Severity};
pub use render::{generate_report, OutputFormat};
pub use score::CategoryScores;
pub use tally::{UsageTally, ValueCount};

use crate::config::Config;
use crate::contrast::{ContrastFinding, WcagStatus};
use crate::tokens::deprecated::DeprecatedUsage;
use crate::tokens::{ColorCluster, Reconciliation, TokenPalette, UndefinedColorRecord};
use chrono::{DateTime, Utc};
use issue::{
    RULE_CONTRAST_AA, RULE_CONTRAST_AAA, RULE_DEPRECATED_TOKEN, RULE_FONT_SIZE, RULE_SPACING,
    RULE_UNDEFINED_COLOR,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Undefined colors used more often than this get a tokenization recommendation
const TOKENIZE_USAGE_THRESHOLD: usize = 5;

/// Everything the engine accumulated during one run
#[derive(Debug, Default)]
pub struct RunTotals {
    pub files_scanned: usize,
    pub reconciliation: Reconciliation,
    pub clusters: Vec<ColorCluster>,
    pub contrast: Vec<ContrastFinding>,
    pub spacing: UsageTally,
    pub font_sizes: UsageTally,
    pub font_weights: UsageTally,
    pub line_heights: UsageTally,
    pub font_families: UsageTally,
    pub border_radius: UsageTally,
    pub box_shadow: UsageTally,
    /// Button class combinations
    pub buttons: UsageTally,
    /// Card class combinations
    pub cards: UsageTally,
    pub deprecated: Vec<DeprecatedUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorSummary {
    pub total_usages: usize,
    pub exact_usages: usize,
    pub near_usages: usize,
    pub undefined_usages: usize,
    pub token_usage: BTreeMap<String, usize>,
    pub undefined: Vec<UndefinedColorRecord>,
    pub clusters: Vec<ColorCluster>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpacingSummary {
    pub total_usages: usize,
    pub non_standard_usages: usize,
    pub unique_values: usize,
    pub most_used: Vec<ValueCount>,
    pub non_standard: Vec<ValueCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypographySummary {
    pub font_size_usages: usize,
    pub undefined_font_size_usages: usize,
    pub font_sizes: Vec<ValueCount>,
    pub undefined_font_sizes: Vec<ValueCount>,
    pub font_weights: Vec<ValueCount>,
    pub line_heights: Vec<ValueCount>,
    pub font_families: Vec<ValueCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub button_usages: usize,
    pub card_usages: usize,
    /// Distinct class combinations per component kind
    pub button_variants: Vec<ValueCount>,
    pub card_variants: Vec<ValueCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSummary {
    pub border_radius: Vec<ValueCount>,
    pub box_shadow: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub generated_at: DateTime<Utc>,
    pub files_scanned: usize,
    pub scores: CategoryScores,
    pub overall_score: f64,
    pub color: ColorSummary,
    pub contrast: Vec<ContrastFinding>,
    pub spacing: SpacingSummary,
    pub typography: TypographySummary,
    pub components: ComponentSummary,
    pub effects: EffectSummary,
    pub deprecated: Vec<DeprecatedUsage>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

impl ConsistencyReport {
    /// Assemble the report from a run's totals
    pub fn build(totals: RunTotals, palette: &TokenPalette, config: &Config) -> Self {
        let rec = &totals.reconciliation;
        let scores = CategoryScores {
            color: score::category_score(rec.undefined_usages, rec.total_usages),
            spacing: score::category_score(
                totals.spacing.non_standard_total(),
                totals.spacing.total(),
            ),
            typography: score::category_score(
                totals.font_sizes.non_standard_total(),
                totals.font_sizes.total(),
            ),
            components: config.weights.components_placeholder,
        };

        let issues = build_issues(&totals, palette, config);
        let recommendations = build_recommendations(&totals, config);

        let RunTotals {
            files_scanned,
            reconciliation,
            clusters,
            contrast,
            spacing,
            font_sizes,
            font_weights,
            line_heights,
            font_families,
            border_radius,
            box_shadow,
            buttons,
            cards,
            deprecated,
        } = totals;

        Self {
            generated_at: Utc::now(),
            files_scanned,
            overall_score: scores.overall(&config.weights),
            scores,
            color: ColorSummary {
                total_usages: reconciliation.total_usages,
                exact_usages: reconciliation.exact_usages,
                near_usages: reconciliation.near_usages,
                undefined_usages: reconciliation.undefined_usages,
                token_usage: reconciliation.token_usage,
                undefined: reconciliation.undefined,
                clusters,
            },
            contrast,
            spacing: SpacingSummary {
                total_usages: spacing.total(),
                non_standard_usages: spacing.non_standard_total(),
                unique_values: spacing.unique(),
                most_used: spacing.ranked(),
                non_standard: spacing.ranked_non_standard(),
            },
            typography: TypographySummary {
                font_size_usages: font_sizes.total(),
                undefined_font_size_usages: font_sizes.non_standard_total(),
                font_sizes: font_sizes.ranked(),
                undefined_font_sizes: font_sizes.ranked_non_standard(),
                font_weights: font_weights.ranked(),
                line_heights: line_heights.ranked(),
                font_families: font_families.ranked(),
            },
            components: ComponentSummary {
                button_usages: buttons.total(),
                card_usages: cards.total(),
                button_variants: buttons.ranked(),
                card_variants: cards.ranked(),
            },
            effects: EffectSummary {
                border_radius: border_radius.ranked(),
                box_shadow: box_shadow.ranked(),
            },
            deprecated,
            issues,
            recommendations,
        }
    }

    pub fn contrast_with_status(&self, status: WcagStatus) -> Vec<&ContrastFinding> {
        self.contrast.iter().filter(|f| f.status == status).collect()
    }

    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    /// Non-zero exit: overall score of zero, or any pair below AA
    pub fn should_fail(&self) -> bool {
        self.overall_score <= 0.0 || self.contrast.iter().any(|f| f.status == WcagStatus::FailAa)
    }
}

fn build_issues(totals: &RunTotals, palette: &TokenPalette, config: &Config) -> Vec<Issue> {
    let mut issues = Vec::new();

    for finding in &totals.contrast {
        let (rule, severity, level, target) = match finding.status {
            WcagStatus::Pass => continue,
            WcagStatus::FailAa => (RULE_CONTRAST_AA, Severity::Error, "AA", 4.5),
            WcagStatus::FailAaa => (RULE_CONTRAST_AAA, Severity::Warning, "AAA", 7.0),
        };
        issues.push(
            Issue::new(
                rule,
                severity,
                &format!(
                    "Contrast {:.2}:1 for {} on {} is below WCAG {} ({}:1)",
                    finding.ratio, finding.foreground, finding.background, level, target
                ),
            )
            .with_category("color")
            .with_rule_name(&format!("Contrast below {}", level))
            .with_file(finding.file.clone())
            .with_line(finding.line)
            .with_element(&finding.selector)
            .with_suggestion(&format!(
                "Raise the contrast between text and background to at least {}:1",
                target
            )),
        );
    }

    for record in &totals.reconciliation.undefined {
        let mut issue = Issue::new(
            RULE_UNDEFINED_COLOR,
            Severity::Warning,
            &format!(
                "Color {} is not a design token (used {} times)",
                record.color, record.count
            ),
        )
        .with_category("color")
        .with_rule_name("Undefined color");
        if let Some(first) = record.occurrences.first() {
            issue = issue.with_file(first.file.clone()).with_line(first.line);
        }
        if let Some((token, distance)) = palette.nearest(&record.color) {
            issue = issue.with_suggestion(&format!(
                "Use the closest token {} ({}, distance {:.1}) or add a new token",
                token.name, token.color, distance
            ));
        }
        issues.push(issue);
    }

    for usage in &totals.deprecated {
        issues.push(
            Issue::new(
                RULE_DEPRECATED_TOKEN,
                Severity::Warning,
                &format!("Deprecated token {} is still referenced", usage.token),
            )
            .with_category("color")
            .with_rule_name("Deprecated token")
            .with_file(usage.file.clone())
            .with_line(usage.line)
            .with_element(&usage.context)
            .with_suggestion(&format!("Replace with {}", usage.replacement)),
        );
    }

    let rhythm = config.spacing.rhythm_px;
    for entry in totals.spacing.non_standard() {
        issues.push(
            Issue::new(
                RULE_SPACING,
                Severity::Info,
                &format!(
                    "Spacing value {} is off the {}px rhythm and spacing scale (used {} times)",
                    entry.value, rhythm, entry.count
                ),
            )
            .with_category("spacing")
            .with_rule_name("Non-standard spacing")
            .with_file(entry.file.clone())
            .with_line(entry.line)
            .with_suggestion(&format!("Use a multiple of {}px or a spacing token", rhythm)),
        );
    }

    for entry in totals.font_sizes.non_standard() {
        issues.push(
            Issue::new(
                RULE_FONT_SIZE,
                Severity::Info,
                &format!(
                    "Font size {} is not in the type scale (used {} times)",
                    entry.value, entry.count
                ),
            )
            .with_category("typography")
            .with_rule_name("Undefined font size")
            .with_file(entry.file.clone())
            .with_line(entry.line)
            .with_suggestion("Use one of the font-size tokens"),
        );
    }

    issues
}

fn build_recommendations(totals: &RunTotals, config: &Config) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let fail_aa = totals
        .contrast
        .iter()
        .filter(|f| f.status == WcagStatus::FailAa)
        .count();
    if fail_aa > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "color",
            &format!("Fix {} color pair(s) below WCAG AA", fail_aa),
            "Text on these backgrounds is below 4.5:1 and hard to read for low-vision users.",
        ));
    }

    let heavy: Vec<String> = totals
        .reconciliation
        .undefined
        .iter()
        .filter(|r| r.count > TOKENIZE_USAGE_THRESHOLD)
        .map(|r| format!("{} ({}x)", r.color, r.count))
        .collect();
    if !heavy.is_empty() {
        recs.push(Recommendation::new(
            Priority::High,
            "color",
            &format!("Tokenize {} frequently used undefined color(s)", heavy.len()),
            &format!("Add palette tokens or map to existing ones: {}", heavy.join(", ")),
        ));
    }

    let undefined_sizes = totals.font_sizes.ranked_non_standard();
    if !undefined_sizes.is_empty() {
        let listed: Vec<&str> = undefined_sizes.iter().take(5).map(|v| v.value.as_str()).collect();
        recs.push(Recommendation::new(
            Priority::High,
            "typography",
            "Normalize font sizes to the type scale",
            &format!("Replace hard-coded sizes such as {}", listed.join(", ")),
        ));
    }

    let mergeable: Vec<&ColorCluster> = totals
        .clusters
        .iter()
        .filter(|c| c.members.len() > 1)
        .collect();
    if !mergeable.is_empty() {
        let groups: Vec<String> = mergeable
            .iter()
            .map(|c| {
                c.members
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(" ~ ")
            })
            .collect();
        recs.push(Recommendation::new(
            Priority::Medium,
            "color",
            &format!("Merge {} group(s) of near-duplicate colors", mergeable.len()),
            &groups.join("; "),
        ));
    }

    if !totals.deprecated.is_empty() {
        let mut replacements: BTreeMap<&str, &str> = BTreeMap::new();
        for usage in &totals.deprecated {
            replacements.insert(&usage.token, &usage.replacement);
        }
        let pairs: Vec<String> = replacements
            .iter()
            .map(|(old, new)| format!("{} -> {}", old, new))
            .collect();
        recs.push(Recommendation::new(
            Priority::Medium,
            "color",
            &format!("Replace {} deprecated token reference(s)", totals.deprecated.len()),
            &pairs.join(", "),
        ));
    }

    let off_rhythm = totals.spacing.non_standard_total();
    if off_rhythm > 0 {
        recs.push(Recommendation::new(
            Priority::Low,
            "spacing",
            "Align spacing to the rhythm",
            &format!(
                "{} spacing usage(s) are not multiples of {}px or spacing-scale steps",
                off_rhythm, config.spacing.rhythm_px
            ),
        ));
    }

    recs.sort_by_key(|r| r.priority);
    recs
}
