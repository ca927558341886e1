// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Report rendering

use super::issue::Severity;
use super::score::status_label;
use super::{ConsistencyReport, ValueCount};
use crate::contrast::WcagStatus;
use serde::Serialize;

const TOP_COLORS: usize = 10;
const TOP_VALUES: usize = 15;
const TOP_PAIRS: usize = 20;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable Markdown
    Markdown,
    /// The full report as JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

/// Render a report
pub fn generate_report(report: &ConsistencyReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => generate_markdown_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Sarif => generate_sarif_report(report),
    }
}

fn ranked_list(out: &mut String, values: &[ValueCount], limit: usize, empty: &str) {
    if values.is_empty() {
        out.push_str(&format!("{}\n", empty));
        return;
    }
    for (i, v) in values.iter().take(limit).enumerate() {
        out.push_str(&format!("{}. `{}` - used {} times\n", i + 1, v.value, v.count));
    }
}

fn generate_markdown_report(report: &ConsistencyReport) -> String {
    let mut out = String::new();
    let s = &report.scores;

    out.push_str("# Design System Consistency Audit\n\n");
    out.push_str(&format!(
        "Generated {} from {} file(s).\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.files_scanned
    ));
    out.push_str(&format!("**Overall score: {}/100**\n\n", report.overall_score));
    out.push_str("| Category | Score | Status |\n");
    out.push_str("|----------|-------|--------|\n");
    for (name, score) in [
        ("Color", s.color),
        ("Spacing", s.spacing),
        ("Typography", s.typography),
        ("Components", s.components),
    ] {
        out.push_str(&format!("| {} | {}/100 | {} |\n", name, score, status_label(score)));
    }

    // Color
    let c = &report.color;
    out.push_str("\n## Color\n\n");
    out.push_str(&format!("- Total color usages: {}\n", c.total_usages));
    out.push_str(&format!("- Matching a token exactly: {}\n", c.exact_usages));
    out.push_str(&format!("- Near a token: {}\n", c.near_usages));
    out.push_str(&format!("- Undefined usages: {}\n", c.undefined_usages));
    out.push_str(&format!("- Unique undefined colors: {}\n\n", c.undefined.len()));

    out.push_str(&format!("### Undefined colors (top {})\n\n", TOP_COLORS));
    if c.undefined.is_empty() {
        out.push_str("All colors are defined as design tokens.\n");
    } else {
        let mut sorted: Vec<_> = c.undefined.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        for (i, record) in sorted.iter().take(TOP_COLORS).enumerate() {
            let location = record
                .occurrences
                .first()
                .map(|o| format!(" (first at {}:{})", o.file.display(), o.line))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}. `{}` - used {} times{}\n",
                i + 1,
                record.color,
                record.count,
                location
            ));
        }
    }

    let multi: Vec<_> = c.clusters.iter().filter(|cl| cl.members.len() > 1).collect();
    out.push_str("\n### Near-duplicate clusters\n\n");
    if multi.is_empty() {
        out.push_str("No near-duplicate undefined colors.\n");
    } else {
        for cluster in multi {
            let members: Vec<String> = cluster.members.iter().map(|m| format!("`{}`", m)).collect();
            out.push_str(&format!(
                "- {} ({} usages): {}\n",
                cluster.representative,
                cluster.total_count,
                members.join(", ")
            ));
        }
    }

    // Contrast
    out.push_str("\n## Contrast\n\n");
    let failing_aa = report.contrast_with_status(WcagStatus::FailAa);
    let failing_aaa = report.contrast_with_status(WcagStatus::FailAaa);
    out.push_str(&format!(
        "{} pair(s) checked: {} below AA, {} below AAA only.\n\n",
        report.contrast.len(),
        failing_aa.len(),
        failing_aaa.len()
    ));
    if !failing_aa.is_empty() || !failing_aaa.is_empty() {
        out.push_str("| Selector | Text | Background | Ratio | Status | Location |\n");
        out.push_str("|----------|------|------------|-------|--------|----------|\n");
        let mut worst: Vec<_> = failing_aa.into_iter().chain(failing_aaa).collect();
        worst.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        for f in worst.iter().take(TOP_PAIRS) {
            out.push_str(&format!(
                "| `{}` | `{}` | `{}` | {:.2}:1 | {} | {}:{} |\n",
                f.selector.replace('|', "\\|"),
                f.foreground,
                f.background,
                f.ratio,
                f.status,
                f.file.display(),
                f.line
            ));
        }
    }

    // Spacing
    let sp = &report.spacing;
    out.push_str("\n## Spacing\n\n");
    out.push_str(&format!("- Total spacing usages: {}\n", sp.total_usages));
    out.push_str(&format!("- Unique values: {}\n", sp.unique_values));
    out.push_str(&format!("- Non-standard usages: {}\n\n", sp.non_standard_usages));
    out.push_str(&format!("### Most used (top {})\n\n", TOP_VALUES));
    ranked_list(&mut out, &sp.most_used, TOP_VALUES, "No spacing values found.");
    out.push_str("\n### Non-standard values\n\n");
    ranked_list(
        &mut out,
        &sp.non_standard,
        TOP_VALUES,
        "All spacing values follow the rhythm.",
    );

    // Typography
    let ty = &report.typography;
    out.push_str("\n## Typography\n\n");
    out.push_str(&format!("- Font-size usages: {}\n", ty.font_size_usages));
    out.push_str(&format!("- Outside the type scale: {}\n\n", ty.undefined_font_size_usages));
    out.push_str("### Font sizes\n\n");
    ranked_list(&mut out, &ty.font_sizes, TOP_VALUES, "No font sizes found.");
    out.push_str("\n### Undefined font sizes\n\n");
    ranked_list(
        &mut out,
        &ty.undefined_font_sizes,
        TOP_VALUES,
        "All font sizes are defined as tokens.",
    );
    out.push_str("\n### Font weights\n\n");
    ranked_list(&mut out, &ty.font_weights, TOP_COLORS, "None.");
    out.push_str("\n### Line heights\n\n");
    ranked_list(&mut out, &ty.line_heights, TOP_COLORS, "None.");
    out.push_str("\n### Font families\n\n");
    ranked_list(&mut out, &ty.font_families, TOP_COLORS, "None.");

    // Components and effects
    let comp = &report.components;
    out.push_str("\n## Components\n\n");
    out.push_str(&format!(
        "- Buttons: {} usage(s), {} class combination(s)\n",
        comp.button_usages,
        comp.button_variants.len()
    ));
    out.push_str(&format!(
        "- Cards: {} usage(s), {} class combination(s)\n",
        comp.card_usages,
        comp.card_variants.len()
    ));
    out.push_str("\n### Border radius\n\n");
    ranked_list(&mut out, &report.effects.border_radius, TOP_COLORS, "None.");
    out.push_str("\n### Box shadow\n\n");
    ranked_list(&mut out, &report.effects.box_shadow, TOP_COLORS, "None.");

    if !report.deprecated.is_empty() {
        out.push_str("\n## Deprecated tokens\n\n");
        for usage in &report.deprecated {
            out.push_str(&format!(
                "- `{}` -> `{}` at {}:{}\n",
                usage.token,
                usage.replacement,
                usage.file.display(),
                usage.line
            ));
        }
    }

    out.push_str("\n## Recommendations\n\n");
    if report.recommendations.is_empty() {
        out.push_str("Nothing to do. The design system is consistent.\n");
    } else {
        for rec in &report.recommendations {
            out.push_str(&format!(
                "- **[{}] {}** ({}): {}\n",
                rec.priority, rec.title, rec.category, rec.detail
            ));
        }
    }

    let errors = report.issues_by_severity(Severity::Error).len();
    let warnings = report.issues_by_severity(Severity::Warning).len();
    out.push_str(&format!(
        "\n---\n\n{} issue(s): {} error(s), {} warning(s), {} info.\n",
        report.issues.len(),
        errors,
        warnings,
        report.issues.len() - errors - warnings
    ));
    if report.should_fail() {
        out.push_str("\nRESULT: FAIL\n");
    } else {
        out.push_str("\nRESULT: PASS\n");
    }

    out
}

fn generate_json_report(report: &ConsistencyReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
}

fn generate_sarif_report(report: &ConsistencyReport) -> String {
    let results: Vec<SarifResult> = report
        .issues
        .iter()
        .map(|issue| {
            let level = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "note",
            };

            let mut locations = Vec::new();
            if let Some(ref file) = issue.file {
                locations.push(SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: file.display().to_string(),
                        },
                        region: issue.line.map(|l| SarifRegion { start_line: l }),
                    },
                });
            }

            SarifResult {
                rule_id: issue.rule_id.clone(),
                level: level.to_string(),
                message: SarifMessage {
                    text: issue.message.clone(),
                },
                locations,
            }
        })
        .collect();

    let sarif = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "palettebot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/gitbot-fleet".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&sarif)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;
    use crate::config::Config;
    use crate::contrast::{ContrastFinding, PairSource};
    use crate::report::RunTotals;
    use crate::tokens::TokenPalette;
    use std::path::PathBuf;

    fn failing_report() -> ConsistencyReport {
        let totals = RunTotals {
            files_scanned: 1,
            contrast: vec![ContrastFinding {
                selector: ".muted".to_string(),
                foreground: ColorValue::parse("#999").unwrap(),
                background: ColorValue::parse("#fff").unwrap(),
                ratio: 2.85,
                status: WcagStatus::FailAa,
                file: PathBuf::from("styles.css"),
                line: 7,
                context: "color: #999;...background: #fff;".to_string(),
                source: PairSource::RuleBlock,
            }],
            ..Default::default()
        };
        ConsistencyReport::build(totals, &TokenPalette::default(), &Config::default())
    }

    #[test]
    fn test_markdown_empty() {
        let report = ConsistencyReport::build(RunTotals::default(), &TokenPalette::default(), &Config::default());
        let md = generate_report(&report, OutputFormat::Markdown);
        assert!(md.contains("**Overall score: 100/100**"));
        assert!(md.contains("All colors are defined as design tokens."));
        assert!(md.contains("RESULT: PASS"));
    }

    #[test]
    fn test_markdown_with_failures() {
        let md = generate_report(&failing_report(), OutputFormat::Markdown);
        assert!(md.contains("| `.muted` | `#999999` | `#FFFFFF` | 2.85:1 | fail_aa | styles.css:7 |"));
        assert!(md.contains("[high] Fix 1 color pair(s) below WCAG AA"));
        assert!(md.contains("RESULT: FAIL"));
    }

    #[test]
    fn test_json_report() {
        let json = generate_report(&failing_report(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["contrast"][0]["status"], "fail_aa");
        assert_eq!(parsed["contrast"][0]["foreground"]["value"], "#999999");
        assert_eq!(parsed["scores"]["components"], 75.0);
    }

    #[test]
    fn test_sarif_report() {
        let sarif = generate_report(&failing_report(), OutputFormat::Sarif);
        let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let result = &parsed["runs"][0]["results"][0];
        assert_eq!(result["ruleId"], "PAL-CON-001");
        assert_eq!(result["level"], "error");
        assert_eq!(
            result["locations"][0]["physicalLocation"]["region"]["startLine"],
            7
        );
    }
}
