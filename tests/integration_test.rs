// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for palettebot

use palettebot::config::{load_config, write_default_config, Config};
use palettebot::contrast::PairSource;
use palettebot::report::{generate_report, OutputFormat, Severity};
use palettebot::scanner::{self, SourceFile};
use palettebot::{AuditEngine, ColorValue, ConsistencyReport, WcagStatus};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn engine() -> AuditEngine {
    AuditEngine::new(&Config::default()).expect("default config should build")
}

fn audit_fixtures() -> ConsistencyReport {
    scanner::audit_directory(&engine(), Path::new("tests/fixtures"))
}

fn audit_text(path: &str, text: &str) -> ConsistencyReport {
    engine().audit(&[SourceFile::new(path, text)])
}

#[test]
fn test_fixtures_directory() {
    let report = audit_fixtures();
    assert_eq!(report.files_scanned, 3);

    let fail_aa = report.contrast_with_status(WcagStatus::FailAa);
    assert_eq!(fail_aa.len(), 1);
    assert_eq!(fail_aa[0].selector, ".muted");
    assert_eq!(fail_aa[0].foreground.as_str(), "#999999");

    let fail_aaa = report.contrast_with_status(WcagStatus::FailAaa);
    assert_eq!(fail_aaa.len(), 1);
    assert_eq!(fail_aaa[0].selector, "<p style>");
    assert_eq!(fail_aaa[0].source, PairSource::InlineStyle);

    assert_eq!(report.contrast_with_status(WcagStatus::Pass).len(), 3);
    assert!(report.should_fail());
}

#[test]
fn test_fixture_variables_resolve() {
    let report = audit_fixtures();
    let hero = report
        .contrast
        .iter()
        .find(|f| f.selector == ".hero")
        .expect("hero pair should resolve through custom properties");
    assert_eq!(hero.foreground.as_str(), "#1E3A8A");
    assert_eq!(hero.background.as_str(), "#FDFBF7");
    assert_eq!(hero.status, WcagStatus::Pass);
}

#[test]
fn test_fixture_utility_pair() {
    let report = audit_fixtures();
    let header = report
        .contrast
        .iter()
        .find(|f| f.source == PairSource::UtilityClass)
        .expect("utility pair");
    assert_eq!(header.selector, "bg-trust-800 + text-white");
    assert_eq!(header.status, WcagStatus::Pass);
}

#[test]
fn test_fixture_decorative_pseudo_element_skipped() {
    let report = audit_fixtures();
    assert!(report.contrast.iter().all(|f| !f.selector.contains("::before")));
}

#[test]
fn test_fixture_color_reconciliation() {
    let report = audit_fixtures();
    // Definitions in tokens.css and the embedded blockquote are not usages
    assert_eq!(report.color.total_usages, 10);
    assert_eq!(report.color.undefined_usages, 6);
    assert_eq!(report.scores.color, 40.0);

    let legacy = report
        .color
        .undefined
        .iter()
        .find(|r| r.color.as_str() == "#123456")
        .expect("#123456 is undefined");
    assert_eq!(legacy.count, 2);

    let merged = report
        .color
        .clusters
        .iter()
        .find(|c| c.members.len() > 1)
        .expect("#123456 and #123457 cluster together");
    assert_eq!(merged.representative.as_str(), "#123456");
    assert_eq!(merged.total_count, 3);
}

#[test]
fn test_fixture_spacing_and_typography() {
    let report = audit_fixtures();
    assert_eq!(report.spacing.total_usages, 5);
    assert_eq!(report.spacing.non_standard_usages, 2);
    assert_eq!(report.scores.spacing, 60.0);
    assert_eq!(report.typography.font_size_usages, 2);
    assert_eq!(report.scores.typography, 50.0);
    assert!((report.overall_score - 50.0).abs() < 1e-9);
}

#[test]
fn test_fixture_deprecated_and_components() {
    let report = audit_fixtures();
    assert_eq!(report.deprecated.len(), 1);
    assert_eq!(report.deprecated[0].token, "neutral-100");
    assert_eq!(report.deprecated[0].replacement, "sand-100");
    assert_eq!(report.components.button_usages, 1);
    assert_eq!(report.components.card_usages, 1);
}

#[test]
fn test_fixture_issues() {
    let report = audit_fixtures();
    let errors = report.issues_by_severity(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule_id, "PAL-CON-001");
    assert!(report.issues.iter().any(|i| i.rule_id == "PAL-TOK-002"));
    assert!(!report.recommendations.is_empty());
}

#[test]
fn test_black_on_white_pair() {
    let report = audit_text("a.css", ".x { color: #000; background: #fff; }");
    assert_eq!(report.contrast.len(), 1);
    assert!((report.contrast[0].ratio - 21.0).abs() < 1e-6);
    assert_eq!(report.contrast[0].status, WcagStatus::Pass);
}

#[test]
fn test_two_foregrounds_one_background() {
    let css = ".x {\n  color: #000;\n  color: #333;\n  background: #fff;\n}\n";
    let report = audit_text("a.css", css);
    assert_eq!(report.contrast.len(), 2);
}

#[test]
fn test_repeated_rule_deduplicated() {
    let css = ".x { color: #000; background: #fff; }\n.x { color: #000; background: #fff; }\n";
    assert_eq!(audit_text("a.css", css).contrast.len(), 1);
}

#[test]
fn test_unresolved_variable_drops_pair() {
    let report = audit_text("a.css", ".x { color: var(--nope); background: #fff; }");
    assert!(report.contrast.is_empty());
}

#[test]
fn test_repeated_undefined_color() {
    let css = (1..=6)
        .map(|i| format!(".c{} {{ color: #123456; }}\n", i))
        .collect::<String>();
    let report = audit_text("a.css", &css);
    assert_eq!(report.color.undefined.len(), 1);
    assert_eq!(report.color.undefined[0].count, 6);
}

#[test]
fn test_third_party_and_definition_excluded() {
    let html = r#"<blockquote class="instagram-media" style="background:#FFF; border:0;"></blockquote>"#;
    assert_eq!(audit_text("embed.html", html).color.total_usages, 0);

    let css = ":root {\n  --brand: #ABCDEF;\n}\n";
    assert_eq!(audit_text("tokens.css", css).color.total_usages, 0);
}

#[test]
fn test_empty_corpus_report() {
    let report = engine().audit(&[]);
    assert_eq!(report.scores.color, 100.0);
    assert_eq!(report.scores.spacing, 100.0);
    assert_eq!(report.scores.typography, 100.0);
    assert_eq!(report.scores.components, 75.0);
    assert!(report.issues.is_empty());
    assert!(!report.should_fail());
}

#[test]
fn test_normalize_equivalence() {
    let short = ColorValue::parse("#ABC").unwrap();
    let long = ColorValue::parse("#AABBCC").unwrap();
    assert_eq!(short, long);
    assert_eq!(ColorValue::parse(short.as_str()).unwrap(), short);
}

#[test]
fn test_scan_tempdir_skips_excluded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("site.css"), ".a { color: #000; background: #fff; }").unwrap();
    fs::create_dir(dir.path().join("node_modules")).unwrap();
    fs::write(
        dir.path().join("node_modules/lib.css"),
        ".b { color: #aaa; background: #fff; }",
    )
    .unwrap();

    let report = scanner::audit_directory(&engine(), dir.path());
    assert_eq!(report.files_scanned, 1);
    assert!(!report.should_fail());
}

#[test]
fn test_output_formats() {
    let report = audit_fixtures();

    let md = generate_report(&report, OutputFormat::Markdown);
    assert!(md.contains("RESULT: FAIL"));
    assert!(md.contains("#123456"));

    let json = generate_report(&report, OutputFormat::Json);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["files_scanned"], 3);

    let sarif = generate_report(&report, OutputFormat::Sarif);
    let parsed: serde_json::Value = serde_json::from_str(&sarif).unwrap();
    assert_eq!(parsed["version"], "2.1.0");
    assert_eq!(parsed["runs"][0]["tool"]["driver"]["name"], "palettebot");
}

#[test]
fn test_config_roundtrip_drives_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("palettebot.toml");
    write_default_config(&path).unwrap();

    let mut config = load_config(&path).unwrap();
    config
        .palette
        .insert("legacy-navy".to_string(), "#123456".to_string());
    let engine = AuditEngine::new(&config).unwrap();

    let report = engine.audit(&[SourceFile::new("a.css", ".x { color: #123456; }")]);
    assert_eq!(report.color.undefined_usages, 0);
    assert_eq!(report.color.token_usage.get("legacy-navy"), Some(&1));
}
