// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Audit engine
//!
//! Runs every extractor over an ordered corpus and folds the results into a
//! [`ConsistencyReport`]. Custom properties are collected from all files
//! first so `var()` references resolve regardless of file order.

use crate::config::Config;
use crate::contrast::{ContrastEvaluator, PairSource};
use crate::error::Result;
use crate::extract::dimensions::DimensionPatterns;
use crate::extract::typography::TypographyPatterns;
use crate::extract::utility::UtilityPatterns;
use crate::extract::ColorPatterns;
use crate::report::{ConsistencyReport, RunTotals};
use crate::rules::{BlockAnalyzer, VariableTable};
use crate::scanner::SourceFile;
use crate::tokens::deprecated::DeprecatedTokens;
use crate::tokens::{cluster, Reconciler, TokenPalette};
use std::path::Path;
use tracing::{debug, info};

/// How a file's content is treated beyond plain color extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Stylesheet,
    Markup,
    Other,
}

pub struct AuditEngine {
    config: Config,
    palette: TokenPalette,
    colors: ColorPatterns,
    blocks: BlockAnalyzer,
    utilities: UtilityPatterns,
    dimensions: DimensionPatterns,
    typography: TypographyPatterns,
    deprecated: DeprecatedTokens,
    variables: VariableTable,
}

impl AuditEngine {
    /// Validate the configuration and compile every pattern up front
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            palette: TokenPalette::from_config(config)?,
            colors: ColorPatterns::new(config)?,
            blocks: BlockAnalyzer::new()?,
            utilities: UtilityPatterns::new()?,
            dimensions: DimensionPatterns::new(&config.spacing)?,
            typography: TypographyPatterns::new(&config.typography)?,
            deprecated: DeprecatedTokens::new(&config.deprecated)?,
            variables: VariableTable::new()?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &TokenPalette {
        &self.palette
    }

    fn kind_of(&self, path: &Path) -> FileKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let scan = &self.config.scan;
        if scan.stylesheet_extensions.iter().any(|e| e == &ext) {
            FileKind::Stylesheet
        } else if scan.markup_extensions.iter().any(|e| e == &ext) {
            FileKind::Markup
        } else {
            FileKind::Other
        }
    }

    /// Audit an ordered set of files. Never fails; an empty corpus yields an
    /// empty report.
    pub fn audit(&self, files: &[SourceFile]) -> ConsistencyReport {
        let thresholds = &self.config.thresholds;

        let mut variables = self.variables.clone();
        for file in files {
            variables.collect(&file.content);
        }
        debug!(variables = variables.len(), "Collected custom properties");

        let mut reconciler = Reconciler::new(
            &self.palette,
            thresholds.token_match_distance,
            thresholds.max_record_occurrences,
        );
        let mut evaluator = ContrastEvaluator::new();
        let mut totals = RunTotals::default();

        for file in files {
            let path = file.path.as_path();
            let text = file.content.as_str();
            let kind = self.kind_of(path);

            let before = evaluator.findings().len();
            for occurrence in self.colors.occurrences(path, text) {
                reconciler.add(occurrence);
            }

            match kind {
                FileKind::Stylesheet => {
                    for block in self.blocks.blocks(text) {
                        for pair in self.blocks.pairs(&block) {
                            evaluator.evaluate_pair(&pair, &variables, path, PairSource::RuleBlock);
                        }
                    }
                }
                FileKind::Markup => {
                    for block in self.blocks.inline_style_blocks(text) {
                        for pair in self.blocks.pairs(&block) {
                            evaluator.evaluate_pair(
                                &pair,
                                &variables,
                                path,
                                PairSource::InlineStyle,
                            );
                        }
                    }
                    for attribute in self.utilities.class_attributes(text) {
                        evaluator.evaluate_utilities(&attribute, &self.palette, path);
                    }
                }
                FileKind::Other => {}
            }

            self.tally_file(path, text, &mut totals);
            totals.deprecated.extend(self.deprecated.scan(path, text));
            totals.files_scanned += 1;

            debug!(
                file = %path.display(),
                ?kind,
                pairs = evaluator.findings().len() - before,
                "Audited file"
            );
        }

        totals.reconciliation = reconciler.finish();
        totals.clusters = cluster(
            &totals.reconciliation.undefined,
            thresholds.cluster_distance,
        );
        totals.contrast = evaluator.into_findings();

        info!(
            files = totals.files_scanned,
            colors = totals.reconciliation.total_usages,
            undefined = totals.reconciliation.undefined.len(),
            pairs = totals.contrast.len(),
            "Audit complete"
        );

        ConsistencyReport::build(totals, &self.palette, &self.config)
    }

    fn tally_file(&self, path: &Path, text: &str, totals: &mut RunTotals) {
        for hit in self.dimensions.spacing(text) {
            totals.spacing.add(&hit.value, hit.standard, path, hit.line);
        }
        for hit in self.typography.font_sizes(text, self.colors.embeds()) {
            totals.font_sizes.add(&hit.value, hit.standard, path, hit.line);
        }
        for hit in self.typography.font_weights(text) {
            totals.font_weights.add(&hit.value, true, path, hit.line);
        }
        for hit in self.typography.line_heights(text) {
            totals.line_heights.add(&hit.value, true, path, hit.line);
        }
        for hit in self.typography.font_families(text) {
            totals.font_families.add(&hit.value, true, path, hit.line);
        }
        for hit in self.dimensions.radii(text) {
            totals.border_radius.add(&hit.value, true, path, hit.line);
        }
        for hit in self.dimensions.shadows(text) {
            totals.box_shadow.add(&hit.value, true, path, hit.line);
        }
        for hit in self.dimensions.components(text) {
            let (buttons, cards): (Vec<&String>, Vec<&String>) = hit
                .classes
                .iter()
                .partition(|c| c.starts_with("btn") || c.starts_with("button"));
            if !buttons.is_empty() {
                let combo = buttons.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ");
                totals.buttons.add(&combo, true, path, hit.line);
            }
            if !cards.is_empty() {
                let combo = cards.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ");
                totals.cards.add(&combo, true, path, hit.line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contrast::WcagStatus;
    use std::path::PathBuf;

    fn source(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    fn engine() -> AuditEngine {
        AuditEngine::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_empty_corpus() {
        let report = engine().audit(&[]);
        assert_eq!(report.overall_score, 100.0);
        assert_eq!(report.files_scanned, 0);
        assert!(report.contrast.is_empty());
        assert!(report.color.undefined.is_empty());
    }

    #[test]
    fn test_invalid_palette_rejected() {
        let mut config = Config::default();
        config.palette.insert("broken".to_string(), "not-a-color".to_string());
        assert!(AuditEngine::new(&config).is_err());
    }

    #[test]
    fn test_variables_resolve_across_files() {
        let files = [
            source("a.css", ".card {\n  color: var(--ink);\n  background: var(--paper);\n}\n"),
            source("tokens.css", ":root {\n  --ink: #000;\n  --paper: #fff;\n}\n"),
        ];
        let report = engine().audit(&files);
        assert_eq!(report.contrast.len(), 1);
        assert_eq!(report.contrast[0].status, WcagStatus::Pass);
        // definitions are not usages
        assert_eq!(report.color.total_usages, 0);
    }

    #[test]
    fn test_markup_inline_and_utility_pairs() {
        let html = concat!(
            "<section class=\"bg-trust-50 text-white/80\">\n",
            "<p style=\"color: #999; background: #fff\">x</p>\n",
            "</section>\n"
        );
        let report = engine().audit(&[source("index.html", html)]);
        let sources: Vec<_> = report.contrast.iter().map(|f| f.source).collect();
        assert!(sources.contains(&PairSource::InlineStyle));
        assert!(sources.contains(&PairSource::UtilityClass));
        assert!(report.should_fail());
    }

    #[test]
    fn test_rule_blocks_ignored_outside_stylesheets() {
        let report = engine().audit(&[source("app.js", "const css = `.x { color: #000; background: #fff; }`;")]);
        assert!(report.contrast.is_empty());
        assert_eq!(report.color.total_usages, 2);
    }

    #[test]
    fn test_component_combinations() {
        let html = "<a class=\"btn btn-primary\"></a>\n<a class=\"btn btn-primary\"></a>\n<div class=\"card\"></div>";
        let report = engine().audit(&[source("index.html", html)]);
        assert_eq!(report.components.button_usages, 2);
        assert_eq!(report.components.button_variants.len(), 1);
        assert_eq!(report.components.card_usages, 1);
    }
}
