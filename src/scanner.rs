// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Source tree enumeration
//!
//! Walks a directory, keeps files with configured extensions and hands them
//! to the [`AuditEngine`] in path order.

use crate::config::ScanConfig;
use crate::engine::AuditEngine;
use crate::error::Result;
use crate::report::ConsistencyReport;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// One input file and its text
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Read a single file
pub fn read_source(path: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(SourceFile::new(path, content))
}

fn is_scannable(path: &Path, scan: &ScanConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| scan.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Collect every scannable file under `root`, sorted by path.
///
/// A missing root or unreadable file contributes nothing.
pub fn collect_sources(root: &Path, scan: &ScanConfig) -> Vec<SourceFile> {
    info!("Scanning directory: {}", root.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !scan.exclude.iter().any(|d| d == name) && !name.starts_with('.')
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() || !is_scannable(entry.path(), scan) {
            continue;
        }
        match read_source(entry.path()) {
            Ok(file) => files.push(file),
            Err(e) => info!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    info!(files = files.len(), "Collected sources");
    files
}

/// Collect and audit a directory in one step
pub fn audit_directory(engine: &AuditEngine, root: &Path) -> ConsistencyReport {
    let files = collect_sources(root, &engine.config().scan);
    engine.audit(&files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nonexistent_dir() {
        let engine = AuditEngine::new(&Config::default()).unwrap();
        let report = audit_directory(&engine, Path::new("/nonexistent/path"));
        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.overall_score, 100.0);
    }

    #[test]
    fn test_collect_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.css"), ".b { color: #000; }").unwrap();
        fs::write(dir.path().join("a.html"), "<p></p>").unwrap();
        fs::write(dir.path().join("notes.md"), "#fff").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/lib.css"), ".x { color: red; }").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/x.css"), ".x { color: red; }").unwrap();

        let files = collect_sources(dir.path(), &ScanConfig::default());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.html", "b.css"]);
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("MAIN.CSS"), "").unwrap();
        assert_eq!(collect_sources(dir.path(), &ScanConfig::default()).len(), 1);
    }

    #[test]
    fn test_read_source_missing_file() {
        assert!(read_source(Path::new("/nonexistent/file.css")).is_err());
    }
}
