// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! palettebot CLI - Design Token Consistency & Accessibility Auditor
//!
//! Part of the gitbot-fleet ecosystem.

use clap::{Parser, Subcommand, ValueEnum};
use palettebot::config::{self, Config};
use palettebot::report::{generate_report, OutputFormat};
use palettebot::{scanner, AuditEngine, ContrastFinding, WcagStatus};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Design token consistency and color accessibility auditor for gitbot-fleet
#[derive(Parser)]
#[command(name = "palettebot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a directory of stylesheets and markup
    Audit {
        /// Directory to scan
        dir: PathBuf,

        /// Output format
        #[arg(long, default_value = "markdown")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the full JSON report to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// List contrast findings for a single file
    Contrast {
        /// File to analyze
        file: PathBuf,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Write a default configuration file
    Init {
        /// Write TOML instead of YAML
        #[arg(long)]
        toml: bool,
    },

    /// Show the effective configuration
    Show,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable Markdown
    Markdown,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("palettebot=debug")
    } else {
        EnvFilter::new("palettebot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Audit { dir, format, output, json, verbose } => {
            init_logging(verbose);
            let config = config::load_config(&config_path)?;
            let engine = AuditEngine::new(&config)?;
            let report = scanner::audit_directory(&engine, &dir);

            write_output(&generate_report(&report, format.into()), output.as_deref())?;
            if let Some(path) = json {
                write_output(&generate_report(&report, OutputFormat::Json), Some(&path))?;
            }

            if report.should_fail() {
                std::process::exit(1);
            }
        }

        Commands::Contrast { file, json, verbose } => {
            init_logging(verbose);
            let config = config::load_config(&config_path)?;
            let engine = AuditEngine::new(&config)?;
            let source = scanner::read_source(&file)?;
            let report = engine.audit(std::slice::from_ref(&source));

            if json {
                println!("{}", serde_json::to_string_pretty(&report.contrast)?);
            } else {
                print_contrast(&report.contrast);
            }

            if report.contrast.iter().any(|f| f.status == WcagStatus::FailAa) {
                std::process::exit(1);
            }
        }

        Commands::Init { toml } => {
            let path = if toml {
                config_path.with_extension("toml")
            } else {
                config_path
            };
            if path.exists() {
                anyhow::bail!("Config file already exists: {}", path.display());
            }
            config::write_default_config(&path)?;
            eprintln!("Config written to {}", path.display());
        }

        Commands::Show => {
            let config: Config = config::load_config(&config_path)?;
            println!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

fn print_contrast(findings: &[ContrastFinding]) {
    if findings.is_empty() {
        println!("No foreground/background pairs found.");
        return;
    }
    for f in findings {
        println!(
            "[{}] {:.2}:1  {} on {}  {} (line {})",
            f.status,
            f.ratio,
            f.foreground.as_str(),
            f.background.as_str(),
            f.selector,
            f.line
        );
    }
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
