// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! palettebot: Design Token Consistency & Accessibility Auditor
//!
//! Part of the Hyperpolymath Gitbot Fleet. Palettebot reads the textual source
//! of stylesheets and markup and reports how faithfully a project uses its
//! design-token palette:
//!
//! - **Colors**: literal extraction, normalization and reconciliation against
//!   the palette, with clustering of near-duplicate undefined colors
//! - **Contrast**: WCAG 2.x contrast ratios for foreground/background pairs
//!   declared in the same rule block, inline style or utility class list
//! - **Spacing & typography**: usage of non-standard lengths and font sizes
//! - **Deprecated tokens**: usages of retired palette names
//!
//! Nothing is rendered or executed; each declaration block is analyzed in
//! isolation.

pub mod color;
pub mod config;
pub mod contrast;
pub mod engine;
pub mod error;
pub mod extract;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod tokens;

pub use color::{contrast_ratio, ColorValue, SourceFormat};
pub use config::{load_config, Config};
pub use contrast::{ContrastFinding, WcagStatus};
pub use engine::AuditEngine;
pub use error::{PaletteError, Result};
pub use report::{generate_report, ConsistencyReport, OutputFormat};
pub use scanner::{audit_directory, collect_sources, SourceFile};
pub use tokens::TokenPalette;
