//! Configuration file (`lvnet.toml`).
//!
//! Every section is optional:
//!
//! ```toml
//! [columns.segments]
//! phase = 3
//!
//! [report]
//! path = "reports/errors.txt"
//! append = true
//! line_ending = "lf"
//!
//! [compatibility.segment_to_segment]
//! A = ["A", "AB", "CA", "ABC"]
//! ```
//!
//! When `[compatibility]` is present it replaces the standard tables
//! entirely; upstream phases it does not list feed nothing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lvnet_core::{CompatibilitySpec, PhaseCompatibility};
use serde::{Deserialize, Serialize};

use crate::layout::ColumnLayout;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LvnetConfig {
    /// Column positions of the input tables
    #[serde(default)]
    pub columns: ColumnLayout,
    /// Alternate phasing standard
    #[serde(default)]
    pub compatibility: Option<CompatibilitySpec>,
    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: PathBuf,
    /// Append to an existing report instead of truncating it
    #[serde(default = "default_append")]
    pub append: bool,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            append: default_append(),
            line_ending: LineEnding::default(),
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("error_report.txt")
}

fn default_append() -> bool {
    true
}

impl LvnetConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config '{}'", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: LvnetConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Compatibility tables for this configuration.
    pub fn compatibility(&self) -> Result<PhaseCompatibility> {
        match &self.compatibility {
            Some(spec) => Ok(PhaseCompatibility::from_spec(spec)?),
            None => Ok(PhaseCompatibility::default()),
        }
    }
}
