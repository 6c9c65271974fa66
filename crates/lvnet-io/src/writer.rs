//! Report persistence.
//!
//! Each run is written as one block in a single `write_all`, so a report file
//! shared by several runs never interleaves their lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use lvnet_core::{LvnetResult, VerificationResult};
use tracing::debug;

use crate::config::ReportConfig;

pub fn write_report(result: &VerificationResult, config: &ReportConfig) -> LvnetResult<()> {
    write_report_to(result, &config.path, config.append, config.line_ending.as_str())
}

pub fn write_report_to(
    result: &VerificationResult,
    path: &Path,
    append: bool,
    line_ending: &str,
) -> LvnetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    file.write_all(result.render(line_ending).as_bytes())?;
    debug!(path = %path.display(), code = result.error_code(), "wrote report");
    Ok(())
}
