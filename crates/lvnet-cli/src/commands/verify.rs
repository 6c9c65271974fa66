use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lvnet_algo::verify;
use lvnet_core::NodeId;
use lvnet_io::{load_circuit, write_report_to, CircuitPaths, LvnetConfig};
use serde::Serialize;
use tracing::info;

pub struct VerifyArgs<'a> {
    pub paths: CircuitPaths,
    pub report: Option<&'a Path>,
    pub no_report: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct VerifyOutput {
    circuit: NodeId,
    error_code: u32,
    report: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_file: Option<PathBuf>,
}

/// Runs the verification. A failing circuit is a normal outcome, not an error.
pub fn handle(args: &VerifyArgs<'_>, config: &LvnetConfig) -> Result<()> {
    let compat = config.compatibility()?;
    let input = load_circuit(&args.paths, &config.columns)?;
    let result = verify(&input, &compat);

    let report_path = if args.no_report {
        None
    } else {
        let path = args
            .report
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.report.path.clone());
        write_report_to(
            &result,
            &path,
            config.report.append,
            config.report.line_ending.as_str(),
        )
        .with_context(|| format!("writing report '{}'", path.display()))?;
        info!(path = %path.display(), "report written");
        Some(path)
    };

    if args.json {
        let payload = VerifyOutput {
            circuit: result.circuit,
            error_code: result.error_code(),
            report: result.report_lines(),
            report_file: report_path,
        };
        serde_json::to_writer_pretty(io::stdout(), &payload)
            .map_err(|err| anyhow::anyhow!("serializing verification result to JSON: {err}"))?;
        println!();
    } else {
        let mut stdout = io::stdout().lock();
        for line in result.report_lines() {
            writeln!(stdout, "{line}")?;
        }
    }
    Ok(())
}
