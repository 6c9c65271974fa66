use std::process::ExitCode;

use clap::Parser;
use lvnet_cli::cli::{Cli, Commands};
use lvnet_io::{CircuitPaths, LvnetConfig};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::verify::VerifyArgs;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries reports and tables; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match LvnetConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Loading configuration failed: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Verify {
            transformer,
            segments,
            users,
            curve,
            report,
            no_report,
            json,
        } => {
            info!("Verifying circuit from {}", transformer.display());
            let args = VerifyArgs {
                paths: CircuitPaths {
                    transformer: transformer.clone(),
                    segments: segments.clone(),
                    users: users.clone(),
                    load_curve: curve.clone(),
                },
                report: report.as_deref(),
                no_report: *no_report,
                json: *json,
            };
            commands::verify::handle(&args, &config).map_err(|e| ("Verify", e))
        }
        Commands::Graph { command } => {
            commands::graph::handle(command, &config.columns).map_err(|e| ("Graph", e))
        }
        Commands::Compat { command } => {
            commands::compat::handle(command, &config).map_err(|e| ("Compat", e))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err((name, e)) => {
            error!("{} command failed: {:?}", name, e);
            ExitCode::FAILURE
        }
    }
}
