use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lvnet", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Path to an lvnet.toml configuration file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a circuit from its four CSV tables
    Verify {
        /// Transformer table (Trafos.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        transformer: PathBuf,
        /// Segment table (Tramos.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        segments: PathBuf,
        /// User table (Usuarios.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        users: PathBuf,
        /// Hourly load curve (Curvas.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        curve: PathBuf,
        /// Report file (overrides the configured path)
        #[arg(long, value_hint = ValueHint::FilePath)]
        report: Option<PathBuf>,
        /// Do not write the report file
        #[arg(long)]
        no_report: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Graph utilities over a segment table
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Phase-compatibility tables
    Compat {
        #[command(subcommand)]
        command: CompatCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats {
        /// Segment table (Tramos.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        segments: PathBuf,
    },
    /// Export the circuit graph to Graphviz
    Export {
        /// Segment table (Tramos.csv)
        #[arg(long, value_hint = ValueHint::FilePath)]
        segments: PathBuf,
        /// Optional output file path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompatCommands {
    /// Print the active compatibility tables
    Show {
        /// Print as a TOML `[compatibility]` section
        #[arg(long)]
        toml: bool,
    },
}
