//! # lvnet-io: Table Loading, Configuration and Report Output
//!
//! Turns the four CSV exports of a circuit into a [`lvnet_core::CircuitInput`]
//! and persists verification reports.
//!
//! - [`table`] - numeric-column extraction from CSV
//! - [`layout`] - positional mapping of numeric columns onto records
//! - [`config`] - `lvnet.toml` configuration
//! - [`writer`] - report file output

use std::path::PathBuf;

use anyhow::{Context, Result};
use lvnet_core::CircuitInput;
use tracing::info;

pub mod config;
pub mod layout;
pub mod table;
pub mod writer;

pub use config::{LineEnding, LvnetConfig, ReportConfig};
pub use layout::{CircuitTables, ColumnLayout};
pub use table::NumericTable;
pub use writer::{write_report, write_report_to};

/// Locations of the four tables of one circuit.
#[derive(Debug, Clone)]
pub struct CircuitPaths {
    pub transformer: PathBuf,
    pub segments: PathBuf,
    pub users: PathBuf,
    pub load_curve: PathBuf,
}

pub fn load_tables(paths: &CircuitPaths) -> Result<CircuitTables> {
    Ok(CircuitTables {
        transformer: NumericTable::from_path(&paths.transformer)?,
        segments: NumericTable::from_path(&paths.segments)?,
        users: NumericTable::from_path(&paths.users)?,
        load_curve: NumericTable::from_path(&paths.load_curve)?,
    })
}

/// Reads and maps the four tables of a circuit.
pub fn load_circuit(paths: &CircuitPaths, layout: &ColumnLayout) -> Result<CircuitInput> {
    let tables = load_tables(paths)?;
    let input = layout
        .circuit_input(&tables)
        .context("mapping table columns")?;
    info!(
        circuit = %input.transformer.circuit_id(),
        segments = input.segments.len(),
        users = input.users.len(),
        curve_points = input.load_curve.values().len(),
        "loaded circuit tables"
    );
    Ok(input)
}
