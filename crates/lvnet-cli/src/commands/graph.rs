use std::fs;
use std::path::Path;

use anyhow::Result;
use lvnet_cli::cli::GraphCommands;
use lvnet_core::CircuitGraph;
use lvnet_io::{ColumnLayout, NumericTable};
use tracing::warn;

fn load_graph(segments: &Path, layout: &ColumnLayout) -> Result<CircuitGraph> {
    let table = NumericTable::from_path(segments)?;
    let segments = layout.segments(&table)?;
    let graph = CircuitGraph::from_segments(&segments);
    for conflict in graph.phase_conflicts() {
        warn!(
            edge = %conflict.edge,
            kept = conflict.kept_code,
            discarded = conflict.discarded_code,
            "parallel segments with different phases"
        );
    }
    Ok(graph)
}

pub fn handle(command: &GraphCommands, layout: &ColumnLayout) -> Result<()> {
    match command {
        GraphCommands::Stats { segments } => {
            let graph = load_graph(segments, layout)?;
            let stats = graph.stats();
            println!("Graph statistics for {}:", segments.display());
            println!("  Nodes         : {}", stats.node_count);
            println!("  Edges         : {}", stats.edge_count);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Degree [min/avg/max]: {}/{:.2}/{}",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );
            println!("  Cycles        : {}", stats.cyclomatic_number);
            if !graph.phase_conflicts().is_empty() {
                println!("  Phase conflicts: {}", graph.phase_conflicts().len());
            }
            Ok(())
        }
        GraphCommands::Export { segments, out } => {
            let graph = load_graph(segments, layout)?;
            let dot = graph.to_dot();
            if let Some(path) = out {
                fs::write(path, &dot)?;
                println!("Graph exported to {}", path.display());
            } else {
                println!("{dot}");
            }
            Ok(())
        }
    }
}
