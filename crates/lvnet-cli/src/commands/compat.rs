use std::io::{self, Write};

use anyhow::Result;
use lvnet_cli::cli::CompatCommands;
use lvnet_core::{PhaseCode, PhaseCompatibility};
use lvnet_io::LvnetConfig;
use tabwriter::TabWriter;

pub fn handle(command: &CompatCommands, config: &LvnetConfig) -> Result<()> {
    match command {
        CompatCommands::Show { toml } => {
            let compat = config.compatibility()?;
            if *toml {
                let section = LvnetConfig {
                    compatibility: Some(compat.to_spec()),
                    ..LvnetConfig::default()
                };
                print!("{}", section.to_toml()?);
                Ok(())
            } else {
                print_tables(&compat)
            }
        }
    }
}

fn print_tables(compat: &PhaseCompatibility) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout()).padding(2);
    writeln!(writer, "UPSTREAM\tSEGMENTS\tUSERS")?;
    for upstream in PhaseCode::ALL {
        let segments = allowed(|down| compat.segment_feeds_segment(upstream, down));
        let users = allowed(|user| compat.segment_feeds_user(upstream, user));
        writeln!(writer, "{}\t{}\t{}", upstream, segments, users)?;
    }
    writer.flush()?;
    Ok(())
}

fn allowed(mut feeds: impl FnMut(PhaseCode) -> bool) -> String {
    let names: Vec<&str> = PhaseCode::ALL
        .into_iter()
        .filter(|&phase| feeds(phase))
        .map(PhaseCode::name)
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(",")
    }
}
