//! Partitions command implementation

use crate::cli::args::Cli;
use crate::image::{format_address, partition_table};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub async fn execute_partitions_command(cli: &Cli, file: Option<PathBuf>) -> Result<()> {
    let project_dir = super::project_dir(cli)?;
    let path = match file {
        Some(file) => project_dir.join(file),
        None => {
            let config = super::load_config(cli, &project_dir)?;
            project_dir
                .join(&config.output_dir)
                .join(&config.artifacts.staged_partitions)
        }
    };

    let table = partition_table::read_partition_table(&path)
        .with_context(|| format!("Failed to read partition table {}", path.display()))?;
    let entries = partition_table::entries(&table);

    println!("🗂️  {} ({} partitions)", path.display(), entries.len());
    println!("{:<16} {:<24} {:>10} {:>10}", "Name", "Type", "Offset", "Size");
    for entry in &entries {
        println!(
            "{:<16} {:<24} {:>10} {:>10}",
            entry.name,
            entry.kind,
            format_address(entry.offset),
            format_address(entry.size)
        );
    }

    Ok(())
}
