//! CLI command implementations

pub mod init_config;
pub mod package;
pub mod partitions;

use crate::cli::args::{Cli, Commands};
use crate::config::PackagerConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Execute a CLI command
pub async fn execute_command(command: Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Package(args) => package::execute_package_command(cli, &args).await,
        Commands::InitConfig { product, force } => {
            init_config::execute_init_config_command(cli, product, force).await
        }
        Commands::Partitions { file } => partitions::execute_partitions_command(cli, file).await,
    }
}

/// Project directory given on the command line, or the current directory
pub(crate) fn project_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Load the configuration for the selected project
pub(crate) fn load_config(cli: &Cli, project_dir: &std::path::Path) -> Result<PackagerConfig> {
    PackagerConfig::load_or_default(project_dir, cli.config.as_deref())
        .context("Failed to load packager configuration")
}
