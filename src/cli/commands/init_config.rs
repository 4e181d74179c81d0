//! Init-config command implementation

use crate::cli::args::Cli;
use crate::config::{CONFIG_FILE_NAME, PackagerConfig};
use anyhow::Result;
use tokio::fs;

/// Generate a default configuration file
pub async fn execute_init_config_command(
    cli: &Cli,
    product: Option<String>,
    force: bool,
) -> Result<()> {
    let project_dir = super::project_dir(cli)?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| project_dir.join(CONFIG_FILE_NAME));

    if config_path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Configuration file '{}' already exists (use --force to overwrite)",
            config_path.display()
        ));
    }

    let config = PackagerConfig {
        product: product.unwrap_or_else(|| "my-device".to_string()),
        ..PackagerConfig::default()
    };
    let toml_content = config.to_toml_string()?;

    fs::write(&config_path, toml_content).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to write config file '{}': {}",
            config_path.display(),
            e
        )
    })?;

    println!(
        "✅ Generated default configuration file: {}",
        config_path.display()
    );
    println!("ℹ️  Edit `product` and the [merge] section to match your build.");

    Ok(())
}
