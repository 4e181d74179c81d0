//! Package command implementation
//!
//! Runs the post-build packaging sequence for one finished build and prints
//! the completion banner.

use crate::cli::args::{Cli, PackageArgs};
use crate::models::ArtifactCopy;
use crate::packager::{BuildContext, Packager};
use anyhow::{Context, Result};

/// Build the packager for one invocation.
///
/// Options given with the `package` subcommand take precedence over the same
/// options given before it. The build directory comes from `--build-dir` or
/// `FWPACK_BUILD_DIR` and is required.
pub fn prepare_packager(cli: &Cli, args: &PackageArgs) -> Result<Packager> {
    let args = args.or(&cli.package);

    let project_dir = super::project_dir(cli)?;
    if !project_dir.exists() {
        return Err(anyhow::anyhow!(
            "Project directory does not exist: {:?}",
            project_dir
        ));
    }

    let build_dir = args.build_dir.clone().ok_or_else(|| {
        anyhow::anyhow!("Build directory not set, pass --build-dir or set FWPACK_BUILD_DIR")
    })?;

    let mut config = super::load_config(cli, &project_dir)?;
    args.apply_to(&mut config);

    let context = BuildContext::new(&project_dir, build_dir);
    Packager::new(config, context).context("Invalid packager configuration")
}

pub async fn execute_package_command(cli: &Cli, args: &PackageArgs) -> Result<()> {
    let packager = prepare_packager(cli, args)?;

    let report = packager
        .run()
        .await
        .with_context(|| format!("Packaging of {} failed", packager.config().product))?;

    for (label, copy) in [
        ("partition table", &report.partitions),
        ("bootloader", &report.bootloader),
    ] {
        match copy {
            ArtifactCopy::Copied { destination, .. } => {
                log::debug!("Staged {} at {}", label, destination.display())
            }
            ArtifactCopy::Skipped { source } => log::debug!(
                "No {} at {}, using the staged copy",
                label,
                source.display()
            ),
        }
    }

    for line in report.summary_lines() {
        println!("{}", line);
    }

    Ok(())
}
