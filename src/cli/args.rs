//! Command line argument parsing

use crate::config::{MergeTool, PackagerConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "fwpack")]
#[command(
    about = "📦 Post-build firmware packager - merges bootloader, partition table and firmware into one flashable image"
)]
pub struct Cli {
    /// Project directory that relative paths are resolved against (defaults to current directory)
    #[arg(global = true, value_name = "PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Configuration file (defaults to PROJECT_DIR/fwpack.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Package options for the bare invocation used from post-build hooks
    #[command(flatten)]
    pub package: PackageArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Package the artifacts of a finished build (default)
    Package(PackageArgs),
    /// Write a default configuration file
    InitConfig {
        /// Product name written into the configuration
        #[arg(short, long)]
        product: Option<String>,
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// List the entries of a binary partition table
    Partitions {
        /// Partition table to read (defaults to the staged partitions.bin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Options of the package command, also used when no subcommand is given
#[derive(Args, Clone, Debug, Default)]
pub struct PackageArgs {
    /// Toolchain build directory containing firmware.bin
    #[arg(short, long, env = "FWPACK_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// Product name used for the output file names
    #[arg(short, long)]
    pub product: Option<String>,

    /// Output directory for staged and final artifacts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File whose first line is the version string
    #[arg(long)]
    pub version_file: Option<PathBuf>,

    /// Merge implementation to use
    #[arg(short, long, value_enum)]
    pub merger: Option<MergeTool>,
}

impl PackageArgs {
    /// Fill options missing here from `outer`, the options given before the
    /// subcommand
    pub fn or(&self, outer: &PackageArgs) -> PackageArgs {
        PackageArgs {
            build_dir: self.build_dir.clone().or_else(|| outer.build_dir.clone()),
            product: self.product.clone().or_else(|| outer.product.clone()),
            output_dir: self.output_dir.clone().or_else(|| outer.output_dir.clone()),
            version_file: self
                .version_file
                .clone()
                .or_else(|| outer.version_file.clone()),
            merger: self.merger.or(outer.merger),
        }
    }

    /// Apply command line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut PackagerConfig) {
        if let Some(product) = &self.product {
            config.product = product.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(version_file) = &self.version_file {
            config.version_file = version_file.clone();
        }
        if let Some(merger) = self.merger {
            config.merge.tool = merger;
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
