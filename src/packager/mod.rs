//! Post-build packaging pipeline
//!
//! A [`Packager`] takes the firmware produced by the toolchain, stages it
//! together with the optional bootloader and partition table, merges the
//! three into one flashable image and gives both final artifacts their
//! product and version based names.

pub mod artifacts;
pub mod cleanup;
pub mod merger;
pub mod readiness;
pub mod version;

pub use merger::{ExternalMerger, ImageMerger, NativeMerger, merger_for};

use crate::config::PackagerConfig;
use crate::errors::{PackagerError, Result};
use crate::image::{APP_ADDR, MergePlan, partition_table};
use crate::models::PackageReport;
use std::path::{Path, PathBuf};

/// Paths supplied by the build system for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Directory relative configuration paths are resolved against
    pub project_dir: PathBuf,
    /// Toolchain output directory holding `firmware.bin` and friends
    pub build_dir: PathBuf,
}

impl BuildContext {
    /// The project directory is made absolute so paths handed to the merge
    /// tool stay valid after it changes into that directory.
    pub fn new(project_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let project_dir = std::path::absolute(&project_dir).unwrap_or(project_dir);
        let build_dir = project_dir.join(build_dir.into());
        Self {
            project_dir,
            build_dir,
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.project_dir.join(path)
    }
}

/// Runs the packaging steps for one build
pub struct Packager {
    config: PackagerConfig,
    context: BuildContext,
    merger: Box<dyn ImageMerger>,
}

impl Packager {
    /// Create a packager using the merger selected in `config`
    pub fn new(config: PackagerConfig, context: BuildContext) -> Result<Self> {
        let merger = merger_for(&config.merge, &context.project_dir);
        Self::with_merger(config, context, merger)
    }

    /// Create a packager with an explicit merger
    pub fn with_merger(
        config: PackagerConfig,
        context: BuildContext,
        merger: Box<dyn ImageMerger>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context,
            merger,
        })
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn output_dir(&self) -> PathBuf {
        self.context.resolve(&self.config.output_dir)
    }

    fn staged(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    fn build_artifact(&self, name: &str) -> PathBuf {
        self.context.build_dir.join(name)
    }

    /// Execute the full packaging sequence
    pub async fn run(&self) -> Result<PackageReport> {
        let names = &self.config.artifacts;
        let output_dir = self.output_dir();

        log::info!("📦 Packaging {}", self.config.product);
        log::info!("📁 Build directory: {}", self.context.build_dir.display());

        let firmware_source = self.build_artifact(&names.firmware);
        readiness::wait_for_stable_file(&firmware_source, &self.config.settle).await?;

        std::fs::create_dir_all(&output_dir)?;
        let staged_firmware = self.staged(&names.staged_firmware);
        let firmware_len = artifacts::copy_required(&firmware_source, &staged_firmware)?;

        let removed = cleanup::remove_stale_outputs(&output_dir, &self.config.stale_pattern())?;

        let staged_partitions = self.staged(&names.staged_partitions);
        let partitions = artifacts::copy_optional(
            &self.build_artifact(&names.partitions),
            &staged_partitions,
        )?;
        let staged_bootloader = self.staged(&names.staged_bootloader);
        let bootloader = artifacts::copy_optional(
            &self.build_artifact(&names.bootloader),
            &staged_bootloader,
        )?;

        let plan = MergePlan::new(
            &output_dir,
            self.config.merged_name(),
            &staged_bootloader,
            &staged_partitions,
            &staged_firmware,
        );
        plan.check_inputs()?;
        self.inspect_partitions(&staged_partitions, firmware_len);

        log::info!("🔗 Merging image with the {} merger", self.merger.name());
        self.merger.merge(&plan).await?;

        let merged = plan.output_path();
        if !merged.is_file() {
            return Err(PackagerError::MergeOutputMissing(merged));
        }

        let version_file = self.context.resolve(&self.config.version_file);
        let version = version::read_version(&version_file, &self.config.default_version);

        let full_image = output_dir.join(self.config.versioned_name(version.version()));
        let firmware_image = output_dir.join(self.config.merged_name());
        std::fs::rename(&merged, &full_image)?;
        std::fs::rename(&staged_firmware, &firmware_image)?;

        log::info!("✅ Packaging of {} completed", self.config.product);

        Ok(PackageReport {
            full_image,
            firmware_image,
            version,
            partitions,
            bootloader,
            removed,
        })
    }

    fn inspect_partitions(&self, path: &Path, firmware_len: u64) {
        match partition_table::read_partition_table(path) {
            Ok(table) => {
                let entries = partition_table::entries(&table);
                let warnings =
                    partition_table::check_app_partition(&entries, APP_ADDR, firmware_len);
                for warning in warnings {
                    log::warn!("⚠️  {}", warning);
                }
            }
            Err(e) => log::warn!("⚠️  Could not inspect partition table: {}", e),
        }
    }
}
