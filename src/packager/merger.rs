//! Merge step implementations

use crate::config::{MergeConfig, MergeTool};
use crate::errors::{PackagerError, Result};
use crate::image::{MergePlan, merge_segments};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Produces the combined image described by a [`MergePlan`]
#[async_trait]
pub trait ImageMerger: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Write `plan.output_path()`. Inputs are already known to exist.
    async fn merge(&self, plan: &MergePlan) -> Result<()>;
}

/// Build the merger selected by the configuration
pub fn merger_for(config: &MergeConfig, project_dir: &Path) -> Box<dyn ImageMerger> {
    match config.tool {
        MergeTool::External => Box::new(ExternalMerger::new(
            config.program.clone(),
            config.args.clone(),
            project_dir.to_path_buf(),
        )),
        MergeTool::Native => Box::new(NativeMerger::new(config.flash_base)),
    }
}

/// Runs a merge program such as `merge_bin_esp.py`
#[derive(Debug, Clone)]
pub struct ExternalMerger {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ExternalMerger {
    pub fn new(program: String, args: Vec<String>, working_dir: PathBuf) -> Self {
        Self {
            program,
            args,
            working_dir,
        }
    }

    /// Full argument list: configured prefix followed by the plan
    pub fn command_args(&self, plan: &MergePlan) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();

        args.push("--output_folder".into());
        args.push(plan.output_dir().into());
        args.push("--output_name".into());
        args.push(plan.output_name().into());
        args.push("--bin_path".into());
        args.extend(plan.bin_paths().into_iter().map(OsString::from));
        args.push("--bin_address".into());
        args.extend(plan.hex_addresses().into_iter().map(OsString::from));

        args
    }

    /// Resolve the program through PATH, or relative to the working
    /// directory when it contains a path separator
    pub fn resolve_program(&self) -> Result<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            let candidate = self.working_dir.join(program);
            return if candidate.is_file() {
                Ok(candidate)
            } else {
                Err(PackagerError::MergeToolNotFound(self.program.clone()))
            };
        }

        which::which(&self.program)
            .map_err(|_| PackagerError::MergeToolNotFound(self.program.clone()))
    }
}

#[async_trait]
impl ImageMerger for ExternalMerger {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn merge(&self, plan: &MergePlan) -> Result<()> {
        let program = self.resolve_program()?;
        let args = self.command_args(plan);

        log::info!(
            "🔨 Executing: {} {}",
            self.program,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let status = Command::new(&program)
            .args(&args)
            .current_dir(&self.working_dir)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            log::error!("❌ Merge tool failed: {}", status);
            Err(PackagerError::MergeFailed {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}

/// Writes the combined image in-process
#[derive(Debug, Clone, Copy)]
pub struct NativeMerger {
    flash_base: u32,
}

impl NativeMerger {
    pub fn new(flash_base: u32) -> Self {
        Self { flash_base }
    }
}

#[async_trait]
impl ImageMerger for NativeMerger {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn merge(&self, plan: &MergePlan) -> Result<()> {
        let segments = plan.load_segments()?;
        for segment in &segments {
            log::debug!("   📦 {:?}", segment);
        }

        let image = merge_segments(&segments, self.flash_base)?;
        tokio::fs::write(plan.output_path(), &image).await?;

        log::info!(
            "🔨 Wrote {} ({} bytes)",
            plan.output_path().display(),
            image.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{APP_ADDR, BOOTLOADER_ADDR, PARTITION_TABLE_ADDR};
    use tempfile::TempDir;

    fn plan_in(dir: &Path) -> MergePlan {
        MergePlan::new(
            dir,
            "GW90.bin",
            dir.join("bootloader_dio_40m.bin"),
            dir.join("partitions.bin"),
            dir.join("firmware.bin"),
        )
    }

    #[test]
    fn test_external_command_args_order() {
        let merger = ExternalMerger::new(
            "python".to_string(),
            vec!["tools/merge_bin_esp.py".to_string()],
            PathBuf::from("."),
        );
        let plan = MergePlan::new(
            "./bin",
            "GW90.bin",
            "bin/bootloader_dio_40m.bin",
            "bin/partitions.bin",
            "bin/firmware.bin",
        );

        let args: Vec<String> = merger
            .command_args(&plan)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "tools/merge_bin_esp.py",
                "--output_folder",
                "./bin",
                "--output_name",
                "GW90.bin",
                "--bin_path",
                "bin/bootloader_dio_40m.bin",
                "bin/partitions.bin",
                "bin/firmware.bin",
                "--bin_address",
                "0x1000",
                "0x8000",
                "0x10000",
            ]
        );
    }

    #[test]
    fn test_unknown_program_is_not_found() {
        let merger = ExternalMerger::new(
            "definitely-not-a-merge-tool-4711".to_string(),
            Vec::new(),
            PathBuf::from("."),
        );
        assert!(matches!(
            merger.resolve_program(),
            Err(PackagerError::MergeToolNotFound(_))
        ));

        let relative = ExternalMerger::new(
            "tools/missing.sh".to_string(),
            Vec::new(),
            PathBuf::from("/nonexistent"),
        );
        assert!(relative.resolve_program().is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_external_non_zero_exit_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let merger = ExternalMerger::new(
            "sh".to_string(),
            vec!["-c".to_string(), "exit 3".to_string(), "merge".to_string()],
            temp_dir.path().to_path_buf(),
        );

        let err = merger.merge(&plan_in(temp_dir.path())).await.unwrap_err();
        match err {
            PackagerError::MergeFailed { code, .. } => assert_eq!(code, Some(3)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_native_merge_writes_image() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::write(dir.join("bootloader_dio_40m.bin"), [0x11u8; 8]).unwrap();
        std::fs::write(dir.join("partitions.bin"), [0x22u8; 8]).unwrap();
        std::fs::write(dir.join("firmware.bin"), [0x33u8; 8]).unwrap();

        let plan = plan_in(dir);
        NativeMerger::new(0).merge(&plan).await.unwrap();

        let image = std::fs::read(plan.output_path()).unwrap();
        assert_eq!(image.len(), APP_ADDR as usize + 8);
        assert_eq!(image[BOOTLOADER_ADDR as usize], 0x11);
        assert_eq!(image[PARTITION_TABLE_ADDR as usize], 0x22);
        assert_eq!(image[APP_ADDR as usize], 0x33);
        assert_eq!(image[0], 0xFF);
    }

    #[test]
    fn test_merger_for_selects_implementation() {
        let mut config = MergeConfig::default();
        assert_eq!(merger_for(&config, Path::new(".")).name(), "external");

        config.tool = MergeTool::Native;
        assert_eq!(merger_for(&config, Path::new(".")).name(), "native");
    }
}
