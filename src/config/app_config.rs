//! Packager configuration management

use crate::errors::{PackagerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the project directory when none is given
pub const CONFIG_FILE_NAME: &str = "fwpack.toml";

/// Main packager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// Product name used for the final artifact names
    pub product: String,
    /// Output directory, relative to the project directory
    pub output_dir: PathBuf,
    /// Version file, relative to the project directory
    pub version_file: PathBuf,
    /// Version used when the version file cannot be read
    pub default_version: String,
    /// Source and staged artifact file names
    pub artifacts: ArtifactNames,
    /// Merge step configuration
    pub merge: MergeConfig,
    /// Firmware readiness polling
    pub settle: SettleConfig,
}

/// File names of the build artifacts and of their staged copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    pub firmware: String,
    pub partitions: String,
    pub bootloader: String,
    pub staged_firmware: String,
    pub staged_partitions: String,
    pub staged_bootloader: String,
}

/// Which merge implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeTool {
    /// Run an external merge program
    External,
    /// Write the merged image in-process
    Native,
}

/// Merge step configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub tool: MergeTool,
    /// External program to execute
    pub program: String,
    /// Arguments placed before the generated merge arguments
    pub args: Vec<String>,
    /// Flash address that corresponds to offset 0 of the native merged image
    pub flash_base: u32,
}

/// Polling parameters used to wait for the firmware image to stop changing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub poll_interval_ms: u64,
    /// Consecutive unchanged polls required; 0 disables polling
    pub stable_polls: u32,
    pub timeout_ms: u64,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            product: String::new(),
            output_dir: PathBuf::from("bin"),
            version_file: PathBuf::from("tools/version"),
            default_version: "0.0.0".to_string(),
            artifacts: ArtifactNames::default(),
            merge: MergeConfig::default(),
            settle: SettleConfig::default(),
        }
    }
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            firmware: "firmware.bin".to_string(),
            partitions: "partitions.bin".to_string(),
            bootloader: "bootloader.bin".to_string(),
            staged_firmware: "firmware.bin".to_string(),
            staged_partitions: "partitions.bin".to_string(),
            staged_bootloader: "bootloader_dio_40m.bin".to_string(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tool: MergeTool::External,
            program: "python".to_string(),
            args: vec!["tools/merge_bin_esp.py".to_string()],
            flash_base: 0,
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            stable_polls: 2,
            timeout_ms: 10_000,
        }
    }
}

impl PackagerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PackagerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `explicit` if given, otherwise `fwpack.toml` from the project
    /// directory, otherwise the defaults.
    pub fn load_or_default(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = project_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Loading configuration from {}", candidate.display());
            Self::load(&candidate)
        } else {
            log::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(Self::default())
        }
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PackagerError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Name of the merged image before it is renamed
    pub fn merged_name(&self) -> String {
        format!("{}.bin", self.product)
    }

    /// Final name of the versioned merged image
    pub fn versioned_name(&self, version: &str) -> String {
        format!("{}_v{}.full.bin", self.product, version)
    }

    /// Glob pattern (relative to the output directory) of outputs left by earlier runs
    pub fn stale_pattern(&self) -> String {
        format!("{}*.bin", glob::Pattern::escape(&self.product))
    }

    /// Check that the configuration can drive a packaging run
    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(PackagerError::Config(
                "product name is not set (use --product or `product` in fwpack.toml)".to_string(),
            ));
        }

        if self.product.contains(['/', '\\']) {
            return Err(PackagerError::Config(format!(
                "product name must not contain path separators: {}",
                self.product
            )));
        }

        if self.default_version.trim().is_empty() {
            return Err(PackagerError::Config(
                "default_version must not be empty".to_string(),
            ));
        }

        let pattern = glob::Pattern::new(&self.stale_pattern())
            .map_err(|e| PackagerError::Config(format!("invalid product pattern: {}", e)))?;
        let staged = [
            &self.artifacts.staged_firmware,
            &self.artifacts.staged_partitions,
            &self.artifacts.staged_bootloader,
        ];
        if let Some(name) = staged.into_iter().find(|name| pattern.matches(name)) {
            return Err(PackagerError::Config(format!(
                "stale-output pattern '{}' would delete staged file '{}'",
                self.stale_pattern(),
                name
            )));
        }

        if self.merge.tool == MergeTool::External && self.merge.program.trim().is_empty() {
            return Err(PackagerError::Config(
                "merge.program must be set for the external merger".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(product: &str) -> PackagerConfig {
        PackagerConfig {
            product: product.to_string(),
            ..PackagerConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_build_layout() {
        let config = PackagerConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("bin"));
        assert_eq!(config.version_file, PathBuf::from("tools/version"));
        assert_eq!(config.default_version, "0.0.0");
        assert_eq!(config.artifacts.staged_bootloader, "bootloader_dio_40m.bin");
        assert_eq!(config.merge.tool, MergeTool::External);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PackagerConfig::from_toml_str(
            r#"
product = "GW90"

[merge]
tool = "native"
"#,
        )
        .unwrap();

        assert_eq!(config.product, "GW90");
        assert_eq!(config.merge.tool, MergeTool::Native);
        assert_eq!(config.merge.program, "python");
        assert_eq!(config.settle, SettleConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = PackagerConfig::from_toml_str("product = [").unwrap_err();
        assert!(matches!(err, PackagerError::Config(_)));
    }

    #[test]
    fn test_names() {
        let config = config_for("AVATTO-GW90-Ti");
        assert_eq!(config.merged_name(), "AVATTO-GW90-Ti.bin");
        assert_eq!(config.versioned_name("1.2.3"), "AVATTO-GW90-Ti_v1.2.3.full.bin");
        assert_eq!(config.stale_pattern(), "AVATTO-GW90-Ti*.bin");
    }

    #[test]
    fn test_validate_rejects_bad_products() {
        assert!(config_for("").validate().is_err());
        assert!(config_for("a/b").validate().is_err());
        // "firmware*.bin" would match the staged firmware copy
        assert!(config_for("firmware").validate().is_err());
        assert!(config_for("boot").validate().is_err());
        assert!(config_for("GW90").validate().is_ok());
    }

    #[test]
    fn test_stale_pattern_escapes_glob_characters() {
        let config = config_for("dev[1]");
        let pattern = glob::Pattern::new(&config.stale_pattern()).unwrap();
        assert!(pattern.matches("dev[1]_v1.0.0.full.bin"));
        assert!(!pattern.matches("dev1.bin"));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = config_for("GW90");
        let text = config.to_toml_string().unwrap();
        assert_eq!(PackagerConfig::from_toml_str(&text).unwrap(), config);
    }
}
