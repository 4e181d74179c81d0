//! Packaging run data models

use std::fmt;
use std::path::{Path, PathBuf};

/// Role of a binary inside the merged flash image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    Bootloader,
    PartitionTable,
    Firmware,
}

impl SegmentRole {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentRole::Bootloader => "bootloader",
            SegmentRole::PartitionTable => "partition table",
            SegmentRole::Firmware => "firmware",
        }
    }
}

impl fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of copying an optional build artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactCopy {
    /// The artifact existed and was copied
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    /// The artifact is not produced by this build configuration
    Skipped { source: PathBuf },
}

impl ArtifactCopy {
    pub fn is_copied(&self) -> bool {
        matches!(self, ArtifactCopy::Copied { .. })
    }
}

/// Where the version string came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// First line of the version file
    File { path: PathBuf, version: String },
    /// The version file could not be used
    Fallback { version: String, reason: String },
}

impl VersionSource {
    pub fn version(&self) -> &str {
        match self {
            VersionSource::File { version, .. } => version,
            VersionSource::Fallback { version, .. } => version,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, VersionSource::Fallback { .. })
    }
}

/// Result of a completed packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Versioned merged image (`<product>_v<version>.full.bin`)
    pub full_image: PathBuf,
    /// Plain firmware image (`<product>.bin`)
    pub firmware_image: PathBuf,
    pub version: VersionSource,
    pub partitions: ArtifactCopy,
    pub bootloader: ArtifactCopy,
    /// Files removed by the stale-output cleanup
    pub removed: Vec<PathBuf>,
}

impl PackageReport {
    /// Completion banner naming both final artifacts
    pub fn summary_lines(&self) -> Vec<String> {
        let rule = "-".repeat(56);
        vec![
            String::new(),
            rule.clone(),
            created_line(&self.full_image),
            created_line(&self.firmware_image),
            rule,
            String::new(),
        ]
    }
}

fn created_line(path: &Path) -> String {
    format!("{} created with success !", path.display())
}
