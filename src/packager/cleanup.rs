//! Removal of outputs left behind by earlier runs

use crate::errors::{PackagerError, Result};
use glob::glob;
use std::path::{Path, PathBuf};

/// Delete every file in `output_dir` matching `pattern` (a file name glob).
/// Returns the removed paths.
pub fn remove_stale_outputs(output_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir = glob::Pattern::escape(&output_dir.to_string_lossy());
    let full_pattern = format!("{}/{}", dir, pattern);

    let entries = glob(&full_pattern)
        .map_err(|e| PackagerError::Config(format!("invalid cleanup pattern: {}", e)))?;

    let mut removed = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PackagerError::Io(e.into_error()))?;
        if !path.is_file() {
            continue;
        }
        std::fs::remove_file(&path)?;
        log::info!("🧹 Removed stale output {}", path.display());
        removed.push(path);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_only_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in [
            "GW90.bin",
            "GW90_v1.0.0.full.bin",
            "firmware.bin",
            "partitions.bin",
            "GW90.txt",
        ] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let mut removed = remove_stale_outputs(dir, "GW90*.bin").unwrap();
        removed.sort();

        assert_eq!(
            removed,
            vec![dir.join("GW90.bin"), dir.join("GW90_v1.0.0.full.bin")]
        );
        assert!(dir.join("firmware.bin").exists());
        assert!(dir.join("partitions.bin").exists());
        assert!(dir.join("GW90.txt").exists());
    }

    #[test]
    fn test_output_dir_with_glob_characters() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("out[1]");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("GW90.bin"), b"x").unwrap();

        let removed = remove_stale_outputs(&dir, "GW90*.bin").unwrap();
        assert_eq!(removed, vec![dir.join("GW90.bin")]);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(remove_stale_outputs(temp_dir.path(), "GW90*.bin")
            .unwrap()
            .is_empty());
    }
}
