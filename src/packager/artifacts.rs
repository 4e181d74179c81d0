//! Copying build artifacts into the output directory

use crate::errors::{PackagerError, Result};
use crate::models::ArtifactCopy;
use std::path::Path;

/// Copy an artifact the build must have produced
pub fn copy_required(source: &Path, destination: &Path) -> Result<u64> {
    if !source.is_file() {
        return Err(PackagerError::MissingArtifact(source.to_path_buf()));
    }

    let bytes = std::fs::copy(source, destination)?;
    log::debug!(
        "Copied {} -> {} ({} bytes)",
        source.display(),
        destination.display(),
        bytes
    );
    Ok(bytes)
}

/// Copy an artifact only some build configurations produce.
///
/// Absence is reported as [`ArtifactCopy::Skipped`]; a source that exists but
/// cannot be copied is an error.
pub fn copy_optional(source: &Path, destination: &Path) -> Result<ArtifactCopy> {
    match std::fs::metadata(source) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => {
            return Err(PackagerError::Io(std::io::Error::other(format!(
                "{} is not a regular file",
                source.display()
            ))));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("Optional artifact {} not present, skipping", source.display());
            return Ok(ArtifactCopy::Skipped {
                source: source.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    }

    let bytes = std::fs::copy(source, destination)?;
    log::debug!(
        "Copied {} -> {} ({} bytes)",
        source.display(),
        destination.display(),
        bytes
    );
    Ok(ArtifactCopy::Copied {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        bytes,
    })
}
