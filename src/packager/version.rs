//! Version string lookup

use crate::models::VersionSource;
use std::io::BufRead;
use std::path::Path;

/// Read the first line of `path` as the version.
///
/// Never fails: a missing, unreadable or empty file yields
/// [`VersionSource::Fallback`] with `default` and logs a warning.
pub fn read_version(path: &Path, default: &str) -> VersionSource {
    match first_line(path) {
        Ok(line) if line.is_empty() => {
            fallback(path, default, "version file is empty".to_string())
        }
        Ok(line) if line.contains(['/', '\\']) => fallback(
            path,
            default,
            format!("version '{}' contains path separators", line),
        ),
        Ok(line) => VersionSource::File {
            path: path.to_path_buf(),
            version: line,
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fallback(path, default, "file not found".to_string())
        }
        Err(e) => fallback(path, default, e.to_string()),
    }
}

fn first_line(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut line = String::new();
    std::io::BufReader::new(file).read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn fallback(path: &Path, default: &str, reason: String) -> VersionSource {
    log::warn!(
        "Cannot use version file {} ({}), using {}",
        path.display(),
        reason,
        default
    );
    VersionSource::Fallback {
        version: default.to_string(),
        reason,
    }
}
