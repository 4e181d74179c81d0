//! Wait for a freshly written build artifact to stop changing

use crate::config::SettleConfig;
use crate::errors::{PackagerError, Result};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

fn stamp(path: &Path) -> Result<FileStamp> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PackagerError::MissingArtifact(path.to_path_buf()),
        _ => PackagerError::Io(e),
    })?;
    Ok(FileStamp {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Poll `path` until its size and modification time stay the same for
/// `settle.stable_polls` consecutive polls. Returns the final size.
///
/// A missing file fails immediately with [`PackagerError::MissingArtifact`].
pub async fn wait_for_stable_file(path: &Path, settle: &SettleConfig) -> Result<u64> {
    let mut last = stamp(path)?;
    if settle.stable_polls == 0 {
        return Ok(last.len);
    }

    let interval = Duration::from_millis(settle.poll_interval_ms);
    let deadline = Instant::now() + Duration::from_millis(settle.timeout_ms);
    let mut unchanged = 0;

    while unchanged < settle.stable_polls {
        if Instant::now() >= deadline {
            log::error!(
                "{} still changing after {} ms",
                path.display(),
                settle.timeout_ms
            );
            return Err(PackagerError::NotReady(path.to_path_buf()));
        }

        tokio::time::sleep(interval).await;

        let current = stamp(path)?;
        if current == last {
            unchanged += 1;
        } else {
            log::trace!(
                "{} changed ({} -> {} bytes)",
                path.display(),
                last.len,
                current.len
            );
            unchanged = 0;
            last = current;
        }
    }

    log::debug!("{} is stable at {} bytes", path.display(), last.len);
    Ok(last.len)
}
