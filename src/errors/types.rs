//! Custom error types for fwpack

use std::fmt;
use std::path::PathBuf;

/// Main error type for packaging operations
#[derive(Debug)]
pub enum PackagerError {
    /// Configuration related errors
    Config(String),
    /// A required build artifact does not exist
    MissingArtifact(PathBuf),
    /// The artifact kept changing until the settle timeout expired
    NotReady(PathBuf),
    /// A staged merge input is missing from the output directory
    MissingMergeInput(PathBuf),
    /// The merge program could not be resolved
    MergeToolNotFound(String),
    /// The merge program exited unsuccessfully (`None` when killed by a signal)
    MergeFailed { program: String, code: Option<i32> },
    /// The merge step finished but did not write the expected image
    MergeOutputMissing(PathBuf),
    /// Flash segments cannot be laid out in a single image
    Layout(String),
    /// Partition table parsing errors
    PartitionTable(String),
    /// General I/O errors
    Io(std::io::Error),
}

impl fmt::Display for PackagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PackagerError::MissingArtifact(path) => {
                write!(f, "Build artifact not found: {}", path.display())
            }
            PackagerError::NotReady(path) => write!(
                f,
                "Build artifact did not settle before timeout: {}",
                path.display()
            ),
            PackagerError::MissingMergeInput(path) => {
                write!(f, "Merge input not found: {}", path.display())
            }
            PackagerError::MergeToolNotFound(program) => {
                write!(f, "Merge tool not found: {}", program)
            }
            PackagerError::MergeFailed { program, code } => match code {
                Some(code) => write!(f, "Merge tool '{}' exited with status {}", program, code),
                None => write!(f, "Merge tool '{}' was terminated by a signal", program),
            },
            PackagerError::MergeOutputMissing(path) => {
                write!(f, "Merged image was not produced: {}", path.display())
            }
            PackagerError::Layout(msg) => write!(f, "Flash layout error: {}", msg),
            PackagerError::PartitionTable(msg) => write!(f, "Partition table error: {}", msg),
            PackagerError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for PackagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackagerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PackagerError {
    fn from(err: std::io::Error) -> Self {
        PackagerError::Io(err)
    }
}

impl From<toml::de::Error> for PackagerError {
    fn from(err: toml::de::Error) -> Self {
        PackagerError::Config(err.to_string())
    }
}

/// Result type alias for packaging operations
pub type Result<T> = std::result::Result<T, PackagerError>;
