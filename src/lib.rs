//! fwpack - Post-build firmware packager
//!
//! After the toolchain has linked `firmware.bin`, fwpack stages it next to the
//! bootloader and partition table, merges the three into one flashable image
//! at 0x1000 / 0x8000 / 0x10000 and names the results after the product and
//! the version found in the project's version file.

pub mod cli;
pub mod config;
pub mod errors;
pub mod image;
pub mod models;
pub mod packager;
pub mod utils;

// Re-export commonly used types
pub use config::{MergeTool, PackagerConfig};
pub use errors::*;
pub use models::*;
pub use packager::{BuildContext, Packager};

/// fwpack version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// fwpack application name
pub const APP_NAME: &str = "fwpack";
