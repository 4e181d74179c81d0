//! Logging utilities and initialization for fwpack

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Map the `-q` / `-v` flags to a level filter
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize stderr logging for the CLI
pub fn init_cli_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);

    // Stdout is reserved for the completion banner
    Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init()?;

    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("fwpack logging initialized with level: {:?}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_selection() {
        assert_eq!(level_for(0, true), LevelFilter::Error);
        assert_eq!(level_for(3, true), LevelFilter::Error);
        assert_eq!(level_for(0, false), LevelFilter::Info);
        assert_eq!(level_for(1, false), LevelFilter::Debug);
        assert_eq!(level_for(2, false), LevelFilter::Trace);
    }
}
