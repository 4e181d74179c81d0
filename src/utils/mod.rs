//! Utility functions and helpers used throughout fwpack

pub mod logging;
