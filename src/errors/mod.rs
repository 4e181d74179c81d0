//! Error handling for fwpack

pub mod types;

pub use types::*;
