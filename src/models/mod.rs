//! Data models and types used throughout fwpack

pub mod package;

pub use package::*;
