//! Configuration management for fwpack

pub mod app_config;

pub use app_config::*;
