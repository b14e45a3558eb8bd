//! CLI utilities for voxgate.
//!
//! This crate provides configuration, directory layout and output helpers
//! shared by the command-line tools.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{Config, StoreBackend, StoreConfig, load_config};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
