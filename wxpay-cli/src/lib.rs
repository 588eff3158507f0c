//! Operator tooling for the WeChat Pay v2 API.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration file with environment variable expansion

pub mod config;

pub use config::{ConfigFileError, FileConfig};
