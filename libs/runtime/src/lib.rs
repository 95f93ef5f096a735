//! Application-level plumbing shared by the server binary: configuration
//! loading and logging initialization.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
