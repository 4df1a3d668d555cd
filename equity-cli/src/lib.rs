//! Command-line front end: argument parsing, `equity.toml` configuration,
//! logging setup and report rendering.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod report;

pub use cli::Cli;
pub use config::AppConfig;
