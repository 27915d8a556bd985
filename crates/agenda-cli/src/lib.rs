//! CLI, configuration loading and output rendering
//!
//! This crate provides the `agenda` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::AgendaConfig;
pub use error::{CliError, CliResult};
