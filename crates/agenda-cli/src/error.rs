//! CLI error types.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// The provider records could not be read.
    Records(String),
    /// IO error.
    Io(std::io::Error),
    /// Output could not be produced.
    Render(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Records(msg) => write!(f, "invalid records: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Render(msg) => write!(f, "render error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<agenda_core::TracingError> for CliError {
    fn from(err: agenda_core::TracingError) -> Self {
        Self::Config(err.to_string())
    }
}
