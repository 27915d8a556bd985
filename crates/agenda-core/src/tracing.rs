//! Tracing setup for the agenda crates.
//!
//! Library code only emits `tracing` events. A binary installs the subscriber
//! once with [`init_tracing`]; logs go to stderr so they never interleave with
//! rendered entries on stdout.
//!
//! The filter is taken from, in order: an explicit directive,
//! the `AGENDA_LOG` variable, `RUST_LOG`, then the configured level for the
//! three agenda crates.
//!
//! ```ignore
//! use agenda_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::for_cli(true))?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "AGENDA_LOG";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive does not parse.
    #[error("failed to parse log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, with fields on their own lines.
    Pretty,
    /// JSON lines.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level of the agenda crates when no directive or variable is set.
    pub level: Level,
    /// Line format.
    pub format: TracingOutputFormat,
    /// Print file and line of each event.
    pub show_source: bool,
    /// Print a timestamp on each event.
    pub show_time: bool,
    /// Filter directive overriding both environment variables.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            show_source: false,
            show_time: false,
            directive: None,
        }
    }
}

impl TracingConfig {
    /// Settings for the `agenda` binary. `debug` turns on the per-stage
    /// record counts and source locations.
    pub fn for_cli(debug: bool) -> Self {
        if debug {
            Self {
                level: Level::DEBUG,
                show_source: true,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// Settings for output consumed by a log collector.
    pub fn json() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            show_time: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// The directive used when nothing else is configured.
    pub fn default_directive(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        ["agenda_core", "agenda_pipeline", "agenda_cli"]
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Resolves the event filter.
    ///
    /// # Errors
    ///
    /// Fails only when the explicit directive is invalid; invalid environment
    /// values fall through to the next source.
    pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive())))
    }
}

fn fmt_layer<S>(config: &TracingConfig) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.show_source)
        .with_line_number(config.show_source);

    match (config.format, config.show_time) {
        (TracingOutputFormat::Json, _) => layer.json().boxed(),
        (TracingOutputFormat::Pretty, true) => layer.pretty().boxed(),
        (TracingOutputFormat::Pretty, false) => layer.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the explicit
/// directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;
    let subscriber = tracing_subscriber::registry().with(fmt_layer(&config).with_filter(filter));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
