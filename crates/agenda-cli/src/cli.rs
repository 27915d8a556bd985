//! Command-line interface definition.

use std::path::PathBuf;

use agenda_core::settings::WidgetId;
use agenda_core::{EventRange, OutputFormat};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// agenda - Render the entry list of an agenda widget
#[derive(Debug, Parser)]
#[command(name = "agenda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "AGENDA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    // --- Input ---
    /// JSON file with the provider records (reads stdin when omitted)
    #[arg(long, short, env = "AGENDA_RECORDS")]
    pub records: Option<PathBuf>,

    /// Widget whose settings are used
    #[arg(long, short, default_value = "0")]
    pub widget: WidgetId,

    /// Instant to render for, as RFC 3339 (defaults to the current time)
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    // --- Settings overrides ---
    /// Event range: today, today_and_tomorrow, week, a number of days or
    /// custom:<start>/<hours>
    #[arg(long)]
    pub range: Option<String>,

    /// IANA time zone the agenda is rendered in
    #[arg(long)]
    pub time_zone: Option<String>,

    // --- Display options ---
    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Returns the event range override, if any.
    pub fn event_range(&self) -> Option<EventRange> {
        self.range.as_deref().map(EventRange::from_value)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
