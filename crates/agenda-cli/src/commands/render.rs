//! Render command: run the pipeline for one widget and print its entries.

use std::io::Read;
use std::path::Path;

use agenda_core::settings::{SettingsRepository, WidgetId};
use agenda_core::{OutputFormat, OutputFormatter, PositionedEntry, RawRecord};
use agenda_pipeline::AgendaPipeline;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::AgendaConfig;
use crate::error::{CliError, CliResult};

/// Parses provider records from JSON.
///
/// Blank input stands for a provider that returned nothing, which renders as
/// a footer-only list.
pub fn parse_records(content: &str) -> CliResult<Vec<RawRecord>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content).map_err(|e| CliError::Records(e.to_string()))
}

/// Reads provider records from `path`, or from stdin when no path is given.
pub fn load_records(path: Option<&Path>) -> CliResult<Vec<RawRecord>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let records = parse_records(&content)?;
    info!(count = records.len(), "Loaded provider records");
    Ok(records)
}

/// Applies the command-line overrides to the configuration of `widget_id`.
pub fn apply_overrides(cli: &Cli, config: &mut AgendaConfig, widget_id: WidgetId) -> CliResult<()> {
    let mut settings = config
        .repository()
        .map_err(CliError::Config)?
        .settings_for(widget_id);
    let mut changed = false;
    if let Some(range) = cli.event_range() {
        settings.event_range = range;
        changed = true;
    }
    if let Some(ref zone) = cli.time_zone {
        settings.time_zone = Some(zone.clone());
        changed = true;
    }
    if changed {
        config.set_widget(widget_id, settings);
    }
    if cli.max_title_length.is_some() {
        config.display.max_title_length = cli.max_title_length;
    }
    Ok(())
}

/// Renders the entries of a widget as output lines.
pub fn render_lines(
    config: &AgendaConfig,
    widget_id: WidgetId,
    records: &[RawRecord],
    now: DateTime<Utc>,
    format: OutputFormat,
) -> CliResult<Vec<String>> {
    let repository = config.repository().map_err(CliError::Config)?;
    let pipeline = AgendaPipeline::new(&repository, widget_id);
    let settings = pipeline.settings();
    let entries: Vec<PositionedEntry> = pipeline.run(records, now);
    debug!(widget_id, entries = entries.len(), "Rendering entries");

    let formatter = OutputFormatter::new(config.display.clone(), settings.zone());
    match format {
        OutputFormat::Text => Ok(formatter.format_text(&entries)),
        OutputFormat::Json => {
            let output = formatter.format_json(&entries, settings.visible_range(now), now);
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| CliError::Render(e.to_string()))?;
            Ok(vec![json])
        }
    }
}

/// Runs the render command.
pub fn run(cli: &Cli, mut config: AgendaConfig) -> CliResult<()> {
    apply_overrides(cli, &mut config, cli.widget)?;
    let records = load_records(cli.records.as_deref())?;
    let now = cli.now.unwrap_or_else(Utc::now);

    for line in render_lines(&config, cli.widget, &records, now, cli.output_format())? {
        println!("{}", line);
    }
    Ok(())
}
