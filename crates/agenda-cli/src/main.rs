//! agenda CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use agenda_core::{TracingConfig, init_tracing};
use clap::Parser;

use agenda_cli::cli::{Cli, Command, ConfigAction};
use agenda_cli::config::AgendaConfig;
use agenda_cli::error::{CliError, CliResult};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match load_config(&cli).and_then(|config| run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<AgendaConfig> {
    match cli.config {
        Some(ref path) => AgendaConfig::load_from(path),
        None => AgendaConfig::load(),
    }
    .map_err(CliError::Config)
}

fn run(cli: Cli, config: AgendaConfig) -> CliResult<()> {
    init_tracing(TracingConfig::for_cli(cli.debug || config.debug))?;

    let config_path: PathBuf = cli.config.clone().unwrap_or_else(AgendaConfig::default_path);

    match cli.command {
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => agenda_cli::commands::config::dump(&config, &config_path),
            ConfigAction::Validate => agenda_cli::commands::config::validate(&config),
            ConfigAction::Path => agenda_cli::commands::config::path(&config_path),
        },
        None => agenda_cli::commands::render::run(&cli, config),
    }
}
