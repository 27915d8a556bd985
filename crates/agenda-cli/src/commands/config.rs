//! Configuration commands.

use std::path::Path;

use crate::config::AgendaConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &AgendaConfig, path: &Path) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &AgendaConfig) -> CliResult<()> {
    let repository = config.repository().map_err(CliError::Config)?;
    for (key, settings) in &config.widgets {
        let Some(name) = settings.time_zone.as_deref() else {
            continue;
        };
        let name = name.trim();
        if !name.is_empty() && name.parse::<chrono_tz::Tz>().is_err() {
            return Err(CliError::Config(format!(
                "widget {}: unknown time zone {:?}",
                key, name
            )));
        }
    }

    println!(
        "Configuration is valid ({} widget(s) configured).",
        repository.widget_ids().len()
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> CliResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_known_zones() {
        let config =
            AgendaConfig::parse("[widgets.1]\ntime_zone = \"America/New_York\"\n").unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_zone() {
        let config = AgendaConfig::parse("[widgets.1]\ntime_zone = \"Nowhere/City\"\n").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("Nowhere/City"));
    }

    #[test]
    fn validate_rejects_bad_widget_key() {
        let config = AgendaConfig::parse("[widgets.abc]\n").unwrap();
        assert!(matches!(validate(&config), Err(CliError::Config(_))));
    }
}
