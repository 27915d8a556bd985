//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/agenda/config.toml` by default:
//!
//! ```toml
//! [display]
//! max_title_length = 40
//! time_format = "h12"
//!
//! [widgets.1]
//! time_zone = "Europe/Paris"
//! event_range = "today_and_tomorrow"
//! hide_subtasks = "hide_all"
//! ```
//!
//! Widget tables are keyed by widget id. A widget without a table renders
//! with the default settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agenda_core::settings::{InMemorySettingsRepository, WidgetId, WidgetSettings};
use agenda_core::FormatOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the agenda CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaConfig {
    /// Debug mode.
    pub debug: bool,

    /// Display settings.
    pub display: FormatOptions,

    /// Per-widget settings, keyed by widget id.
    pub widgets: BTreeMap<String, WidgetSettings>,
}

impl AgendaConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agenda")
    }

    /// Stores the settings of a widget, replacing previous ones.
    pub fn set_widget(&mut self, widget_id: WidgetId, settings: WidgetSettings) {
        self.widgets.insert(widget_id.to_string(), settings);
    }

    /// Builds the settings repository handed to the pipeline.
    ///
    /// Fails when a widget table is not keyed by a numeric id.
    pub fn repository(&self) -> Result<InMemorySettingsRepository, String> {
        let mut repository = InMemorySettingsRepository::new();
        for (key, settings) in &self.widgets {
            let widget_id: WidgetId = key
                .trim()
                .parse()
                .map_err(|_| {
                    format!("widget table [widgets.{key}] must be keyed by a numeric id")
                })?;
            repository.insert(widget_id, settings.clone());
        }
        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::settings::{EventRange, HideSubtasks, SettingsRepository};
    use agenda_core::TimeFormat;
    use std::io::Write;

    #[test]
    fn empty_config() {
        let config = AgendaConfig::parse("").unwrap();
        assert!(!config.debug);
        assert!(config.widgets.is_empty());
        assert_eq!(config.display, FormatOptions::default());
    }

    #[test]
    fn widget_tables() {
        let config = AgendaConfig::parse(
            r#"
[display]
max_title_length = 20
time_format = "h12"

[widgets.1]
time_zone = "Europe/Paris"
event_range = "today_and_tomorrow"
hide_subtasks = "hide_all"
hide_keywords = "Birthday"

[widgets.2]
event_range = "7"
show_day_headers = false
"#,
        )
        .unwrap();

        assert_eq!(config.display.max_title_length, Some(20));
        assert_eq!(config.display.time_format, TimeFormat::H12);
        assert_eq!(config.display.hour_separator, ":");

        let repository = config.repository().unwrap();
        assert_eq!(repository.widget_ids(), vec![1, 2]);

        let one = repository.settings_for(1);
        assert_eq!(one.time_zone.as_deref(), Some("Europe/Paris"));
        assert_eq!(one.event_range, EventRange::TodayAndTomorrow);
        assert_eq!(one.hide_subtasks, HideSubtasks::HideAll);
        assert_eq!(one.hide_keywords, "Birthday");
        assert!(one.show_day_headers);

        let two = repository.settings_for(2);
        assert_eq!(two.event_range, EventRange::Days(7));
        assert!(!two.show_day_headers);

        assert_eq!(repository.settings_for(3), WidgetSettings::default());
    }

    #[test]
    fn unknown_values_fall_back_to_defaults() {
        let config = AgendaConfig::parse(
            r#"
[widgets.1]
event_range = "fortnight"
hide_subtasks = "some"
"#,
        )
        .unwrap();
        let settings = config.repository().unwrap().settings_for(1);
        assert_eq!(settings.event_range, EventRange::default());
        assert_eq!(settings.hide_subtasks, HideSubtasks::ShowAll);
    }

    #[test]
    fn non_numeric_widget_key_is_rejected() {
        let config = AgendaConfig::parse("[widgets.main]\n").unwrap();
        let err = config.repository().unwrap_err();
        assert!(err.contains("widgets.main"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = AgendaConfig::parse("[widgets\n").unwrap_err();
        assert!(err.starts_with("failed to parse config"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debug = true\n\n[widgets.4]\nshow_current_time = false").unwrap();

        let config = AgendaConfig::load_from(file.path()).unwrap();

        assert!(config.debug);
        assert!(!config.repository().unwrap().settings_for(4).show_current_time);
    }

    #[test]
    fn load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgendaConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.starts_with("failed to read config"));
    }

    #[test]
    fn dump_round_trips() {
        let mut config = AgendaConfig::default();
        config.set_widget(
            9,
            WidgetSettings::default()
                .with_time_zone("Asia/Tokyo")
                .with_event_range(EventRange::CurrentWeek),
        );

        let dumped = toml::to_string_pretty(&config).unwrap();
        let parsed = AgendaConfig::parse(&dumped).unwrap();

        assert_eq!(parsed.widgets, config.widgets);
    }

    #[test]
    fn default_path_ends_with_agenda_config() {
        let path = AgendaConfig::default_path();
        assert!(path.ends_with("agenda/config.toml"));
    }
}
