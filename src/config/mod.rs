//! Configuration loading for the reader.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the UI can still launch.

mod defaults;
mod models;
mod tables;

pub use models::{AppConfig, HighlightColor, LogLevel, ThemeMode};

use std::fs;
use std::path::Path;
use tables::ConfigTables;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    parse_config(&contents).unwrap_or_else(|err| {
        warn!(path = %path.display(), "Invalid config TOML: {err}");
        AppConfig::default()
    })
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    let tables: ConfigTables = toml::from_str(contents)?;
    debug!("Parsed configuration tables");
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string(&ConfigTables::from(config))
}

/// Persist the config back to disk; best-effort like the rest of the cache.
pub fn save_config(path: &Path, config: &AppConfig) {
    match serialize_config(config) {
        Ok(contents) => {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(err) = fs::write(path, contents) {
                warn!(path = %path.display(), "Failed to save config: {err}");
            }
        }
        Err(err) => warn!("Failed to serialize config: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, parse_config, serialize_config};

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").expect("empty config parses");
        let defaults = AppConfig::default();
        assert_eq!(config.server_url, defaults.server_url);
        assert_eq!(config.target_lang, defaults.target_lang);
        assert_eq!(config.paragraph_pause_secs, defaults.paragraph_pause_secs);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = parse_config("[server]\nurl = \"http://test.local\"\n").expect("parses");
        assert_eq!(config.server_url, "http://test.local");
        assert_eq!(config.font_size, AppConfig::default().font_size);
    }

    #[test]
    fn round_trips_through_tables() {
        let mut config = AppConfig::default();
        config.server_url = "https://truyen.example".to_string();
        config.auto_open_last_chapter = false;
        let text = serialize_config(&config).expect("serializes");
        let parsed = parse_config(&text).expect("parses back");
        assert_eq!(parsed.server_url, config.server_url);
        assert!(!parsed.auto_open_last_chapter);
    }
}
