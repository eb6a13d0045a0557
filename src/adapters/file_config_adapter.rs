//! INI file configuration adapter.
//!
//! ```ini
//! [data]
//! path = /srv/market
//! dataset = stock_data_day
//!
//! [spot]
//! field = close
//! strict = false
//!
//! [display]
//! width = 120
//! precision = 4
//! ```

use crate::domain::error::CycError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
    /// File path, or `<string>` for inline configs; used in diagnostics.
    source: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CycError> {
        let source = path.as_ref().display().to_string();
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| CycError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        debug!(file = %source, "loaded config");
        Ok(Self { config, source })
    }

    pub fn from_string(content: &str) -> Result<Self, CycError> {
        let source = "<string>".to_string();
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| CycError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { config, source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    /// Present but unusable values fall back to `default` with a warning.
    fn fallback<T: std::fmt::Display>(&self, section: &str, key: &str, raw: &str, default: T) -> T {
        warn!(
            file = %self.source,
            "[{section}] {key} = '{raw}' is not valid, using {default}"
        );
        default
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.config.get(section, key) {
            Some(raw) => raw
                .trim()
                .parse()
                .unwrap_or_else(|_| self.fallback(section, key, &raw, default)),
            None => default,
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.config.get(section, key) {
            Some(raw) => Self::parse_bool(&raw)
                .unwrap_or_else(|| self.fallback(section, key, &raw, default)),
            None => default,
        }
    }
}
