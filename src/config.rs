//! Settings for the command-line tool, read from a RON file such as:
//!
//! ```ron
//! Settings(
//!     schema: Some("my_schema.ron"),
//!     log_file: Some("structnav.log"),
//!     log_level: Debug,
//! )
//! ```

use crate::schema::{SchemaError, SlotSchema};
use crate::util::{Log, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Looked for in the working directory when no settings file is given.
pub const DEFAULT_SETTINGS_FILE: &str = "structnav.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// A slot schema to use instead of the bundled one.
    pub schema: Option<PathBuf>,
    /// Where to append log entries, in addition to the in-memory log.
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid settings in {}: {message}", .path.display())]
    Ron { path: PathBuf, message: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let source = read(path)?;
        ron::from_str::<Settings>(&source).map_err(|err| ConfigError::Ron {
            path: path.to_owned(),
            message: err.to_string(),
        })
    }

    /// Loads `path` if given, else [`DEFAULT_SETTINGS_FILE`] if it exists, else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Settings, ConfigError> {
        match path {
            Some(path) => Settings::load(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => {
                Settings::load(Path::new(DEFAULT_SETTINGS_FILE))
            }
            None => Ok(Settings::default()),
        }
    }

    /// The configured slot schema, or the bundled default.
    pub fn slot_schema(&self) -> Result<SlotSchema, ConfigError> {
        match &self.schema {
            None => Ok(SlotSchema::default()),
            Some(path) => {
                let source = read(path)?;
                Ok(SlotSchema::from_ron(&path.display().to_string(), &source)?)
            }
        }
    }

    /// Apply the log settings to the process-wide log.
    pub fn configure_log(&self) -> Result<(), ConfigError> {
        Log::configure(self.log_level, self.log_file.as_deref()).map_err(|source| ConfigError::Io {
            path: self.log_file.clone().unwrap_or_default(),
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let settings = ron::from_str::<Settings>(
            r#"Settings(schema: Some("custom.ron"), log_level: Debug)"#,
        )
        .unwrap();
        assert_eq!(settings.schema, Some(PathBuf::from("custom.ron")));
        assert_eq!(settings.log_file, None);
        assert_eq!(settings.log_level, LogLevel::Debug);

        let settings = ron::from_str::<Settings>("()").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_unknown_field() {
        assert!(ron::from_str::<Settings>("Settings(colour: true)").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("no/such/settings.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read no/such/settings.ron"));
    }
}
