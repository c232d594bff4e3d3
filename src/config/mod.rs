//! # Config Module
//!
//! Run settings from a JSON file, overridable from the command line.
//!
//! ## File Format
//! ```json
//! {
//!   "InputDir": "/Users/me/Inbox",
//!   "OutputDir": "/Users/me/Pictures",
//!   "NamePattern": "%Y/%m/%d/%Y-%m-%d %H-%M",
//!   "Extensions": ["jpg", "heic", "mov"],
//!   "IncludeHidden": false,
//!   "ProbeTimeoutSecs": 30,
//!   "UtcOffset": "+01:00"
//! }
//! ```
//!
//! Only `InputDir` and `OutputDir` are required once file and flags are
//! merged. Everything else falls back to its default.

use crate::core::allocate::NamingPattern;
use crate::core::organize::OrganizeConfig;
use crate::core::timestamp::TargetZone;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the user's config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Raw settings as written in the file; every field is optional so flags can
/// fill the gaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_pattern: Option<String>,
    /// Extensions to pick up; an empty list picks up every file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_secs: Option<u64>,
    /// `local`, `utc` or an offset such as `+01:00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

impl Settings {
    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// `<config dir>/media-foldering/settings.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("media-foldering").join(SETTINGS_FILE_NAME))
    }

    /// The settings file to use: an explicit path must load, the default
    /// location is used only when it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Layer `overrides` on top; its present fields win
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            input_dir: overrides.input_dir.or(self.input_dir),
            output_dir: overrides.output_dir.or(self.output_dir),
            name_pattern: overrides.name_pattern.or(self.name_pattern),
            extensions: overrides.extensions.or(self.extensions),
            include_hidden: overrides.include_hidden.or(self.include_hidden),
            probe_timeout_secs: overrides.probe_timeout_secs.or(self.probe_timeout_secs),
            utc_offset: overrides.utc_offset.or(self.utc_offset),
        }
    }

    /// Target zone, defaulting to the machine's local zone
    pub fn zone(&self) -> Result<TargetZone, ConfigError> {
        self.utc_offset
            .as_deref()
            .map(str::parse::<TargetZone>)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::core::metadata::DEFAULT_PROBE_TIMEOUT)
    }

    /// Validate values and build the run configuration.
    ///
    /// Directory existence is checked by the organizer when the run starts.
    pub fn into_config(self, dry_run: bool) -> Result<OrganizeConfig, ConfigError> {
        let zone = self.zone()?;
        let probe_timeout = self.probe_timeout();
        let pattern = match self.name_pattern {
            Some(pattern) => NamingPattern::new(pattern)?,
            None => NamingPattern::default(),
        };
        let input_dir = self.input_dir.ok_or(ConfigError::Missing { field: "InputDir" })?;
        let output_dir = self.output_dir.ok_or(ConfigError::Missing { field: "OutputDir" })?;

        let mut config = OrganizeConfig::new(input_dir, output_dir)
            .with_pattern(pattern)
            .with_zone(zone)
            .with_probe_timeout(probe_timeout)
            .with_hidden(self.include_hidden.unwrap_or(false))
            .with_dry_run(dry_run);
        if let Some(extensions) = self.extensions {
            config = config.with_extensions(extensions);
        }
        Ok(config)
    }
}
