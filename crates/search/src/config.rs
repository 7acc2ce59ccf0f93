//! Mapper configuration via `activity-index.toml`
//!
//! All settings have defaults, so an empty file (or no file at all) is a
//! valid configuration.

use activity_core::{Error, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "activity-index.toml";

/// Mapper configuration loaded from `activity-index.toml`.
///
/// # Example
///
/// ```toml
/// # Offset applied to stored dates that carry none
/// default_offset = "+01:00"
/// validate_documents = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapperConfig {
    /// Offset (`+HH:MM` or `-HH:MM`) for dates stored without one
    #[serde(default = "default_offset_str")]
    pub default_offset: String,
    /// Check every produced document against the index schema
    #[serde(default = "default_true")]
    pub validate_documents: bool,
    /// Title of a work without a name
    #[serde(default = "default_untitled_work")]
    pub untitled_work: String,
    /// Name used in the title of an event without a name
    #[serde(default = "default_untitled_event")]
    pub untitled_event: String,
    /// Place used in the title of an event without a known city
    #[serde(default = "default_unknown_place")]
    pub unknown_place: String,
    /// Dates used in the title of an event without dates
    #[serde(default = "default_unknown_date")]
    pub unknown_date: String,
}

fn default_offset_str() -> String {
    "+00:00".to_string()
}

fn default_true() -> bool {
    true
}

fn default_untitled_work() -> String {
    "(activité sans nom)".to_string()
}

fn default_untitled_event() -> String {
    "Événement sans nom".to_string()
}

fn default_unknown_place() -> String {
    "lieu inconnu".to_string()
}

fn default_unknown_date() -> String {
    "date inconnue".to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            default_offset: default_offset_str(),
            validate_documents: true,
            untitled_work: default_untitled_work(),
            untitled_event: default_untitled_event(),
            unknown_place: default_unknown_place(),
            unknown_date: default_unknown_date(),
        }
    }
}

impl MapperConfig {
    /// Parse `default_offset`
    ///
    /// # Errors
    ///
    /// Returns `Config` if the value is not `+HH:MM` / `-HH:MM` within ±23:59.
    pub fn offset(&self) -> Result<FixedOffset> {
        parse_offset(&self.default_offset).ok_or_else(|| {
            Error::Config(format!(
                "Invalid default_offset '{}'. Expected \"+HH:MM\" or \"-HH:MM\".",
                self.default_offset
            ))
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Activity index mapper configuration
#
# Offset applied to stored dates that carry none ("+HH:MM" or "-HH:MM").
default_offset = "+00:00"

# Check every produced document against the index schema (default: true).
validate_documents = true

# Fallback texts used when building titles.
# untitled_work = "(activité sans nom)"
# untitled_event = "Événement sans nom"
# unknown_place = "lieu inconnu"
# unknown_date = "date inconnue"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// offset is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: MapperConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        // Validate the offset eagerly
        config.offset()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    let (sign, rest) = if let Some(rest) = s.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
