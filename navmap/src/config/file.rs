//! Configuration file handling for ~/.navmap/config.ini.
//!
//! Only the `[map_query]` section is read. Missing keys keep their defaults;
//! values outside their accepted range are clamped after parsing.

use ini::Ini;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::QueryConfig;

const SECTION: &str = "map_query";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl QueryConfig {
    /// Load configuration from the default path (~/.navmap/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults. The result is clamped.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        Ok(parse_ini(&ini)?.clamped())
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some(SECTION))
            .set("rect_inflation_factor", self.rect_inflation_factor.to_string())
            .set(
                "rect_inflation_increment",
                self.rect_inflation_increment.to_string(),
            )
            .set("row_limit", self.row_limit.to_string())
            .set("geometry_cache_size", self.geometry_cache_size.to_string())
            .set("overview_cache_size", self.overview_cache_size.to_string());

        ini.write_to_file(path)
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }
}

fn parse_ini(ini: &Ini) -> Result<QueryConfig, ConfigFileError> {
    let mut config = QueryConfig::default();

    if let Some(section) = ini.section(Some(SECTION)) {
        if let Some(v) = section.get("rect_inflation_factor") {
            config.rect_inflation_factor = parse_value("rect_inflation_factor", v)?;
        }
        if let Some(v) = section.get("rect_inflation_increment") {
            config.rect_inflation_increment = parse_value("rect_inflation_increment", v)?;
        }
        if let Some(v) = section.get("row_limit") {
            config.row_limit = usize::try_from(parse_count("row_limit", v)?).unwrap_or(usize::MAX);
        }
        if let Some(v) = section.get("geometry_cache_size") {
            config.geometry_cache_size = parse_count("geometry_cache_size", v)?;
        }
        if let Some(v) = section.get("overview_cache_size") {
            config.overview_cache_size = parse_count("overview_cache_size", v)?;
        }
    }

    Ok(config)
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigFileError::InvalidValue {
            section: SECTION.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Integer setting; negative values read as 0 and are raised by clamping.
fn parse_count(key: &str, value: &str) -> Result<u64, ConfigFileError> {
    let parsed: i64 = parse_value(key, value)?;
    Ok(u64::try_from(parsed).unwrap_or(0))
}

/// Get the path to the config directory (~/.navmap).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".navmap")
}

/// Get the path to the config file (~/.navmap/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
