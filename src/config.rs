//! Configuration file handling.
//!
//! The configuration file is optional. By default it is looked for at
//! `$CONFIG_DIR/findash/config.json` (for example `~/.config/findash/config.json` on Linux); a
//! different path can be given with `--config` or `FINDASH_CONFIG`. It holds the default monthly
//! budget and the settings used to read transaction files.

use crate::ingest::{IngestOptions, DEFAULT_DATE_FORMATS};
use crate::model::Amount;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const APP_NAME: &str = "findash";
const CONFIG_VERSION: u8 = 1;
const CONFIG_DIR: &str = "findash";
const CONFIG_JSON: &str = "config.json";

/// The monthly budget used when neither the config file nor the command line sets one.
pub const DEFAULT_BUDGET: Decimal = Decimal::from_parts(1500, 0, 0, false, 0);

/// The loaded configuration, along with where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `None` when the built-in defaults are in use.
    path: Option<PathBuf>,
    config_file: ConfigFile,
}

impl Config {
    /// The default location of the config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_JSON))
    }

    /// Loads the configuration.
    ///
    /// - With an explicit `path`, the file must exist.
    /// - Without one, the file at `default_path()` is used if it exists, otherwise the built-in
    ///   defaults are.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.is_file() {
                    bail!("The config file is missing '{}'", p.display())
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    trace!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_file = ConfigFile::load(&path)?;
        debug!("Loaded config from {}", path.display());
        Ok(Self {
            path: Some(path),
            config_file,
        })
    }

    /// Writes a config file with default settings to `path`, creating parent directories as
    /// needed.
    ///
    /// # Errors
    /// - Returns an error if a file already exists at `path` or if any file operation fails.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            bail!("Refusing to overwrite the existing file '{}'", path.display())
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent)?;
        }
        let config_file = ConfigFile::default();
        config_file.save(&path)?;
        Ok(Self {
            path: Some(path),
            config_file,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn monthly_budget(&self) -> Decimal {
        self.config_file.monthly_budget
    }

    /// The settings for reading transaction files.
    pub fn ingest_options(&self) -> IngestOptions {
        // The delimiter was checked to be ASCII when the file was loaded.
        IngestOptions::new(
            self.config_file.delimiter as u8,
            self.config_file.date_formats.clone(),
        )
    }
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "findash",
///   "config_version": 1,
///   "monthly_budget": "1500",
///   "date_formats": ["%Y-%m-%d", "%m/%d/%Y"],
///   "delimiter": ","
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "findash"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The budget shown before the user picks one
    #[serde(default = "default_budget")]
    monthly_budget: Decimal,

    /// `chrono` format strings tried in order when parsing the Date column
    #[serde(default = "default_date_formats")]
    date_formats: Vec<String>,

    /// Field delimiter of transaction files
    #[serde(default = "default_delimiter")]
    delimiter: char,
}

fn default_budget() -> Decimal {
    DEFAULT_BUDGET
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
}

fn default_delimiter() -> char {
    ','
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            monthly_budget: default_budget(),
            date_formats: default_date_formats(),
            delimiter: default_delimiter(),
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.delimiter.is_ascii(),
            "Invalid delimiter in config file: '{}' is not a single ASCII character",
            config.delimiter
        );
        ensure!(
            config.monthly_budget.abs() <= Amount::MAX_MAGNITUDE,
            "Invalid monthly_budget in config file: {} is out of range",
            config.monthly_budget
        );
        ensure!(
            !config.date_formats.is_empty(),
            "Invalid date_formats in config file: at least one format is required"
        );

        Ok(config)
    }

    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data).context("Unable to write config file")
    }
}
