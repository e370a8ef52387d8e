// Benchmark settings (TOML)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file looked up in the working directory.
pub const LOCAL_FILE: &str = "xlbench.toml";

// Mirrors the writer crate's limits; kept here so config has no writer dependency.
const MAX_COLUMN_UNITS: u32 = 255 * 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("cannot serialize settings: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchSettings {
    /// CSV dataset, relative to the working directory.
    pub data: PathBuf,
    /// Timed runs per variant.
    pub iterations: u32,
    /// Untimed runs per variant before timing starts.
    pub warmup: u32,
    /// Variant names, in run order.
    pub variants: Vec<String>,
    pub table: TableSettings,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data.csv"),
            iterations: 10,
            warmup: 1,
            variants: vec!["ooxml-table".into(), "xlsxwriter".into(), "simple".into()],
            table: TableSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub style: String,
    pub row_stripes: bool,
    /// Extra column width for the filter button, 1/256 character units.
    pub filter_button_padding: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            style: "TableStyleMedium2".into(),
            row_stripes: true,
            filter_button_padding: 1500,
        }
    }
}

/// Settings plus the file they came from (`None` = built-in defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub settings: BenchSettings,
    pub source: Option<PathBuf>,
}

impl BenchSettings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Self::parse(input, "<string>")
    }

    fn parse(input: &str, origin: &str) -> Result<Self, ConfigError> {
        let settings: BenchSettings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Validation("iterations must be at least 1".into()));
        }
        if self.table.style.trim().is_empty() {
            return Err(ConfigError::Validation("table.style must not be empty".into()));
        }
        if self.table.filter_button_padding > MAX_COLUMN_UNITS {
            return Err(ConfigError::Validation(format!(
                "table.filter_button_padding must be at most {MAX_COLUMN_UNITS}, got {}",
                self.table.filter_button_padding
            )));
        }
        if let Some(empty) = self.variants.iter().position(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!("variants[{empty}] is empty")));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Get the per-user settings file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xlbench").join("settings.toml"))
    }

    /// Load settings: `explicit` path if given, else `./xlbench.toml`, else
    /// the per-user file, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
        Self::load_from(explicit, Path::new("."), Self::config_path().as_deref())
    }

    /// [`BenchSettings::load`] with the search locations spelled out.
    pub fn load_from(
        explicit: Option<&Path>,
        working_dir: &Path,
        user_file: Option<&Path>,
    ) -> Result<LoadedSettings, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let local = working_dir.join(LOCAL_FILE);
                if local.is_file() {
                    Some(local)
                } else {
                    user_file.filter(|p| p.is_file()).map(Path::to_path_buf)
                }
            }
        };

        let Some(path) = path else {
            log::debug!("no settings file found, using defaults");
            return Ok(LoadedSettings {
                settings: Self::default(),
                source: None,
            });
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::parse(&contents, &path.display().to_string())?;
        log::debug!("settings loaded from {}", path.display());
        Ok(LoadedSettings {
            settings,
            source: Some(path),
        })
    }
}
