//! TOML-based run configuration with environment overrides.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::Tier;

/// Top-level run configuration parsed from TOML.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Load with [`RunConfig::from_toml_file`], then layer deployment
/// variables on top with [`RunConfig::apply_env`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Worker pool and sampling.
    #[serde(default)]
    pub batch: BatchConfig,
    /// External simulator invocation.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory receiving model files and the manifest (created if absent).
    pub output_dir: PathBuf,
    /// Building inventory read by the CSV store.
    pub buildings_csv: PathBuf,
    /// Weather file handed to the simulator.
    pub weather_file: PathBuf,
    /// Object definitions file handed to the simulator.
    pub definitions_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            buildings_csv: PathBuf::from("buildings.csv"),
            weather_file: PathBuf::from("weather.epw"),
            definitions_file: PathBuf::from("Energy+.idd"),
        }
    }
}

/// Worker pool and sampling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Concurrent generation tasks (must be >= 1).
    pub max_workers: usize,
    /// Base seed for reproducible sampling; unseeded when absent.
    pub seed: Option<u64>,
    /// Extra attempts for tasks failing with a transient error.
    pub max_retries: u32,
    /// Tier used when the override document selects none.
    pub default_tier: String,
    /// Write `batch_manifest.json` next to the models.
    pub write_manifest: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 20,
            seed: None,
            max_retries: 0,
            default_tier: "tier 1".to_string(),
            write_manifest: true,
        }
    }
}

impl BatchConfig {
    /// Parsed default tier, if valid.
    pub fn default_tier(&self) -> Option<Tier> {
        self.default_tier.parse().ok()
    }
}

/// External simulator invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Run the simulator over every generated model after the batch.
    pub enabled: bool,
    /// Simulator executable, resolved through `PATH` when not absolute.
    pub executable: PathBuf,
    /// Concurrent simulator processes (must be >= 1).
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            executable: PathBuf::from("energyplus"),
            workers: 4,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"batch.max_workers"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl RunConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies `OUTPUT_DIR`, `BUILDINGS_CSV`, `EPWFILE`, `IDDFILE` and
    /// `MAX_WORKERS` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `MAX_WORKERS` is not an integer.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an explicit variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("BUILDINGS_CSV") {
            self.paths.buildings_csv = PathBuf::from(v);
        }
        if let Some(v) = lookup("EPWFILE") {
            self.paths.weather_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("IDDFILE") {
            self.paths.definitions_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_WORKERS") {
            self.batch.max_workers = v.trim().parse().map_err(|_| ConfigError {
                field: "MAX_WORKERS".to_string(),
                message: format!("expected a positive integer, got \"{v}\""),
            })?;
        }
        Ok(())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.paths.output_dir.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "paths.output_dir".into(),
                message: "must not be empty".into(),
            });
        }

        let b = &self.batch;
        if b.max_workers == 0 {
            errors.push(ConfigError {
                field: "batch.max_workers".into(),
                message: "must be >= 1".into(),
            });
        }
        if b.default_tier().is_none() {
            errors.push(ConfigError {
                field: "batch.default_tier".into(),
                message: format!(
                    "must be \"tier 0\", \"tier 1\" or \"tier 2\", got \"{}\"",
                    b.default_tier
                ),
            });
        }

        if self.simulation.workers == 0 {
            errors.push(ConfigError {
                field: "simulation.workers".into(),
                message: "must be >= 1".into(),
            });
        }

        errors
    }
}
