//! Error taxonomy shared by the resolver, sampler, and batch pipeline.

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while resolving, sampling, or generating building models.
#[derive(Debug, Error)]
pub enum Error {
    /// A strict catalog lookup missed. `path` is the full key path attempted,
    /// `missing` names the level and key that was absent.
    #[error("configuration for {path} not found (missing {missing})")]
    ConfigurationNotFound { path: String, missing: String },

    /// A string key outside one of the closed catalog enumerations.
    #[error("unknown {level} \"{value}\"")]
    UnknownKey { level: &'static str, value: String },

    /// A range spec that is not autosize-flagged lacks one or both bounds.
    #[error("missing 'min_value' or 'max_value' for parameter \"{param}\"")]
    MissingRangeBounds { param: String },

    /// A range spec whose lower bound exceeds its upper bound.
    #[error("invalid range for parameter \"{param}\": min_value {min} > max_value {max}")]
    InvalidRange { param: String, min: f64, max: f64 },

    /// A parameter that must be numeric resolved to the autosize sentinel.
    #[error("parameter \"{param}\" cannot be autosized")]
    NotAutosizable { param: String },

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The external simulator failed for one model.
    #[error("simulation failed for {building_id}: {message}")]
    Simulation { building_id: String, message: String },

    /// The same building id appears more than once in one batch.
    #[error("building \"{building_id}\" appears more than once in the batch")]
    DuplicateBuilding { building_id: String },

    /// A generation task panicked; caught at the task boundary.
    #[error("task panicked: {message}")]
    TaskPanicked { message: String },
}

impl Error {
    /// Whether a retry could plausibly succeed.
    ///
    /// Filesystem and simulator failures are transient; catalog and sampling
    /// errors are permanent and retrying them only repeats the failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Simulation { .. })
    }
}
