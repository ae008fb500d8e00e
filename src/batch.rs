//! Best-effort batch orchestration over a bounded worker pool.
//!
//! Every record becomes one task. A task's error or panic is caught at the
//! task boundary, logged with the building id and recorded in the
//! [`BatchReport`]; it never cancels sibling tasks.
//!
//! Tasks are not preempted: a hung task keeps its worker slot until it
//! returns.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{BuildContext, ModelBuilder, ModelDocument, ModelWriter};
use crate::preprocess::ResolvedRecord;
use crate::sampler::ValueSampler;

/// File name of the JSON manifest written next to the models.
pub const MANIFEST_FILE: &str = "batch_manifest.json";

/// Pool and sampling settings for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_workers: usize,
    /// Base seed; task `i` samples with `seed + i`. Unseeded when `None`.
    pub seed: Option<u64>,
    /// Extra attempts for transient failures.
    pub max_retries: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: 20,
            seed: None,
            max_retries: 0,
        }
    }
}

impl BatchOptions {
    /// Sampler for task `index`.
    pub fn sampler_for(&self, index: usize) -> ValueSampler {
        match self.seed {
            Some(seed) => ValueSampler::seeded(seed.wrapping_add(index as u64)),
            None => ValueSampler::from_entropy(),
        }
    }
}

/// Lifecycle of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Terminal result of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded {
        artifact: PathBuf,
        attempts: u32,
    },
    Failed {
        error: String,
        transient: bool,
        attempts: u32,
    },
}

impl TaskOutcome {
    pub fn state(&self) -> TaskState {
        match self {
            Self::Succeeded { .. } => TaskState::Succeeded,
            Self::Failed { .. } => TaskState::Failed,
        }
    }
}

/// Outcome of one task tagged with its building id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub building_id: String,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Succeeded { .. })
    }
}

/// Per-task outcomes in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<TaskReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &TaskReport> {
        self.outcomes.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskReport> {
        self.outcomes.iter().filter(|r| !r.is_success())
    }

    /// Building ids and paths of all successfully written artifacts.
    pub fn artifacts(&self) -> Vec<(&str, &Path)> {
        self.outcomes
            .iter()
            .filter_map(|r| match &r.outcome {
                TaskOutcome::Succeeded { artifact, .. } => {
                    Some((r.building_id.as_str(), artifact.as_path()))
                }
                TaskOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Writes the report as pretty JSON to `dir/batch_manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_manifest(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(MANIFEST_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }
}

/// Runs `task` for every item on a pool of `max_workers` threads.
///
/// `task` receives the item's index and the item. Errors classified as
/// transient are retried up to `max_retries` times; panics are caught and
/// recorded as permanent failures.
///
/// # Errors
///
/// Only fails when the thread pool cannot be built.
pub fn run_pool<T, L, F>(
    items: &[T],
    max_workers: usize,
    max_retries: u32,
    label: L,
    task: F,
) -> Result<BatchReport>
where
    T: Sync,
    L: Fn(&T) -> String + Sync,
    F: Fn(usize, &T) -> Result<PathBuf> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()?;

    for item in items {
        log::debug!("{}: {}", label(item), TaskState::Pending);
    }

    let outcomes = pool.install(|| {
        items
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                let id = label(item);
                let outcome = run_task(&id, max_retries, || task(index, item));
                TaskReport {
                    building_id: id,
                    outcome,
                }
            })
            .collect::<Vec<_>>()
    });

    Ok(BatchReport { outcomes })
}

fn run_task<F>(id: &str, max_retries: u32, attempt: F) -> TaskOutcome
where
    F: Fn() -> Result<PathBuf>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        log::debug!("{id}: {} (attempt {attempts})", TaskState::Running);
        let result = panic::catch_unwind(AssertUnwindSafe(&attempt)).unwrap_or_else(|payload| {
            Err(Error::TaskPanicked {
                message: panic_message(payload.as_ref()),
            })
        });

        match result {
            Ok(artifact) => {
                log::info!("{id}: {} -> {}", TaskState::Succeeded, artifact.display());
                return TaskOutcome::Succeeded { artifact, attempts };
            }
            Err(e) if e.is_transient() && attempts <= max_retries => {
                log::warn!("{id}: transient failure, retrying: {e}");
            }
            Err(e) => {
                log::error!("{id}: {}: {e}", TaskState::Failed);
                return TaskOutcome::Failed {
                    error: e.to_string(),
                    transient: e.is_transient(),
                    attempts,
                };
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builds and writes one model per record.
///
/// Each task opens a fresh [`ModelDocument`], lets `builder` fill it with a
/// sampler derived from `options`, and persists it through `writer`.
///
/// Building ids must be unique within a batch. The first record with a given
/// id is built; later ones fail with [`Error::DuplicateBuilding`] and never
/// touch the first record's artifact.
///
/// # Errors
///
/// Only fails when the worker pool cannot be built; per-building failures
/// are reported in the returned [`BatchReport`].
pub fn generate_all<B>(
    records: &[ResolvedRecord],
    builder: &B,
    writer: &ModelWriter,
    ctx: &BuildContext<'_>,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    B: ModelBuilder + ?Sized,
{
    log::info!(
        "generating {} model(s) with {} worker(s)",
        records.len(),
        options.max_workers
    );
    let mut first_index = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        first_index.entry(record.id()).or_insert(index);
    }
    let report = run_pool(
        records,
        options.max_workers,
        options.max_retries,
        |r| r.id().to_string(),
        |index, record| {
            if first_index.get(record.id()) != Some(&index) {
                return Err(Error::DuplicateBuilding {
                    building_id: record.id().to_string(),
                });
            }
            let mut doc = ModelDocument::new();
            let mut sampler = options.sampler_for(index);
            builder.build(record, ctx, &mut sampler, &mut doc)?;
            writer.write(record.id(), &doc)
        },
    )?;
    log::info!(
        "batch finished: {} succeeded, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );
    Ok(report)
}
