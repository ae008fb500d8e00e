//! Runs generated models through the external building simulator.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::batch::{BatchReport, run_pool};
use crate::error::{Error, Result};
use crate::model::{MODEL_PREFIX, decode_id};

/// Produces a time-series output file for one model.
pub trait Simulator: Send + Sync {
    /// # Errors
    ///
    /// Any failure counts as a failure of this model only.
    fn simulate(&self, model: &Path, weather: &Path, definitions: &Path) -> Result<PathBuf>;
}

/// Invokes a simulator executable as a child process.
///
/// The command line is
/// `<exe> -w <weather> -i <definitions> -d <dir> -p <stem> -s C -r <model>`,
/// so results land next to the model as `<stem>.csv`.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    executable: PathBuf,
}

impl CommandSimulator {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn command(&self, model: &Path, weather: &Path, definitions: &Path) -> (Command, PathBuf) {
        let dir = model.parent().unwrap_or_else(|| Path::new("."));
        let stem = model
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-w")
            .arg(weather)
            .arg("-i")
            .arg(definitions)
            .arg("-d")
            .arg(dir)
            .arg("-p")
            .arg(&stem)
            .arg("-s")
            .arg("C")
            .arg("-r")
            .arg(model);
        (cmd, dir.join(format!("{stem}.csv")))
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&self, model: &Path, weather: &Path, definitions: &Path) -> Result<PathBuf> {
        let (mut cmd, output) = self.command(model, weather, definitions);
        log::debug!("running {cmd:?}");
        let result = cmd.output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Simulation {
                building_id: building_id(model),
                message: format!("{}: {}", result.status, stderr.trim()),
            });
        }
        Ok(output)
    }
}

/// Building id encoded in a model file name.
pub fn building_id(model: &Path) -> String {
    let stem = model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix(MODEL_PREFIX) {
        Some(encoded) => decode_id(encoded),
        None => stem,
    }
}

/// Simulates the given `(building id, model)` pairs on a pool of `workers`
/// threads.
///
/// Only the listed models run; other files in the output directory are
/// ignored.
///
/// # Errors
///
/// Fails only when the pool cannot be built; per-model failures are reported
/// in the returned [`BatchReport`].
pub fn simulate_all<S>(
    simulator: &S,
    models: &[(&str, &Path)],
    weather: &Path,
    definitions: &Path,
    workers: usize,
    max_retries: u32,
) -> Result<BatchReport>
where
    S: Simulator + ?Sized,
{
    log::info!(
        "simulating {} model(s) with {} worker(s)",
        models.len(),
        workers
    );
    run_pool(
        models,
        workers,
        max_retries,
        |(id, _)| (*id).to_string(),
        |_, (_, model)| simulator.simulate(model, weather, definitions),
    )
}
