//! End-to-end run: query the inventory, resolve, generate, simulate.

use std::path::PathBuf;

use serde::Serialize;

use crate::batch::{BatchOptions, BatchReport, generate_all};
use crate::catalog::{Catalog, Tier};
use crate::config::RunConfig;
use crate::error::Result;
use crate::model::{BuildContext, EnvelopeModelBuilder, ModelWriter};
use crate::preprocess::preprocess;
use crate::resolver::ConfigurationResolver;
use crate::simulate::{CommandSimulator, Simulator, simulate_all};
use crate::store::BuildingStore;
use crate::user_config::UserConfig;

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub generation: BatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<BatchReport>,
}

impl RunSummary {
    /// Number of failed tasks across generation and simulation.
    pub fn failure_count(&self) -> usize {
        self.generation.failed().count()
            + self
                .simulation
                .as_ref()
                .map_or(0, |s| s.failed().count())
    }
}

/// Runs the pipeline, simulating with the configured executable when
/// simulation is enabled.
///
/// # Errors
///
/// Fails on setup problems only: an invalid default tier, an unreadable
/// inventory, a pool that cannot be built, or an unwritable manifest.
/// Per-building failures are part of the returned summary.
pub fn run_pipeline(
    config: &RunConfig,
    user: &UserConfig,
    store: &dyn BuildingStore,
) -> Result<RunSummary> {
    let simulator = CommandSimulator::new(&config.simulation.executable);
    run_pipeline_with(config, user, store, &simulator)
}

/// Same as [`run_pipeline`] with an explicit simulator.
pub fn run_pipeline_with(
    config: &RunConfig,
    user: &UserConfig,
    store: &dyn BuildingStore,
    simulator: &dyn Simulator,
) -> Result<RunSummary> {
    let catalog = Catalog::builtin();
    for warning in user.validate(catalog) {
        log::warn!("{warning}");
    }

    let default_tier: Tier = config.batch.default_tier.parse()?;
    let resolver = ConfigurationResolver::new(catalog, user).with_default_tier(default_tier);

    let rows = store.query(&user.filter_criteria)?;
    let records = preprocess(rows, &resolver);

    let ctx = BuildContext::new(resolver);
    let output_dir = &config.paths.output_dir;
    let writer = ModelWriter::new(output_dir);
    let options = BatchOptions {
        max_workers: config.batch.max_workers,
        seed: config.batch.seed,
        max_retries: config.batch.max_retries,
    };

    let generation = generate_all(&records, &EnvelopeModelBuilder, &writer, &ctx, &options)?;

    let manifest = if config.batch.write_manifest {
        Some(generation.write_manifest(output_dir)?)
    } else {
        None
    };

    let models = generation.artifacts();
    let simulation = if config.simulation.enabled && !models.is_empty() {
        Some(simulate_all(
            simulator,
            &models,
            &config.paths.weather_file,
            &config.paths.definitions_file,
            config.simulation.workers,
            config.batch.max_retries,
        )?)
    } else {
        None
    };

    Ok(RunSummary {
        generation,
        manifest,
        simulation,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::building::BuildingRecord;
    use crate::error::Error;
    use crate::store::MemoryBuildingStore;

    struct EchoSimulator;

    impl Simulator for EchoSimulator {
        fn simulate(&self, model: &Path, _: &Path, _: &Path) -> Result<PathBuf> {
            Ok(model.with_extension("csv"))
        }
    }

    fn config(dir: &Path) -> RunConfig {
        let mut cfg = RunConfig::default();
        cfg.paths.output_dir = dir.to_path_buf();
        cfg.batch.max_workers = 2;
        cfg.batch.seed = Some(1);
        cfg
    }

    fn store() -> MemoryBuildingStore {
        MemoryBuildingStore::new(vec![
            BuildingRecord::new("1", "Residential", "Apartment", "< 1945"),
            BuildingRecord::new("2", "Industrial", "Other", "2006 - 2014"),
            BuildingRecord::new("3", "Residential", "Palace", "< 1945"),
        ])
    }

    #[test]
    fn generates_and_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let summary = run_pipeline_with(
            &config(dir.path()),
            &UserConfig::default(),
            &store(),
            &EchoSimulator,
        )
        .unwrap();

        assert_eq!(summary.generation.succeeded().count(), 2);
        assert_eq!(summary.failure_count(), 1);
        assert!(summary.manifest.as_ref().is_some_and(|p| p.exists()));
        assert!(summary.simulation.is_none());
        assert!(dir.path().join("modified_building_1.idf").exists());
        assert!(!dir.path().join("modified_building_3.idf").exists());
    }

    #[test]
    fn simulation_covers_only_this_runs_models() {
        let dir = tempfile::tempdir().unwrap();
        // left over from an earlier run; building 3 fails in this one
        std::fs::write(dir.path().join("modified_building_3.idf"), "VERSION, 9.4;\n").unwrap();
        std::fs::write(dir.path().join("modified_building_old.idf"), "VERSION, 9.4;\n").unwrap();
        let mut cfg = config(dir.path());
        cfg.simulation.enabled = true;
        cfg.batch.write_manifest = false;

        let summary = run_pipeline_with(&cfg, &UserConfig::default(), &store(), &EchoSimulator)
            .unwrap();
        assert!(summary.manifest.is_none());
        let sim = summary.simulation.unwrap();
        let ids: Vec<_> = sim.outcomes.iter().map(|r| r.building_id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(sim.succeeded().count(), 2);
    }

    #[test]
    fn filter_criteria_limit_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserConfig::from_json_str(r#"{"filter_criteria": {"ids": ["2"]}}"#)
            .unwrap();
        let summary = run_pipeline_with(&config(dir.path()), &user, &store(), &EchoSimulator)
            .unwrap();
        assert_eq!(summary.generation.len(), 1);
        assert_eq!(summary.generation.outcomes[0].building_id, "2");
    }

    #[test]
    fn invalid_default_tier_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.batch.default_tier = "tier 7".into();
        let result = run_pipeline_with(&cfg, &UserConfig::default(), &store(), &EchoSimulator);
        assert!(matches!(result, Err(Error::UnknownKey { level: "tier", .. })));
    }
}
