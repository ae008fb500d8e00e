//! Integration tests for batch generation over a full inventory.

mod common;

use std::fs;

use bem_paramgen::batch::{BatchOptions, MANIFEST_FILE, TaskOutcome, generate_all};
use bem_paramgen::catalog::Catalog;
use bem_paramgen::model::{BuildContext, EnvelopeModelBuilder, ModelWriter};
use bem_paramgen::pipeline::run_pipeline;
use bem_paramgen::preprocess::preprocess;
use bem_paramgen::resolver::ConfigurationResolver;
use bem_paramgen::store::{CsvBuildingStore, MemoryBuildingStore};
use bem_paramgen::user_config::UserConfig;

#[test]
fn one_invalid_row_fails_alone() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserConfig::default();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    let records = preprocess(common::ten_buildings(), &resolver);
    let ctx = BuildContext::new(resolver);
    let writer = ModelWriter::new(dir.path());
    let options = BatchOptions {
        max_workers: 4,
        seed: Some(1),
        max_retries: 0,
    };

    let report = generate_all(&records, &EnvelopeModelBuilder, &writer, &ctx, &options)
        .unwrap();

    assert_eq!(report.succeeded().count(), 9);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].building_id, common::INVALID_ID);
    match &failed[0].outcome {
        TaskOutcome::Failed {
            error, transient, ..
        } => {
            assert!(error.contains("Bungalow"), "{error}");
            assert!(!transient);
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 9);
    assert!(!dir.path().join("modified_building_b05.idf").exists());
}

#[test]
fn seeded_batches_are_reproducible() {
    let user = common::sample_user_config();
    let run = |dir: &std::path::Path| {
        let summary = run_pipeline(
            &common::test_config(dir),
            &user,
            &MemoryBuildingStore::new(common::ten_buildings()),
        )
        .unwrap();
        assert_eq!(summary.generation.succeeded().count(), 9);
        fs::read_to_string(dir.join("modified_building_b03.idf")).unwrap()
    };

    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = run(a.path());
    assert!(!first.is_empty());
    assert_eq!(first, run(b.path()));
}

#[test]
fn csv_inventory_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("buildings.csv");
    fs::write(&csv_path, common::ten_buildings_csv()).unwrap();
    let out = dir.path().join("models");

    let mut config = common::test_config(&out);
    config.paths.buildings_csv = csv_path.clone();
    let user = common::sample_user_config();

    let summary = run_pipeline(&config, &user, &CsvBuildingStore::new(&csv_path))
        .unwrap();

    assert_eq!(summary.generation.len(), 10);
    assert_eq!(summary.failure_count(), 1);
    assert!(out.join(MANIFEST_FILE).exists());

    let model = fs::read_to_string(out.join("modified_building_b00.idf")).unwrap();
    // autosized roof and the overridden window u-factor
    assert!(model.contains("Autosize;"), "{model}");
    assert!(model.contains("1.6,"), "{model}");
    // January: 2.61 + 0.5 clamped to the overridden max
    assert!(model.contains("2.8,"), "{model}");
}

#[test]
fn manifest_lists_every_building() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run_pipeline(
        &common::test_config(dir.path()),
        &UserConfig::default(),
        &MemoryBuildingStore::new(common::ten_buildings()),
    )
    .unwrap();

    let manifest = fs::read_to_string(summary.manifest.unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 10);
    assert_eq!(outcomes[5]["building_id"], common::INVALID_ID);
    assert_eq!(outcomes[5]["status"], "failed");
}

#[test]
fn malformed_override_entries_do_not_block_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserConfig::from_json_str(
        r#"{"user_modifications": {
            "chimney": 3,
            "roof": {"thermal resistance": "high"},
            "windows": {"u_factor": 1.6}
        }}"#,
    )
    .unwrap();
    assert_eq!(user.validate(Catalog::builtin()).len(), 2);

    let summary = run_pipeline(
        &common::test_config(dir.path()),
        &user,
        &MemoryBuildingStore::new(common::ten_buildings()),
    )
    .unwrap();

    assert_eq!(summary.generation.succeeded().count(), 9);
    let model = fs::read_to_string(dir.path().join("modified_building_b00.idf")).unwrap();
    assert!(model.contains("1.6,"), "{model}");
}

#[test]
fn repeated_building_id_keeps_the_first_record() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserConfig::default();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    let buildings = common::ten_buildings();
    let rows = vec![buildings[0].clone(), buildings[1].clone(), buildings[0].clone()];
    let records = preprocess(rows, &resolver);
    let ctx = BuildContext::new(resolver);
    let writer = ModelWriter::new(dir.path());
    let options = BatchOptions {
        max_workers: 2,
        seed: Some(3),
        max_retries: 2,
    };

    let report = generate_all(&records, &EnvelopeModelBuilder, &writer, &ctx, &options)
        .unwrap();

    assert_eq!(report.succeeded().count(), 2);
    assert!(matches!(
        report.outcomes[0].outcome,
        TaskOutcome::Succeeded { .. }
    ));
    match &report.outcomes[2].outcome {
        TaskOutcome::Failed {
            error,
            transient,
            attempts,
        } => {
            assert!(error.contains("more than once"), "{error}");
            assert!(!transient);
            assert_eq!(*attempts, 1);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}
