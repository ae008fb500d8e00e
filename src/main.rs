//! Building energy model generator entry point: CLI wiring and run reporting.

use std::path::Path;
use std::process;

use clap::Parser;

use bem_paramgen::cli::Cli;
use bem_paramgen::config::RunConfig;
use bem_paramgen::pipeline::{RunSummary, run_pipeline};
use bem_paramgen::store::CsvBuildingStore;
use bem_paramgen::user_config::UserConfig;

fn load_config(cli: &Cli) -> Result<RunConfig, String> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        None => RunConfig::default(),
    };
    config.apply_env().map_err(|e| e.to_string())?;
    cli.apply_to_config(&mut config);

    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(config)
}

fn load_user_config(cli: &Cli, path: &Path) -> Result<UserConfig, String> {
    let mut user = UserConfig::from_json_file(path)
        .map_err(|e| format!("cannot load override document \"{}\": {e}", path.display()))?;
    cli.apply_to_user(&mut user);
    Ok(user)
}

fn print_summary(summary: &RunSummary) {
    let generation = &summary.generation;
    println!(
        "generated {} of {} model(s)",
        generation.succeeded().count(),
        generation.len()
    );
    for failed in generation.failed() {
        if let bem_paramgen::batch::TaskOutcome::Failed { error, .. } = &failed.outcome {
            println!("  failed {}: {error}", failed.building_id);
        }
    }
    if let Some(path) = &summary.manifest {
        println!("manifest: {}", path.display());
    }
    if let Some(sim) = &summary.simulation {
        println!(
            "simulated {} of {} model(s)",
            sim.succeeded().count(),
            sim.len()
        );
        for failed in sim.failed() {
            println!("  simulation failed: {}", failed.building_id);
        }
    }
}

#[cfg(feature = "api")]
fn serve(config: RunConfig, port: u16) -> Result<(), String> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let store = CsvBuildingStore::new(&config.paths.buildings_csv);
    let state = Arc::new(bem_paramgen::api::AppState {
        config,
        store: Arc::new(store),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    rt.block_on(bem_paramgen::api::serve(state, addr))
        .map_err(|e| format!("server error on {addr}: {e}"))
}

#[cfg(not(feature = "api"))]
fn serve(_config: RunConfig, _port: u16) -> Result<(), String> {
    Err("--serve requires a build with the `api` feature".to_string())
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = load_config(cli)?;

    if cli.serve {
        return serve(config, cli.port);
    }

    let Some(user_path) = &cli.user_config else {
        return Err("--user-config is required".to_string());
    };
    let user = load_user_config(cli, user_path)?;
    let store = CsvBuildingStore::new(&config.paths.buildings_csv);

    let summary = run_pipeline(&config, &user, &store).map_err(|e| e.to_string())?;
    print_summary(&summary);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
