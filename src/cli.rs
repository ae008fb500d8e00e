use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;
use crate::user_config::UserConfig;

/// Generates per-building energy models from catalog defaults and a user
/// override document.
#[derive(Parser, Debug, Clone)]
#[command(name = "bem-paramgen", author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration TOML; built-in defaults when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// User override document (JSON).
    #[arg(short, long, required_unless_present = "serve")]
    pub user_config: Option<PathBuf>,

    /// Building inventory CSV (overrides `paths.buildings_csv`).
    #[arg(long)]
    pub buildings: Option<PathBuf>,

    /// Output directory for models and the manifest.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Concurrent generation tasks.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Base seed for reproducible sampling.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only buildings with this 6-character postcode.
    #[arg(long)]
    pub postcode: Option<String>,

    /// Only buildings with these ids.
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,

    /// Run the simulator over the generated models.
    #[arg(long, default_value_t = false)]
    pub simulate: bool,

    /// Serve the HTTP API instead of running once.
    #[arg(long, default_value_t = false)]
    pub serve: bool,

    /// HTTP API port.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,
}

impl Cli {
    /// Layers command-line flags over a loaded configuration.
    pub fn apply_to_config(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
        if let Some(csv) = &self.buildings {
            config.paths.buildings_csv = csv.clone();
        }
        if let Some(n) = self.workers {
            config.batch.max_workers = n;
        }
        if self.seed.is_some() {
            config.batch.seed = self.seed;
        }
        if self.simulate {
            config.simulation.enabled = true;
        }
    }

    /// Replaces the document's filter with the one given on the command line,
    /// if any.
    pub fn apply_to_user(&self, user: &mut UserConfig) {
        if self.postcode.is_some() {
            user.filter_criteria.postcode6 = self.postcode.clone();
        }
        if self.ids.is_some() {
            user.filter_criteria.ids = self.ids.clone();
        }
    }
}
