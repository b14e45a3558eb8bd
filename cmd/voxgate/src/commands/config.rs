//! Configuration management commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use voxgate_cli::StoreBackend;

use super::{get_config, output_result, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.voxgate/voxgate/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// View the current configuration
    Show,
    /// Set the default identification threshold
    #[command(name = "set-threshold")]
    SetThreshold {
        /// Minimum similarity in [-1, 1]
        #[arg(allow_negative_numbers = true)]
        threshold: f32,
    },
    /// Choose where enrollments are stored
    #[command(name = "set-store")]
    SetStore {
        /// Backend: files or redb
        backend: StoreBackend,
        /// Store location (default: data/ next to the config file)
        path: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ConfigView {
    config_file: String,
    threshold: f32,
    store_backend: String,
    store_path: String,
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::Show => {
                let cfg = get_config(cli)?;
                output_result(
                    cli,
                    &ConfigView {
                        config_file: cfg.path().display().to_string(),
                        threshold: cfg.threshold,
                        store_backend: cfg.store.backend.to_string(),
                        store_path: cfg.store_path().display().to_string(),
                    },
                )
            }

            ConfigSubcommand::SetThreshold { threshold } => {
                let mut cfg = get_config(cli)?;
                cfg.set_threshold(*threshold)?;
                print_success(&format!("Threshold set to {}", threshold));
                Ok(())
            }

            ConfigSubcommand::SetStore { backend, path } => {
                let mut cfg = get_config(cli)?;
                cfg.set_store(*backend, path.clone())?;
                print_success(&format!(
                    "Store set to {} at {}",
                    backend,
                    cfg.store_path().display()
                ));
                Ok(())
            }
        }
    }
}
