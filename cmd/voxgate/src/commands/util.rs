//! Utility functions for CLI commands.

use std::sync::Arc;

use voxgate_audio::{Pcm16, wav};
use voxgate_cli::{Config, Output, StoreBackend, load_config};
use voxgate_enroll::{EnrollmentStore, FileStore, RedbStore, Registry};
use voxgate_voiceprint::{FbankModel, FbankModelConfig, VoiceprintModel};

use crate::Cli;

const APP_NAME: &str = "voxgate";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Opens the configured enrollment store.
pub fn open_store(cfg: &Config) -> anyhow::Result<Box<dyn EnrollmentStore>> {
    let path = cfg.store_path();
    tracing::debug!(backend = %cfg.store.backend, path = %path.display(), "opening store");
    let store: Box<dyn EnrollmentStore> = match cfg.store.backend {
        StoreBackend::Files => Box::new(FileStore::open(&path)?),
        StoreBackend::Redb => Box::new(RedbStore::open(&path)?),
    };
    Ok(store)
}

/// Builds a registry over the configured store and the filterbank model.
pub fn open_registry(cli: &Cli) -> anyhow::Result<Registry> {
    let cfg = get_config(cli)?;
    let model: Arc<dyn VoiceprintModel> =
        Arc::new(FbankModel::new(FbankModelConfig::default())?);
    let store = open_store(&cfg)?;
    let registry = Registry::new(
        voxgate_enroll::Config {
            threshold: cfg.threshold,
        },
        model,
        store,
    )?;
    Ok(registry)
}

/// Reads a WAV recording.
pub fn read_audio(path: &str) -> anyhow::Result<Pcm16> {
    let pcm = wav::read_file(path)
        .map_err(|e| anyhow::anyhow!("failed to read {path}: {e}"))?;
    tracing::debug!(
        path,
        sample_rate = pcm.sample_rate,
        seconds = pcm.duration().as_secs_f32(),
        "loaded audio"
    );
    Ok(pcm)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    Output::from_flags(cli.json, cli.output.as_deref()).write(result)
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}
