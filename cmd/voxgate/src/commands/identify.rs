//! Identification command.

use clap::Args;

use super::{open_registry, output_result, read_audio};
use crate::Cli;

/// Identify the speaker of a WAV recording.
///
/// Prints the best match. A rejected login is a normal result with
/// `matched: false`, not an error.
#[derive(Args)]
pub struct IdentifyCommand {
    /// WAV recording to identify
    audio: String,

    /// Minimum similarity in [-1, 1] (default: from config)
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f32>,
}

impl IdentifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let registry = open_registry(cli)?;
        let audio = read_audio(&self.audio)?;

        let threshold = self.threshold.unwrap_or(registry.config().threshold);
        let result = registry.identify_with_threshold(&audio, threshold)?;

        if !result.matched {
            tracing::debug!(
                candidate = ?result.candidate,
                score = result.score,
                "no enrolled user cleared the threshold"
            );
        }
        output_result(cli, &result)
    }
}
