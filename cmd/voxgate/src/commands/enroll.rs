//! Enrollment command.

use clap::Args;
use serde::Serialize;

use super::{open_registry, output_result, print_success, read_audio};
use crate::Cli;

/// Enroll a user from a WAV recording.
///
/// A later enrollment under the same user id replaces the earlier one.
#[derive(Args)]
pub struct EnrollCommand {
    /// User id to enroll
    user_id: String,

    /// WAV recording of the user's voice
    audio: String,
}

#[derive(Serialize)]
struct EnrollResult<'a> {
    user_id: &'a str,
    dimension: usize,
}

impl EnrollCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let registry = open_registry(cli)?;
        let audio = read_audio(&self.audio)?;

        let embedding = registry.enroll(&self.user_id, &audio)?;

        print_success(&format!("Enrolled \"{}\"", self.user_id));
        output_result(
            cli,
            &EnrollResult {
                user_id: &self.user_id,
                dimension: embedding.dim(),
            },
        )
    }
}
