//! User listing command.

use clap::Args;
use serde::Serialize;

use super::{open_registry, output_result};
use crate::Cli;

/// List enrolled users.
#[derive(Args)]
pub struct UsersCommand {}

#[derive(Serialize)]
struct UsersResult {
    count: usize,
    users: Vec<String>,
}

impl UsersCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let registry = open_registry(cli)?;
        let users = registry.users()?;
        output_result(
            cli,
            &UsersResult {
                count: users.len(),
                users,
            },
        )
    }
}
