//! voxgate - voice enrollment and login from the command line.

use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, EnrollCommand, IdentifyCommand, UsersCommand};

/// voxgate - enroll speakers and identify them by voice.
///
/// Audio is read from WAV files (16-bit PCM, any sample rate or channel
/// count). Enrollments and settings live in ~/.voxgate/voxgate/.
#[derive(Parser)]
#[command(name = "voxgate")]
#[command(about = "Voice enrollment and identification CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.voxgate/voxgate/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enroll a user from a recording
    Enroll(EnrollCommand),
    /// Identify the speaker of a recording
    Identify(IdentifyCommand),
    /// List enrolled users
    Users(UsersCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        Commands::Enroll(cmd) => cmd.run(&cli),
        Commands::Identify(cmd) => cmd.run(&cli),
        Commands::Users(cmd) => cmd.run(&cli),
        Commands::Config(cmd) => cmd.run(&cli),
    }
}
