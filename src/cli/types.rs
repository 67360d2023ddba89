//! Top-level CLI definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::check::CheckArgs;
use super::commands::run::RunArgs;
use super::commands::simulate::SimulateArgs;

#[derive(Parser, Debug)]
#[command(name = "courtroom")]
#[command(about = "Courtroom - message escalation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .courtroom/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the engine in real time, taking actor commands on stdin
    Run(RunArgs),

    /// Replay a span of simulated time on a virtual clock
    Simulate(SimulateArgs),

    /// Check whether a message's issue is fixed in a snapshot
    Check(CheckArgs),
}
