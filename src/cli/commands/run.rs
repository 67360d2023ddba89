//! `courtroom run`: drive the engine in real time.
//!
//! Notifications are printed as they happen; actor commands are read one per
//! line from stdin (see [`ActorCommand`]).

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::{format_event, snapshot_source};
use crate::application::EngineRuntime;
use crate::cli::actor::ActorCommand;
use crate::cli::table::BoardFormatter;
use crate::domain::models::Config;
use crate::services::{EngineEvent, SeededPicker};

const USAGE: &str =
    "Commands: enqueue <source> <text> | resolve <id> | list | enable | disable | reset | quit";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workspace snapshot file, re-read at every check
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Generator seed (overrides generator.seed in config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds
    #[arg(short, long)]
    pub duration_secs: Option<u64>,
}

fn print_event(event: &EngineEvent, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string(event).unwrap_or_default());
    } else {
        println!(
            "{} {}",
            event.timestamp.format("%H:%M:%S"),
            format_event(&event.payload)
        );
    }
}

/// Apply one actor command. Returns `false` when the session should end.
async fn apply(runtime: &EngineRuntime, command: ActorCommand, json_mode: bool) -> bool {
    match command {
        ActorCommand::Enqueue { source, text } => {
            let id = runtime.enqueue(source, text).await;
            if !json_mode {
                println!("Posted #{id}");
            }
        }
        ActorCommand::Resolve(id) => {
            let outcome = runtime.resolve(id).await;
            if json_mode {
                println!("{}", serde_json::to_string(&outcome).unwrap_or_default());
            } else {
                println!("{}", outcome.describe());
            }
        }
        ActorCommand::List => {
            let board = runtime.messages().await;
            if json_mode {
                println!("{}", serde_json::to_string(&board).unwrap_or_default());
            } else {
                println!("{}", BoardFormatter::new().format(&board));
            }
        }
        ActorCommand::Reset => runtime.reset().await,
        ActorCommand::Disable => {
            if !runtime.disable().await && !json_mode {
                println!("Engine is not running.");
            }
        }
        ActorCommand::Enable => {
            if !runtime.enable().await && !json_mode {
                println!("Engine is already running.");
            }
        }
        ActorCommand::Quit => return false,
    }
    true
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let snapshots = snapshot_source(args.snapshot.clone(), None);
    let picker = SeededPicker::from_optional_seed(args.seed.or(config.generator.seed));
    let runtime = EngineRuntime::new(config, snapshots, Box::new(picker));

    let mut events = runtime.subscribe();
    let scheduler = runtime.spawn();
    runtime.enable().await;

    if !json_mode {
        eprintln!("{USAGE}");
    }

    let deadline = args.duration_secs.map(Duration::from_secs);
    let timeout = async move {
        match deadline {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(timeout);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => match ActorCommand::parse(&line) {
                        Ok(Some(command)) => {
                            if !apply(&runtime, command, json_mode).await {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(err) => eprintln!("Error: {err}"),
                    },
                    None => {
                        tracing::debug!("stdin closed");
                        stdin_open = false;
                        if deadline.is_none() {
                            break;
                        }
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => print_event(&event, json_mode),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            () = &mut timeout => {
                tracing::info!("run duration elapsed");
                break;
            }
        }
    }

    runtime.shutdown();
    scheduler.await.context("Scheduler task failed")?;
    Ok(())
}
