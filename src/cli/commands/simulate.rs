//! `courtroom simulate`: replay engine time on a virtual clock.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

use super::{format_event, snapshot_source};
use crate::application::CourtEngine;
use crate::cli::output::{output, CommandOutput};
use crate::cli::table::BoardFormatter;
use crate::domain::models::{Config, Message, MessageSource};
use crate::infrastructure::ManualClock;
use crate::services::{EngineEvent, EventPayload, SeededPicker};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Simulated seconds to run
    #[arg(short = 'S', long, default_value = "60")]
    pub seconds: u64,

    /// Generator seed (overrides generator.seed in config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Snapshot file re-read at every check
    #[arg(long, conflicts_with = "snapshot_text")]
    pub snapshot: Option<PathBuf>,

    /// Fixed snapshot text
    #[arg(long)]
    pub snapshot_text: Option<String>,

    /// Extra message posted right after start, as "source:text" (repeatable)
    #[arg(short, long = "post", value_name = "SOURCE:TEXT")]
    pub posts: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub event: EventPayload,
}

#[derive(Debug, serde::Serialize)]
pub struct SimulateOutput {
    pub seconds: u64,
    pub events: Vec<TimedEvent>,
    pub board: Vec<Message>,
}

impl CommandOutput for SimulateOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Simulated {}s:", self.seconds)];
        for timed in &self.events {
            lines.push(format!(
                "  [{:>8.3}s] {}",
                timed.at_ms as f64 / 1000.0,
                format_event(&timed.event)
            ));
        }
        lines.push(String::new());
        lines.push(BoardFormatter::new().format(&self.board));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn parse_post(raw: &str) -> Result<(MessageSource, String)> {
    let (source, text) = raw
        .split_once(':')
        .with_context(|| format!("Expected SOURCE:TEXT, got '{raw}'"))?;
    let source: MessageSource = source.trim().parse()?;
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!(crate::domain::DomainError::EmptyText);
    }
    Ok((source, text.to_string()))
}

fn drain(rx: &mut broadcast::Receiver<EngineEvent>, at: Duration, into: &mut Vec<TimedEvent>) {
    let at_ms = u64::try_from(at.as_millis()).unwrap_or(u64::MAX);
    loop {
        match rx.try_recv() {
            Ok(event) => into.push(TimedEvent {
                at_ms,
                event: event.payload,
            }),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "simulation event receiver lagged");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

/// Run the engine from t=0 to `seconds`, jumping straight to each deadline.
pub fn simulate(args: &SimulateArgs, config: &Config) -> Result<SimulateOutput> {
    let posts = args
        .posts
        .iter()
        .map(|raw| parse_post(raw))
        .collect::<Result<Vec<_>>>()?;

    let clock = ManualClock::new();
    let snapshots = snapshot_source(args.snapshot.clone(), args.snapshot_text.clone());
    let picker = SeededPicker::from_optional_seed(args.seed.or(config.generator.seed));
    let mut engine = CourtEngine::new(config, snapshots, Arc::new(clock.clone()), Box::new(picker));

    let mut rx = engine.bus().subscribe();
    let mut events = Vec::new();

    engine.enable();
    for (source, text) in posts {
        engine.enqueue(source, text);
    }
    drain(&mut rx, Duration::ZERO, &mut events);

    let end = Duration::from_secs(args.seconds);
    while let Some(deadline) = engine.next_deadline() {
        if deadline > end {
            break;
        }
        clock.set(deadline);
        engine.advance();
        drain(&mut rx, deadline, &mut events);
    }
    clock.set(end);

    tracing::info!(
        seconds = args.seconds,
        events = events.len(),
        pending = engine.pending_timers(),
        "simulation finished"
    );

    Ok(SimulateOutput {
        seconds: args.seconds,
        events,
        board: engine.messages(),
    })
}

pub async fn execute(args: SimulateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = simulate(&args, config)?;
    output(&result, json_mode);
    Ok(())
}
