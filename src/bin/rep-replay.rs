// ABOUTME: Command-line replay of recorded landmark frames through the rep-counting engine
// ABOUTME: Prints events as JSON lines and the final workout summary as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recording replay tool.
//!
//! Usage:
//! ```bash
//! # Count push-ups in a recording
//! cargo run --bin rep-replay -- --exercise push-up --input recording.jsonl
//!
//! # Read from stdin, print every event, stop at 30 seconds of plank
//! cat plank.jsonl | cargo run --bin rep-replay -- -e plank --target-seconds 30 --events
//!
//! # Pace frames in real time through the async frame pump
//! cargo run --bin rep-replay -- -e squat -i squats.jsonl --live
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pierre_rep_engine::admission::SharedSession;
use pierre_rep_engine::config::EngineConfig;
use pierre_rep_engine::engine::WorkoutSession;
use pierre_rep_engine::logging::LoggingConfig;
use pierre_rep_engine::phase::ExerciseKind;
use pierre_rep_engine::pump::{FramePump, DEFAULT_REPORT_CAPACITY};
use pierre_rep_engine::replay::{self, ReplayControl, ReplayOptions, ReplayRecord, TimedEvent};
use pierre_rep_engine::session::{SessionTarget, WorkoutSummary};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "rep-replay",
    about = "Pierre rep engine recording replay",
    long_about = "Replay a JSON-lines landmark recording through the rep-counting engine and print the workout summary"
)]
struct ReplayArgs {
    /// Exercise to analyze (push-up, squat, plank, jumping-jack, burpee, glute-bridge)
    #[arg(long, short = 'e')]
    exercise: ExerciseKind,

    /// Recording file; stdin when omitted or '-'
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Complete the session after this many reps
    #[arg(long, conflicts_with = "target_seconds")]
    target_reps: Option<u32>,

    /// Complete the session after this many seconds of hold time
    #[arg(long)]
    target_seconds: Option<u64>,

    /// Analyze every frame instead of the exercise's sampling rate
    #[arg(long)]
    no_sampling: bool,

    /// Do not activate the session before the first record
    #[arg(long)]
    no_auto_start: bool,

    /// Print each event as a JSON line before the summary
    #[arg(long)]
    events: bool,

    /// Pace frames by their timestamps through the async frame pump
    #[arg(long)]
    live: bool,
}

impl ReplayArgs {
    const fn target(&self) -> Option<SessionTarget> {
        match (self.target_reps, self.target_seconds) {
            (Some(reps), _) => Some(SessionTarget::Reps(reps)),
            (None, Some(seconds)) => Some(SessionTarget::HoldSeconds(seconds)),
            (None, None) => None,
        }
    }

    const fn options(&self) -> ReplayOptions {
        ReplayOptions {
            honor_sampling: !self.no_sampling,
            auto_start: !self.no_auto_start,
        }
    }

    fn read_records(&self) -> Result<Vec<ReplayRecord>> {
        match self.input.as_deref() {
            Some(path) if path.as_os_str() != "-" => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Ok(replay::read_records(BufReader::new(file))?)
            }
            _ => Ok(replay::read_records(io::stdin().lock())?),
        }
    }
}

fn print_json_line<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn offline(
    args: &ReplayArgs,
    session: &mut WorkoutSession,
    records: &[ReplayRecord],
) -> Result<WorkoutSummary> {
    let outcome = replay::run(session, records, args.options())?;
    info!(
        frames_total = outcome.frames_total,
        frames_analyzed = outcome.frames_analyzed,
        events = outcome.events.len(),
        "Offline replay complete"
    );
    if args.events {
        for event in &outcome.events {
            print_json_line(event)?;
        }
    }
    Ok(outcome.summary)
}

async fn live(
    args: &ReplayArgs,
    mut session: WorkoutSession,
    records: Vec<ReplayRecord>,
) -> Result<WorkoutSummary> {
    let options = args.options();
    let auto_start = replay::needs_auto_start(&records, options);
    if !options.honor_sampling {
        warn!("--no-sampling has no effect with --live; the exercise sampling rate applies");
    }
    if auto_start {
        replay::apply_control(&mut session, ReplayControl::Start, 0)?;
    }

    let shared = SharedSession::new(session);
    let pump = FramePump::spawn(shared.clone(), DEFAULT_REPORT_CAPACITY);
    let mut reports = pump.subscribe();
    let print_events = args.events;
    let printer = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) if print_events => {
                    for event in report.events {
                        if let Err(err) = print_json_line(&event) {
                            warn!("Failed to print event: {err}");
                        }
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Report printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let base = Instant::now();
    let mut stopped = None;
    for record in records {
        let due = base + Duration::from_millis(record.timestamp_ms);
        sleep_until(due).await;
        if let Some(frame) = record.frame {
            pump.push_at(frame, due.into_std());
        } else if let Some(control) = record.control {
            let outcome = shared
                .with(|session| replay::apply_control(session, control, record.timestamp_ms))?;
            if args.events {
                for event in outcome.events {
                    print_json_line(&TimedEvent {
                        timestamp_ms: record.timestamp_ms,
                        event,
                    })?;
                }
            }
            if stopped.is_none() {
                stopped = outcome.summary;
            }
        }
    }

    let stats = pump.shutdown().await?;
    printer.await?;
    info!(
        pushed = stats.pushed,
        analyzed = stats.analyzed,
        sampled_out = stats.sampled_out,
        superseded = stats.superseded(),
        dropped = shared.dropped_frames(),
        "Live replay complete"
    );
    Ok(stopped.unwrap_or_else(|| shared.with(|session| session.summary())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ReplayArgs::parse();

    LoggingConfig::from_env().init()?;

    let config = EngineConfig::from_environment()?;
    let mut session = WorkoutSession::new(args.exercise, config)?;
    session.set_target(args.target());
    let records = args.read_records()?;
    info!(
        exercise = %args.exercise,
        records = records.len(),
        live = args.live,
        "Replaying recording"
    );

    let summary = if args.live {
        live(&args, session, records).await?
    } else {
        offline(&args, &mut session, &records)?
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)?;
    writeln!(stdout)?;
    Ok(())
}
