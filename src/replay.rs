// ABOUTME: Offline replay of recorded landmark frames through a workout session
// ABOUTME: JSON-lines recordings with per-frame timestamps and optional lifecycle control records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recording replay
//!
//! A recording is one JSON object per line. Each record carries a capture
//! timestamp in milliseconds and exactly one of:
//!
//! - `frame`: a [`LandmarkFrame`] as produced by the pose model
//! - `control`: a lifecycle call ([`ReplayControl`])
//!
//! ```text
//! {"timestamp_ms":0,"control":"start"}
//! {"timestamp_ms":33,"frame":{"width":720,"height":1280,"landmarks":{...}}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Timestamps must not go
//! backwards. Frame timing during replay comes from the recorded timestamps,
//! so results do not depend on how fast the replay runs.

use pierre_pose::{LandmarkFrame, PoseError};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::{DetectionResult, EngineEvent, WorkoutSession};
use crate::session::{SessionError, WorkoutSummary};

/// Lifecycle call embedded in a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayControl {
    /// Request start, start the countdown and activate
    Start,
    /// User pause
    Pause,
    /// Resume after a pause
    Resume,
    /// Stop; the summary taken here becomes the replay's summary
    Stop,
    /// Manual rep override
    ManualRep,
    /// Manual hold-second override
    ManualSecond,
}

/// One line of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Capture time relative to the start of the recording
    pub timestamp_ms: u64,
    /// Landmark frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<LandmarkFrame>,
    /// Lifecycle call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ReplayControl>,
}

impl ReplayRecord {
    /// Frame record
    #[must_use]
    pub const fn frame(timestamp_ms: u64, frame: LandmarkFrame) -> Self {
        Self {
            timestamp_ms,
            frame: Some(frame),
            control: None,
        }
    }

    /// Control record
    #[must_use]
    pub const fn control(timestamp_ms: u64, control: ReplayControl) -> Self {
        Self {
            timestamp_ms,
            frame: None,
            control: Some(control),
        }
    }
}

/// Replay failures
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Reading the recording failed
    #[error("Failed to read recording: {0}")]
    Io(#[from] io::Error),

    /// A line is not valid JSON for a record
    #[error("Line {line}: {source}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A frame failed validation
    #[error("Line {line}: invalid frame: {source}")]
    InvalidFrame {
        /// 1-based line number
        line: usize,
        /// Validation error
        source: PoseError,
    },

    /// A record has neither or both of `frame` and `control`
    #[error("Line {line}: record must have exactly one of 'frame' or 'control'")]
    AmbiguousRecord {
        /// 1-based line number
        line: usize,
    },

    /// Timestamps went backwards
    #[error("Line {line}: timestamp {current}ms is earlier than {previous}ms")]
    NonMonotonic {
        /// 1-based line number
        line: usize,
        /// Previous timestamp
        previous: u64,
        /// Offending timestamp
        current: u64,
    },

    /// A control record was not valid for the session state
    #[error("Control '{control:?}' at {timestamp_ms}ms rejected: {source}")]
    Control {
        /// Control that failed
        control: ReplayControl,
        /// Record timestamp
        timestamp_ms: u64,
        /// Lifecycle error
        source: SessionError,
    },
}

/// Parse a JSON-lines recording
///
/// # Errors
///
/// Returns `ReplayError` for I/O failures, malformed lines, invalid frames,
/// ambiguous records or timestamps that go backwards
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut records = Vec::new();
    let mut previous = 0_u64;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: ReplayRecord =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
                line: line_number,
                source,
            })?;

        if record.frame.is_some() == record.control.is_some() {
            return Err(ReplayError::AmbiguousRecord { line: line_number });
        }
        if let Some(frame) = &record.frame {
            frame
                .validate()
                .map_err(|source| ReplayError::InvalidFrame {
                    line: line_number,
                    source,
                })?;
        }
        if record.timestamp_ms < previous {
            return Err(ReplayError::NonMonotonic {
                line: line_number,
                previous,
                current: record.timestamp_ms,
            });
        }
        previous = record.timestamp_ms;
        records.push(record);
    }

    debug!(records = records.len(), "Recording parsed");
    Ok(records)
}

/// How to drive the session during a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Apply the exercise's frame sampling rate
    pub honor_sampling: bool,
    /// Activate the session before the first record unless the recording has a `start`
    pub auto_start: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            honor_sampling: true,
            auto_start: true,
        }
    }
}

/// Event stamped with the record time that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Record timestamp
    pub timestamp_ms: u64,
    /// Event
    #[serde(flatten)]
    pub event: EngineEvent,
}

/// Result of replaying a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Frame records in the recording
    pub frames_total: usize,
    /// Frames actually analyzed
    pub frames_analyzed: usize,
    /// Every event in order
    pub events: Vec<TimedEvent>,
    /// Detection result of the last analyzed frame
    pub last_result: Option<DetectionResult>,
    /// Summary at the first `stop` record, or at the end of the recording
    pub summary: WorkoutSummary,
}

fn start(session: &mut WorkoutSession) -> Result<(), SessionError> {
    session.request_start()?;
    session.start_countdown()?;
    session.activate()?;
    Ok(())
}

/// What a control record did to the session
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOutcome {
    /// Events produced by the call
    pub events: Vec<EngineEvent>,
    /// Summary taken by a `stop`
    pub summary: Option<WorkoutSummary>,
}

/// Apply one lifecycle call to a session
///
/// # Errors
///
/// Returns `ReplayError::Control` when the call is invalid for the session state
pub fn apply_control(
    session: &mut WorkoutSession,
    control: ReplayControl,
    timestamp_ms: u64,
) -> Result<ControlOutcome, ReplayError> {
    let rejected = |source: SessionError| ReplayError::Control {
        control,
        timestamp_ms,
        source,
    };
    let mut summary = None;
    let events = match control {
        ReplayControl::Start => {
            start(session).map_err(rejected)?;
            Vec::new()
        }
        ReplayControl::Pause => vec![session.pause().map_err(rejected)?.into()],
        ReplayControl::Resume => vec![session.resume().map_err(rejected)?.into()],
        ReplayControl::Stop => {
            summary = Some(session.stop());
            Vec::new()
        }
        ReplayControl::ManualRep => session.add_manual_rep().map_err(rejected)?,
        ReplayControl::ManualSecond => session.add_manual_second().map_err(rejected)?,
    };
    debug!(?control, timestamp_ms, "Control applied");
    Ok(ControlOutcome { events, summary })
}

/// Whether `run` should activate the session itself
#[must_use]
pub fn needs_auto_start(records: &[ReplayRecord], options: ReplayOptions) -> bool {
    options.auto_start
        && !records
            .iter()
            .any(|record| record.control == Some(ReplayControl::Start))
}

/// Replay records through a session
///
/// # Errors
///
/// Returns `ReplayError::Control` when a control record is invalid for the
/// session state at that point
pub fn run(
    session: &mut WorkoutSession,
    records: &[ReplayRecord],
    options: ReplayOptions,
) -> Result<ReplayOutcome, ReplayError> {
    let base = Instant::now();
    if needs_auto_start(records, options) {
        apply_control(session, ReplayControl::Start, 0)?;
    }

    let mut frames_total = 0;
    let mut frames_analyzed = 0;
    let mut events = Vec::new();
    let mut last_result = None;
    let mut stopped: Option<WorkoutSummary> = None;

    for record in records {
        let timestamp_ms = record.timestamp_ms;
        let stamp = |event| TimedEvent {
            timestamp_ms,
            event,
        };

        if let Some(frame) = &record.frame {
            frames_total += 1;
            let now = base + Duration::from_millis(timestamp_ms);
            let report = if options.honor_sampling {
                session.submit_frame_at(frame, now)
            } else {
                Some(session.analyze_at(frame, now))
            };
            if let Some(report) = report {
                frames_analyzed += 1;
                events.extend(report.events.into_iter().map(stamp));
                last_result = Some(report.result);
            }
        } else if let Some(control) = record.control {
            let outcome = apply_control(session, control, timestamp_ms)?;
            events.extend(outcome.events.into_iter().map(stamp));
            if stopped.is_none() {
                stopped = outcome.summary;
            }
        }
    }

    let summary = stopped.unwrap_or_else(|| session.summary());
    info!(
        session_id = %summary.session_id,
        exercise = %summary.exercise,
        frames_total,
        frames_analyzed,
        reps = summary.reps,
        elapsed_seconds = ?summary.elapsed_seconds,
        "Replay finished"
    );

    Ok(ReplayOutcome {
        frames_total,
        frames_analyzed,
        events,
        last_result,
        summary,
    })
}
