// ABOUTME: Main library entry point for the Pierre exercise rep-counting engine
// ABOUTME: Landmark frames in; debounced phases, counted reps, hold time and feedback out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Rep Engine
//!
//! Per-frame exercise analysis for camera-based workouts. An external pose model
//! produces a [`LandmarkFrame`] per camera frame; the engine turns the stream into
//! debounced exercise phases, rep counts, hold time and coaching feedback.
//!
//! ## Features
//!
//! - **Six exercises**: push-up, squat, plank, jumping jack, burpee, glute bridge
//! - **Confidence gating**: separate thresholds for feedback and for counting
//! - **Hysteresis**: a phase is confirmed only after consecutive agreeing frames
//! - **Event floor**: minimum time between reps, adaptive for fast cadences
//! - **Session lifecycle**: positioning, countdown, active, paused, completed
//! - **Auto-pause**: pauses when the body leaves the frame and resumes on return
//!
//! ## Architecture
//!
//! - **`pierre_pose`**: landmark frames, geometry kernel and thresholds
//! - **confidence**: two-threshold gate over the active exercise's joints
//! - **debounce**: hysteresis filter and rep event debouncer
//! - **analyzers**: one analyzer per exercise behind a shared tracker
//! - **engine**: [`WorkoutSession`], the per-frame pipeline
//! - **admission** / **pump**: frame sampling and drop-when-busy hand-off
//! - **replay**: offline replay of JSON-lines recordings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_rep_engine::engine::WorkoutSession;
//! use pierre_rep_engine::phase::ExerciseKind;
//! use pierre_rep_engine::pierre_pose::{Joint, LandmarkFrame};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut session = WorkoutSession::with_defaults(ExerciseKind::Squat);
//!     session.request_start()?;
//!     session.start_countdown()?;
//!     session.activate()?;
//!
//!     let frame = LandmarkFrame::builder(720.0, 1280.0)
//!         .landmark(Joint::LeftHip, 340.0, 640.0, 0.95)
//!         .build()?;
//!     let report = session.analyze(&frame);
//!     println!("{} reps, feedback: {}", session.rep_count(), report.result.feedback);
//!     Ok(())
//! }
//! ```

pub use pierre_pose;

/// Frame sampling and drop-when-busy submission
pub mod admission;

/// Exercise analyzers and the shared per-frame tracker
pub mod analyzers;

/// Per-frame landmark confidence gate
pub mod confidence;

/// Engine configuration with environment overrides
pub mod config;

/// Rep and hold-time counters
pub mod counters;

/// Hysteresis filter and event debouncer
pub mod debounce;

/// Workout session engine
pub mod engine;

/// Tracing subscriber setup
pub mod logging;

/// Exercise kinds and phase enums
pub mod phase;

/// Async latest-wins frame pump
pub mod pump;

/// Offline replay of recorded frames
pub mod replay;

/// Session lifecycle state machine
pub mod session;

pub use engine::{DetectionResult, EngineEvent, FrameReport, WorkoutSession};
pub use phase::{ExerciseKind, Phase};
pub use pierre_pose::LandmarkFrame;
pub use session::{SessionTarget, WorkoutSessionState, WorkoutSummary};
