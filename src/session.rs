// ABOUTME: Workout session lifecycle state machine, targets, errors and the hand-off summary
// ABOUTME: Idle -> Positioning -> Countdown -> Active <-> Paused -> Completed, any -> Idle on stop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session lifecycle
//!
//! The lifecycle only moves on explicit calls, or on the three automatic
//! transitions the engine drives itself: auto-pause when the body leaves the
//! frame, auto-resume when it returns, and completion when the target is met.
//! Illegal calls are rejected with [`SessionError::InvalidTransition`] and leave
//! the state untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::phase::ExerciseKind;

/// Lifecycle state of a workout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSessionState {
    /// Created, nothing requested yet
    #[default]
    Idle,
    /// Waiting for the user to get into frame
    Positioning,
    /// Pose is stable, counting down to start
    Countdown,
    /// Counting reps or hold time
    Active,
    /// Temporarily not counting
    Paused,
    /// Target reached
    Completed,
}

impl WorkoutSessionState {
    /// Stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Positioning => "positioning",
            Self::Countdown => "countdown",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for WorkoutSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// Explicit pause call; only an explicit resume ends it
    User,
    /// The body left the frame; resumes automatically when it returns
    VisibilityLost,
}

/// Goal that completes a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SessionTarget {
    /// Complete after this many reps
    Reps(u32),
    /// Complete after this many whole seconds of hold time
    HoldSeconds(u64),
}

impl SessionTarget {
    /// Whether the counters meet the target
    #[must_use]
    pub const fn is_reached(&self, reps: u32, hold_seconds: u64) -> bool {
        match *self {
            Self::Reps(target) => reps >= target,
            Self::HoldSeconds(target) => hold_seconds >= target,
        }
    }
}

/// A lifecycle state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// State before the change
    pub from: WorkoutSessionState,
    /// State after the change
    pub to: WorkoutSessionState,
}

/// Session lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The requested lifecycle call is not valid from the current state
    #[error("Cannot {action} while session is {from}")]
    InvalidTransition {
        /// State the call was made in
        from: WorkoutSessionState,
        /// Attempted lifecycle call
        action: &'static str,
    },

    /// The session already reached its target
    #[error("Session is completed; counters are frozen")]
    SessionCompleted,
}

impl SessionError {
    /// Create an invalid-transition error
    #[must_use]
    pub const fn invalid_transition(from: WorkoutSessionState, action: &'static str) -> Self {
        Self::InvalidTransition { from, action }
    }
}

/// Lifecycle state plus the reason for the current pause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifecycle {
    state: WorkoutSessionState,
    pause_reason: Option<PauseReason>,
}

impl Lifecycle {
    /// Current state
    #[must_use]
    pub const fn state(&self) -> WorkoutSessionState {
        self.state
    }

    /// Reason for the current pause, `None` unless paused
    #[must_use]
    pub const fn pause_reason(&self) -> Option<PauseReason> {
        self.pause_reason
    }

    /// Counters may change from frame analysis
    #[must_use]
    pub const fn is_counting(&self) -> bool {
        matches!(self.state, WorkoutSessionState::Active)
    }

    fn move_to(&mut self, to: WorkoutSessionState) -> StateChange {
        let from = self.state;
        self.state = to;
        if to != WorkoutSessionState::Paused {
            self.pause_reason = None;
        }
        StateChange { from, to }
    }

    fn require(
        &self,
        expected: WorkoutSessionState,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::invalid_transition(self.state, action))
        }
    }

    /// Idle -> Positioning
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless idle
    pub fn request_start(&mut self) -> Result<StateChange, SessionError> {
        self.require(WorkoutSessionState::Idle, "request start")?;
        Ok(self.move_to(WorkoutSessionState::Positioning))
    }

    /// Positioning -> Countdown
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless positioning
    pub fn start_countdown(&mut self) -> Result<StateChange, SessionError> {
        self.require(WorkoutSessionState::Positioning, "start countdown")?;
        Ok(self.move_to(WorkoutSessionState::Countdown))
    }

    /// Countdown -> Active
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless counting down
    pub fn activate(&mut self) -> Result<StateChange, SessionError> {
        self.require(WorkoutSessionState::Countdown, "activate")?;
        Ok(self.move_to(WorkoutSessionState::Active))
    }

    /// Active -> Paused
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless active
    pub fn pause(&mut self, reason: PauseReason) -> Result<StateChange, SessionError> {
        self.require(WorkoutSessionState::Active, "pause")?;
        let change = self.move_to(WorkoutSessionState::Paused);
        self.pause_reason = Some(reason);
        Ok(change)
    }

    /// Paused -> Active
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless paused
    pub fn resume(&mut self) -> Result<StateChange, SessionError> {
        self.require(WorkoutSessionState::Paused, "resume")?;
        Ok(self.move_to(WorkoutSessionState::Active))
    }

    /// Active/Paused -> Completed
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless active or paused
    pub fn complete(&mut self) -> Result<StateChange, SessionError> {
        match self.state {
            WorkoutSessionState::Active | WorkoutSessionState::Paused => {
                Ok(self.move_to(WorkoutSessionState::Completed))
            }
            from => Err(SessionError::invalid_transition(from, "complete")),
        }
    }

    /// Any -> Idle; `None` when already idle
    pub fn stop(&mut self) -> Option<StateChange> {
        (self.state != WorkoutSessionState::Idle).then(|| self.move_to(WorkoutSessionState::Idle))
    }
}

/// Record handed to the persistence collaborator when a session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Session identifier
    pub session_id: Uuid,
    /// Exercise performed
    pub exercise: ExerciseKind,
    /// Counted reps
    pub reps: u32,
    /// Accumulated hold time, present for time-based exercises
    pub elapsed_seconds: Option<f64>,
    /// Lifecycle state when the summary was taken
    pub state: WorkoutSessionState,
    /// When the session was created or last reset
    pub started_at: DateTime<Utc>,
    /// When the summary was taken
    pub finished_at: DateTime<Utc>,
}
