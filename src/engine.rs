// ABOUTME: Workout session engine: per-frame pipeline from landmarks to detection result and events
// ABOUTME: Owns the gate, analyzer, lifecycle and counters; no timers, no shared state, no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Workout session engine
//!
//! [`WorkoutSession`] is the single object a caller owns per workout. Each call to
//! [`WorkoutSession::analyze_at`] runs one frame through:
//!
//! 1. the confidence gate for the active exercise's joints
//! 2. the exercise tracker (classification, hysteresis, cycle, event floor)
//! 3. counters, only while the lifecycle is active and the gate allows counting
//! 4. visibility tracking for auto-pause and auto-resume
//! 5. target completion
//!
//! and returns a [`FrameReport`] with the frame's [`DetectionResult`] and any events.

use chrono::{DateTime, Utc};
use pierre_pose::LandmarkFrame;
use serde::{Deserialize, Serialize};
use std::mem;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::admission::FrameSampler;
use crate::analyzers::{ExerciseAnalyzer, FrameStep};
use crate::confidence::{ConfidenceGate, GateDecision};
use crate::config::{ConfigError, EngineConfig};
use crate::counters::SessionCounters;
use crate::phase::{ExerciseKind, Phase};
use crate::session::{
    Lifecycle, PauseReason, SessionError, SessionTarget, StateChange, WorkoutSessionState,
    WorkoutSummary,
};

/// Feedback when required joints are missing
pub const POSITIONING_FEEDBACK: &str = "Position yourself so your whole body is in view";

/// Feedback when landmark confidence is too low to classify
pub const LOW_CONFIDENCE_FEEDBACK: &str = "Move closer to the camera or improve the lighting";

/// Feedback while auto-paused
pub const VISIBILITY_PAUSE_FEEDBACK: &str = "Step back into view to resume";

/// Event emitted while processing a frame or a manual override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A rep was counted
    RepCounted {
        /// Rep total after this rep
        total: u32,
    },
    /// Hold time crossed a whole second
    TimerUpdated {
        /// Whole seconds held
        elapsed_seconds: u64,
    },
    /// The lifecycle changed state on its own
    StateChanged {
        /// State before
        from: WorkoutSessionState,
        /// State after
        to: WorkoutSessionState,
    },
}

impl From<StateChange> for EngineEvent {
    fn from(change: StateChange) -> Self {
        Self::StateChanged {
            from: change.from,
            to: change.to,
        }
    }
}

/// Per-frame result for the UI layer, rebuilt from scratch every processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Every required joint was reported
    pub pose_detected: bool,
    /// Mean likelihood over the required joints
    pub average_confidence: f64,
    /// Debounced phase
    pub confirmed_phase: Phase,
    /// Short coaching text
    pub feedback: String,
    /// Every required joint clears the feedback threshold
    pub full_body_visible: bool,
    /// Visible enough to begin the countdown
    pub ready_to_start: bool,
    /// Hold time for time-based exercises
    pub elapsed_seconds: Option<f64>,
}

/// Everything produced by one processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Detection result for the frame
    pub result: DetectionResult,
    /// Events in the order they happened
    pub events: Vec<EngineEvent>,
}

/// One workout of one exercise
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    session_id: Uuid,
    kind: ExerciseKind,
    config: EngineConfig,
    gate: ConfidenceGate,
    analyzer: ExerciseAnalyzer,
    lifecycle: Lifecycle,
    counters: SessionCounters,
    sampler: FrameSampler,
    target: Option<SessionTarget>,
    started_at: DateTime<Utc>,
    last_tick: Option<Instant>,
    pending_hold: Duration,
    frames_without_body: u32,
}

impl WorkoutSession {
    /// Create an idle session
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration fails validation
    pub fn new(kind: ExerciseKind, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(kind, config))
    }

    /// Create an idle session with the default configuration
    #[must_use]
    pub fn with_defaults(kind: ExerciseKind) -> Self {
        Self::build(kind, EngineConfig::default())
    }

    fn build(kind: ExerciseKind, config: EngineConfig) -> Self {
        let tuning = *config.exercises.for_kind(kind);
        let session_id = Uuid::new_v4();
        info!(session_id = %session_id, exercise = %kind, "Workout session created");
        Self {
            session_id,
            kind,
            config,
            gate: ConfidenceGate::from(&config.confidence),
            analyzer: ExerciseAnalyzer::new(kind, tuning),
            lifecycle: Lifecycle::default(),
            counters: SessionCounters::default(),
            sampler: FrameSampler::new(tuning.sample_every_n_frames),
            target: None,
            started_at: Utc::now(),
            last_tick: None,
            pending_hold: Duration::ZERO,
            frames_without_body: 0,
        }
    }

    /// Set the goal that completes the session
    #[must_use]
    pub const fn with_target(mut self, target: SessionTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Replace or clear the goal
    pub fn set_target(&mut self, target: Option<SessionTarget>) {
        self.target = target;
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Session identifier, regenerated on reset
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Exercise of this session
    #[must_use]
    pub const fn exercise(&self) -> ExerciseKind {
        self.kind
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> WorkoutSessionState {
        self.lifecycle.state()
    }

    /// Reason for the current pause
    #[must_use]
    pub const fn pause_reason(&self) -> Option<PauseReason> {
        self.lifecycle.pause_reason()
    }

    /// Goal of this session
    #[must_use]
    pub const fn target(&self) -> Option<SessionTarget> {
        self.target
    }

    /// Counted reps
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.counters.reps.count()
    }

    /// Hold time in seconds for time-based exercises
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.kind
            .is_time_based()
            .then(|| self.counters.hold.seconds())
    }

    /// Debounced phase
    #[must_use]
    pub fn confirmed_phase(&self) -> Phase {
        self.analyzer.confirmed_phase()
    }

    /// Snapshot for the persistence collaborator
    #[must_use]
    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary {
            session_id: self.session_id,
            exercise: self.kind,
            reps: self.rep_count(),
            elapsed_seconds: self.elapsed_seconds(),
            state: self.state(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Idle -> Positioning
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless idle
    pub fn request_start(&mut self) -> Result<StateChange, SessionError> {
        let change = self.lifecycle.request_start()?;
        self.frames_without_body = 0;
        self.log_change(change);
        Ok(change)
    }

    /// Positioning -> Countdown, on the external pose-stable signal
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless positioning
    pub fn start_countdown(&mut self) -> Result<StateChange, SessionError> {
        let change = self.lifecycle.start_countdown()?;
        self.log_change(change);
        Ok(change)
    }

    /// Countdown -> Active, on the external countdown-elapsed signal
    ///
    /// Cycles started before activation are dropped so only movement performed
    /// while active can count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless counting down
    pub fn activate(&mut self) -> Result<StateChange, SessionError> {
        let change = self.lifecycle.activate()?;
        self.enter_counting();
        self.log_change(change);
        Ok(change)
    }

    /// Active -> Paused by the user
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless active
    pub fn pause(&mut self) -> Result<StateChange, SessionError> {
        let change = self.lifecycle.pause(PauseReason::User)?;
        self.log_change(change);
        Ok(change)
    }

    /// Paused -> Active
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless paused
    pub fn resume(&mut self) -> Result<StateChange, SessionError> {
        let change = self.lifecycle.resume()?;
        self.enter_counting();
        self.log_change(change);
        Ok(change)
    }

    /// End the workout: returns its summary, then resets to a fresh idle session
    pub fn stop(&mut self) -> WorkoutSummary {
        let summary = self.summary();
        info!(
            session_id = %self.session_id,
            reps = summary.reps,
            elapsed_seconds = ?summary.elapsed_seconds,
            "Workout session stopped"
        );
        self.reset();
        summary
    }

    /// Clear counters, analyzer and debouncers and return to idle
    ///
    /// Idempotent. A new session id is issued so summaries never collide.
    pub fn reset(&mut self) {
        if let Some(change) = self.lifecycle.stop() {
            self.log_change(change);
        }
        self.counters.reset();
        self.analyzer.reset();
        self.sampler.reset();
        self.last_tick = None;
        self.pending_hold = Duration::ZERO;
        self.frames_without_body = 0;
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
    }

    /// Consume the session and hand back its summary
    #[must_use]
    pub fn dispose(self) -> WorkoutSummary {
        let summary = self.summary();
        debug!(session_id = %self.session_id, "Workout session disposed");
        summary
    }

    // ============================================================================
    // Manual overrides
    // ============================================================================

    /// Count one rep without the analyzer
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionCompleted` once the target has been reached
    pub fn add_manual_rep(&mut self) -> Result<Vec<EngineEvent>, SessionError> {
        self.ensure_not_completed()?;
        let total = self.counters.reps.increment();
        info!(session_id = %self.session_id, total, "Manual rep added");
        let mut events = vec![EngineEvent::RepCounted { total }];
        self.check_target(&mut events);
        Ok(events)
    }

    /// Credit one second of hold time without the analyzer
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionCompleted` once the target has been reached
    pub fn add_manual_second(&mut self) -> Result<Vec<EngineEvent>, SessionError> {
        self.ensure_not_completed()?;
        let mut events = Vec::new();
        if let Some(elapsed_seconds) = self.counters.hold.add(Duration::from_secs(1)) {
            events.push(EngineEvent::TimerUpdated { elapsed_seconds });
        }
        info!(
            session_id = %self.session_id,
            hold_seconds = self.counters.hold.seconds(),
            "Manual second added"
        );
        self.check_target(&mut events);
        Ok(events)
    }

    const fn ensure_not_completed(&self) -> Result<(), SessionError> {
        if matches!(self.lifecycle.state(), WorkoutSessionState::Completed) {
            return Err(SessionError::SessionCompleted);
        }
        Ok(())
    }

    // ============================================================================
    // Frame processing
    // ============================================================================

    /// Apply the exercise's sampling rate, then analyze at the current time
    pub fn submit_frame(&mut self, frame: &LandmarkFrame) -> Option<FrameReport> {
        self.submit_frame_at(frame, Instant::now())
    }

    /// Apply the exercise's sampling rate, then analyze at `now`
    pub fn submit_frame_at(&mut self, frame: &LandmarkFrame, now: Instant) -> Option<FrameReport> {
        if !self.sampler.admit() {
            trace!(session_id = %self.session_id, "Frame sampled out");
            return None;
        }
        Some(self.analyze_at(frame, now))
    }

    /// Analyze a frame at the current time
    pub fn analyze(&mut self, frame: &LandmarkFrame) -> FrameReport {
        self.analyze_at(frame, Instant::now())
    }

    /// Analyze a frame captured at `now`
    ///
    /// Never fails: missing joints, low confidence and degenerate geometry all
    /// produce a well-defined result with no counter changes.
    pub fn analyze_at(&mut self, frame: &LandmarkFrame, now: Instant) -> FrameReport {
        let mut events = Vec::new();

        let decision = self.gate.evaluate(frame, self.analyzer.required_joints());
        match &decision {
            GateDecision::MissingJoints(missing) => {
                debug!(session_id = %self.session_id, ?missing, "Required joints missing");
            }
            GateDecision::LowConfidence { average } => {
                debug!(session_id = %self.session_id, average, "Landmark confidence too low");
            }
            GateDecision::Classify { .. } => {}
        }

        let counting = self.lifecycle.is_counting() && decision.counting_allowed();
        let step = self.analyzer.step(frame, &decision, counting, now);

        if step.rep {
            let total = self.counters.reps.increment();
            info!(
                session_id = %self.session_id,
                exercise = %self.kind,
                total,
                "Rep counted"
            );
            events.push(EngineEvent::RepCounted { total });
        }
        if self.kind.is_time_based() {
            self.track_hold(&step, counting, now, &mut events);
        }
        self.track_visibility(decision.full_body_visible(), &mut events);
        self.check_target(&mut events);

        FrameReport {
            result: self.detection_result(&decision, step),
            events,
        }
    }

    fn track_hold(
        &mut self,
        step: &FrameStep,
        counting: bool,
        now: Instant,
        events: &mut Vec<EngineEvent>,
    ) {
        let previous = mem::replace(&mut self.last_tick, counting.then_some(now));
        if !counting {
            self.pending_hold = Duration::ZERO;
            return;
        }

        let delta = previous
            .map(|prev| now.saturating_duration_since(prev))
            .filter(|gap| *gap <= self.config.session.max_hold_frame_gap())
            .unwrap_or_default();

        let credit = if step.holding {
            mem::take(&mut self.pending_hold) + delta
        } else if step.raw_holding {
            // Not yet confirmed; credited once the hysteresis catches up
            self.pending_hold += delta;
            return;
        } else {
            self.pending_hold = Duration::ZERO;
            return;
        };

        if let Some(elapsed_seconds) = self.counters.hold.add(credit) {
            debug!(session_id = %self.session_id, elapsed_seconds, "Hold timer advanced");
            events.push(EngineEvent::TimerUpdated { elapsed_seconds });
        }
    }

    fn track_visibility(&mut self, full_body_visible: bool, events: &mut Vec<EngineEvent>) {
        if full_body_visible {
            self.frames_without_body = 0;
            if self.lifecycle.pause_reason() == Some(PauseReason::VisibilityLost) {
                if let Ok(change) = self.lifecycle.resume() {
                    self.enter_counting();
                    info!(session_id = %self.session_id, "Body back in view, resuming");
                    events.push(change.into());
                }
            }
            return;
        }

        self.frames_without_body = self.frames_without_body.saturating_add(1);
        let session = &self.config.session;
        if session.auto_pause_on_visibility_loss
            && self.lifecycle.is_counting()
            && self.frames_without_body >= session.visibility_loss_frames
        {
            if let Ok(change) = self.lifecycle.pause(PauseReason::VisibilityLost) {
                info!(
                    session_id = %self.session_id,
                    frames = self.frames_without_body,
                    "Body out of view, pausing"
                );
                events.push(change.into());
            }
        }
    }

    fn check_target(&mut self, events: &mut Vec<EngineEvent>) {
        let Some(target) = self.target else {
            return;
        };
        if !target.is_reached(self.counters.reps.count(), self.counters.hold.whole_seconds()) {
            return;
        }
        if let Ok(change) = self.lifecycle.complete() {
            info!(
                session_id = %self.session_id,
                ?target,
                reps = self.counters.reps.count(),
                hold_seconds = self.counters.hold.whole_seconds(),
                "Workout target reached"
            );
            events.push(change.into());
        }
    }

    fn enter_counting(&mut self) {
        self.analyzer.disarm();
        self.last_tick = None;
        self.pending_hold = Duration::ZERO;
        self.frames_without_body = 0;
    }

    fn log_change(&self, change: StateChange) {
        info!(
            session_id = %self.session_id,
            from = %change.from,
            to = %change.to,
            "Session state changed"
        );
    }

    fn detection_result(&self, decision: &GateDecision, step: FrameStep) -> DetectionResult {
        let feedback = if self.lifecycle.pause_reason() == Some(PauseReason::VisibilityLost) {
            VISIBILITY_PAUSE_FEEDBACK.to_owned()
        } else {
            match decision {
                GateDecision::MissingJoints(_) => POSITIONING_FEEDBACK.to_owned(),
                GateDecision::LowConfidence { .. } => LOW_CONFIDENCE_FEEDBACK.to_owned(),
                GateDecision::Classify { .. } => step
                    .feedback
                    .unwrap_or_else(|| POSITIONING_FEEDBACK.to_owned()),
            }
        };

        DetectionResult {
            pose_detected: !matches!(decision, GateDecision::MissingJoints(_)),
            average_confidence: decision.average(),
            confirmed_phase: step.confirmed,
            feedback,
            full_body_visible: decision.full_body_visible(),
            ready_to_start: self.gate.ready_to_start(decision),
            elapsed_seconds: self.elapsed_seconds(),
        }
    }
}
