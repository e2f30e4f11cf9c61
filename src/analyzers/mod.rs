// ABOUTME: Exercise analyzer trait, the generic per-frame tracker, and closed-enum dispatch
// ABOUTME: Classify -> debounce -> cycle recognition -> event floor, shared by all six exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise analyzers
//!
//! Every exercise implements [`MovementAnalyzer`]: it knows which joints it needs,
//! how to turn one frame into a raw phase, and which confirmed transitions complete
//! a rep. The shared pipeline lives in [`Tracker`]:
//!
//! 1. the confidence gate decision arrives from the engine
//! 2. the analyzer classifies the frame against the current confirmed phase
//! 3. the hysteresis filter confirms the raw phase
//! 4. the analyzer recognizes completed cycles on confirmed transitions
//! 5. the event debouncer enforces the minimum time between reps
//!
//! [`ExerciseAnalyzer`] holds exactly one tracker per session and dispatches by
//! exhaustive match, so a new exercise cannot be half-wired.

mod burpee;
mod glute_bridge;
mod jumping_jack;
mod plank;
mod push_up;
mod squat;

pub use burpee::BurpeeAnalyzer;
pub use glute_bridge::GluteBridgeAnalyzer;
pub use jumping_jack::JumpingJackAnalyzer;
pub use plank::PlankAnalyzer;
pub use push_up::PushUpAnalyzer;
pub use squat::SquatAnalyzer;

use pierre_pose::{Joint, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ExerciseTuning;
use crate::confidence::GateDecision;
use crate::debounce::{EventDebouncer, Hysteresis, Transition};
use crate::phase::{ExerciseKind, Phase};

/// Specific reason a frame fails an exercise's form criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormIssue {
    /// Shoulder-hip-ankle line bent
    BodyLineBroken,
    /// Torso too steep for a horizontal exercise
    TorsoNotHorizontal,
    /// Hips below the shoulder-ankle line
    HipsSagging,
    /// Hips above the shoulder-ankle line
    HipsPiked,
    /// Elbows above shoulder height
    ArmsNotSupporting,
    /// Hips not level with the shoulders
    HipsNotLevel,
    /// Knees not level with the hips
    KneesNotLevel,
    /// Squat bottom never reached parallel
    NotDeepEnough,
    /// Knee bend outside the planted-feet window
    KneeAngleOutOfRange,
    /// Torso not lying on the floor
    TorsoNotSupine,
    /// Left and right shoulders at different heights
    ShouldersNotLevel,
    /// Feet wider than the torso allows
    StanceTooWide,
    /// Hips not lifted high enough at the top
    HipsNotLifted,
}

impl FormIssue {
    /// Short coaching hint
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::BodyLineBroken => "Keep your body in a straight line",
            Self::TorsoNotHorizontal => "Keep your torso parallel to the floor",
            Self::HipsSagging => "Lift your hips, don't let them sag",
            Self::HipsPiked => "Lower your hips into line",
            Self::ArmsNotSupporting => "Keep your elbows under your shoulders",
            Self::HipsNotLevel => "Bring your hips level with your shoulders",
            Self::KneesNotLevel => "Straighten your legs",
            Self::NotDeepEnough => "Go deeper",
            Self::KneeAngleOutOfRange => "Plant your feet closer to your hips",
            Self::TorsoNotSupine => "Lie back with your shoulders on the floor",
            Self::ShouldersNotLevel => "Keep your shoulders level",
            Self::StanceTooWide => "Bring your feet hip-width apart",
            Self::HipsNotLifted => "Drive your hips higher",
        }
    }
}

/// One frame's classification by an analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment<P> {
    /// Unfiltered phase for this frame
    pub raw: P,
    /// Primary signal (elbow angle, knee angle, hip extension, ...)
    pub metric: f64,
    /// First failing form criterion, if any
    pub form: Option<FormIssue>,
}

impl<P> Assessment<P> {
    /// Assessment with valid form
    #[must_use]
    pub const fn clean(raw: P, metric: f64) -> Self {
        Self {
            raw,
            metric,
            form: None,
        }
    }

    /// Whether every form criterion passed
    #[must_use]
    pub const fn form_ok(&self) -> bool {
        self.form.is_none()
    }
}

/// Completed movement cycle recognized by an analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// A rep worth counting
    Rep,
    /// Full range of motion with invalid form
    Rejected(FormIssue),
}

/// Exercise-specific classification and cycle recognition
pub trait MovementAnalyzer: Debug + Default {
    /// Phase enum of this exercise
    type Phase: Copy + Eq + Debug + Default + Into<Phase>;

    /// Exercise implemented by this analyzer
    const KIND: ExerciseKind;

    /// Joints that must be present for classification
    fn required_joints(&self) -> &'static [Joint];

    /// Phases in the middle of a movement, confirmed with fewer frames
    fn is_transit(&self, phase: Self::Phase) -> bool;

    /// Consecutive frames required to confirm `raw`
    fn confirm_frames(&self, raw: Self::Phase, tuning: &ExerciseTuning) -> u32 {
        if self.is_transit(raw) {
            tuning.transit_confirm_frames
        } else {
            tuning.confirm_frames
        }
    }

    /// Classify a frame; `None` when the geometry cannot be evaluated
    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: Self::Phase,
    ) -> Option<Assessment<Self::Phase>>;

    /// Called on every classified frame after debouncing; may complete a cycle
    fn observe(
        &mut self,
        _confirmed: Self::Phase,
        _assessment: &Assessment<Self::Phase>,
    ) -> Option<Cycle> {
        None
    }

    /// Called when the confirmed phase changes; returns a completed cycle
    fn on_transition(
        &mut self,
        transition: Transition<Self::Phase>,
        assessment: &Assessment<Self::Phase>,
    ) -> Option<Cycle>;

    /// Minimum time between reps given the last measured rep interval
    fn event_floor(&self, base: Duration, _last_interval: Option<Duration>) -> Duration {
        base
    }

    /// Coaching text for the current state
    fn feedback(&self, confirmed: Self::Phase, assessment: &Assessment<Self::Phase>) -> String;

    /// Phases during which hold time accumulates
    fn is_holding(&self, _phase: Self::Phase) -> bool {
        false
    }

    /// Forget in-progress cycle state
    fn reset(&mut self);
}

/// Type-erased outcome of running one frame through a tracker
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStep {
    /// Raw phase, `None` when the frame was not classified
    pub raw: Option<Phase>,
    /// Confirmed phase after this frame
    pub confirmed: Phase,
    /// Confirmed transition on this frame
    pub transition: Option<Transition<Phase>>,
    /// Primary metric, when classified
    pub metric: Option<f64>,
    /// Analyzer feedback, when classified
    pub feedback: Option<String>,
    /// A rep was counted on this frame
    pub rep: bool,
    /// The raw phase is a holding phase
    pub raw_holding: bool,
    /// The confirmed phase is a holding phase
    pub holding: bool,
}

/// Generic per-frame pipeline around one analyzer
#[derive(Debug, Clone)]
pub struct Tracker<A: MovementAnalyzer> {
    analyzer: A,
    hysteresis: Hysteresis<A::Phase>,
    events: EventDebouncer,
    tuning: ExerciseTuning,
}

impl<A: MovementAnalyzer> Tracker<A> {
    /// Create a tracker with fresh analyzer state
    #[must_use]
    pub fn new(tuning: ExerciseTuning) -> Self {
        Self {
            analyzer: A::default(),
            hysteresis: Hysteresis::new(A::Phase::default()),
            events: EventDebouncer::new(),
            tuning,
        }
    }

    /// Underlying analyzer
    #[must_use]
    pub const fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Confirmed phase
    #[must_use]
    pub fn confirmed(&self) -> A::Phase {
        self.hysteresis.confirmed()
    }

    /// Run one gated frame through classification, debouncing and cycle recognition
    ///
    /// `counting` is true only when the session is active and the gate allows counting;
    /// cycles completed otherwise are consumed without a rep.
    pub fn step(
        &mut self,
        frame: &LandmarkFrame,
        decision: &GateDecision,
        counting: bool,
        now: Instant,
    ) -> FrameStep {
        let confirmed = self.hysteresis.confirmed();
        let assessment = match decision {
            GateDecision::Classify { .. } => self.analyzer.classify(frame, confirmed),
            GateDecision::MissingJoints(_) | GateDecision::LowConfidence { .. } => None,
        };
        let Some(assessment) = assessment else {
            return FrameStep {
                raw: None,
                confirmed: confirmed.into(),
                transition: None,
                metric: None,
                feedback: None,
                rep: false,
                raw_holding: false,
                holding: self.analyzer.is_holding(confirmed),
            };
        };

        let required = self.analyzer.confirm_frames(assessment.raw, &self.tuning);
        let transition = self.hysteresis.observe(assessment.raw, required);
        let cycle = transition.and_then(|change| {
            debug!(
                exercise = %A::KIND,
                from = ?change.from,
                to = ?change.to,
                metric = assessment.metric,
                "Confirmed phase transition"
            );
            self.analyzer.on_transition(change, &assessment)
        });
        let confirmed = self.hysteresis.confirmed();
        let cycle = cycle.or_else(|| self.analyzer.observe(confirmed, &assessment));

        let rep = match cycle {
            Some(Cycle::Rep) => self.accept_rep(counting, now),
            Some(Cycle::Rejected(issue)) => {
                debug!(exercise = %A::KIND, ?issue, "Cycle rejected for form");
                false
            }
            None => false,
        };

        FrameStep {
            raw: Some(assessment.raw.into()),
            confirmed: confirmed.into(),
            transition: transition.map(|change| Transition {
                from: change.from.into(),
                to: change.to.into(),
            }),
            metric: Some(assessment.metric),
            feedback: Some(self.analyzer.feedback(confirmed, &assessment)),
            rep,
            raw_holding: self.analyzer.is_holding(assessment.raw),
            holding: self.analyzer.is_holding(confirmed),
        }
    }

    fn accept_rep(&mut self, counting: bool, now: Instant) -> bool {
        if !counting {
            debug!(exercise = %A::KIND, "Cycle completed while counting disabled");
            return false;
        }
        let floor = self
            .analyzer
            .event_floor(self.tuning.min_event_interval(), self.events.last_interval());
        let accepted = self.events.try_fire(now, floor);
        if !accepted {
            debug!(
                exercise = %A::KIND,
                floor_ms = floor.as_millis(),
                "Rep suppressed by event floor"
            );
        }
        accepted
    }

    /// Drop in-progress cycle state, keeping the confirmed phase
    pub fn disarm(&mut self) {
        self.analyzer.reset();
    }

    /// Return to a freshly created tracker
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.hysteresis.reset();
        self.events.reset();
    }
}

/// The active exercise's tracker
#[derive(Debug, Clone)]
pub enum ExerciseAnalyzer {
    /// Push-up tracker
    PushUp(Tracker<PushUpAnalyzer>),
    /// Squat tracker
    Squat(Tracker<SquatAnalyzer>),
    /// Plank tracker
    Plank(Tracker<PlankAnalyzer>),
    /// Jumping-jack tracker
    JumpingJack(Tracker<JumpingJackAnalyzer>),
    /// Burpee tracker
    Burpee(Tracker<BurpeeAnalyzer>),
    /// Glute-bridge tracker
    GluteBridge(Tracker<GluteBridgeAnalyzer>),
}

macro_rules! dispatch {
    ($self:expr, $tracker:ident => $body:expr) => {
        match $self {
            ExerciseAnalyzer::PushUp($tracker) => $body,
            ExerciseAnalyzer::Squat($tracker) => $body,
            ExerciseAnalyzer::Plank($tracker) => $body,
            ExerciseAnalyzer::JumpingJack($tracker) => $body,
            ExerciseAnalyzer::Burpee($tracker) => $body,
            ExerciseAnalyzer::GluteBridge($tracker) => $body,
        }
    };
}

impl ExerciseAnalyzer {
    /// Create the tracker for an exercise
    #[must_use]
    pub fn new(kind: ExerciseKind, tuning: ExerciseTuning) -> Self {
        match kind {
            ExerciseKind::PushUp => Self::PushUp(Tracker::new(tuning)),
            ExerciseKind::Squat => Self::Squat(Tracker::new(tuning)),
            ExerciseKind::Plank => Self::Plank(Tracker::new(tuning)),
            ExerciseKind::JumpingJack => Self::JumpingJack(Tracker::new(tuning)),
            ExerciseKind::Burpee => Self::Burpee(Tracker::new(tuning)),
            ExerciseKind::GluteBridge => Self::GluteBridge(Tracker::new(tuning)),
        }
    }

    /// Exercise being tracked
    #[must_use]
    pub const fn kind(&self) -> ExerciseKind {
        match self {
            Self::PushUp(_) => ExerciseKind::PushUp,
            Self::Squat(_) => ExerciseKind::Squat,
            Self::Plank(_) => ExerciseKind::Plank,
            Self::JumpingJack(_) => ExerciseKind::JumpingJack,
            Self::Burpee(_) => ExerciseKind::Burpee,
            Self::GluteBridge(_) => ExerciseKind::GluteBridge,
        }
    }

    /// Joints the active analyzer needs
    #[must_use]
    pub fn required_joints(&self) -> &'static [Joint] {
        dispatch!(self, tracker => tracker.analyzer().required_joints())
    }

    /// Confirmed phase
    #[must_use]
    pub fn confirmed_phase(&self) -> Phase {
        dispatch!(self, tracker => tracker.confirmed().into())
    }

    /// Run one gated frame through the active tracker
    pub fn step(
        &mut self,
        frame: &LandmarkFrame,
        decision: &GateDecision,
        counting: bool,
        now: Instant,
    ) -> FrameStep {
        dispatch!(self, tracker => tracker.step(frame, decision, counting, now))
    }

    /// Drop in-progress cycle state
    pub fn disarm(&mut self) {
        dispatch!(self, tracker => tracker.disarm());
    }

    /// Reset analyzer, hysteresis and event history
    pub fn reset(&mut self) {
        dispatch!(self, tracker => tracker.reset());
    }
}

/// Resolve a reading between two thresholds from the previously confirmed phase
///
/// Shared by analyzers with a two-sided threshold and intermediate transit phases:
/// after a resting-high or descending phase the reading is still descending, after
/// a resting-low or ascending phase it is ascending, and from unknown it stays unknown.
pub(crate) fn dead_zone<P: Copy + Eq>(
    confirmed: P,
    descending_from: &[P],
    descending: P,
    ascending_from: &[P],
    ascending: P,
) -> Option<P> {
    if descending_from.contains(&confirmed) {
        Some(descending)
    } else if ascending_from.contains(&confirmed) {
        Some(ascending)
    } else {
        None
    }
}
