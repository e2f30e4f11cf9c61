// ABOUTME: Shared test utilities for rep engine integration tests
// ABOUTME: Synthetic landmark frames per exercise, a fixed-step frame feeder and session setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `pierre_rep_engine`
//!
//! Frames are side or front views on a 1000x1000 image with identical left and
//! right joints, which keeps the geometry easy to reason about: every helper
//! documents the angle or ratio it produces.

use pierre_pose::{Joint, LandmarkFrame, Point2};
use pierre_rep_engine::config::EngineConfig;
use pierre_rep_engine::engine::{EngineEvent, FrameReport, WorkoutSession};
use pierre_rep_engine::phase::ExerciseKind;
use std::env;
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Likelihood used for every joint unless a test says otherwise
pub const GOOD: f64 = 0.9;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

fn pairs(pairs: &[(Joint, Joint, Point2)], likelihood: f64) -> LandmarkFrame {
    let mut builder = LandmarkFrame::builder(1000.0, 1000.0);
    for &(left, right, point) in pairs {
        builder = builder
            .point(left, point, likelihood)
            .point(right, point, likelihood);
    }
    builder.build().unwrap()
}

/// Push-up side view with the given mean elbow angle
///
/// Body runs horizontally shoulder (300,500) -> hip -> ankle (800,500); `hip_drop`
/// pushes the hip down and bends the body line.
pub fn push_up_frame_with(elbow_angle: f64, hip_drop: f64, likelihood: f64) -> LandmarkFrame {
    let elbow = Point2::new(300.0, 600.0);
    let radians = elbow_angle.to_radians();
    let wrist = Point2::new(
        100.0_f64.mul_add(radians.sin(), elbow.x),
        (-100.0_f64).mul_add(radians.cos(), elbow.y),
    );
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(300.0, 500.0)),
            (Joint::LeftElbow, Joint::RightElbow, elbow),
            (Joint::LeftWrist, Joint::RightWrist, wrist),
            (Joint::LeftHip, Joint::RightHip, Point2::new(550.0, 500.0 + hip_drop)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(800.0, 500.0)),
        ],
        likelihood,
    )
}

/// Push-up frame with a straight body
pub fn push_up_frame(elbow_angle: f64) -> LandmarkFrame {
    push_up_frame_with(elbow_angle, 0.0, GOOD)
}

/// Squat side view with the given mean knee angle
///
/// Ankle sits straight below the knee; the hip swings around the knee.
pub fn squat_frame(knee_angle: f64) -> LandmarkFrame {
    let knee = Point2::new(500.0, 600.0);
    let radians = knee_angle.to_radians();
    let hip = Point2::new(
        200.0_f64.mul_add(radians.sin(), knee.x),
        200.0_f64.mul_add(radians.cos(), knee.y),
    );
    pairs(
        &[
            (Joint::LeftHip, Joint::RightHip, hip),
            (Joint::LeftKnee, Joint::RightKnee, knee),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(500.0, 800.0)),
        ],
        GOOD,
    )
}

/// Plank side view; `hip_y` 500 is a straight body, larger values sag
pub fn plank_frame(hip_y: f64) -> LandmarkFrame {
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(200.0, 500.0)),
            (Joint::LeftElbow, Joint::RightElbow, Point2::new(200.0, 600.0)),
            (Joint::LeftHip, Joint::RightHip, Point2::new(500.0, hip_y)),
            (Joint::LeftKnee, Joint::RightKnee, Point2::new(650.0, 500.0)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(800.0, 500.0)),
        ],
        GOOD,
    )
}

/// Straight plank
pub fn plank_holding() -> LandmarkFrame {
    plank_frame(500.0)
}

/// Sagging plank, body line near 150 degrees
pub fn plank_sagging() -> LandmarkFrame {
    plank_frame(580.0)
}

/// Jumping-jack front view
///
/// Arms up puts the wrists well above the shoulders; feet apart gives an
/// ankle/hip width ratio of 3.0, together 1.0.
pub fn jumping_jack_frame(arms_up: bool, feet_apart: bool) -> LandmarkFrame {
    let wrist_y = if arms_up { 150.0 } else { 500.0 };
    let ankle_half = if feet_apart { 120.0 } else { 40.0 };
    LandmarkFrame::builder(1000.0, 1000.0)
        .point(Joint::LeftShoulder, Point2::new(450.0, 300.0), GOOD)
        .point(Joint::RightShoulder, Point2::new(550.0, 300.0), GOOD)
        .point(Joint::LeftWrist, Point2::new(380.0, wrist_y), GOOD)
        .point(Joint::RightWrist, Point2::new(620.0, wrist_y), GOOD)
        .point(Joint::LeftHip, Point2::new(460.0, 550.0), GOOD)
        .point(Joint::RightHip, Point2::new(540.0, 550.0), GOOD)
        .point(Joint::LeftAnkle, Point2::new(500.0 - ankle_half, 900.0), GOOD)
        .point(Joint::RightAnkle, Point2::new(500.0 + ankle_half, 900.0), GOOD)
        .build()
        .unwrap()
}

/// Burpee standing: vertical body, straight knees
pub fn burpee_standing() -> LandmarkFrame {
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(500.0, 200.0)),
            (Joint::LeftHip, Joint::RightHip, Point2::new(500.0, 500.0)),
            (Joint::LeftKnee, Joint::RightKnee, Point2::new(500.0, 700.0)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(500.0, 900.0)),
        ],
        GOOD,
    )
}

/// Burpee floor: horizontal torso, knees bent to about 113 degrees
pub fn burpee_floor() -> LandmarkFrame {
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(200.0, 500.0)),
            (Joint::LeftHip, Joint::RightHip, Point2::new(500.0, 500.0)),
            (Joint::LeftKnee, Joint::RightKnee, Point2::new(650.0, 400.0)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(800.0, 500.0)),
        ],
        GOOD,
    )
}

/// Burpee squat-thrust midpoint: knees bent but torso upright
pub fn burpee_crouch() -> LandmarkFrame {
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(500.0, 300.0)),
            (Joint::LeftHip, Joint::RightHip, Point2::new(500.0, 600.0)),
            (Joint::LeftKnee, Joint::RightKnee, Point2::new(650.0, 700.0)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(500.0, 850.0)),
        ],
        GOOD,
    )
}

fn glute_bridge(hip: Point2, knee: Point2) -> LandmarkFrame {
    pairs(
        &[
            (Joint::LeftShoulder, Joint::RightShoulder, Point2::new(200.0, 800.0)),
            (Joint::LeftHip, Joint::RightHip, hip),
            (Joint::LeftKnee, Joint::RightKnee, knee),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(700.0, 800.0)),
        ],
        GOOD,
    )
}

/// Glute bridge at rest: hips on the floor, hip extension near 119 degrees
pub fn glute_bridge_down() -> LandmarkFrame {
    glute_bridge(Point2::new(450.0, 800.0), Point2::new(550.0, 620.0))
}

/// Glute bridge at the top: straight shoulder-hip-knee line, hips lifted 0.3 torso
pub fn glute_bridge_up() -> LandmarkFrame {
    glute_bridge(Point2::new(450.0, 720.0), Point2::new(600.0, 672.0))
}

/// Glute bridge halfway: extension near 145 degrees, hips barely lifted
pub fn glute_bridge_mid() -> LandmarkFrame {
    glute_bridge(Point2::new(450.0, 760.0), Point2::new(557.7, 655.6))
}

/// Glute bridge near full extension with the hips under the shoulder-knee line
pub fn glute_bridge_sagging_top() -> LandmarkFrame {
    glute_bridge(Point2::new(450.0, 700.0), Point2::new(600.0, 600.0))
}

/// Session already moved through positioning and countdown
pub fn active_session(kind: ExerciseKind) -> WorkoutSession {
    active_session_with(kind, EngineConfig::default())
}

/// Active session with a custom configuration
pub fn active_session_with(kind: ExerciseKind, config: EngineConfig) -> WorkoutSession {
    init_test_logging();
    let mut session = WorkoutSession::new(kind, config).unwrap();
    session.request_start().unwrap();
    session.start_countdown().unwrap();
    session.activate().unwrap();
    session
}

/// Feeds frames at a fixed interval from a fixed base instant
pub struct Feeder {
    base: Instant,
    elapsed_ms: u64,
    step_ms: u64,
    last: Option<FrameReport>,
}

impl Feeder {
    /// Frames `step_ms` apart, the first at 0 ms
    pub fn new(step_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            elapsed_ms: 0,
            step_ms,
            last: None,
        }
    }

    /// Timestamp the next frame will get
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Let time pass without frames
    pub fn skip(&mut self, ms: u64) {
        self.elapsed_ms += ms;
    }

    /// Analyze `frame` `count` times and collect the events
    pub fn feed(
        &mut self,
        session: &mut WorkoutSession,
        frame: &LandmarkFrame,
        count: usize,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            let now = self.base + Duration::from_millis(self.elapsed_ms);
            let report = session.analyze_at(frame, now);
            events.extend(report.events.iter().copied());
            self.last = Some(report);
            self.elapsed_ms += self.step_ms;
        }
        events
    }

    /// Most recent report
    pub fn last(&self) -> &FrameReport {
        self.last.as_ref().unwrap()
    }
}

/// Rep totals announced in `events`
pub fn rep_totals(events: &[EngineEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::RepCounted { total } => Some(*total),
            _ => None,
        })
        .collect()
}
