// ABOUTME: Jumping-jack analyzer combining wrist lift and ankle spread from a front view
// ABOUTME: Counts on Apart -> Together with an event floor that tightens for fast sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::jumping_jack;
use pierre_pose::geometry::distance;
use pierre_pose::{Joint, LandmarkFrame};
use std::time::Duration;

use super::{Assessment, Cycle, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{ExerciseKind, JumpingJackPhase};

const REQUIRED_JOINTS: [Joint; 8] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Jumping-jack analyzer
///
/// Arm position is the wrist height above the shoulders divided by the
/// shoulder-to-ankle body height; leg position is ankle separation over hip
/// separation. Both must agree for a resting phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpingJackAnalyzer;

impl MovementAnalyzer for JumpingJackAnalyzer {
    type Phase = JumpingJackPhase;

    const KIND: ExerciseKind = ExerciseKind::JumpingJack;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, _phase: JumpingJackPhase) -> bool {
        false
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: JumpingJackPhase,
    ) -> Option<Assessment<JumpingJackPhase>> {
        let shoulder = frame.mid(Joint::LeftShoulder, Joint::RightShoulder)?;
        let wrist = frame.mid(Joint::LeftWrist, Joint::RightWrist)?;
        let ankle = frame.mid(Joint::LeftAnkle, Joint::RightAnkle)?;
        let hip_width = distance(frame.point(Joint::LeftHip)?, frame.point(Joint::RightHip)?);
        let ankle_width = distance(
            frame.point(Joint::LeftAnkle)?,
            frame.point(Joint::RightAnkle)?,
        );
        let body_height = distance(shoulder, ankle);
        if hip_width <= f64::EPSILON || body_height <= f64::EPSILON {
            return None;
        }

        let lift = (shoulder.y - wrist.y) / body_height;
        let spread = ankle_width / hip_width;

        let raw = if lift > jumping_jack::ARMS_UP_LIFT && spread > jumping_jack::LEGS_APART_RATIO
        {
            JumpingJackPhase::Apart
        } else if lift < jumping_jack::ARMS_DOWN_LIFT
            && spread < jumping_jack::LEGS_TOGETHER_RATIO
        {
            JumpingJackPhase::Together
        } else {
            // Mid-jump or mismatched arms and legs
            confirmed
        };
        Some(Assessment::clean(raw, spread))
    }

    fn on_transition(
        &mut self,
        transition: Transition<JumpingJackPhase>,
        _assessment: &Assessment<JumpingJackPhase>,
    ) -> Option<Cycle> {
        (transition.from == JumpingJackPhase::Apart && transition.to == JumpingJackPhase::Together)
            .then_some(Cycle::Rep)
    }

    fn event_floor(&self, base: Duration, last_interval: Option<Duration>) -> Duration {
        let fast = Duration::from_millis(jumping_jack::FAST_INTERVAL_MS);
        match last_interval {
            Some(interval) if interval < fast => {
                base.min(Duration::from_millis(jumping_jack::FAST_FLOOR_MS))
            }
            _ => base,
        }
    }

    fn feedback(
        &self,
        confirmed: JumpingJackPhase,
        _assessment: &Assessment<JumpingJackPhase>,
    ) -> String {
        match confirmed {
            JumpingJackPhase::Unknown => "Face the camera, arms by your sides, feet together",
            JumpingJackPhase::Together => "Jump out and raise your arms",
            JumpingJackPhase::Apart => "Jump back in",
        }
        .to_owned()
    }

    fn reset(&mut self) {}
}
