// ABOUTME: Glute-bridge analyzer scoring hip extension with planted-feet, supine and levelness checks
// ABOUTME: Rep sub-state machine: armed by a confirmed Down, spent by the first valid confirmed Up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::glute_bridge;
use pierre_pose::geometry::{
    angle, distance, hip_extension_angle, inclination_from_horizontal, offset_below_line,
};
use pierre_pose::{Joint, LandmarkFrame, Point2};

use super::{dead_zone, Assessment, Cycle, FormIssue, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{ExerciseKind, GluteBridgePhase};

const REQUIRED_JOINTS: [Joint; 8] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Glute-bridge analyzer
///
/// Supine side view. The hip-extension angle alone would double count when the
/// hips wobble at the top, so counting runs its own cycle state: a confirmed
/// Down arms it, the first confirmed Up frame with valid form spends it, and
/// only the next confirmed Down re-arms it.
#[derive(Debug, Clone, Default)]
pub struct GluteBridgeAnalyzer {
    armed: bool,
}

struct Posture {
    extension: f64,
    lift: f64,
    /// Hip drop below the shoulder-knee line, fraction of torso length
    drop: f64,
    form: Option<FormIssue>,
}

impl GluteBridgeAnalyzer {
    fn side(frame: &LandmarkFrame, side: [Joint; 4]) -> Option<[Point2; 4]> {
        Some([
            frame.point(side[0])?,
            frame.point(side[1])?,
            frame.point(side[2])?,
            frame.point(side[3])?,
        ])
    }

    fn posture(frame: &LandmarkFrame) -> Option<Posture> {
        let [l_shoulder, l_hip, l_knee, l_ankle] = Self::side(
            frame,
            [
                Joint::LeftShoulder,
                Joint::LeftHip,
                Joint::LeftKnee,
                Joint::LeftAnkle,
            ],
        )?;
        let [r_shoulder, r_hip, r_knee, r_ankle] = Self::side(
            frame,
            [
                Joint::RightShoulder,
                Joint::RightHip,
                Joint::RightKnee,
                Joint::RightAnkle,
            ],
        )?;

        let shoulder = frame.mid(Joint::LeftShoulder, Joint::RightShoulder)?;
        let hip = frame.mid(Joint::LeftHip, Joint::RightHip)?;
        let knee_mid = frame.mid(Joint::LeftKnee, Joint::RightKnee)?;
        let torso = distance(shoulder, hip);
        if torso <= f64::EPSILON {
            return None;
        }

        let extension = (hip_extension_angle(l_shoulder, l_hip, l_knee)
            + hip_extension_angle(r_shoulder, r_hip, r_knee))
            / 2.0;
        let knee = (angle(l_hip, l_knee, l_ankle) + angle(r_hip, r_knee, r_ankle)) / 2.0;
        // Image y grows downward, so a lifted pelvis has a smaller y than the shoulders
        let lift = (shoulder.y - hip.y) / torso;
        let drop = offset_below_line(shoulder, knee_mid, hip) / torso;
        let incline = inclination_from_horizontal(shoulder, hip);

        let form = if !(glute_bridge::MIN_KNEE_ANGLE..=glute_bridge::MAX_KNEE_ANGLE).contains(&knee)
        {
            Some(FormIssue::KneeAngleOutOfRange)
        } else if incline > glute_bridge::MAX_SUPINE_INCLINATION {
            Some(FormIssue::TorsoNotSupine)
        } else if (l_hip.y - r_hip.y).abs() / torso > glute_bridge::MAX_LEVEL_OFFSET {
            Some(FormIssue::HipsNotLevel)
        } else if (l_shoulder.y - r_shoulder.y).abs() / torso > glute_bridge::MAX_LEVEL_OFFSET {
            Some(FormIssue::ShouldersNotLevel)
        } else if distance(l_ankle, r_ankle) / torso > glute_bridge::MAX_STANCE_WIDTH {
            Some(FormIssue::StanceTooWide)
        } else {
            None
        };

        Some(Posture {
            extension,
            lift,
            drop,
            form,
        })
    }
}

impl MovementAnalyzer for GluteBridgeAnalyzer {
    type Phase = GluteBridgePhase;

    const KIND: ExerciseKind = ExerciseKind::GluteBridge;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, phase: GluteBridgePhase) -> bool {
        matches!(phase, GluteBridgePhase::Rising | GluteBridgePhase::Lowering)
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: GluteBridgePhase,
    ) -> Option<Assessment<GluteBridgePhase>> {
        let Posture {
            extension,
            lift,
            drop,
            mut form,
        } = Self::posture(frame)?;

        let extended = extension > glute_bridge::UP_HIP_EXTENSION;
        let lifted = lift >= glute_bridge::MIN_HIP_LIFT;
        let in_line = drop <= glute_bridge::MAX_HIP_DROP_BELOW_KNEE_LINE;
        if extended && form.is_none() {
            if !lifted {
                form = Some(FormIssue::HipsNotLifted);
            } else if !in_line {
                form = Some(FormIssue::HipsSagging);
            }
        }

        let raw = if extension < glute_bridge::DOWN_HIP_EXTENSION {
            GluteBridgePhase::Down
        } else if extended && lifted && in_line {
            GluteBridgePhase::Up
        } else {
            dead_zone(
                confirmed,
                &[GluteBridgePhase::Down, GluteBridgePhase::Rising],
                GluteBridgePhase::Rising,
                &[GluteBridgePhase::Up, GluteBridgePhase::Lowering],
                GluteBridgePhase::Lowering,
            )
            .unwrap_or(GluteBridgePhase::Unknown)
        };

        Some(Assessment {
            raw,
            metric: extension,
            form,
        })
    }

    fn observe(
        &mut self,
        confirmed: GluteBridgePhase,
        assessment: &Assessment<GluteBridgePhase>,
    ) -> Option<Cycle> {
        if self.armed && confirmed == GluteBridgePhase::Up && assessment.form_ok() {
            self.armed = false;
            return Some(Cycle::Rep);
        }
        None
    }

    fn on_transition(
        &mut self,
        transition: Transition<GluteBridgePhase>,
        _assessment: &Assessment<GluteBridgePhase>,
    ) -> Option<Cycle> {
        if transition.to == GluteBridgePhase::Down {
            self.armed = true;
        }
        None
    }

    fn feedback(
        &self,
        confirmed: GluteBridgePhase,
        assessment: &Assessment<GluteBridgePhase>,
    ) -> String {
        if let Some(issue) = assessment.form {
            return issue.hint().to_owned();
        }
        match confirmed {
            GluteBridgePhase::Unknown => "Lie on your back, knees bent, feet flat on the floor",
            GluteBridgePhase::Down => "Squeeze your glutes and lift your hips",
            GluteBridgePhase::Rising => "Keep driving your hips up",
            GluteBridgePhase::Up => "Hold at the top, then lower slowly",
            GluteBridgePhase::Lowering => "Lower all the way down",
        }
        .to_owned()
    }

    fn reset(&mut self) {
        self.armed = false;
    }
}
