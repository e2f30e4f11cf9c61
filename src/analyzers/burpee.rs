// ABOUTME: Burpee analyzer using mean knee angle plus torso orientation as a coarse posture proxy
// ABOUTME: Counts when a confirmed floor position returns to a confirmed standing position
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::burpee;
use pierre_pose::geometry::{angle, inclination_from_horizontal};
use pierre_pose::{Joint, LandmarkFrame};

use super::{dead_zone, Assessment, Cycle, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{BurpeePhase, ExerciseKind};

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

/// Burpee analyzer
///
/// Floor requires folded knees with a near-horizontal torso; standing requires
/// extended knees with an upright torso. Both conditions are strict ANDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurpeeAnalyzer;

impl MovementAnalyzer for BurpeeAnalyzer {
    type Phase = BurpeePhase;

    const KIND: ExerciseKind = ExerciseKind::Burpee;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, phase: BurpeePhase) -> bool {
        matches!(phase, BurpeePhase::Descending | BurpeePhase::Rising)
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: BurpeePhase,
    ) -> Option<Assessment<BurpeePhase>> {
        let left = angle(
            frame.point(Joint::LeftHip)?,
            frame.point(Joint::LeftKnee)?,
            frame.point(Joint::LeftAnkle)?,
        );
        let right = angle(
            frame.point(Joint::RightHip)?,
            frame.point(Joint::RightKnee)?,
            frame.point(Joint::RightAnkle)?,
        );
        let knee = (left + right) / 2.0;
        let torso = inclination_from_horizontal(
            frame.mid(Joint::LeftShoulder, Joint::RightShoulder)?,
            frame.mid(Joint::LeftHip, Joint::RightHip)?,
        );

        let raw = if knee < burpee::FLOOR_KNEE_ANGLE && torso <= burpee::FLOOR_MAX_TORSO_INCLINATION
        {
            BurpeePhase::Floor
        } else if knee > burpee::STANDING_KNEE_ANGLE
            && torso >= burpee::STANDING_MIN_TORSO_INCLINATION
        {
            BurpeePhase::Standing
        } else {
            dead_zone(
                confirmed,
                &[BurpeePhase::Standing, BurpeePhase::Descending],
                BurpeePhase::Descending,
                &[BurpeePhase::Floor, BurpeePhase::Rising],
                BurpeePhase::Rising,
            )
            .unwrap_or(BurpeePhase::Unknown)
        };
        Some(Assessment::clean(raw, knee))
    }

    fn on_transition(
        &mut self,
        transition: Transition<BurpeePhase>,
        _assessment: &Assessment<BurpeePhase>,
    ) -> Option<Cycle> {
        let from_floor = matches!(transition.from, BurpeePhase::Floor | BurpeePhase::Rising);
        (from_floor && transition.to == BurpeePhase::Standing).then_some(Cycle::Rep)
    }

    fn feedback(&self, confirmed: BurpeePhase, _assessment: &Assessment<BurpeePhase>) -> String {
        match confirmed {
            BurpeePhase::Unknown => "Stand side on to the camera with your whole body in view",
            BurpeePhase::Standing => "Drop down to the floor",
            BurpeePhase::Descending => "Hands down, kick back",
            BurpeePhase::Floor => "Jump your feet in and stand up",
            BurpeePhase::Rising => "Stand all the way up",
        }
        .to_owned()
    }

    fn reset(&mut self) {}
}
