// ABOUTME: Plank analyzer validating five form criteria every frame to drive hold time
// ABOUTME: Holding when every criterion passes, Broken when any fails; no discrete reps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::plank;
use pierre_pose::geometry::{angle, distance, inclination_from_horizontal, offset_below_line};
use pierre_pose::{Joint, LandmarkFrame};

use super::{Assessment, Cycle, FormIssue, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{ExerciseKind, PlankPhase};

const REQUIRED_JOINTS: [Joint; 10] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Plank analyzer
///
/// All criteria are evaluated with a single strict AND; vertical offsets are
/// normalized by the shoulder-to-ankle body length so camera distance does not
/// matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlankAnalyzer;

impl PlankAnalyzer {
    fn first_issue(frame: &LandmarkFrame) -> Option<(f64, Option<FormIssue>)> {
        let shoulder = frame.mid(Joint::LeftShoulder, Joint::RightShoulder)?;
        let elbow = frame.mid(Joint::LeftElbow, Joint::RightElbow)?;
        let hip = frame.mid(Joint::LeftHip, Joint::RightHip)?;
        let knee = frame.mid(Joint::LeftKnee, Joint::RightKnee)?;
        let ankle = frame.mid(Joint::LeftAnkle, Joint::RightAnkle)?;

        let body_length = distance(shoulder, ankle);
        if body_length <= f64::EPSILON {
            return None;
        }
        let body_line = angle(shoulder, hip, ankle);

        let issue = if inclination_from_horizontal(shoulder, hip) > plank::MAX_TORSO_INCLINATION {
            Some(FormIssue::TorsoNotHorizontal)
        } else if body_line < plank::MIN_BODY_LINE_ANGLE {
            if offset_below_line(shoulder, ankle, hip) > 0.0 {
                Some(FormIssue::HipsSagging)
            } else {
                Some(FormIssue::HipsPiked)
            }
        } else if shoulder.y - elbow.y > plank::ELBOW_ABOVE_SHOULDER_TOLERANCE * body_length {
            Some(FormIssue::ArmsNotSupporting)
        } else if (hip.y - shoulder.y).abs() > plank::MAX_HIP_SHOULDER_OFFSET * body_length {
            Some(FormIssue::HipsNotLevel)
        } else if (knee.y - hip.y).abs() > plank::MAX_KNEE_HIP_OFFSET * body_length {
            Some(FormIssue::KneesNotLevel)
        } else {
            None
        };
        Some((body_line, issue))
    }
}

impl MovementAnalyzer for PlankAnalyzer {
    type Phase = PlankPhase;

    const KIND: ExerciseKind = ExerciseKind::Plank;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, _phase: PlankPhase) -> bool {
        false
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        _confirmed: PlankPhase,
    ) -> Option<Assessment<PlankPhase>> {
        let (body_line, form) = Self::first_issue(frame)?;
        let raw = if form.is_none() {
            PlankPhase::Holding
        } else {
            PlankPhase::Broken
        };
        Some(Assessment {
            raw,
            metric: body_line,
            form,
        })
    }

    fn on_transition(
        &mut self,
        _transition: Transition<PlankPhase>,
        _assessment: &Assessment<PlankPhase>,
    ) -> Option<Cycle> {
        None
    }

    fn feedback(&self, confirmed: PlankPhase, assessment: &Assessment<PlankPhase>) -> String {
        if let Some(issue) = assessment.form {
            return issue.hint().to_owned();
        }
        match confirmed {
            PlankPhase::Unknown | PlankPhase::Broken => "Hold that position",
            PlankPhase::Holding => "Great form, keep holding",
        }
        .to_owned()
    }

    fn is_holding(&self, phase: PlankPhase) -> bool {
        phase == PlankPhase::Holding
    }

    fn reset(&mut self) {}
}
