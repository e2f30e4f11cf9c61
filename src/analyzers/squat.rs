// ABOUTME: Squat analyzer driven by the mean knee angle with a depth requirement per rep
// ABOUTME: Tracks the deepest knee angle between one confirmed stand-up and the next
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::squat;
use pierre_pose::geometry::angle;
use pierre_pose::{Joint, LandmarkFrame};
use std::mem;

use super::{dead_zone, Assessment, Cycle, FormIssue, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{ExerciseKind, SquatPhase};

const REQUIRED_JOINTS: [Joint; 6] = [
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Squat analyzer
///
/// Depth is the lowest knee angle seen since the last confirmed stand-up, so
/// frames from the raw streak that confirms the bottom count towards it.
#[derive(Debug, Clone, Default)]
pub struct SquatAnalyzer {
    /// A bottom was confirmed since the last stand-up
    armed: bool,
    /// Deepest knee angle since the last confirmed stand-up
    deepest: Option<f64>,
}

impl SquatAnalyzer {
    fn record_depth(&mut self, knee: f64) -> f64 {
        let deepest = self.deepest.map_or(knee, |deepest| deepest.min(knee));
        self.deepest = Some(deepest);
        deepest
    }
}

impl MovementAnalyzer for SquatAnalyzer {
    type Phase = SquatPhase;

    const KIND: ExerciseKind = ExerciseKind::Squat;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, phase: SquatPhase) -> bool {
        matches!(phase, SquatPhase::GoingDown | SquatPhase::GoingUp)
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: SquatPhase,
    ) -> Option<Assessment<SquatPhase>> {
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

        let raw = if knee < squat::DOWN_KNEE_ANGLE {
            SquatPhase::Down
        } else if knee > squat::UP_KNEE_ANGLE {
            SquatPhase::Up
        } else {
            dead_zone(
                confirmed,
                &[SquatPhase::Up, SquatPhase::GoingDown],
                SquatPhase::GoingDown,
                &[SquatPhase::Down, SquatPhase::GoingUp],
                SquatPhase::GoingUp,
            )
            .unwrap_or(SquatPhase::Unknown)
        };
        Some(Assessment::clean(raw, knee))
    }

    fn observe(
        &mut self,
        _confirmed: SquatPhase,
        assessment: &Assessment<SquatPhase>,
    ) -> Option<Cycle> {
        self.record_depth(assessment.metric);
        None
    }

    fn on_transition(
        &mut self,
        transition: Transition<SquatPhase>,
        assessment: &Assessment<SquatPhase>,
    ) -> Option<Cycle> {
        match transition.to {
            SquatPhase::Down => {
                self.armed = true;
                self.record_depth(assessment.metric);
                None
            }
            SquatPhase::Up => {
                let deepest = self.record_depth(assessment.metric);
                self.deepest = None;
                if !mem::take(&mut self.armed) {
                    return None;
                }
                if deepest <= squat::MAX_DEPTH_KNEE_ANGLE {
                    Some(Cycle::Rep)
                } else {
                    Some(Cycle::Rejected(FormIssue::NotDeepEnough))
                }
            }
            _ => None,
        }
    }

    fn feedback(&self, confirmed: SquatPhase, assessment: &Assessment<SquatPhase>) -> String {
        match confirmed {
            SquatPhase::Unknown => "Stand side on to the camera with your whole body in view",
            SquatPhase::Up => "Squat down",
            SquatPhase::GoingDown => "Keep going down",
            SquatPhase::Down if assessment.metric > squat::MAX_DEPTH_KNEE_ANGLE => {
                FormIssue::NotDeepEnough.hint()
            }
            SquatPhase::Down => "Drive up through your heels",
            SquatPhase::GoingUp => "Stand all the way up",
        }
        .to_owned()
    }

    fn reset(&mut self) {
        self.armed = false;
        self.deepest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: SquatPhase, to: SquatPhase) -> Transition<SquatPhase> {
        Transition { from, to }
    }

    #[test]
    fn test_deep_cycle_counts() {
        let mut analyzer = SquatAnalyzer::default();
        analyzer.on_transition(
            transition(SquatPhase::GoingDown, SquatPhase::Down),
            &Assessment::clean(SquatPhase::Down, 95.0),
        );
        analyzer.observe(SquatPhase::Down, &Assessment::clean(SquatPhase::Down, 82.0));
        analyzer.observe(
            SquatPhase::GoingUp,
            &Assessment::clean(SquatPhase::GoingUp, 130.0),
        );
        let cycle = analyzer.on_transition(
            transition(SquatPhase::GoingUp, SquatPhase::Up),
            &Assessment::clean(SquatPhase::Up, 170.0),
        );
        assert_eq!(cycle, Some(Cycle::Rep));
    }

    #[test]
    fn test_shallow_cycle_rejected() {
        let mut analyzer = SquatAnalyzer::default();
        analyzer.on_transition(
            transition(SquatPhase::GoingDown, SquatPhase::Down),
            &Assessment::clean(SquatPhase::Down, 97.0),
        );
        let cycle = analyzer.on_transition(
            transition(SquatPhase::GoingUp, SquatPhase::Up),
            &Assessment::clean(SquatPhase::Up, 170.0),
        );
        assert_eq!(cycle, Some(Cycle::Rejected(FormIssue::NotDeepEnough)));
    }

    #[test]
    fn test_depth_before_bottom_confirmation_counts() {
        let mut analyzer = SquatAnalyzer::default();
        analyzer.observe(SquatPhase::Up, &Assessment::clean(SquatPhase::Down, 85.0));
        analyzer.on_transition(
            transition(SquatPhase::Up, SquatPhase::Down),
            &Assessment::clean(SquatPhase::Down, 95.0),
        );
        let cycle = analyzer.on_transition(
            transition(SquatPhase::GoingUp, SquatPhase::Up),
            &Assessment::clean(SquatPhase::Up, 170.0),
        );
        assert_eq!(cycle, Some(Cycle::Rep));
    }

    #[test]
    fn test_stand_up_clears_depth() {
        let mut analyzer = SquatAnalyzer::default();
        analyzer.observe(SquatPhase::Up, &Assessment::clean(SquatPhase::Down, 80.0));
        // Standing without a confirmed bottom is not a cycle and forgets the depth
        let stand = analyzer.on_transition(
            transition(SquatPhase::Unknown, SquatPhase::Up),
            &Assessment::clean(SquatPhase::Up, 170.0),
        );
        assert_eq!(stand, None);
        analyzer.on_transition(
            transition(SquatPhase::GoingDown, SquatPhase::Down),
            &Assessment::clean(SquatPhase::Down, 97.0),
        );
        let cycle = analyzer.on_transition(
            transition(SquatPhase::GoingUp, SquatPhase::Up),
            &Assessment::clean(SquatPhase::Up, 170.0),
        );
        assert_eq!(cycle, Some(Cycle::Rejected(FormIssue::NotDeepEnough)));
    }

    #[test]
    fn test_go_deeper_feedback() {
        let analyzer = SquatAnalyzer::default();
        let shallow = Assessment::clean(SquatPhase::Down, 96.0);
        let deep = Assessment::clean(SquatPhase::Down, 85.0);
        assert_eq!(analyzer.feedback(SquatPhase::Down, &shallow), "Go deeper");
        assert_ne!(analyzer.feedback(SquatPhase::Down, &deep), "Go deeper");
    }
}
