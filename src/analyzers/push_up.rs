// ABOUTME: Push-up analyzer driven by the mean elbow angle with a body-line form check
// ABOUTME: A rep is a confirmed bottom followed by a confirmed lockout with straight body throughout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_pose::constants::push_up;
use pierre_pose::geometry::{angle, inclination_from_horizontal};
use pierre_pose::{Joint, LandmarkFrame};

use super::{dead_zone, Assessment, Cycle, FormIssue, MovementAnalyzer};
use crate::debounce::Transition;
use crate::phase::{ExerciseKind, PushUpPhase};

const REQUIRED_JOINTS: [Joint; 10] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Push-up analyzer
///
/// Side view. The cycle arms when the bottom is confirmed and collects the first
/// form violation seen from then until lockout.
#[derive(Debug, Clone, Default)]
pub struct PushUpAnalyzer {
    armed: bool,
    issue: Option<FormIssue>,
}

impl PushUpAnalyzer {
    fn form(frame: &LandmarkFrame) -> Option<Option<FormIssue>> {
        let shoulder = frame.mid(Joint::LeftShoulder, Joint::RightShoulder)?;
        let hip = frame.mid(Joint::LeftHip, Joint::RightHip)?;
        let ankle = frame.mid(Joint::LeftAnkle, Joint::RightAnkle)?;

        let issue = if angle(shoulder, hip, ankle) < push_up::MIN_BODY_LINE_ANGLE {
            Some(FormIssue::BodyLineBroken)
        } else if inclination_from_horizontal(shoulder, hip) > push_up::MAX_TORSO_INCLINATION {
            Some(FormIssue::TorsoNotHorizontal)
        } else {
            None
        };
        Some(issue)
    }

    fn elbow_angle(frame: &LandmarkFrame) -> Option<f64> {
        let left = angle(
            frame.point(Joint::LeftShoulder)?,
            frame.point(Joint::LeftElbow)?,
            frame.point(Joint::LeftWrist)?,
        );
        let right = angle(
            frame.point(Joint::RightShoulder)?,
            frame.point(Joint::RightElbow)?,
            frame.point(Joint::RightWrist)?,
        );
        Some((left + right) / 2.0)
    }
}

impl MovementAnalyzer for PushUpAnalyzer {
    type Phase = PushUpPhase;

    const KIND: ExerciseKind = ExerciseKind::PushUp;

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED_JOINTS
    }

    fn is_transit(&self, phase: PushUpPhase) -> bool {
        matches!(phase, PushUpPhase::GoingDown | PushUpPhase::GoingUp)
    }

    fn classify(
        &self,
        frame: &LandmarkFrame,
        confirmed: PushUpPhase,
    ) -> Option<Assessment<PushUpPhase>> {
        let elbow = Self::elbow_angle(frame)?;
        let form = Self::form(frame)?;

        let raw = if elbow < push_up::DOWN_ELBOW_ANGLE {
            PushUpPhase::Down
        } else if elbow > push_up::UP_ELBOW_ANGLE {
            PushUpPhase::Up
        } else {
            dead_zone(
                confirmed,
                &[PushUpPhase::Up, PushUpPhase::GoingDown],
                PushUpPhase::GoingDown,
                &[PushUpPhase::Down, PushUpPhase::GoingUp],
                PushUpPhase::GoingUp,
            )
            .unwrap_or(PushUpPhase::Unknown)
        };

        Some(Assessment {
            raw,
            metric: elbow,
            form,
        })
    }

    fn observe(
        &mut self,
        _confirmed: PushUpPhase,
        assessment: &Assessment<PushUpPhase>,
    ) -> Option<Cycle> {
        if self.armed && self.issue.is_none() {
            self.issue = assessment.form;
        }
        None
    }

    fn on_transition(
        &mut self,
        transition: Transition<PushUpPhase>,
        assessment: &Assessment<PushUpPhase>,
    ) -> Option<Cycle> {
        match transition.to {
            PushUpPhase::Down => {
                self.armed = true;
                self.issue = assessment.form;
                None
            }
            PushUpPhase::Up if self.armed => {
                self.armed = false;
                let issue = self.issue.take().or(assessment.form);
                Some(issue.map_or(Cycle::Rep, Cycle::Rejected))
            }
            _ => None,
        }
    }

    fn feedback(&self, confirmed: PushUpPhase, assessment: &Assessment<PushUpPhase>) -> String {
        if let Some(issue) = assessment.form {
            if confirmed != PushUpPhase::Unknown {
                return issue.hint().to_owned();
            }
        }
        match confirmed {
            PushUpPhase::Unknown => "Get into a push-up position, side on to the camera",
            PushUpPhase::Up => "Lower your chest towards the floor",
            PushUpPhase::GoingDown => "Keep going down",
            PushUpPhase::Down => "Push back up",
            PushUpPhase::GoingUp => "Lock out your arms",
        }
        .to_owned()
    }

    fn reset(&mut self) {
        self.armed = false;
        self.issue = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pierre_pose::Point2;

    /// Horizontal straight body with both elbows bent to `elbow_angle` degrees
    fn frame_with_elbow_angle(elbow_angle: f64) -> LandmarkFrame {
        let shoulder = Point2::new(300.0, 400.0);
        let elbow = Point2::new(300.0, 500.0);
        let theta = elbow_angle.to_radians();
        let wrist = Point2::new(
            100.0f64.mul_add(theta.sin(), 300.0),
            100.0f64.mul_add(-theta.cos(), 500.0),
        );
        let mut builder = LandmarkFrame::builder(1000.0, 1000.0);
        for (left, right, point) in [
            (Joint::LeftShoulder, Joint::RightShoulder, shoulder),
            (Joint::LeftElbow, Joint::RightElbow, elbow),
            (Joint::LeftWrist, Joint::RightWrist, wrist),
            (Joint::LeftHip, Joint::RightHip, Point2::new(550.0, 400.0)),
            (Joint::LeftAnkle, Joint::RightAnkle, Point2::new(800.0, 400.0)),
        ] {
            builder = builder.point(left, point, 0.9).point(right, point, 0.9);
        }
        builder.build().unwrap_or_else(|err| unreachable!("{err}"))
    }

    fn raw(confirmed: PushUpPhase, elbow_angle: f64) -> Option<PushUpPhase> {
        PushUpAnalyzer::default()
            .classify(&frame_with_elbow_angle(elbow_angle), confirmed)
            .map(|assessment| assessment.raw)
    }

    #[test]
    fn test_dead_zone_inherits_direction() {
        assert_eq!(raw(PushUpPhase::Up, 120.0), Some(PushUpPhase::GoingDown));
        assert_eq!(raw(PushUpPhase::GoingDown, 120.0), Some(PushUpPhase::GoingDown));
        assert_eq!(raw(PushUpPhase::Down, 120.0), Some(PushUpPhase::GoingUp));
        assert_eq!(raw(PushUpPhase::Unknown, 120.0), Some(PushUpPhase::Unknown));
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(raw(PushUpPhase::Unknown, 170.0), Some(PushUpPhase::Up));
        assert_eq!(raw(PushUpPhase::Up, 80.0), Some(PushUpPhase::Down));
        let assessment = PushUpAnalyzer::default()
            .classify(&frame_with_elbow_angle(170.0), PushUpPhase::Up)
            .unwrap_or_else(|| unreachable!());
        assert!(assessment.form_ok());
        assert!((assessment.metric - 170.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejected_cycle_when_form_breaks() {
        let mut analyzer = PushUpAnalyzer::default();
        let down = Assessment::clean(PushUpPhase::Down, 80.0);
        let sagging = Assessment {
            raw: PushUpPhase::GoingUp,
            metric: 120.0,
            form: Some(FormIssue::BodyLineBroken),
        };
        let up = Assessment::clean(PushUpPhase::Up, 170.0);

        analyzer.on_transition(
            Transition {
                from: PushUpPhase::Up,
                to: PushUpPhase::Down,
            },
            &down,
        );
        analyzer.observe(PushUpPhase::GoingUp, &sagging);
        let cycle = analyzer.on_transition(
            Transition {
                from: PushUpPhase::GoingUp,
                to: PushUpPhase::Up,
            },
            &up,
        );
        assert_eq!(cycle, Some(Cycle::Rejected(FormIssue::BodyLineBroken)));
    }

    #[test]
    fn test_lockout_without_bottom_is_not_a_rep() {
        let mut analyzer = PushUpAnalyzer::default();
        let up = Assessment::clean(PushUpPhase::Up, 170.0);
        let cycle = analyzer.on_transition(
            Transition {
                from: PushUpPhase::GoingDown,
                to: PushUpPhase::Up,
            },
            &up,
        );
        assert_eq!(cycle, None);
    }
}
