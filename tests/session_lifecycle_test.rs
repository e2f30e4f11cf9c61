// ABOUTME: Integration tests for the workout session lifecycle driven through WorkoutSession
// ABOUTME: Activation gating, auto-pause and resume, targets, manual overrides, stop and reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{active_session, active_session_with, push_up_frame, rep_totals, Feeder};
use pierre_pose::{Joint, LandmarkFrame};
use pierre_rep_engine::config::EngineConfig;
use pierre_rep_engine::engine::{EngineEvent, WorkoutSession, VISIBILITY_PAUSE_FEEDBACK};
use pierre_rep_engine::phase::{ExerciseKind, Phase};
use pierre_rep_engine::session::{PauseReason, SessionError, SessionTarget, WorkoutSessionState};

const UP: f64 = 170.0;
const DOWN: f64 = 80.0;

fn one_push_up(session: &mut WorkoutSession, feeder: &mut Feeder) -> Vec<EngineEvent> {
    let mut events = feeder.feed(session, &push_up_frame(DOWN), 4);
    events.extend(feeder.feed(session, &push_up_frame(UP), 4));
    events
}

fn out_of_view() -> LandmarkFrame {
    push_up_frame(UP).without(&[Joint::LeftAnkle, Joint::RightAnkle])
}

fn state_changes(events: &[EngineEvent]) -> Vec<(WorkoutSessionState, WorkoutSessionState)> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_nothing_counts_before_activation() {
    common::init_test_logging();
    let mut session = WorkoutSession::with_defaults(ExerciseKind::PushUp);
    let mut feeder = Feeder::new(100);

    session.request_start().unwrap();
    feeder.feed(&mut session, &push_up_frame(UP), 4);
    assert!(one_push_up(&mut session, &mut feeder).is_empty());

    session.start_countdown().unwrap();
    assert!(one_push_up(&mut session, &mut feeder).is_empty());

    // Descending during the countdown, rising after activation: not a rep
    feeder.feed(&mut session, &push_up_frame(DOWN), 4);
    session.activate().unwrap();
    assert!(feeder.feed(&mut session, &push_up_frame(UP), 4).is_empty());

    assert_eq!(rep_totals(&one_push_up(&mut session, &mut feeder)), vec![1]);
}

#[test]
fn test_invalid_transitions_are_rejected() {
    common::init_test_logging();
    let mut session = WorkoutSession::with_defaults(ExerciseKind::Squat);

    assert_eq!(
        session.activate(),
        Err(SessionError::InvalidTransition {
            from: WorkoutSessionState::Idle,
            action: "activate",
        })
    );
    assert!(session.pause().is_err());
    assert!(session.resume().is_err());
    assert_eq!(session.state(), WorkoutSessionState::Idle);

    session.request_start().unwrap();
    assert!(session.request_start().is_err());
    assert_eq!(session.state(), WorkoutSessionState::Positioning);
}

#[test]
fn test_auto_pause_and_resume_on_visibility() {
    let mut session = active_session(ExerciseKind::PushUp);
    let mut feeder = Feeder::new(100);
    feeder.feed(&mut session, &push_up_frame(UP), 4);

    let events = feeder.feed(&mut session, &out_of_view(), 14);
    assert!(events.is_empty());
    assert_eq!(session.state(), WorkoutSessionState::Active);

    let events = feeder.feed(&mut session, &out_of_view(), 1);
    assert_eq!(
        state_changes(&events),
        vec![(WorkoutSessionState::Active, WorkoutSessionState::Paused)]
    );
    assert_eq!(session.pause_reason(), Some(PauseReason::VisibilityLost));
    assert_eq!(feeder.last().result.feedback, VISIBILITY_PAUSE_FEEDBACK);

    let events = feeder.feed(&mut session, &push_up_frame(UP), 1);
    assert_eq!(
        state_changes(&events),
        vec![(WorkoutSessionState::Paused, WorkoutSessionState::Active)]
    );
    assert_eq!(rep_totals(&one_push_up(&mut session, &mut feeder)), vec![1]);
}

#[test]
fn test_auto_pause_can_be_disabled() {
    let mut config = EngineConfig::default();
    config.session.auto_pause_on_visibility_loss = false;
    let mut session = active_session_with(ExerciseKind::PushUp, config);
    let mut feeder = Feeder::new(100);

    let events = feeder.feed(&mut session, &out_of_view(), 40);

    assert!(events.is_empty());
    assert_eq!(session.state(), WorkoutSessionState::Active);
}

#[test]
fn test_user_pause_is_not_auto_resumed() {
    let mut session = active_session(ExerciseKind::PushUp);
    let mut feeder = Feeder::new(100);
    feeder.feed(&mut session, &push_up_frame(UP), 4);

    session.pause().unwrap();
    let events = one_push_up(&mut session, &mut feeder);
    assert!(events.is_empty());
    assert_eq!(session.state(), WorkoutSessionState::Paused);
    assert_eq!(session.pause_reason(), Some(PauseReason::User));

    session.resume().unwrap();
    assert_eq!(rep_totals(&one_push_up(&mut session, &mut feeder)), vec![1]);
}

#[test]
fn test_cycle_spanning_a_pause_is_dropped() {
    let mut session = active_session(ExerciseKind::PushUp);
    let mut feeder = Feeder::new(100);
    feeder.feed(&mut session, &push_up_frame(UP), 4);
    feeder.feed(&mut session, &push_up_frame(DOWN), 4);

    session.pause().unwrap();
    session.resume().unwrap();
    let events = feeder.feed(&mut session, &push_up_frame(UP), 4);

    assert!(events.is_empty());
    assert_eq!(session.rep_count(), 0);
}

#[test]
fn test_rep_target_completes_the_session() {
    let mut session = active_session(ExerciseKind::PushUp).with_target(SessionTarget::Reps(2));
    let mut feeder = Feeder::new(100);
    feeder.feed(&mut session, &push_up_frame(UP), 4);

    assert_eq!(rep_totals(&one_push_up(&mut session, &mut feeder)), vec![1]);
    feeder.skip(1000);
    let events = one_push_up(&mut session, &mut feeder);
    assert_eq!(
        events,
        vec![
            EngineEvent::RepCounted { total: 2 },
            EngineEvent::StateChanged {
                from: WorkoutSessionState::Active,
                to: WorkoutSessionState::Completed,
            },
        ]
    );

    // Counters are frozen once complete
    feeder.skip(1000);
    assert!(one_push_up(&mut session, &mut feeder).is_empty());
    assert_eq!(session.add_manual_rep(), Err(SessionError::SessionCompleted));
    assert_eq!(session.rep_count(), 2);
}

#[test]
fn test_manual_overrides_count_toward_targets() {
    let mut session = active_session(ExerciseKind::Plank);
    session.set_target(Some(SessionTarget::HoldSeconds(2)));

    assert_eq!(
        session.add_manual_second().unwrap(),
        vec![EngineEvent::TimerUpdated { elapsed_seconds: 1 }]
    );
    let events = session.add_manual_second().unwrap();
    assert_eq!(events[0], EngineEvent::TimerUpdated { elapsed_seconds: 2 });
    assert_eq!(session.state(), WorkoutSessionState::Completed);
    assert_eq!(
        session.add_manual_second(),
        Err(SessionError::SessionCompleted)
    );
}

#[test]
fn test_manual_rep_while_paused() {
    let mut session = active_session(ExerciseKind::Squat);
    session.pause().unwrap();

    let events = session.add_manual_rep().unwrap();

    assert_eq!(events, vec![EngineEvent::RepCounted { total: 1 }]);
    assert_eq!(session.state(), WorkoutSessionState::Paused);
}

#[test]
fn test_stop_returns_summary_and_resets() {
    let mut session = active_session(ExerciseKind::PushUp);
    let mut feeder = Feeder::new(100);
    feeder.feed(&mut session, &push_up_frame(UP), 4);
    one_push_up(&mut session, &mut feeder);
    let first_id = session.session_id();

    let summary = session.stop();
    assert_eq!(summary.session_id, first_id);
    assert_eq!(summary.reps, 1);
    assert_eq!(summary.exercise, ExerciseKind::PushUp);
    assert_eq!(summary.state, WorkoutSessionState::Active);
    assert_eq!(summary.elapsed_seconds, None);

    assert_eq!(session.state(), WorkoutSessionState::Idle);
    assert_eq!(session.rep_count(), 0);
    assert_ne!(session.session_id(), first_id);
    assert_eq!(
        session.confirmed_phase(),
        Phase::initial(ExerciseKind::PushUp)
    );

    // A restarted session starts unclassified and counts from zero
    session.request_start().unwrap();
    session.start_countdown().unwrap();
    session.activate().unwrap();
    assert_eq!(
        session.confirmed_phase(),
        Phase::initial(ExerciseKind::PushUp)
    );
    feeder.feed(&mut session, &push_up_frame(UP), 4);
    assert_eq!(rep_totals(&one_push_up(&mut session, &mut feeder)), vec![1]);
    session.stop();

    // Stopping an idle session is harmless
    let again = session.stop();
    assert_eq!(again.reps, 0);
    assert_eq!(again.state, WorkoutSessionState::Idle);
    session.reset();
    session.reset();
    assert_eq!(session.state(), WorkoutSessionState::Idle);
}

#[test]
fn test_dispose_hands_back_the_summary() {
    let mut session = active_session(ExerciseKind::Plank);
    session.add_manual_second().unwrap();
    let id = session.session_id();

    let summary = session.dispose();

    assert_eq!(summary.session_id, id);
    assert_eq!(summary.elapsed_seconds, Some(1.0));
    assert!(summary.finished_at >= summary.started_at);
}
