// ABOUTME: Integration tests for JSON-lines recording parsing and offline replay
// ABOUTME: Record validation with line numbers, control records, sampling and replay summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::push_up_frame;
use pierre_rep_engine::engine::{EngineEvent, WorkoutSession};
use pierre_rep_engine::phase::ExerciseKind;
use pierre_rep_engine::replay::{
    self, needs_auto_start, read_records, ReplayControl, ReplayError, ReplayOptions, ReplayRecord,
    TimedEvent,
};
use pierre_rep_engine::session::WorkoutSessionState;
use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use tempfile::NamedTempFile;

const UNSAMPLED: ReplayOptions = ReplayOptions {
    honor_sampling: false,
    auto_start: true,
};

/// One push-up at 100 ms per frame starting at `start_ms`
fn push_up_records(start_ms: u64) -> Vec<ReplayRecord> {
    let mut records = Vec::new();
    let mut timestamp_ms = start_ms;
    for angle in [170.0, 80.0, 170.0] {
        let frame = push_up_frame(angle);
        for _ in 0..4 {
            records.push(ReplayRecord::frame(timestamp_ms, frame.clone()));
            timestamp_ms += 100;
        }
    }
    records
}

fn write_recording(records: &[ReplayRecord]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# push-up recording").unwrap();
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record).unwrap()).unwrap();
        writeln!(file).unwrap();
    }
    file.flush().unwrap();
    file
}

fn parse(text: &str) -> Result<Vec<ReplayRecord>, ReplayError> {
    read_records(Cursor::new(text))
}

#[test]
fn test_recording_file_replays_one_rep() {
    common::init_test_logging();
    let file = write_recording(&push_up_records(0));

    let records = read_records(BufReader::new(File::open(file.path()).unwrap())).unwrap();
    assert_eq!(records.len(), 12);

    let mut session = WorkoutSession::with_defaults(ExerciseKind::PushUp);
    let outcome = replay::run(&mut session, &records, UNSAMPLED).unwrap();

    assert_eq!(outcome.frames_total, 12);
    assert_eq!(outcome.frames_analyzed, 12);
    assert_eq!(
        outcome.events,
        vec![TimedEvent {
            timestamp_ms: 1000,
            event: EngineEvent::RepCounted { total: 1 },
        }]
    );
    assert_eq!(outcome.summary.reps, 1);
    assert_eq!(outcome.summary.state, WorkoutSessionState::Active);
    assert!(outcome.last_result.unwrap().pose_detected);
}

#[test]
fn test_sampling_is_honored_by_default() {
    common::init_test_logging();
    let mut session = WorkoutSession::with_defaults(ExerciseKind::PushUp);

    let outcome =
        replay::run(&mut session, &push_up_records(0), ReplayOptions::default()).unwrap();

    assert_eq!(outcome.frames_total, 12);
    assert_eq!(outcome.frames_analyzed, 6);
}

#[test]
fn test_control_records_drive_the_session() {
    common::init_test_logging();
    let mut records = vec![ReplayRecord::control(0, ReplayControl::Start)];
    records.extend(push_up_records(100));
    records.push(ReplayRecord::control(1300, ReplayControl::ManualRep));
    records.push(ReplayRecord::control(1400, ReplayControl::Stop));
    records.extend(push_up_records(2000));
    assert!(!needs_auto_start(&records, ReplayOptions::default()));

    let mut session = WorkoutSession::with_defaults(ExerciseKind::PushUp);
    let outcome = replay::run(&mut session, &records, UNSAMPLED).unwrap();

    let totals: Vec<(u64, EngineEvent)> = outcome
        .events
        .iter()
        .map(|timed| (timed.timestamp_ms, timed.event))
        .collect();
    assert_eq!(
        totals,
        vec![
            (1100, EngineEvent::RepCounted { total: 1 }),
            (1300, EngineEvent::RepCounted { total: 2 }),
        ]
    );
    // Summary is the one taken at stop; frames after it hit an idle session
    assert_eq!(outcome.summary.reps, 2);
    assert_eq!(outcome.summary.state, WorkoutSessionState::Active);
    assert_eq!(session.state(), WorkoutSessionState::Idle);
    assert_eq!(session.rep_count(), 0);
}

#[test]
fn test_pause_and_resume_controls_emit_state_changes() {
    common::init_test_logging();
    let records = vec![
        ReplayRecord::control(0, ReplayControl::Pause),
        ReplayRecord::control(500, ReplayControl::Resume),
    ];
    let mut session = WorkoutSession::with_defaults(ExerciseKind::Squat);

    let outcome = replay::run(&mut session, &records, UNSAMPLED).unwrap();

    assert_eq!(
        outcome.events[0].event,
        EngineEvent::StateChanged {
            from: WorkoutSessionState::Active,
            to: WorkoutSessionState::Paused,
        }
    );
    assert_eq!(outcome.events[1].timestamp_ms, 500);
    assert_eq!(outcome.frames_total, 0);
    assert!(outcome.last_result.is_none());
}

#[test]
fn test_invalid_control_is_reported() {
    common::init_test_logging();
    let records = vec![ReplayRecord::control(250, ReplayControl::Resume)];
    let mut session = WorkoutSession::with_defaults(ExerciseKind::Plank);

    let error = replay::run(
        &mut session,
        &records,
        ReplayOptions {
            honor_sampling: true,
            auto_start: false,
        },
    )
    .unwrap_err();

    assert!(matches!(
        error,
        ReplayError::Control {
            control: ReplayControl::Resume,
            timestamp_ms: 250,
            ..
        }
    ));
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let records = parse("# header\n\n   \n{\"timestamp_ms\":5,\"control\":\"start\"}\n").unwrap();

    assert_eq!(records, vec![ReplayRecord::control(5, ReplayControl::Start)]);
}

#[test]
fn test_malformed_line_reports_its_number() {
    let text = "{\"timestamp_ms\":0,\"control\":\"start\"}\n# note\n{not json}\n";

    match parse(text) {
        Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_record_needs_exactly_one_payload() {
    assert!(matches!(
        parse("{\"timestamp_ms\":0}"),
        Err(ReplayError::AmbiguousRecord { line: 1 })
    ));

    let frame = serde_json::to_string(&push_up_frame(170.0)).unwrap();
    let both = format!("{{\"timestamp_ms\":0,\"control\":\"pause\",\"frame\":{frame}}}");
    assert!(matches!(
        parse(&both),
        Err(ReplayError::AmbiguousRecord { line: 1 })
    ));
}

#[test]
fn test_frames_are_validated() {
    let text = concat!(
        "{\"timestamp_ms\":0,\"frame\":{\"width\":100,\"height\":100,",
        "\"landmarks\":{\"left_hip\":{\"x\":1,\"y\":2,\"likelihood\":1.5}}}}"
    );

    assert!(matches!(
        parse(text),
        Err(ReplayError::InvalidFrame { line: 1, .. })
    ));
}

#[test]
fn test_timestamps_must_not_go_backwards() {
    let text = concat!(
        "{\"timestamp_ms\":100,\"control\":\"start\"}\n",
        "{\"timestamp_ms\":40,\"control\":\"pause\"}\n"
    );

    match parse(text) {
        Err(ReplayError::NonMonotonic {
            line,
            previous,
            current,
        }) => {
            assert_eq!((line, previous, current), (2, 100, 40));
        }
        other => panic!("expected ordering error, got {other:?}"),
    }
}
