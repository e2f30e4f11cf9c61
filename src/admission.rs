// ABOUTME: Frame admission: per-exercise sampling and drop-when-busy hand-off from capture threads
// ABOUTME: A frame arriving while the previous one is still being analyzed is dropped, never queued
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Frame admission
//!
//! Capture runs faster than analysis is worth. Two things keep the engine from
//! falling behind:
//!
//! - [`FrameSampler`] admits only every Nth frame for the exercise
//! - [`SharedSession`] drops a frame outright when another frame holds the session
//!
//! Frames are processed strictly in arrival order; a dropped frame is gone.

use pierre_pose::LandmarkFrame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Instant;
use tracing::{trace, warn};

use crate::engine::{FrameReport, WorkoutSession};

/// Admits the first frame and then every Nth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    every: u32,
    seen: u64,
}

impl FrameSampler {
    /// Sample every `every` frames; 0 behaves as 1
    #[must_use]
    pub const fn new(every: u32) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
            seen: 0,
        }
    }

    /// Sampling interval
    #[must_use]
    pub const fn every(&self) -> u32 {
        self.every
    }

    /// Record an arriving frame; true when it should be analyzed
    pub fn admit(&mut self) -> bool {
        let admitted = self.seen % u64::from(self.every) == 0;
        self.seen = self.seen.wrapping_add(1);
        admitted
    }

    /// Start counting from the next frame
    pub fn reset(&mut self) {
        self.seen = 0;
    }
}

/// What happened to a submitted frame
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Analyzed
    Processed(FrameReport),
    /// Skipped by the exercise's sampling rate
    SampledOut,
    /// Another frame was being analyzed
    Dropped,
}

impl Submission {
    /// Report, when the frame was analyzed
    #[must_use]
    pub fn into_report(self) -> Option<FrameReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::SampledOut | Self::Dropped => None,
        }
    }
}

/// Session handle shared between a capture thread and the controlling side
///
/// Frame submission never blocks; lifecycle calls go through [`SharedSession::with`],
/// which waits for the in-flight frame.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<WorkoutSession>>,
    dropped: Arc<AtomicU64>,
}

impl SharedSession {
    /// Share a session
    #[must_use]
    pub fn new(session: WorkoutSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    fn recover(
        poisoned: PoisonError<MutexGuard<'_, WorkoutSession>>,
    ) -> MutexGuard<'_, WorkoutSession> {
        warn!("Workout session lock poisoned, recovering");
        poisoned.into_inner()
    }

    /// Submit a frame captured now
    #[must_use]
    pub fn try_submit(&self, frame: &LandmarkFrame) -> Submission {
        self.try_submit_at(frame, Instant::now())
    }

    /// Submit a frame captured at `now`, dropping it if the session is busy
    #[must_use]
    pub fn try_submit_at(&self, frame: &LandmarkFrame, now: Instant) -> Submission {
        let mut session = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => Self::recover(poisoned),
            Err(TryLockError::WouldBlock) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(dropped, "Frame dropped, analysis in progress");
                return Submission::Dropped;
            }
        };
        session
            .submit_frame_at(frame, now)
            .map_or(Submission::SampledOut, Submission::Processed)
    }

    /// Run `f` with exclusive access, waiting for any in-flight frame
    pub fn with<R>(&self, f: impl FnOnce(&mut WorkoutSession) -> R) -> R {
        let mut session = self.inner.lock().unwrap_or_else(Self::recover);
        f(&mut session)
    }

    /// Frames dropped because the session was busy
    #[must_use]
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
