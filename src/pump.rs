// ABOUTME: Async latest-wins frame pump feeding a shared session from a capture source
// ABOUTME: A watch channel holds only the newest frame; reports fan out over a broadcast channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Async frame pump
//!
//! Capture callbacks call [`FramePump::push`], which never waits. A single worker
//! task analyzes the newest frame; any frame replaced before the worker reaches
//! it is superseded and never analyzed. Subscribers receive every [`FrameReport`].

use pierre_pose::LandmarkFrame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, trace};

use crate::admission::{SharedSession, Submission};
use crate::engine::FrameReport;

/// Default report buffer per subscriber
pub const DEFAULT_REPORT_CAPACITY: usize = 64;

/// Frame stamped with its capture time
#[derive(Debug, Clone)]
struct CapturedFrame {
    frame: LandmarkFrame,
    captured_at: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    pushed: AtomicU64,
    analyzed: AtomicU64,
    sampled_out: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PumpStats {
        PumpStats {
            pushed: self.pushed.load(Ordering::Relaxed),
            analyzed: self.analyzed.load(Ordering::Relaxed),
            sampled_out: self.sampled_out.load(Ordering::Relaxed),
        }
    }
}

/// Frame counts observed by a pump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Frames handed to `push`
    pub pushed: u64,
    /// Frames analyzed by the session
    pub analyzed: u64,
    /// Frames skipped by the exercise sampling rate
    pub sampled_out: u64,
}

impl PumpStats {
    /// Frames replaced by a newer one before the worker reached them
    #[must_use]
    pub const fn superseded(&self) -> u64 {
        self.pushed
            .saturating_sub(self.analyzed)
            .saturating_sub(self.sampled_out)
    }
}

/// Latest-wins pump around a [`SharedSession`]
#[derive(Debug)]
pub struct FramePump {
    frames: watch::Sender<Option<CapturedFrame>>,
    reports: broadcast::Sender<FrameReport>,
    counters: Arc<Counters>,
    worker: JoinHandle<()>,
}

impl FramePump {
    /// Spawn the worker on the current tokio runtime
    #[must_use]
    pub fn spawn(session: SharedSession, report_capacity: usize) -> Self {
        let (frames, mut latest) = watch::channel(None::<CapturedFrame>);
        let (reports, _) = broadcast::channel(report_capacity.max(1));
        let counters = Arc::new(Counters::default());

        let worker_reports = reports.clone();
        let worker_counters = Arc::clone(&counters);
        let worker = tokio::spawn(async move {
            while latest.changed().await.is_ok() {
                let Some(captured) = latest.borrow_and_update().clone() else {
                    continue;
                };
                match session.try_submit_at(&captured.frame, captured.captured_at) {
                    Submission::Processed(report) => {
                        worker_counters.analyzed.fetch_add(1, Ordering::Relaxed);
                        // No subscribers is fine; the session state is still updated
                        let _ = worker_reports.send(report);
                    }
                    Submission::SampledOut => {
                        worker_counters.sampled_out.fetch_add(1, Ordering::Relaxed);
                    }
                    Submission::Dropped => {
                        trace!("Pump frame dropped, session busy");
                    }
                }
            }
            debug!("Frame pump worker stopped");
        });

        Self {
            frames,
            reports,
            counters,
            worker,
        }
    }

    /// Hand over the newest frame, replacing any frame not yet analyzed
    pub fn push(&self, frame: LandmarkFrame) {
        self.push_at(frame, Instant::now());
    }

    /// Hand over a frame captured at `captured_at`
    pub fn push_at(&self, frame: LandmarkFrame, captured_at: Instant) {
        self.counters.pushed.fetch_add(1, Ordering::Relaxed);
        self.frames.send_replace(Some(CapturedFrame { frame, captured_at }));
    }

    /// Receive every report produced from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FrameReport> {
        self.reports.subscribe()
    }

    /// Current frame counts
    #[must_use]
    pub fn stats(&self) -> PumpStats {
        self.counters.snapshot()
    }

    /// Stop accepting frames and wait for the worker to finish
    ///
    /// A frame pushed before shutdown that the worker has not seen is still analyzed.
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the worker task panicked or was cancelled
    pub async fn shutdown(self) -> Result<PumpStats, JoinError> {
        let Self {
            frames,
            counters,
            worker,
            ..
        } = self;
        drop(frames);
        worker.await?;
        Ok(counters.snapshot())
    }
}
