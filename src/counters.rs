// ABOUTME: Session counters: monotonic rep counter and hold-time accumulator
// ABOUTME: Only the session decides when they change; reset happens solely on session reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session counters
//!
//! [`RepCounter`] only ever grows by one and [`HoldAccumulator`] only grows.
//! Both go back to zero together on session reset. The engine is the sole writer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Non-decreasing rep count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounter {
    count: u32,
}

impl RepCounter {
    /// Count one rep and return the new total
    pub fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Current total
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Back to zero
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Time accumulated in a holding phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldAccumulator {
    total: Duration,
}

impl HoldAccumulator {
    /// Credit hold time
    ///
    /// Returns the new whole-second total when this credit crossed a second boundary.
    pub fn add(&mut self, delta: Duration) -> Option<u64> {
        let before = self.total.as_secs();
        self.total = self.total.saturating_add(delta);
        let after = self.total.as_secs();
        (after > before).then_some(after)
    }

    /// Accumulated time
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Whole seconds, for events
    #[must_use]
    pub const fn whole_seconds(&self) -> u64 {
        self.total.as_secs()
    }

    /// Fractional seconds, for display
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.total.as_secs_f64()
    }

    /// Back to zero
    pub fn reset(&mut self) {
        self.total = Duration::ZERO;
    }
}

/// Rep and hold counters owned by one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Counted reps
    pub reps: RepCounter,
    /// Accumulated hold time
    pub hold: HoldAccumulator,
}

impl SessionCounters {
    /// Clear both counters
    pub fn reset(&mut self) {
        self.reps.reset();
        self.hold.reset();
    }
}
