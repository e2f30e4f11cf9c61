// ABOUTME: Frame hysteresis and event-interval debouncing shared by every exercise analyzer
// ABOUTME: Confirms a phase after N identical raw readings; enforces a floor between rep events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Debouncing primitives
//!
//! Two independent filters sit between raw classification and counting:
//!
//! - `Hysteresis` stabilizes the phase itself: a raw reading only becomes the
//!   confirmed phase after it has been seen on `k` consecutive frames.
//! - `EventDebouncer` stabilizes emission: even a legitimately confirmed cycle
//!   cannot fire closer to the previous event than the floor duration.

use std::time::{Duration, Instant};

/// Streak counter saturates here; nothing needs more than a handful of frames
const MAX_STREAK: u32 = 64;

/// A change of the confirmed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<P> {
    /// Confirmed value before this frame
    pub from: P,
    /// Confirmed value after this frame
    pub to: P,
}

/// N-consecutive-frames confirmation filter
#[derive(Debug, Clone)]
pub struct Hysteresis<P> {
    initial: P,
    confirmed: P,
    last_raw: Option<P>,
    streak: u32,
}

impl<P: Copy + PartialEq> Hysteresis<P> {
    /// Create a filter whose confirmed value starts at `initial`
    #[must_use]
    pub const fn new(initial: P) -> Self {
        Self {
            initial,
            confirmed: initial,
            last_raw: None,
            streak: 0,
        }
    }

    /// Feed one raw reading requiring `required` consecutive frames to confirm
    ///
    /// Returns the transition when the confirmed value changed on this frame.
    pub fn observe(&mut self, raw: P, required: u32) -> Option<Transition<P>> {
        if self.last_raw == Some(raw) {
            self.streak = self.streak.saturating_add(1).min(MAX_STREAK);
        } else {
            self.last_raw = Some(raw);
            self.streak = 1;
        }

        if self.streak >= required.max(1) && raw != self.confirmed {
            let from = self.confirmed;
            self.confirmed = raw;
            return Some(Transition { from, to: raw });
        }
        None
    }

    /// Current confirmed value
    #[must_use]
    pub const fn confirmed(&self) -> P {
        self.confirmed
    }

    /// Most recent raw reading
    #[must_use]
    pub const fn last_raw(&self) -> Option<P> {
        self.last_raw
    }

    /// Length of the current raw streak
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Forget all readings and return to the initial value
    pub fn reset(&mut self) {
        self.confirmed = self.initial;
        self.last_raw = None;
        self.streak = 0;
    }
}

/// Minimum-interval gate for emitted events
#[derive(Debug, Clone, Default)]
pub struct EventDebouncer {
    last_fired: Option<Instant>,
    last_interval: Option<Duration>,
}

impl EventDebouncer {
    /// Create a debouncer that has never fired
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_fired: None,
            last_interval: None,
        }
    }

    /// Time between the two most recent accepted events
    #[must_use]
    pub const fn last_interval(&self) -> Option<Duration> {
        self.last_interval
    }

    /// Time elapsed since the last accepted event
    #[must_use]
    pub fn since_last(&self, now: Instant) -> Option<Duration> {
        self.last_fired
            .map(|last| now.saturating_duration_since(last))
    }

    /// Accept the event when the floor has elapsed since the previous one
    pub fn try_fire(&mut self, now: Instant, floor: Duration) -> bool {
        match self.since_last(now) {
            Some(elapsed) if elapsed < floor => false,
            elapsed => {
                self.last_interval = elapsed;
                self.last_fired = Some(now);
                true
            }
        }
    }

    /// Forget the event history
    pub fn reset(&mut self) {
        self.last_fired = None;
        self.last_interval = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Pose {
        Unknown,
        Up,
        Down,
    }

    #[test]
    fn test_confirms_after_k_frames() {
        let mut filter = Hysteresis::new(Pose::Unknown);
        assert_eq!(filter.observe(Pose::Up, 3), None);
        assert_eq!(filter.observe(Pose::Up, 3), None);
        assert_eq!(
            filter.observe(Pose::Up, 3),
            Some(Transition {
                from: Pose::Unknown,
                to: Pose::Up
            })
        );
        assert_eq!(filter.confirmed(), Pose::Up);
        assert_eq!(filter.observe(Pose::Up, 3), None);
    }

    #[test]
    fn test_flicker_never_confirms() {
        let mut filter = Hysteresis::new(Pose::Unknown);
        for i in 0..50 {
            let raw = if i % 2 == 0 { Pose::Up } else { Pose::Down };
            assert_eq!(filter.observe(raw, 2), None);
        }
        assert_eq!(filter.confirmed(), Pose::Unknown);
        assert_eq!(filter.streak(), 1);
    }

    #[test]
    fn test_single_frame_confirmation() {
        let mut filter = Hysteresis::new(Pose::Unknown);
        assert!(filter.observe(Pose::Down, 1).is_some());
        assert!(filter.observe(Pose::Up, 1).is_some());
        // Zero is treated as one
        assert!(filter.observe(Pose::Down, 0).is_some());
    }

    #[test]
    fn test_streak_saturates() {
        let mut filter = Hysteresis::new(Pose::Unknown);
        for _ in 0..500 {
            filter.observe(Pose::Up, 2);
        }
        assert_eq!(filter.streak(), MAX_STREAK);
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let mut filter = Hysteresis::new(Pose::Unknown);
        filter.observe(Pose::Up, 1);
        filter.reset();
        assert_eq!(filter.confirmed(), Pose::Unknown);
        assert_eq!(filter.last_raw(), None);
    }

    #[test]
    fn test_event_floor() {
        let start = Instant::now();
        let floor = Duration::from_millis(500);
        let mut debouncer = EventDebouncer::new();

        assert!(debouncer.try_fire(start, floor));
        assert!(!debouncer.try_fire(start + Duration::from_millis(499), floor));
        assert!(debouncer.try_fire(start + Duration::from_millis(500), floor));
        assert_eq!(debouncer.last_interval(), Some(Duration::from_millis(500)));

        debouncer.reset();
        assert!(debouncer.try_fire(start + Duration::from_millis(501), floor));
        assert_eq!(debouncer.last_interval(), None);
    }
}
