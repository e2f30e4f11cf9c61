// ABOUTME: Biomechanical thresholds for every supported exercise, organized by exercise
// ABOUTME: Angles in degrees, ratios relative to body or torso length, durations in milliseconds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Biomechanical constants
//!
//! Thresholds shared by the exercise analyzers. Every two-sided classification has
//! a dead zone between its down and up thresholds; readings inside it inherit the
//! direction of the previously confirmed phase.
//!
//! Where earlier tuning rounds disagreed (plank, burpee), the strictest set is the
//! one kept here.

/// Landmark confidence gates
pub mod confidence {
    /// Mean likelihood below which no classification is attempted
    pub const FEEDBACK_THRESHOLD: f64 = 0.5;

    /// Mean likelihood below which counters are frozen
    pub const COUNTING_THRESHOLD: f64 = 0.7;
}

/// Push-up thresholds (side view)
pub mod push_up {
    /// Mean elbow angle below which the body is at the bottom
    pub const DOWN_ELBOW_ANGLE: f64 = 100.0;

    /// Mean elbow angle above which the arms are locked out
    pub const UP_ELBOW_ANGLE: f64 = 140.0;

    /// Minimum shoulder-hip-ankle angle for a straight body line
    pub const MIN_BODY_LINE_ANGLE: f64 = 160.0;

    /// Maximum torso inclination from horizontal
    pub const MAX_TORSO_INCLINATION: f64 = 35.0;
}

/// Squat thresholds
pub mod squat {
    /// Mean knee angle below which the squat is at the bottom
    pub const DOWN_KNEE_ANGLE: f64 = 100.0;

    /// Mean knee angle above which the lifter is standing
    pub const UP_KNEE_ANGLE: f64 = 160.0;

    /// Deepest knee angle a cycle must reach to count
    ///
    /// 90° of knee flexion, thighs roughly parallel to the floor.
    pub const MAX_DEPTH_KNEE_ANGLE: f64 = 90.0;
}

/// Plank thresholds (side view, forearm or straight-arm)
pub mod plank {
    /// Maximum shoulder-hip inclination from horizontal
    pub const MAX_TORSO_INCLINATION: f64 = 30.0;

    /// Minimum shoulder-hip-ankle angle
    pub const MIN_BODY_LINE_ANGLE: f64 = 160.0;

    /// How far above the shoulders the elbows may sit, as a fraction of body length
    pub const ELBOW_ABOVE_SHOULDER_TOLERANCE: f64 = 0.05;

    /// Maximum hip-shoulder height difference, as a fraction of body length
    pub const MAX_HIP_SHOULDER_OFFSET: f64 = 0.20;

    /// Maximum knee-hip height difference, as a fraction of body length
    pub const MAX_KNEE_HIP_OFFSET: f64 = 0.20;
}

/// Jumping-jack thresholds (front view)
pub mod jumping_jack {
    /// Wrist lift above the shoulders (fraction of body height) for arms up
    pub const ARMS_UP_LIFT: f64 = 0.05;

    /// Wrist lift (fraction of body height) below which the arms are down
    pub const ARMS_DOWN_LIFT: f64 = -0.10;

    /// Ankle spread over hip spread above which the legs are apart
    pub const LEGS_APART_RATIO: f64 = 1.8;

    /// Ankle spread over hip spread below which the legs are together
    pub const LEGS_TOGETHER_RATIO: f64 = 1.3;

    /// A measured rep interval shorter than this marks the set as fast
    pub const FAST_INTERVAL_MS: u64 = 800;

    /// Event floor used while the set is fast
    pub const FAST_FLOOR_MS: u64 = 250;
}

/// Glute-bridge thresholds (supine side view)
pub mod glute_bridge {
    /// Hip extension below which the hips are down
    pub const DOWN_HIP_EXTENSION: f64 = 130.0;

    /// Hip extension above which the bridge is at the top
    pub const UP_HIP_EXTENSION: f64 = 160.0;

    /// Minimum hip lift above the shoulders at the top, as a fraction of torso length
    pub const MIN_HIP_LIFT: f64 = 0.25;

    /// How far the hips may sit below the straight shoulder-knee line at the top,
    /// as a fraction of torso length
    ///
    /// Lying supine, the knees are always higher in the image than the hips, so
    /// "hips at knee height" is judged along the shoulder-knee line instead.
    pub const MAX_HIP_DROP_BELOW_KNEE_LINE: f64 = 0.02;

    /// Knee angle window for planted feet
    pub const MIN_KNEE_ANGLE: f64 = 45.0;

    /// Knee angle window for planted feet
    pub const MAX_KNEE_ANGLE: f64 = 135.0;

    /// Maximum shoulder-hip inclination for a lying torso
    pub const MAX_SUPINE_INCLINATION: f64 = 45.0;

    /// Maximum left/right height difference of hips or shoulders, fraction of torso
    pub const MAX_LEVEL_OFFSET: f64 = 0.15;

    /// Maximum ankle spread, fraction of torso length
    pub const MAX_STANCE_WIDTH: f64 = 1.0;
}

/// Burpee thresholds
pub mod burpee {
    /// Mean knee angle below which the body is folded
    pub const FLOOR_KNEE_ANGLE: f64 = 120.0;

    /// Maximum torso inclination from horizontal while on the floor
    pub const FLOOR_MAX_TORSO_INCLINATION: f64 = 45.0;

    /// Mean knee angle above which the body is standing
    pub const STANDING_KNEE_ANGLE: f64 = 160.0;

    /// Minimum torso inclination from horizontal while standing
    pub const STANDING_MIN_TORSO_INCLINATION: f64 = 60.0;
}
