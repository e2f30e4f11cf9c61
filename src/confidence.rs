// ABOUTME: Per-frame landmark quality gate deciding whether to classify and whether to count
// ABOUTME: Two thresholds: a lower feedback gate and a stricter counting gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Confidence gate
//!
//! The gate is evaluated against the joints the active analyzer needs:
//!
//! 1. a required joint missing from the frame short-circuits to positioning feedback
//! 2. a mean likelihood below the feedback threshold skips classification
//! 3. otherwise classification runs; counting additionally needs the mean to reach
//!    the counting threshold with every required joint above the feedback threshold

use pierre_pose::{Joint, Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};

use crate::config::ConfidenceConfig;

/// Outcome of gating one frame
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Required joints absent from the frame
    MissingJoints(Vec<Joint>),
    /// Joints present but the mean likelihood is too low to classify
    LowConfidence {
        /// Mean likelihood over the required joints
        average: f64,
    },
    /// Good enough to classify
    Classify {
        /// Mean likelihood over the required joints
        average: f64,
        /// Every required joint is at or above the feedback threshold
        full_body_visible: bool,
        /// Counters may change on this frame
        counting_allowed: bool,
    },
}

impl GateDecision {
    /// Mean likelihood, 0 when joints are missing
    #[must_use]
    pub const fn average(&self) -> f64 {
        match self {
            Self::MissingJoints(_) => 0.0,
            Self::LowConfidence { average } | Self::Classify { average, .. } => *average,
        }
    }

    /// Whether the full body counts as visible for this frame
    #[must_use]
    pub const fn full_body_visible(&self) -> bool {
        matches!(
            self,
            Self::Classify {
                full_body_visible: true,
                ..
            }
        )
    }

    /// Whether counters may change on this frame
    #[must_use]
    pub const fn counting_allowed(&self) -> bool {
        matches!(
            self,
            Self::Classify {
                counting_allowed: true,
                ..
            }
        )
    }
}

/// Two-threshold landmark quality gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceGate {
    feedback_threshold: f64,
    counting_threshold: f64,
}

impl ConfidenceGate {
    /// Create a gate; thresholds are assumed validated by `EngineConfig::validate`
    #[must_use]
    pub const fn new(feedback_threshold: f64, counting_threshold: f64) -> Self {
        Self {
            feedback_threshold,
            counting_threshold,
        }
    }

    /// Feedback threshold
    #[must_use]
    pub const fn feedback_threshold(&self) -> f64 {
        self.feedback_threshold
    }

    /// Counting threshold
    #[must_use]
    pub const fn counting_threshold(&self) -> f64 {
        self.counting_threshold
    }

    /// Gate a frame against the required joints
    #[must_use]
    pub fn evaluate(&self, frame: &LandmarkFrame, required: &[Joint]) -> GateDecision {
        let missing: Vec<Joint> = required
            .iter()
            .copied()
            .filter(|joint| !frame.contains(*joint))
            .collect();
        if !missing.is_empty() {
            return GateDecision::MissingJoints(missing);
        }

        let average = mean_confidence(frame, required);
        if average < self.feedback_threshold {
            return GateDecision::LowConfidence { average };
        }

        let full_body_visible = required
            .iter()
            .all(|joint| frame.confidence(*joint) >= self.feedback_threshold);
        GateDecision::Classify {
            average,
            full_body_visible,
            counting_allowed: full_body_visible && average >= self.counting_threshold,
        }
    }

    /// Ready to start: full body visible at counting-grade confidence
    #[must_use]
    pub fn ready_to_start(&self, decision: &GateDecision) -> bool {
        decision.full_body_visible() && decision.average() >= self.counting_threshold
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::from(&ConfidenceConfig::default())
    }
}

impl From<&ConfidenceConfig> for ConfidenceGate {
    fn from(config: &ConfidenceConfig) -> Self {
        Self::new(config.feedback_threshold, config.counting_threshold)
    }
}

/// Mean likelihood over the present joints of `joints`; 0 for an empty set
#[must_use]
pub fn mean_confidence(frame: &LandmarkFrame, joints: &[Joint]) -> f64 {
    let present: Vec<f64> = joints
        .iter()
        .filter_map(|joint| frame.landmark(*joint))
        .map(Landmark::confidence)
        .collect();
    if present.is_empty() {
        return 0.0;
    }
    present.iter().sum::<f64>() / present.len() as f64
}
