// ABOUTME: Error types for landmark frame construction and pose vocabulary parsing
// ABOUTME: Frame processing itself never fails; these cover builder and parser misuse only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pose error types.

use thiserror::Error;

use crate::landmarks::Joint;

/// Errors raised while building or parsing pose data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    /// Image dimensions must be strictly positive and finite
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Reported image width
        width: f64,
        /// Reported image height
        height: f64,
    },

    /// Likelihood outside the closed unit interval
    #[error("Invalid likelihood {value} for joint {joint}")]
    InvalidLikelihood {
        /// Joint carrying the bad likelihood
        joint: Joint,
        /// Offending value
        value: f64,
    },

    /// Coordinates that are NaN or infinite
    #[error("Non-finite coordinates for joint {joint}")]
    NonFiniteCoordinates {
        /// Joint carrying the bad coordinates
        joint: Joint,
    },

    /// Rotation hint that is not a multiple of 90 degrees
    #[error("Unsupported rotation: {0} degrees (expected 0, 90, 180 or 270)")]
    UnsupportedRotation(u16),

    /// Joint name that does not match any tracked joint
    #[error("Unknown joint: '{0}'")]
    UnknownJoint(String),
}

impl PoseError {
    /// Create an invalid dimensions error
    #[must_use]
    pub const fn invalid_dimensions(width: f64, height: f64) -> Self {
        Self::InvalidDimensions { width, height }
    }

    /// Create an invalid likelihood error
    #[must_use]
    pub const fn invalid_likelihood(joint: Joint, value: f64) -> Self {
        Self::InvalidLikelihood { joint, value }
    }

    /// Create an unknown joint error
    #[must_use]
    pub fn unknown_joint(name: impl Into<String>) -> Self {
        Self::UnknownJoint(name.into())
    }
}

/// Result alias for pose operations
pub type PoseResult<T> = Result<T, PoseError>;
