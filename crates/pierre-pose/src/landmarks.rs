// ABOUTME: Landmark frame data model produced once per camera frame by the pose model
// ABOUTME: Joint identifiers, per-joint likelihood, image size, and rotation correction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{PoseError, PoseResult};
use crate::geometry::{midpoint, Point2};

/// Body joints tracked by the engine
///
/// The pose model may report more keypoints; anything outside this set is ignored
/// by the frame builder's callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    /// Nose tip
    Nose,
    /// Left shoulder
    LeftShoulder,
    /// Right shoulder
    RightShoulder,
    /// Left elbow
    LeftElbow,
    /// Right elbow
    RightElbow,
    /// Left wrist
    LeftWrist,
    /// Right wrist
    RightWrist,
    /// Left hip
    LeftHip,
    /// Right hip
    RightHip,
    /// Left knee
    LeftKnee,
    /// Right knee
    RightKnee,
    /// Left ankle
    LeftAnkle,
    /// Right ankle
    RightAnkle,
}

impl Joint {
    /// All tracked joints in declaration order
    pub const ALL: [Self; 13] = [
        Self::Nose,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Stable snake_case name used in recordings and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Joint {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|joint| joint.as_str() == normalized)
            .ok_or_else(|| PoseError::unknown_joint(s))
    }
}

/// One tracked joint: image-space position plus model likelihood in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal pixel coordinate in the source image
    pub x: f64,
    /// Vertical pixel coordinate in the source image
    pub y: f64,
    /// Likelihood that the joint is where the model says it is
    pub likelihood: f64,
}

impl Landmark {
    /// Create a landmark
    #[must_use]
    pub const fn new(x: f64, y: f64, likelihood: f64) -> Self {
        Self { x, y, likelihood }
    }

    /// Likelihood with non-finite values mapped to zero
    #[must_use]
    pub fn confidence(&self) -> f64 {
        if self.likelihood.is_finite() {
            self.likelihood.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Clockwise rotation that must be applied to the source image to make it upright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// Already upright
    #[default]
    Deg0,
    /// Rotate 90° clockwise
    Deg90,
    /// Rotate 180°
    Deg180,
    /// Rotate 270° clockwise
    Deg270,
}

impl Rotation {
    /// Rotation in degrees
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = PoseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(PoseError::UnsupportedRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Immutable set of landmarks for a single camera frame
///
/// Fields are only set through `FrameBuilder` or deserialization. Derived frames
/// come from `without` and `with_landmark`, which leave the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Source image width in pixels
    width: f64,
    /// Source image height in pixels
    height: f64,
    /// Rotation hint from the capture pipeline
    #[serde(default)]
    rotation: Rotation,
    /// Detected joints; absent joints were not reported by the model
    landmarks: BTreeMap<Joint, Landmark>,
}

impl LandmarkFrame {
    /// Start building a frame for an image of the given size
    #[must_use]
    pub fn builder(width: f64, height: f64) -> FrameBuilder {
        FrameBuilder::new(width, height)
    }

    /// Source image width in pixels
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Source image height in pixels
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Rotation hint from the capture pipeline
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Every reported joint, raw coordinates
    #[must_use]
    pub const fn landmarks(&self) -> &BTreeMap<Joint, Landmark> {
        &self.landmarks
    }

    /// Copy of this frame with `joints` removed
    #[must_use]
    pub fn without(&self, joints: &[Joint]) -> Self {
        let mut frame = self.clone();
        for joint in joints {
            frame.landmarks.remove(joint);
        }
        frame
    }

    /// Copy of this frame with `joint` added or replaced
    ///
    /// # Errors
    ///
    /// Returns `PoseError` when the new landmark fails `validate`.
    pub fn with_landmark(&self, joint: Joint, landmark: Landmark) -> PoseResult<Self> {
        let mut frame = self.clone();
        frame.landmarks.insert(joint, landmark);
        frame.validate()?;
        Ok(frame)
    }

    /// Raw landmark as reported by the model
    ///
    /// Landmarks with non-finite coordinates are treated as absent.
    #[must_use]
    pub fn landmark(&self, joint: Joint) -> Option<&Landmark> {
        self.landmarks
            .get(&joint)
            .filter(|lm| lm.x.is_finite() && lm.y.is_finite())
    }

    /// True when the joint is present with usable coordinates
    #[must_use]
    pub fn contains(&self, joint: Joint) -> bool {
        self.landmark(joint).is_some()
    }

    /// Joint position in upright image space (rotation hint applied)
    #[must_use]
    pub fn point(&self, joint: Joint) -> Option<Point2> {
        self.landmark(joint).map(|lm| self.upright(lm.x, lm.y))
    }

    /// Midpoint of a left/right joint pair in upright image space
    #[must_use]
    pub fn mid(&self, left: Joint, right: Joint) -> Option<Point2> {
        Some(midpoint(self.point(left)?, self.point(right)?))
    }

    /// Likelihood of a joint, 0 when absent
    #[must_use]
    pub fn confidence(&self, joint: Joint) -> f64 {
        self.landmark(joint).map_or(0.0, Landmark::confidence)
    }

    /// Image size after the rotation hint is applied
    #[must_use]
    pub const fn upright_size(&self) -> (f64, f64) {
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg180 => (self.width, self.height),
            Rotation::Deg90 | Rotation::Deg270 => (self.height, self.width),
        }
    }

    /// Upright point normalized to [0, 1] by the upright image size
    #[must_use]
    pub fn normalized(&self, joint: Joint) -> Option<Point2> {
        let (w, h) = self.upright_size();
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        self.point(joint).map(|p| Point2::new(p.x / w, p.y / h))
    }

    /// Check dimensions, likelihoods and coordinates
    ///
    /// # Errors
    ///
    /// Returns `PoseError` for non-positive dimensions, likelihood outside [0, 1]
    /// or non-finite coordinates.
    pub fn validate(&self) -> PoseResult<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(PoseError::invalid_dimensions(self.width, self.height));
        }
        for (joint, lm) in &self.landmarks {
            if !lm.x.is_finite() || !lm.y.is_finite() {
                return Err(PoseError::NonFiniteCoordinates { joint: *joint });
            }
            if !(0.0..=1.0).contains(&lm.likelihood) {
                return Err(PoseError::invalid_likelihood(*joint, lm.likelihood));
            }
        }
        Ok(())
    }

    fn upright(&self, x: f64, y: f64) -> Point2 {
        match self.rotation {
            Rotation::Deg0 => Point2::new(x, y),
            Rotation::Deg90 => Point2::new(self.height - y, x),
            Rotation::Deg180 => Point2::new(self.width - x, self.height - y),
            Rotation::Deg270 => Point2::new(y, self.width - x),
        }
    }
}

/// Validating builder for `LandmarkFrame`
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    width: f64,
    height: f64,
    rotation: Rotation,
    landmarks: BTreeMap<Joint, Landmark>,
}

impl FrameBuilder {
    /// Create a builder for an image of the given size
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::Deg0,
            landmarks: BTreeMap::new(),
        }
    }

    /// Set the rotation hint
    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add or replace a joint
    #[must_use]
    pub fn landmark(mut self, joint: Joint, x: f64, y: f64, likelihood: f64) -> Self {
        self.landmarks.insert(joint, Landmark::new(x, y, likelihood));
        self
    }

    /// Add a joint from a point
    #[must_use]
    pub fn point(self, joint: Joint, point: Point2, likelihood: f64) -> Self {
        self.landmark(joint, point.x, point.y, likelihood)
    }

    /// Finish the frame
    ///
    /// # Errors
    ///
    /// Returns `PoseError` when the frame fails `LandmarkFrame::validate`.
    pub fn build(self) -> PoseResult<LandmarkFrame> {
        let frame = LandmarkFrame {
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            landmarks: self.landmarks,
        };
        frame.validate()?;
        Ok(frame)
    }
}
