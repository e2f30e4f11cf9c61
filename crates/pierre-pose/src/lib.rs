// ABOUTME: Pose primitives crate for the Pierre rep-counting engine
// ABOUTME: Foundation crate with landmark frames, geometry, biomechanical constants, and errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Pose
//!
//! Foundation crate holding the pose-side vocabulary of the rep-counting engine.
//! It is deliberately free of session logic so it changes rarely and compiles once.
//!
//! ## Modules
//!
//! - **landmarks**: `Joint`, `Landmark`, `Rotation` and the immutable `LandmarkFrame`
//! - **geometry**: pure angle and alignment functions on 2D points
//! - **constants**: per-exercise biomechanical thresholds
//! - **errors**: `PoseError` for frame validation and name parsing

/// Biomechanical thresholds organized by exercise
pub mod constants;

/// Pose error types
pub mod errors;

/// Stateless geometry kernel (joint angles, inclination, distances)
pub mod geometry;

/// Landmark frame data model produced by the external pose model
pub mod landmarks;

pub use errors::{PoseError, PoseResult};
pub use geometry::Point2;
pub use landmarks::{FrameBuilder, Joint, Landmark, LandmarkFrame, Rotation};
