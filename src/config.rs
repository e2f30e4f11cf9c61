// ABOUTME: Engine configuration: confidence thresholds, session behavior and per-exercise tuning
// ABOUTME: Defaults from biomechanical constants, REP_ENGINE_* environment overrides, validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Engine configuration
//!
//! `EngineConfig::default()` is the tuned production configuration.
//! `EngineConfig::from_environment()` applies `REP_ENGINE_*` overrides on top of it
//! and validates the result, so a session never starts with thresholds that
//! would make counting impossible.

use pierre_pose::constants::confidence;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::phase::ExerciseKind;

/// Largest accepted consecutive-frame confirmation count
pub const MAX_CONFIRM_FRAMES: u32 = 5;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two related values are in the wrong order
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// A single value is outside its allowed range
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// An environment override could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Create a value-out-of-range error
    #[must_use]
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::ValueOutOfRange(message.into())
    }
}

/// Landmark confidence thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Mean likelihood required to classify at all
    pub feedback_threshold: f64,
    /// Mean likelihood required for counters to change
    pub counting_threshold: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            feedback_threshold: confidence::FEEDBACK_THRESHOLD,
            counting_threshold: confidence::COUNTING_THRESHOLD,
        }
    }
}

/// Session lifecycle behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pause automatically when the body leaves the frame
    pub auto_pause_on_visibility_loss: bool,
    /// Consecutive frames without full-body visibility before auto-pausing
    pub visibility_loss_frames: u32,
    /// Frame gaps longer than this are not credited to hold time
    pub max_hold_frame_gap_ms: u64,
}

impl SessionConfig {
    /// Maximum creditable gap between processed frames
    #[must_use]
    pub const fn max_hold_frame_gap(&self) -> Duration {
        Duration::from_millis(self.max_hold_frame_gap_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_pause_on_visibility_loss: true,
            visibility_loss_frames: 15,
            max_hold_frame_gap_ms: 1000,
        }
    }
}

/// Debounce and sampling tuning for one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTuning {
    /// Consecutive frames confirming a resting phase (up, down, holding, ...)
    pub confirm_frames: u32,
    /// Consecutive frames confirming a transit phase (going down, rising, ...)
    pub transit_confirm_frames: u32,
    /// Minimum time between two counted reps
    pub min_event_interval_ms: u64,
    /// Process every Nth submitted frame
    pub sample_every_n_frames: u32,
}

impl ExerciseTuning {
    /// Tuned defaults for an exercise
    #[must_use]
    pub const fn default_for(kind: ExerciseKind) -> Self {
        let (confirm_frames, transit_confirm_frames, min_event_interval_ms, sample_every_n_frames) =
            match kind {
                ExerciseKind::PushUp => (3, 2, 600, 2),
                ExerciseKind::Squat => (3, 2, 800, 2),
                ExerciseKind::Plank => (3, 3, 1000, 3),
                ExerciseKind::JumpingJack => (2, 2, 400, 1),
                ExerciseKind::Burpee => (2, 2, 1500, 1),
                ExerciseKind::GluteBridge => (3, 2, 1000, 2),
            };
        Self {
            confirm_frames,
            transit_confirm_frames,
            min_event_interval_ms,
            sample_every_n_frames,
        }
    }

    /// Minimum time between two counted reps
    #[must_use]
    pub const fn min_event_interval(&self) -> Duration {
        Duration::from_millis(self.min_event_interval_ms)
    }

    fn validate(&self, kind: ExerciseKind) -> Result<(), ConfigError> {
        for (name, frames) in [
            ("confirm_frames", self.confirm_frames),
            ("transit_confirm_frames", self.transit_confirm_frames),
        ] {
            if !(1..=MAX_CONFIRM_FRAMES).contains(&frames) {
                return Err(ConfigError::out_of_range(format!(
                    "{kind}.{name} must be within 1..={MAX_CONFIRM_FRAMES}, got {frames}"
                )));
            }
        }
        if self.sample_every_n_frames == 0 {
            return Err(ConfigError::out_of_range(format!(
                "{kind}.sample_every_n_frames must be at least 1"
            )));
        }
        Ok(())
    }
}

/// Per-exercise tuning table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTunings {
    /// Push-up tuning
    pub push_up: ExerciseTuning,
    /// Squat tuning
    pub squat: ExerciseTuning,
    /// Plank tuning
    pub plank: ExerciseTuning,
    /// Jumping-jack tuning
    pub jumping_jack: ExerciseTuning,
    /// Burpee tuning
    pub burpee: ExerciseTuning,
    /// Glute-bridge tuning
    pub glute_bridge: ExerciseTuning,
}

impl ExerciseTunings {
    /// Tuning for one exercise
    #[must_use]
    pub const fn for_kind(&self, kind: ExerciseKind) -> &ExerciseTuning {
        match kind {
            ExerciseKind::PushUp => &self.push_up,
            ExerciseKind::Squat => &self.squat,
            ExerciseKind::Plank => &self.plank,
            ExerciseKind::JumpingJack => &self.jumping_jack,
            ExerciseKind::Burpee => &self.burpee,
            ExerciseKind::GluteBridge => &self.glute_bridge,
        }
    }

    /// Mutable tuning for one exercise
    pub fn for_kind_mut(&mut self, kind: ExerciseKind) -> &mut ExerciseTuning {
        match kind {
            ExerciseKind::PushUp => &mut self.push_up,
            ExerciseKind::Squat => &mut self.squat,
            ExerciseKind::Plank => &mut self.plank,
            ExerciseKind::JumpingJack => &mut self.jumping_jack,
            ExerciseKind::Burpee => &mut self.burpee,
            ExerciseKind::GluteBridge => &mut self.glute_bridge,
        }
    }
}

impl Default for ExerciseTunings {
    fn default() -> Self {
        Self {
            push_up: ExerciseTuning::default_for(ExerciseKind::PushUp),
            squat: ExerciseTuning::default_for(ExerciseKind::Squat),
            plank: ExerciseTuning::default_for(ExerciseKind::Plank),
            jumping_jack: ExerciseTuning::default_for(ExerciseKind::JumpingJack),
            burpee: ExerciseTuning::default_for(ExerciseKind::Burpee),
            glute_bridge: ExerciseTuning::default_for(ExerciseKind::GluteBridge),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Confidence gate thresholds
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    /// Session lifecycle behavior
    #[serde(default)]
    pub session: SessionConfig,
    /// Per-exercise tuning
    #[serde(default)]
    pub exercises: ExerciseTunings,
}

impl EngineConfig {
    /// Load defaults, apply `REP_ENGINE_*` environment overrides and validate
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed or the result fails validation
    pub fn from_environment() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ConfidenceConfig {
            feedback_threshold,
            counting_threshold,
        } = self.confidence;
        for (name, value) in [
            ("feedback_threshold", feedback_threshold),
            ("counting_threshold", counting_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::out_of_range(format!(
                    "confidence.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if feedback_threshold > counting_threshold {
            return Err(ConfigError::InvalidRange(
                "feedback_threshold must be <= counting_threshold",
            ));
        }

        if self.session.visibility_loss_frames == 0 {
            return Err(ConfigError::out_of_range(
                "session.visibility_loss_frames must be at least 1",
            ));
        }

        for kind in ExerciseKind::ALL {
            self.exercises.for_kind(kind).validate(kind)?;
        }
        Ok(())
    }

    /// Parse and apply one environment override when the variable is set
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}: '{val}'")))?;
        }
        Ok(())
    }

    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var(
            "REP_ENGINE_FEEDBACK_CONFIDENCE",
            &mut self.confidence.feedback_threshold,
        )?;
        Self::apply_env_var(
            "REP_ENGINE_COUNTING_CONFIDENCE",
            &mut self.confidence.counting_threshold,
        )?;
        Self::apply_env_var(
            "REP_ENGINE_AUTO_PAUSE",
            &mut self.session.auto_pause_on_visibility_loss,
        )?;
        Self::apply_env_var(
            "REP_ENGINE_VISIBILITY_LOSS_FRAMES",
            &mut self.session.visibility_loss_frames,
        )?;
        Self::apply_env_var(
            "REP_ENGINE_MAX_HOLD_GAP_MS",
            &mut self.session.max_hold_frame_gap_ms,
        )?;

        for kind in ExerciseKind::ALL {
            let prefix = format!("REP_ENGINE_{}", kind.as_str().to_uppercase());
            let tuning = self.exercises.for_kind_mut(kind);
            Self::apply_env_var(
                &format!("{prefix}_SAMPLE_EVERY"),
                &mut tuning.sample_every_n_frames,
            )?;
            Self::apply_env_var(
                &format!("{prefix}_MIN_INTERVAL_MS"),
                &mut tuning.min_event_interval_ms,
            )?;
        }

        Ok(self)
    }
}
