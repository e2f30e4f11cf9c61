// ABOUTME: Exercise kinds and the per-exercise phase sum type
// ABOUTME: Each exercise owns its own phase enum so variants cannot leak across analyzers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported exercises
///
/// Closed set: adding an exercise means adding a variant here and an analyzer,
/// and the compiler points at every match that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Push-up, counted on lockout
    PushUp,
    /// Bodyweight squat, counted on stand-up
    Squat,
    /// Plank, timed
    Plank,
    /// Jumping jack, counted when the feet come back together
    JumpingJack,
    /// Burpee, counted when standing back up
    Burpee,
    /// Glute bridge, counted at the top of a full cycle
    GluteBridge,
}

impl ExerciseKind {
    /// All exercises
    pub const ALL: [Self; 6] = [
        Self::PushUp,
        Self::Squat,
        Self::Plank,
        Self::JumpingJack,
        Self::Burpee,
        Self::GluteBridge,
    ];

    /// Time-based exercises accumulate hold time instead of reps
    #[must_use]
    pub const fn is_time_based(self) -> bool {
        matches!(self, Self::Plank)
    }

    /// Stable identifier used in config keys and recordings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PushUp => "push_up",
            Self::Squat => "squat",
            Self::Plank => "plank",
            Self::JumpingJack => "jumping_jack",
            Self::Burpee => "burpee",
            Self::GluteBridge => "glute_bridge",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PushUp => "Push-up",
            Self::Squat => "Squat",
            Self::Plank => "Plank",
            Self::JumpingJack => "Jumping jack",
            Self::Burpee => "Burpee",
            Self::GluteBridge => "Glute bridge",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized exercise names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown exercise: '{0}'. Valid options: push_up, squat, plank, jumping_jack, burpee, glute_bridge")]
pub struct UnknownExercise(pub String);

impl FromStr for ExerciseKind {
    type Err = UnknownExercise;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "push_up" | "pushup" => Ok(Self::PushUp),
            "squat" => Ok(Self::Squat),
            "plank" => Ok(Self::Plank),
            "jumping_jack" | "jumpingjack" => Ok(Self::JumpingJack),
            "burpee" => Ok(Self::Burpee),
            "glute_bridge" | "glutebridge" => Ok(Self::GluteBridge),
            _ => Err(UnknownExercise(s.to_owned())),
        }
    }
}

/// Push-up phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushUpPhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Arms locked out
    Up,
    /// Lowering
    GoingDown,
    /// Bottom position
    Down,
    /// Pressing up
    GoingUp,
}

/// Squat phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquatPhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Standing tall
    Up,
    /// Descending
    GoingDown,
    /// Bottom position
    Down,
    /// Driving up
    GoingUp,
}

/// Plank phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlankPhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Every form criterion passes
    Holding,
    /// At least one form criterion fails
    Broken,
}

/// Jumping-jack phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpingJackPhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Arms down, feet together
    Together,
    /// Arms up, feet apart
    Apart,
}

/// Burpee phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurpeePhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Upright, legs extended
    Standing,
    /// On the way to the floor
    Descending,
    /// Folded or horizontal on the floor
    Floor,
    /// On the way back up
    Rising,
}

/// Glute-bridge phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GluteBridgePhase {
    /// Not yet classified
    #[default]
    Unknown,
    /// Hips on the floor
    Down,
    /// Driving the hips up
    Rising,
    /// Hips fully extended
    Up,
    /// Lowering the hips
    Lowering,
}

/// Classified posture for whichever exercise is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "exercise", content = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Push-up phase
    PushUp(PushUpPhase),
    /// Squat phase
    Squat(SquatPhase),
    /// Plank phase
    Plank(PlankPhase),
    /// Jumping-jack phase
    JumpingJack(JumpingJackPhase),
    /// Burpee phase
    Burpee(BurpeePhase),
    /// Glute-bridge phase
    GluteBridge(GluteBridgePhase),
}

impl Phase {
    /// The unclassified phase of an exercise
    #[must_use]
    pub const fn initial(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::PushUp => Self::PushUp(PushUpPhase::Unknown),
            ExerciseKind::Squat => Self::Squat(SquatPhase::Unknown),
            ExerciseKind::Plank => Self::Plank(PlankPhase::Unknown),
            ExerciseKind::JumpingJack => Self::JumpingJack(JumpingJackPhase::Unknown),
            ExerciseKind::Burpee => Self::Burpee(BurpeePhase::Unknown),
            ExerciseKind::GluteBridge => Self::GluteBridge(GluteBridgePhase::Unknown),
        }
    }

    /// Exercise this phase belongs to
    #[must_use]
    pub const fn exercise(&self) -> ExerciseKind {
        match self {
            Self::PushUp(_) => ExerciseKind::PushUp,
            Self::Squat(_) => ExerciseKind::Squat,
            Self::Plank(_) => ExerciseKind::Plank,
            Self::JumpingJack(_) => ExerciseKind::JumpingJack,
            Self::Burpee(_) => ExerciseKind::Burpee,
            Self::GluteBridge(_) => ExerciseKind::GluteBridge,
        }
    }

    /// True for any exercise's unclassified variant
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::initial(self.exercise())
    }
}

impl From<PushUpPhase> for Phase {
    fn from(phase: PushUpPhase) -> Self {
        Self::PushUp(phase)
    }
}

impl From<SquatPhase> for Phase {
    fn from(phase: SquatPhase) -> Self {
        Self::Squat(phase)
    }
}

impl From<PlankPhase> for Phase {
    fn from(phase: PlankPhase) -> Self {
        Self::Plank(phase)
    }
}

impl From<JumpingJackPhase> for Phase {
    fn from(phase: JumpingJackPhase) -> Self {
        Self::JumpingJack(phase)
    }
}

impl From<BurpeePhase> for Phase {
    fn from(phase: BurpeePhase) -> Self {
        Self::Burpee(phase)
    }
}

impl From<GluteBridgePhase> for Phase {
    fn from(phase: GluteBridgePhase) -> Self {
        Self::GluteBridge(phase)
    }
}
