// ABOUTME: Stateless geometry kernel computing joint angles and body alignment metrics
// ABOUTME: Every function is total: degenerate or non-finite input yields 0 instead of NaN
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Geometry kernel
//!
//! All angles are in degrees. Coordinates follow image conventions (x to the right,
//! y downward); callers pass upright-corrected points from `LandmarkFrame::point`.

use serde::{Deserialize, Serialize};

/// Vectors shorter than this are treated as degenerate
const DEGENERATE_LENGTH: f64 = 1e-9;

/// A point (or vector) in image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downward)
    pub y: f64,
}

impl Point2 {
    /// Create a point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `other` to `self`
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Z component of the 2D cross product
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// Euclidean length
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// True when both coordinates are finite
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn usable(length: f64) -> bool {
    // NaN fails the comparison as well
    length > DEGENERATE_LENGTH && length.is_finite()
}

/// Angle at vertex `b` between rays `b→a` and `b→c`, in [0, 180]
///
/// Uses `atan2(|cross|, dot)`, which stays accurate near 0° and 180° where the
/// arccos formulation loses precision. Zero-length rays return 0.
#[must_use]
pub fn angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let ba = a.sub(b);
    let bc = c.sub(b);
    if !usable(ba.norm()) || !usable(bc.norm()) {
        return 0.0;
    }
    ba.cross(bc).abs().atan2(ba.dot(bc)).to_degrees()
}

/// Hip extension angle used for glute-bridge scoring
///
/// Measures the angle between the shoulder→hip vector and the hip→knee vector with
/// the dot-product/arccos formulation and reports it as extension: a straight
/// shoulder-hip-knee line reads 180°, a fully folded hip reads near 0°. The cosine
/// is clamped so rounding never leaves the arccos domain.
#[must_use]
pub fn hip_extension_angle(shoulder: Point2, hip: Point2, knee: Point2) -> f64 {
    let torso = hip.sub(shoulder);
    let thigh = knee.sub(hip);
    let torso_len = torso.norm();
    let thigh_len = thigh.norm();
    if !usable(torso_len) || !usable(thigh_len) {
        return 0.0;
    }
    let cos = (torso.dot(thigh) / (torso_len * thigh_len)).clamp(-1.0, 1.0);
    180.0 - cos.acos().to_degrees()
}

/// Midpoint of two points
#[must_use]
pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Euclidean distance between two points, 0 for non-finite input
#[must_use]
pub fn distance(a: Point2, b: Point2) -> f64 {
    let d = a.sub(b).norm();
    if d.is_finite() {
        d
    } else {
        0.0
    }
}

/// Inclination of the segment `a-b` from the horizontal, in [0, 90]
///
/// 0 means the segment is level, 90 means it is vertical. Degenerate segments
/// return 0.
#[must_use]
pub fn inclination_from_horizontal(a: Point2, b: Point2) -> f64 {
    let v = b.sub(a);
    if !usable(v.norm()) {
        return 0.0;
    }
    v.y.abs().atan2(v.x.abs()).to_degrees()
}

/// Signed vertical offset of `point` from the straight line through `from` and `to`
///
/// Positive when the point lies below the line (image y grows downward). Returns 0
/// when the line is vertical or degenerate.
#[must_use]
pub fn offset_below_line(from: Point2, to: Point2, point: Point2) -> f64 {
    let dx = to.x - from.x;
    if dx.abs() <= DEGENERATE_LENGTH || !dx.is_finite() {
        return 0.0;
    }
    let t = (point.x - from.x) / dx;
    let line_y = (to.y - from.y).mul_add(t, from.y);
    let offset = point.y - line_y;
    if offset.is_finite() {
        offset
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let result = angle(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0));
        assert!((result - 90.0).abs() < 1e-9, "got {result}");
    }

    #[test]
    fn test_straight_angle() {
        let result = angle(p(1.0, 0.0), p(0.0, 0.0), p(-1.0, 0.0));
        assert!((result - 180.0).abs() < 1e-9, "got {result}");
    }

    #[test]
    fn test_angle_is_symmetric() {
        let a = p(3.0, 7.0);
        let b = p(1.0, 1.0);
        let c = p(-4.0, 2.0);
        assert!((angle(a, b, c) - angle(c, b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_angle_returns_zero() {
        assert!(angle(p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)).abs() < f64::EPSILON);
        assert!(angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 0.0)).abs() < f64::EPSILON);
        let nan = angle(p(f64::NAN, 0.0), p(0.0, 0.0), p(1.0, 0.0));
        assert!(nan.abs() < f64::EPSILON);
    }

    #[test]
    fn test_hip_extension_straight_and_folded() {
        let straight = hip_extension_angle(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0));
        assert!((straight - 180.0).abs() < 1e-9);

        let right = hip_extension_angle(p(0.0, 0.0), p(1.0, 0.0), p(1.0, -1.0));
        assert!((right - 90.0).abs() < 1e-9);

        let folded = hip_extension_angle(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0001));
        assert!(folded < 1.0);
    }

    #[test]
    fn test_hip_extension_degenerate() {
        let result = hip_extension_angle(p(1.0, 1.0), p(1.0, 1.0), p(2.0, 2.0));
        assert!(result.abs() < f64::EPSILON);
    }

    #[test]
    fn test_inclination() {
        assert!(inclination_from_horizontal(p(0.0, 0.0), p(10.0, 0.0)).abs() < 1e-9);
        assert!((inclination_from_horizontal(p(0.0, 0.0), p(0.0, -10.0)) - 90.0).abs() < 1e-9);
        assert!((inclination_from_horizontal(p(5.0, 5.0), p(0.0, 0.0)) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_below_line() {
        let below = offset_below_line(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 3.0));
        assert!((below - 3.0).abs() < 1e-9);
        let above = offset_below_line(p(0.0, 0.0), p(10.0, 10.0), p(5.0, 0.0));
        assert!((above + 5.0).abs() < 1e-9);
        assert!(offset_below_line(p(0.0, 0.0), p(0.0, 10.0), p(5.0, 3.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_and_distance() {
        let m = midpoint(p(0.0, 0.0), p(4.0, 2.0));
        assert_eq!(m, p(2.0, 1.0));
        assert!((distance(p(0.0, 0.0), p(3.0, 4.0)) - 5.0).abs() < 1e-9);
    }
}
