// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for drone timelines.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Timeline errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// Keyframe index does not address an existing keyframe
    #[error("Keyframe index {index} out of range (track has {len} keyframes)")]
    KeyframeIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Keyframe count at the time of the request
        len: usize,
    },

    /// A keyframe field was NaN or infinite
    #[error("Keyframe {field} must be a finite number, got {value}")]
    NonFinite {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f32,
    },
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// A timestamped 3D waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds on the shared clock
    pub time: f32,
    /// Position (x, y, z)
    pub position: [f32; 3],
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f32, position: [f32; 3]) -> Self {
        Self { time, position }
    }

    /// Create a keyframe from untrusted input, rejecting NaN and infinities
    pub fn validated(time: f32, position: [f32; 3]) -> Result<Self> {
        check_finite("time", time)?;
        for (field, value) in ["x", "y", "z"].into_iter().zip(position) {
            check_finite(field, value)?;
        }
        Ok(Self::new(time, position))
    }

    /// X coordinate
    pub fn x(&self) -> f32 {
        self.position[0]
    }

    /// Y coordinate
    pub fn y(&self) -> f32 {
        self.position[1]
    }

    /// Z coordinate
    pub fn z(&self) -> f32 {
        self.position[2]
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TimelineError::NonFinite { field, value })
    }
}

impl fmt::Display for Keyframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} → ({}, {}, {})",
            self.time,
            self.x(),
            self.y(),
            self.z()
        )
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate Vec3, each axis independently
    pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }
}
