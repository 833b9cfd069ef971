// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline engine for drone choreography.
//!
//! This crate provides the timing core shared by every drone in a show:
//! - Per-drone keyframe stores kept sorted by time
//! - Linear position interpolation between bracketing keyframes
//! - A single shared clock that all drones sample
//!
//! ## Architecture
//!
//! Drones own a [`KeyframeTrack`]; the session owns one [`SharedClock`].
//! Each frame the clock advances first, then every drone evaluates its track
//! at [`SharedClock::current_time`].

pub mod clock;
pub mod keyframe;
pub mod track;

pub use clock::{ClockState, SharedClock};
pub use keyframe::{Interpolation, Keyframe, TimelineError};
pub use track::{interpolate, KeyframeTrack};
