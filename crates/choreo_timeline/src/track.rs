// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-drone keyframe store and position interpolation.

use crate::keyframe::{Interpolation, Keyframe, Result, TimelineError};
use serde::{Deserialize, Serialize};

/// Ordered keyframe store owned by a single drone.
///
/// Keyframes are kept sorted ascending by time after every mutation.
/// Duplicate times are allowed; when two keyframes share a time the first
/// bracketing pair found by [`interpolate`] wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyframe whose time is the current keyframe count.
    ///
    /// Returns the keyframe that was stored.
    pub fn add_keyframe(&mut self, position: [f32; 3]) -> Keyframe {
        let keyframe = Keyframe::new(self.keyframes.len() as f32, position);
        self.keyframes.push(keyframe);
        self.sort_keyframes();
        keyframe
    }

    /// Append a keyframe one second after the last one (or at zero when empty)
    pub fn append_at_next_slot(&mut self, position: [f32; 3]) -> Keyframe {
        let time = self.keyframes.last().map_or(0.0, |k| k.time + 1.0);
        let keyframe = Keyframe::new(time, position);
        self.keyframes.push(keyframe);
        self.sort_keyframes();
        keyframe
    }

    /// Overwrite the keyframe at `index`, then re-sort by time
    pub fn update_keyframe(&mut self, index: usize, time: f32, position: [f32; 3]) -> Result<()> {
        let len = self.keyframes.len();
        let slot = self
            .keyframes
            .get_mut(index)
            .ok_or(TimelineError::KeyframeIndexOutOfRange { index, len })?;
        *slot = Keyframe::validated(time, position)?;
        self.sort_keyframes();
        Ok(())
    }

    /// Remove the keyframe at `index`
    pub fn remove_keyframe(&mut self, index: usize) -> Result<Keyframe> {
        if index >= self.keyframes.len() {
            return Err(TimelineError::KeyframeIndexOutOfRange {
                index,
                len: self.keyframes.len(),
            });
        }
        Ok(self.keyframes.remove(index))
    }

    /// Sort keyframes by time (stable, so equal times keep insertion order)
    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Evaluate the position at a given time, `None` outside the keyframed range
    pub fn evaluate(&self, time: f32) -> Option<[f32; 3]> {
        interpolate(&self.keyframes, time)
    }

    /// Whether the track has enough keyframes to move under the clock
    pub fn is_playable(&self) -> bool {
        self.keyframes.len() >= 2
    }

    /// First and last keyframe times
    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.keyframes.first()?.time, self.keyframes.last()?.time))
    }

    /// Get the duration (time of last keyframe)
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the track has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

/// Linearly interpolate a position from keyframes sorted ascending by time.
///
/// Returns `None` when `time` lies outside `[first.time, last.time]`, when
/// there are fewer than two keyframes, or when `time` is NaN. Queries that
/// land exactly on a keyframe return that keyframe's position unchanged, and
/// zero-length segments snap to their later keyframe.
pub fn interpolate(keyframes: &[Keyframe], time: f32) -> Option<[f32; 3]> {
    let (a, b) = keyframes
        .windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .find(|(a, b)| a.time <= time && time <= b.time)?;

    let duration = b.time - a.time;
    if duration <= 0.0 || time >= b.time {
        return Some(b.position);
    }
    if time <= a.time {
        return Some(a.position);
    }

    let t = (time - a.time) / duration;
    Some(Interpolation::lerp_vec3(a.position, b.position, t))
}
