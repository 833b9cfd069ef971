// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared playback clock.
//!
//! One clock drives every drone in a session, so all timelines are sampled at
//! the same elapsed time on a given tick. Drones never own a clock.

use std::time::Instant;

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Stopped (elapsed time frozen)
    #[default]
    Stopped,
    /// Playing
    Playing,
}

/// Global play/stop/elapsed-time source
#[derive(Debug, Clone)]
pub struct SharedClock {
    /// Current state
    state: ClockState,
    /// Instant of the last `play`
    start_epoch: Option<Instant>,
    /// Elapsed seconds since `play`, frozen while stopped
    current_time: f32,
    /// Playback speed multiplier
    time_scale: f32,
}

impl SharedClock {
    /// Create a stopped clock at time zero
    pub fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            start_epoch: None,
            current_time: 0.0,
            time_scale: 1.0,
        }
    }

    /// Start playback from zero.
    ///
    /// Calling this while already playing restarts from zero; it never resumes.
    pub fn play(&mut self, now: Instant) {
        if self.state == ClockState::Playing {
            tracing::debug!("Restarting shared clock from zero");
        } else {
            tracing::info!("Shared clock started");
        }
        self.state = ClockState::Playing;
        self.start_epoch = Some(now);
        self.current_time = 0.0;
    }

    /// Stop playback, keeping the last computed time
    pub fn stop(&mut self) {
        if self.state == ClockState::Playing {
            tracing::info!(time = self.current_time, "Shared clock stopped");
        }
        self.state = ClockState::Stopped;
    }

    /// Recompute the elapsed time (no-op while stopped)
    pub fn update(&mut self, now: Instant) {
        if self.state != ClockState::Playing {
            return;
        }
        let Some(start) = self.start_epoch else {
            return;
        };
        self.current_time = now.saturating_duration_since(start).as_secs_f32() * self.time_scale;
    }

    /// Elapsed seconds since the last `play`
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    /// Get the current state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Get the time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set time scale (clamped to reasonable range)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.clamp(0.0, 10.0) } else { 1.0 };
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new()
    }
}
