// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drone entities.
//!
//! A drone owns its keyframe track and its current transform. On each tick it
//! either follows the shared clock through its track or, while a manual
//! override is active, holds the position the operator typed in.

use crate::visual::{VisualBackend, VisualHandle, VisualKind};
use choreo_timeline::KeyframeTrack;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for drones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroneId(pub Uuid);

impl DroneId {
    /// Create a new random drone ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DroneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form for list labels and logs
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis (up)
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// Component index in a `[f32; 3]`
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Position and euler rotation of a drone
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Rotation in euler angles (radians)
    pub rotation: [f32; 3],
}

impl Transform {
    /// Transform at a position with no rotation
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: [0.0; 3],
        }
    }
}

/// One independently animatable drone
#[derive(Debug)]
pub struct Drone {
    id: DroneId,
    name: String,
    transform: Transform,
    track: KeyframeTrack,
    manual_override: bool,
    color: [u8; 3],
    visual: Option<VisualHandle>,
}

impl Drone {
    /// Create a drone with a fresh ID, no rotation and an empty track
    pub fn new(name: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            id: DroneId::new(),
            name: name.into(),
            transform: Transform::at(position),
            track: KeyframeTrack::new(),
            manual_override: false,
            color: [255, 255, 255],
            visual: None,
        }
    }

    /// Set the display color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Create this drone's visual in the backend
    pub fn spawn_visual(&mut self, visuals: &mut dyn VisualBackend, kind: VisualKind) -> VisualHandle {
        let handle = visuals.create_visual(kind, &self.transform);
        visuals.set_color(handle, self.color);
        self.visual = Some(handle);
        handle
    }

    /// Evaluate the track at the shared clock time and refresh the visual.
    ///
    /// With a manual override active the position is left alone. Times outside
    /// the keyframed range also leave it alone, so the drone holds its last pose.
    pub fn apply_time(&mut self, time: f32, visuals: &mut dyn VisualBackend) {
        if !self.manual_override {
            if let Some(position) = self.track.evaluate(time) {
                self.transform.position = position;
            }
        }
        self.sync_visual(visuals);
    }

    /// Overwrite the given axes and engage the manual override
    pub fn set_manual_position(
        &mut self,
        x: Option<f32>,
        y: Option<f32>,
        z: Option<f32>,
        visuals: &mut dyn VisualBackend,
    ) {
        for (slot, value) in self.transform.position.iter_mut().zip([x, y, z]) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        self.manual_override = true;
        self.sync_visual(visuals);
    }

    /// Overwrite a single axis and engage the manual override
    pub fn set_manual_axis(&mut self, axis: Axis, value: f32, visuals: &mut dyn VisualBackend) {
        let mut axes = [None; 3];
        axes[axis.index()] = Some(value);
        let [x, y, z] = axes;
        self.set_manual_position(x, y, z, visuals);
    }

    /// Hand the drone back to the shared clock.
    ///
    /// The position is not re-snapped; the next playing tick moves it.
    pub fn clear_override(&mut self) {
        self.manual_override = false;
    }

    /// Push the current transform to the visual
    pub fn sync_visual(&self, visuals: &mut dyn VisualBackend) {
        if let Some(handle) = self.visual {
            visuals.set_transform(handle, &self.transform);
        }
    }

    /// Drone ID
    pub fn id(&self) -> DroneId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the drone
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// List label, `"<name> #<id>"`
    pub fn label(&self) -> String {
        format!("{} #{}", self.name, self.id)
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Current position
    pub fn position(&self) -> [f32; 3] {
        self.transform.position
    }

    /// Keyframe track
    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    /// Mutable keyframe track
    pub fn track_mut(&mut self) -> &mut KeyframeTrack {
        &mut self.track
    }

    /// Whether the clock is currently bypassed for this drone
    pub fn has_manual_override(&self) -> bool {
        self.manual_override
    }

    /// Display color
    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// Visual handle, if a visual was spawned
    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::HeadlessVisuals;

    fn keyed_drone(visuals: &mut HeadlessVisuals) -> Drone {
        let mut drone = Drone::new("Drone", [0.0, 0.0, 0.0]);
        drone.spawn_visual(visuals, VisualKind::Sphere { radius: 0.25 });
        drone.track_mut().add_keyframe([0.0, 0.0, 0.0]);
        drone.track_mut().add_keyframe([10.0, 0.0, 0.0]);
        drone.track_mut().update_keyframe(1, 2.0, [10.0, 0.0, 0.0]).unwrap();
        drone
    }

    #[test]
    fn test_apply_time_follows_track() {
        let mut visuals = HeadlessVisuals::new();
        let mut drone = keyed_drone(&mut visuals);

        drone.apply_time(1.0, &mut visuals);
        assert_eq!(drone.position(), [5.0, 0.0, 0.0]);

        drone.apply_time(2.0, &mut visuals);
        assert_eq!(drone.position(), [10.0, 0.0, 0.0]);

        // Past the last keyframe: hold the last pose
        drone.apply_time(3.0, &mut visuals);
        assert_eq!(drone.position(), [10.0, 0.0, 0.0]);

        let record = visuals.record(drone.visual().unwrap()).unwrap();
        assert_eq!(record.transform.position, [10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_manual_override_blocks_interpolation() {
        let mut visuals = HeadlessVisuals::new();
        let mut drone = keyed_drone(&mut visuals);

        drone.set_manual_position(Some(3.0), None, Some(-1.0), &mut visuals);
        assert!(drone.has_manual_override());
        assert_eq!(drone.position(), [3.0, 0.0, -1.0]);

        for time in [0.0, 0.5, 1.0, 2.0] {
            drone.apply_time(time, &mut visuals);
            assert_eq!(drone.position(), [3.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_override_still_refreshes_visual() {
        let mut visuals = HeadlessVisuals::new();
        let mut drone = keyed_drone(&mut visuals);
        let handle = drone.visual().unwrap();

        drone.set_manual_axis(Axis::Y, 4.0, &mut visuals);
        let updates = visuals.record(handle).unwrap().transform_updates;
        drone.apply_time(1.0, &mut visuals);
        assert_eq!(visuals.record(handle).unwrap().transform_updates, updates + 1);
    }

    #[test]
    fn test_clear_override_resumes_without_resnap() {
        let mut visuals = HeadlessVisuals::new();
        let mut drone = keyed_drone(&mut visuals);

        drone.set_manual_axis(Axis::X, 7.0, &mut visuals);
        drone.clear_override();
        assert!(!drone.has_manual_override());
        assert_eq!(drone.position(), [7.0, 0.0, 0.0]);

        drone.apply_time(1.0, &mut visuals);
        assert_eq!(drone.position(), [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_label_uses_short_id() {
        let drone = Drone::new("Scout", [0.0; 3]);
        let label = drone.label();
        assert!(label.starts_with("Scout #"));
        assert_eq!(label.len(), "Scout #".len() + 8);
    }
}
