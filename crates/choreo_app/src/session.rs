// SPDX-License-Identifier: MIT OR Apache-2.0
//! Choreography session state.
//!
//! A [`Session`] owns everything one editing session needs: settings, the
//! shared clock, the drone registry with its selection, and the undo history.
//! The host constructs it once, feeds it commands between frames, calls
//! [`Session::tick`] once per frame, and hands it to [`Session::shutdown`] at
//! the end.

use crate::commands::CommandError;
use crate::drone::{Axis, Drone, DroneId};
use crate::history::{DeletedDrone, UndoStack};
use crate::registry::{DroneListEntry, DroneRegistry};
use crate::settings::ChoreoSettings;
use crate::visual::{VisualBackend, VisualKind};
use choreo_timeline::{Keyframe, SharedClock};
use std::time::Instant;

/// Main session state
pub struct Session {
    /// Session settings
    settings: ChoreoSettings,
    /// Shared playback clock
    clock: SharedClock,
    /// Live drones and selection
    registry: DroneRegistry,
    /// Deleted drones
    undo: UndoStack,
    /// Drones created so far (drives palette assignment)
    spawned: usize,
    /// Ticks processed
    frame_count: u64,
}

impl Session {
    /// Create a new session
    pub fn new(settings: ChoreoSettings) -> Self {
        let mut clock = SharedClock::new();
        clock.set_time_scale(settings.time_scale);
        let undo = UndoStack::with_capacity(settings.undo_capacity);
        tracing::info!(
            undo_capacity = undo.capacity(),
            time_scale = clock.time_scale(),
            "Created choreography session"
        );

        Self {
            settings,
            clock,
            registry: DroneRegistry::new(),
            undo,
            spawned: 0,
            frame_count: 0,
        }
    }

    /// Advance one frame.
    ///
    /// The clock advances first, then drones update in registry order. While
    /// the clock is stopped drones keep their pose and only refresh visuals.
    pub fn tick(&mut self, now: Instant, visuals: &mut dyn VisualBackend) {
        self.clock.update(now);
        let playing = self.clock.is_playing();
        let time = self.clock.current_time();

        for drone in self.registry.iter_mut() {
            if playing {
                drone.apply_time(time, visuals);
            } else {
                drone.sync_visual(visuals);
            }
        }

        let marker = self.registry.selected_drone().map(Drone::position);
        visuals.place_selection_marker(marker);
        self.frame_count += 1;
    }

    /// Create a drone at `spawn`, or at the configured spawn position.
    ///
    /// Non-finite coordinates are rejected before anything is created.
    pub fn create_drone(
        &mut self,
        spawn: Option<[f32; 3]>,
        visuals: &mut dyn VisualBackend,
    ) -> Result<DroneId, CommandError> {
        let position = spawn.unwrap_or(self.settings.spawn_position);
        if let Some(bad) = position.into_iter().find(|v| !v.is_finite()) {
            return Err(CommandError::NonFinite(bad));
        }
        let color = self.settings.color_for(self.spawned);
        self.spawned += 1;

        let mut drone = Drone::new(self.settings.default_drone_name.clone(), position).with_color(color);
        drone.spawn_visual(
            visuals,
            VisualKind::Sphere {
                radius: self.settings.drone_radius,
            },
        );
        tracing::info!("Created {} at {:?}", drone.label(), position);
        Ok(self.registry.add(drone))
    }

    /// Create a drone above the ground point under a screen position.
    ///
    /// Falls back to the configured spawn position when nothing usable is under it.
    pub fn spawn_at_screen(
        &mut self,
        screen: [f32; 2],
        visuals: &mut dyn VisualBackend,
    ) -> Result<DroneId, CommandError> {
        let height = self.settings.spawn_position[1];
        let spawn = visuals
            .project_ground_point(screen)
            .filter(|point| point.iter().all(|v| v.is_finite()))
            .map(|[x, _, z]| [x, height, z]);
        self.create_drone(spawn, visuals)
    }

    /// Select the drone under a screen position; misses leave the selection alone
    pub fn pick_at(&mut self, screen: [f32; 2], visuals: &mut dyn VisualBackend) -> Option<DroneId> {
        let handle = visuals.pick_visual_at(screen)?;
        let id = self.registry.find_by_visual(handle)?;
        self.registry.select(id, visuals);
        Some(id)
    }

    /// Select a drone
    pub fn select(&mut self, id: DroneId, visuals: &mut dyn VisualBackend) -> Result<(), CommandError> {
        if self.registry.select(id, visuals) {
            Ok(())
        } else {
            Err(CommandError::DroneNotFound(id))
        }
    }

    /// Clear the selection
    pub fn deselect(&mut self, visuals: &mut dyn VisualBackend) -> Option<DroneId> {
        self.registry.deselect(visuals)
    }

    /// Move a drone into the undo history.
    ///
    /// Returns the index it occupied, or `None` when the ID is unknown.
    pub fn remove_drone(&mut self, id: DroneId, visuals: &mut dyn VisualBackend) -> Option<usize> {
        let (index, drone) = self.registry.take(id)?;
        if let Some(handle) = drone.visual() {
            visuals.set_highlighted(handle, false);
            visuals.detach_visual(handle);
        }
        tracing::info!("Deleted {} at index {index}", drone.label());

        if let Some(evicted) = self.undo.push(DeletedDrone::new(drone, index)) {
            if let Some(handle) = evicted.drone.visual() {
                visuals.dispose_visual(handle);
            }
        }
        Some(index)
    }

    /// Delete the selected drone
    pub fn delete_selected(&mut self, visuals: &mut dyn VisualBackend) -> Result<(DroneId, usize), CommandError> {
        let id = self.registry.selected().ok_or(CommandError::NoSelection)?;
        let index = self
            .remove_drone(id, visuals)
            .ok_or(CommandError::DroneNotFound(id))?;
        Ok((id, index))
    }

    /// Restore the most recently deleted drone and select it
    pub fn undo(&mut self, visuals: &mut dyn VisualBackend) -> Result<(DroneId, usize), CommandError> {
        let entry = self.undo.pop()?;
        let id = entry.drone.id();
        let handle = entry.drone.visual();
        let index = self.registry.insert_at(entry.original_index, entry.drone);

        if let Some(handle) = handle {
            visuals.attach_visual(handle);
        }
        if let Some(drone) = self.registry.get(id) {
            drone.sync_visual(visuals);
        }
        self.registry.select(id, visuals);

        tracing::info!(
            "Restored drone {id} at index {index} (requested {})",
            entry.original_index
        );
        Ok((id, index))
    }

    fn selected_mut(&mut self) -> Result<&mut Drone, CommandError> {
        self.registry
            .selected_drone_mut()
            .ok_or(CommandError::NoSelection)
    }

    /// Add a keyframe at the selected drone's position, timed by keyframe count
    pub fn add_keyframe_from_current(&mut self) -> Result<Keyframe, CommandError> {
        let drone = self.selected_mut()?;
        let position = drone.position();
        let keyframe = drone.track_mut().add_keyframe(position);
        tracing::debug!("{}: added keyframe {keyframe}", drone.label());
        Ok(keyframe)
    }

    /// Add a keyframe at the selected drone's position, one second after the last
    pub fn apply_position_to_timeline(&mut self) -> Result<Keyframe, CommandError> {
        let drone = self.selected_mut()?;
        let position = drone.position();
        let keyframe = drone.track_mut().append_at_next_slot(position);
        tracing::debug!("{}: applied position as keyframe {keyframe}", drone.label());
        Ok(keyframe)
    }

    /// Overwrite a keyframe of the selected drone
    pub fn edit_keyframe(&mut self, index: usize, time: f32, position: [f32; 3]) -> Result<(), CommandError> {
        let drone = self.selected_mut()?;
        drone.track_mut().update_keyframe(index, time, position)?;
        Ok(())
    }

    /// Remove a keyframe of the selected drone
    pub fn remove_keyframe(&mut self, index: usize) -> Result<Keyframe, CommandError> {
        let drone = self.selected_mut()?;
        Ok(drone.track_mut().remove_keyframe(index)?)
    }

    /// Set one axis of the selected drone and engage its override
    pub fn set_manual_axis(
        &mut self,
        axis: Axis,
        value: f32,
        visuals: &mut dyn VisualBackend,
    ) -> Result<(DroneId, [f32; 3]), CommandError> {
        if !value.is_finite() {
            return Err(CommandError::NonFinite(value));
        }
        let drone = self.selected_mut()?;
        drone.set_manual_axis(axis, value, visuals);
        Ok((drone.id(), drone.position()))
    }

    /// Hand the selected drone back to the shared clock
    pub fn clear_override(&mut self) -> Result<DroneId, CommandError> {
        let drone = self.selected_mut()?;
        drone.clear_override();
        Ok(drone.id())
    }

    /// Rename the selected drone
    pub fn rename(&mut self, name: String) -> Result<DroneId, CommandError> {
        let drone = self.selected_mut()?;
        drone.rename(name);
        Ok(drone.id())
    }

    /// Start the shared clock from zero, returning how many drones can move
    pub fn play(&mut self, now: Instant) -> usize {
        let animatable = self
            .registry
            .iter()
            .filter(|d| d.track().is_playable())
            .count();
        if animatable == 0 {
            tracing::warn!("No drone has two keyframes yet; nothing will move");
        }
        self.clock.play(now);
        animatable
    }

    /// Stop the shared clock
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Tear the session down, releasing every visual it still holds
    pub fn shutdown(mut self, visuals: &mut dyn VisualBackend) {
        let mut released = 0;
        for drone in self.registry.drain() {
            if let Some(handle) = drone.visual() {
                visuals.dispose_visual(handle);
                released += 1;
            }
        }
        for entry in self.undo.drain() {
            if let Some(handle) = entry.drone.visual() {
                visuals.dispose_visual(handle);
                released += 1;
            }
        }
        visuals.place_selection_marker(None);
        tracing::info!(frames = self.frame_count, released, "Session shut down");
    }

    /// Session settings
    pub fn settings(&self) -> &ChoreoSettings {
        &self.settings
    }

    /// Shared clock
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Drone registry
    pub fn registry(&self) -> &DroneRegistry {
        &self.registry
    }

    /// Undo history
    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    /// Rows for the drone list
    pub fn list_ordered(&self) -> Vec<DroneListEntry> {
        self.registry.list_ordered()
    }

    /// Ticks processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ChoreoSettings::default())
    }
}
