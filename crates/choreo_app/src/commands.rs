// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator commands.
//!
//! The UI translates raw input into [`Command`] values and hands them to
//! [`Session::execute`]. A failed command is a notice for the operator: the
//! session is left exactly as it was.

use crate::drone::{Axis, DroneId};
use crate::history::HistoryError;
use crate::session::Session;
use crate::visual::VisualBackend;
use choreo_timeline::{Keyframe, TimelineError};
use std::time::Instant;

/// Error type for command execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The command needs a selected drone
    #[error("Select a drone first")]
    NoSelection,

    /// Drone not found
    #[error("Drone not found: {0}")]
    DroneNotFound(DroneId),

    /// History error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Timeline error
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// Manual position value was NaN or infinite
    #[error("Position must be a finite number, got {0}")]
    NonFinite(f32),
}

/// Commands exposed to the UI/input layer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a drone, at the configured spawn position unless one is given
    CreateDrone {
        /// Spawn position override
        spawn: Option<[f32; 3]>,
    },
    /// Create a drone on the ground point under a screen position
    SpawnAtScreen {
        /// Screen position in pixels
        screen: [f32; 2],
    },
    /// Select the drone under a screen position
    PickAtScreen {
        /// Screen position in pixels
        screen: [f32; 2],
    },
    /// Select a drone by ID
    Select(DroneId),
    /// Clear the selection
    Deselect,
    /// Delete the selected drone into the undo history
    DeleteSelected,
    /// Restore the most recently deleted drone
    Undo,
    /// Append a keyframe at the selected drone's position, timed by keyframe count
    AddKeyframe,
    /// Append a keyframe at the selected drone's position, one second after the last
    ApplyPositionToTimeline,
    /// Overwrite a keyframe of the selected drone
    EditKeyframe {
        /// Keyframe index
        index: usize,
        /// New time
        time: f32,
        /// New position
        position: [f32; 3],
    },
    /// Remove a keyframe of the selected drone
    RemoveKeyframe {
        /// Keyframe index
        index: usize,
    },
    /// Set one axis of the selected drone's position and engage its override
    SetManualPosition {
        /// Axis to set
        axis: Axis,
        /// New value
        value: f32,
    },
    /// Hand the selected drone back to the shared clock
    ClearManualOverride,
    /// Rename the selected drone
    Rename {
        /// New name
        name: String,
    },
    /// Start the shared clock from zero
    Play {
        /// Instant playback starts at
        at: Instant,
    },
    /// Stop the shared clock
    Stop,
}

impl Command {
    /// Get a description of this command
    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateDrone { .. } | Self::SpawnAtScreen { .. } => "Create Drone",
            Self::PickAtScreen { .. } | Self::Select(_) => "Select Drone",
            Self::Deselect => "Deselect",
            Self::DeleteSelected => "Delete Drone",
            Self::Undo => "Undo",
            Self::AddKeyframe => "Add Keyframe",
            Self::ApplyPositionToTimeline => "Apply Position to Timeline",
            Self::EditKeyframe { .. } => "Edit Keyframe",
            Self::RemoveKeyframe { .. } => "Remove Keyframe",
            Self::SetManualPosition { .. } => "Set Position",
            Self::ClearManualOverride => "Clear Override",
            Self::Rename { .. } => "Rename Drone",
            Self::Play { .. } => "Play",
            Self::Stop => "Stop",
        }
    }
}

/// What a successful command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// A drone was created
    Created(DroneId),
    /// A drone was selected
    Selected(DroneId),
    /// Nothing matched; state unchanged
    Unchanged,
    /// The selection was cleared
    Deselected(Option<DroneId>),
    /// A drone moved into the undo history
    Deleted {
        /// Deleted drone
        id: DroneId,
        /// Index it occupied
        index: usize,
    },
    /// A drone came back from the undo history
    Restored {
        /// Restored drone
        id: DroneId,
        /// Index it was inserted at
        index: usize,
    },
    /// A keyframe was appended
    KeyframeAdded(Keyframe),
    /// A keyframe was overwritten
    KeyframeEdited {
        /// Index that was edited
        index: usize,
    },
    /// A keyframe was removed
    KeyframeRemoved(Keyframe),
    /// The selected drone was moved by hand
    ManualPositionSet {
        /// Drone
        id: DroneId,
        /// Resulting position
        position: [f32; 3],
    },
    /// The selected drone follows the clock again
    OverrideCleared(DroneId),
    /// The selected drone was renamed
    Renamed(DroneId),
    /// The clock started
    PlaybackStarted {
        /// Drones with at least two keyframes
        animatable: usize,
    },
    /// The clock stopped
    PlaybackStopped,
}

impl Session {
    /// Execute a command against the session.
    ///
    /// Errors are operator notices; they are logged and leave the session untouched.
    pub fn execute(
        &mut self,
        command: Command,
        visuals: &mut dyn VisualBackend,
    ) -> Result<CommandOutcome, CommandError> {
        let description = command.description();
        let result = self.dispatch(command, visuals);
        match &result {
            Ok(outcome) => tracing::debug!("{description}: {outcome:?}"),
            Err(err) => tracing::warn!("{description}: {err}"),
        }
        result
    }

    fn dispatch(
        &mut self,
        command: Command,
        visuals: &mut dyn VisualBackend,
    ) -> Result<CommandOutcome, CommandError> {
        let outcome = match command {
            Command::CreateDrone { spawn } => CommandOutcome::Created(self.create_drone(spawn, visuals)?),
            Command::SpawnAtScreen { screen } => {
                CommandOutcome::Created(self.spawn_at_screen(screen, visuals)?)
            }
            Command::PickAtScreen { screen } => match self.pick_at(screen, visuals) {
                Some(id) => CommandOutcome::Selected(id),
                None => CommandOutcome::Unchanged,
            },
            Command::Select(id) => {
                self.select(id, visuals)?;
                CommandOutcome::Selected(id)
            }
            Command::Deselect => CommandOutcome::Deselected(self.deselect(visuals)),
            Command::DeleteSelected => {
                let (id, index) = self.delete_selected(visuals)?;
                CommandOutcome::Deleted { id, index }
            }
            Command::Undo => {
                let (id, index) = self.undo(visuals)?;
                CommandOutcome::Restored { id, index }
            }
            Command::AddKeyframe => CommandOutcome::KeyframeAdded(self.add_keyframe_from_current()?),
            Command::ApplyPositionToTimeline => {
                CommandOutcome::KeyframeAdded(self.apply_position_to_timeline()?)
            }
            Command::EditKeyframe { index, time, position } => {
                self.edit_keyframe(index, time, position)?;
                CommandOutcome::KeyframeEdited { index }
            }
            Command::RemoveKeyframe { index } => {
                CommandOutcome::KeyframeRemoved(self.remove_keyframe(index)?)
            }
            Command::SetManualPosition { axis, value } => {
                let (id, position) = self.set_manual_axis(axis, value, visuals)?;
                CommandOutcome::ManualPositionSet { id, position }
            }
            Command::ClearManualOverride => CommandOutcome::OverrideCleared(self.clear_override()?),
            Command::Rename { name } => CommandOutcome::Renamed(self.rename(name)?),
            Command::Play { at } => CommandOutcome::PlaybackStarted {
                animatable: self.play(at),
            },
            Command::Stop => {
                self.stop();
                CommandOutcome::PlaybackStopped
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ChoreoSettings;
    use crate::visual::HeadlessVisuals;
    use std::time::Duration;

    fn session() -> (Session, HeadlessVisuals) {
        (Session::new(ChoreoSettings::default()), HeadlessVisuals::new())
    }

    #[test]
    fn test_commands_without_selection_are_notices() {
        let (mut session, mut visuals) = session();
        session
            .execute(Command::CreateDrone { spawn: None }, &mut visuals)
            .unwrap();

        for command in [
            Command::AddKeyframe,
            Command::ApplyPositionToTimeline,
            Command::DeleteSelected,
            Command::ClearManualOverride,
            Command::SetManualPosition { axis: Axis::X, value: 1.0 },
        ] {
            assert_eq!(
                session.execute(command, &mut visuals),
                Err(CommandError::NoSelection)
            );
        }
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_undo_empty_is_notice() {
        let (mut session, mut visuals) = session();
        assert_eq!(
            session.execute(Command::Undo, &mut visuals),
            Err(CommandError::History(HistoryError::NothingToUndo))
        );
    }

    #[test]
    fn test_edit_out_of_range_leaves_track() {
        let (mut session, mut visuals) = session();
        let Ok(CommandOutcome::Created(id)) =
            session.execute(Command::CreateDrone { spawn: None }, &mut visuals)
        else {
            panic!("create failed");
        };
        session.execute(Command::Select(id), &mut visuals).unwrap();
        session.execute(Command::AddKeyframe, &mut visuals).unwrap();

        let result = session.execute(
            Command::EditKeyframe { index: 4, time: 1.0, position: [0.0; 3] },
            &mut visuals,
        );
        assert!(matches!(
            result,
            Err(CommandError::Timeline(TimelineError::KeyframeIndexOutOfRange { index: 4, len: 1 }))
        ));
        assert_eq!(session.registry().get(id).unwrap().track().len(), 1);
    }

    #[test]
    fn test_non_finite_manual_position_rejected() {
        let (mut session, mut visuals) = session();
        session
            .execute(Command::CreateDrone { spawn: Some([1.0, 2.0, 3.0]) }, &mut visuals)
            .unwrap();
        let id = session.registry().list_ordered()[0].id;
        session.execute(Command::Select(id), &mut visuals).unwrap();

        let result = session.execute(
            Command::SetManualPosition { axis: Axis::Y, value: f32::NAN },
            &mut visuals,
        );
        assert!(matches!(result, Err(CommandError::NonFinite(_))));
        let drone = session.registry().get(id).unwrap();
        assert_eq!(drone.position(), [1.0, 2.0, 3.0]);
        assert!(!drone.has_manual_override());
    }

    #[test]
    fn test_pick_at_screen_selects() {
        let (mut session, mut visuals) = session();
        session
            .execute(Command::CreateDrone { spawn: Some([2.0, 0.5, 1.0]) }, &mut visuals)
            .unwrap();
        let id = session.registry().list_ordered()[0].id;

        let screen = visuals.screen_point([2.0, 0.5, 1.0]);
        assert_eq!(
            session.execute(Command::PickAtScreen { screen }, &mut visuals),
            Ok(CommandOutcome::Selected(id))
        );
        assert_eq!(
            session.execute(Command::PickAtScreen { screen: [-900.0, 0.0] }, &mut visuals),
            Ok(CommandOutcome::Unchanged)
        );
        assert_eq!(session.registry().selected(), Some(id));
    }

    #[test]
    fn test_spawn_at_screen_uses_ground_point() {
        let (mut session, mut visuals) = session();
        let Ok(CommandOutcome::Created(id)) =
            session.execute(Command::SpawnAtScreen { screen: [300.0, -200.0] }, &mut visuals)
        else {
            panic!("spawn failed");
        };
        assert_eq!(session.registry().get(id).unwrap().position(), [3.0, 0.5, -2.0]);
    }

    #[test]
    fn test_non_finite_spawn_rejected() {
        let (mut session, mut visuals) = session();
        let result = session.execute(
            Command::CreateDrone { spawn: Some([f32::NAN, 0.0, 0.0]) },
            &mut visuals,
        );
        assert!(matches!(result, Err(CommandError::NonFinite(v)) if v.is_nan()));
        assert!(session.registry().is_empty());
        assert!(visuals.is_empty());

        let result = session.execute(
            Command::CreateDrone { spawn: Some([0.0, f32::INFINITY, 0.0]) },
            &mut visuals,
        );
        assert_eq!(result, Err(CommandError::NonFinite(f32::INFINITY)));
        assert_eq!(
            session.execute(Command::AddKeyframe, &mut visuals),
            Err(CommandError::NoSelection)
        );
    }

    #[test]
    fn test_spawn_at_screen_overflow_uses_spawn_position() {
        let mut session = Session::default();
        let mut visuals = HeadlessVisuals::with_pixels_per_unit(0.5);
        let Ok(CommandOutcome::Created(id)) =
            session.execute(Command::SpawnAtScreen { screen: [f32::MAX, 0.0] }, &mut visuals)
        else {
            panic!("spawn failed");
        };
        assert_eq!(session.registry().get(id).unwrap().position(), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_scripted_show() {
        let (mut session, mut visuals) = session();
        let Ok(CommandOutcome::Created(id)) =
            session.execute(Command::CreateDrone { spawn: Some([0.0; 3]) }, &mut visuals)
        else {
            panic!("create failed");
        };

        let script = vec![
            Command::Select(id),
            Command::AddKeyframe,
            Command::SetManualPosition { axis: Axis::X, value: 10.0 },
            Command::AddKeyframe,
            Command::EditKeyframe { index: 1, time: 2.0, position: [10.0, 0.0, 0.0] },
            Command::ClearManualOverride,
        ];
        for command in script {
            session.execute(command, &mut visuals).unwrap();
        }

        let t0 = Instant::now();
        assert_eq!(
            session.execute(Command::Play { at: t0 }, &mut visuals),
            Ok(CommandOutcome::PlaybackStarted { animatable: 1 })
        );
        session.tick(t0 + Duration::from_secs(1), &mut visuals);
        assert_eq!(session.registry().get(id).unwrap().position(), [5.0, 0.0, 0.0]);

        session.execute(Command::Stop, &mut visuals).unwrap();
        session.tick(t0 + Duration::from_secs(2), &mut visuals);
        assert_eq!(session.registry().get(id).unwrap().position(), [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rename_and_remove_keyframe() {
        let (mut session, mut visuals) = session();
        session
            .execute(Command::CreateDrone { spawn: None }, &mut visuals)
            .unwrap();
        let id = session.registry().list_ordered()[0].id;
        session.execute(Command::Select(id), &mut visuals).unwrap();
        session.execute(Command::ApplyPositionToTimeline, &mut visuals).unwrap();
        session
            .execute(Command::Rename { name: "Lead".to_string() }, &mut visuals)
            .unwrap();

        let removed = session.execute(Command::RemoveKeyframe { index: 0 }, &mut visuals);
        assert!(matches!(removed, Ok(CommandOutcome::KeyframeRemoved(k)) if k.time == 0.0));
        let drone = session.registry().get(id).unwrap();
        assert_eq!(drone.name(), "Lead");
        assert!(drone.track().is_empty());
    }
}
