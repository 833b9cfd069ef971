// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drone choreography session.
//!
//! Builds on `choreo_timeline` to provide:
//! - Drone entities with manual position overrides
//! - An ordered registry with single selection
//! - Bounded undo of deletions, restoring drones at their original index
//! - A command layer for the UI/input collaborator
//! - A visual backend seam for rendering and picking
//!
//! ## Architecture
//!
//! [`Session`] is the owning context. The host loop calls [`Session::tick`]
//! once per frame and [`Session::execute`] for each operator command; both
//! run on the same thread and never overlap.

pub mod commands;
pub mod drone;
pub mod history;
pub mod registry;
pub mod session;
pub mod settings;
pub mod visual;

pub use commands::{Command, CommandError, CommandOutcome};
pub use drone::{Axis, Drone, DroneId, Transform};
pub use history::{DeletedDrone, HistoryError, UndoStack};
pub use registry::{DroneListEntry, DroneRegistry};
pub use session::Session;
pub use settings::{ChoreoSettings, SettingsError};
pub use visual::{HeadlessVisuals, VisualBackend, VisualHandle, VisualKind};
