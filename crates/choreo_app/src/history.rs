// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo history for drone deletion.
//!
//! Deleted drones are moved, not copied, into the stack together with the
//! registry index they occupied. The stack is bounded; pushing past capacity
//! drops the oldest entry for good.

use crate::drone::Drone;
use std::collections::VecDeque;
use thiserror::Error;

/// Default undo history depth
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// A deleted drone waiting to be restored
#[derive(Debug)]
pub struct DeletedDrone {
    /// The drone, with its keyframes and visual handle
    pub drone: Drone,
    /// Registry index before deletion
    pub original_index: usize,
}

impl DeletedDrone {
    /// Create a new entry
    pub fn new(drone: Drone, original_index: usize) -> Self {
        Self {
            drone,
            original_index,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        format!("Delete {}", self.drone.label())
    }
}

/// Bounded LIFO of deleted drones
#[derive(Debug)]
pub struct UndoStack {
    /// Oldest at the front, newest at the back
    entries: VecDeque<DeletedDrone>,
    /// Maximum depth
    capacity: usize,
}

impl UndoStack {
    /// Create a stack with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }

    /// Create with custom capacity (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Push an entry, returning the entry evicted to stay within capacity
    pub fn push(&mut self, entry: DeletedDrone) -> Option<DeletedDrone> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_front();
            if let Some(old) = &evicted {
                tracing::debug!("Undo history full, dropping '{}'", old.description());
            }
            evicted
        } else {
            None
        }
    }

    /// Pop the most recent entry
    pub fn pop(&mut self) -> Result<DeletedDrone> {
        self.entries.pop_back().ok_or(HistoryError::NothingToUndo)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get undo stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Maximum depth
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<String> {
        self.entries.back().map(DeletedDrone::description)
    }

    /// Remove every entry, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = DeletedDrone> + '_ {
        self.entries.drain(..)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
