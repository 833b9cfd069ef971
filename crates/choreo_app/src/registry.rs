// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered drone registry and single selection.

use crate::drone::{Drone, DroneId};
use crate::visual::{VisualBackend, VisualHandle};
use indexmap::IndexMap;

/// One row of the drone list
#[derive(Debug, Clone, PartialEq)]
pub struct DroneListEntry {
    /// Drone ID
    pub id: DroneId,
    /// `"<name> #<id>"`
    pub label: String,
    /// Whether this is the selected drone
    pub selected: bool,
    /// Keyframe count
    pub keyframes: usize,
    /// Whether the manual override is engaged
    pub manual_override: bool,
}

/// Live drones in list order, plus the selection pointer
#[derive(Debug, Default)]
pub struct DroneRegistry {
    drones: IndexMap<DroneId, Drone>,
    selected: Option<DroneId>,
}

impl DroneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drone; the selection is unchanged
    pub fn add(&mut self, drone: Drone) -> DroneId {
        let id = drone.id();
        self.drones.insert(id, drone);
        id
    }

    /// Remove a drone, returning it with the index it occupied.
    ///
    /// Clears the selection if the drone was selected. Unknown IDs return `None`.
    pub fn take(&mut self, id: DroneId) -> Option<(usize, Drone)> {
        let (index, _, drone) = self.drones.shift_remove_full(&id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some((index, drone))
    }

    /// Insert a drone at `index`, clamped to the current length.
    ///
    /// Returns the index actually used.
    pub fn insert_at(&mut self, index: usize, drone: Drone) -> usize {
        let index = index.min(self.drones.len());
        self.drones.shift_insert(index, drone.id(), drone);
        index
    }

    /// Select a drone, moving the highlight off the previous one.
    ///
    /// Returns `false` when the ID is not in the registry.
    pub fn select(&mut self, id: DroneId, visuals: &mut dyn VisualBackend) -> bool {
        let Some(next) = self.drones.get(&id) else {
            return false;
        };
        let next_visual = next.visual();

        if let Some(previous) = self.selected.filter(|p| *p != id) {
            if let Some(handle) = self.drones.get(&previous).and_then(Drone::visual) {
                visuals.set_highlighted(handle, false);
            }
        }
        if let Some(handle) = next_visual {
            visuals.set_highlighted(handle, true);
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection, returning the previously selected ID
    pub fn deselect(&mut self, visuals: &mut dyn VisualBackend) -> Option<DroneId> {
        let previous = self.selected.take()?;
        if let Some(handle) = self.drones.get(&previous).and_then(Drone::visual) {
            visuals.set_highlighted(handle, false);
        }
        Some(previous)
    }

    /// Selected drone ID
    pub fn selected(&self) -> Option<DroneId> {
        self.selected
    }

    /// Selected drone
    pub fn selected_drone(&self) -> Option<&Drone> {
        self.drones.get(&self.selected?)
    }

    /// Selected drone, mutable
    pub fn selected_drone_mut(&mut self) -> Option<&mut Drone> {
        self.drones.get_mut(&self.selected?)
    }

    /// Get a drone by ID
    pub fn get(&self, id: DroneId) -> Option<&Drone> {
        self.drones.get(&id)
    }

    /// Position of a drone in list order
    pub fn index_of(&self, id: DroneId) -> Option<usize> {
        self.drones.get_index_of(&id)
    }

    /// Drone owning a visual
    pub fn find_by_visual(&self, handle: VisualHandle) -> Option<DroneId> {
        self.drones
            .values()
            .find(|d| d.visual() == Some(handle))
            .map(Drone::id)
    }

    /// Iterate drones in list order
    pub fn iter(&self) -> impl Iterator<Item = &Drone> {
        self.drones.values()
    }

    /// Iterate drones mutably in list order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Drone> {
        self.drones.values_mut()
    }

    /// Rows for the drone list, in registry order
    pub fn list_ordered(&self) -> Vec<DroneListEntry> {
        self.drones
            .values()
            .map(|d| DroneListEntry {
                id: d.id(),
                label: d.label(),
                selected: self.selected == Some(d.id()),
                keyframes: d.track().len(),
                manual_override: d.has_manual_override(),
            })
            .collect()
    }

    /// Number of live drones
    pub fn len(&self) -> usize {
        self.drones.len()
    }

    /// Whether there are no live drones
    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// Remove every drone
    pub fn drain(&mut self) -> impl Iterator<Item = Drone> + '_ {
        self.selected = None;
        self.drones.drain(..).map(|(_, drone)| drone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::{HeadlessVisuals, VisualKind};

    fn populate(registry: &mut DroneRegistry, visuals: &mut HeadlessVisuals, n: usize) -> Vec<DroneId> {
        (0..n)
            .map(|i| {
                let mut drone = Drone::new(format!("Drone {i}"), [i as f32, 0.5, 0.0]);
                drone.spawn_visual(visuals, VisualKind::Sphere { radius: 0.25 });
                registry.add(drone)
            })
            .collect()
    }

    #[test]
    fn test_add_keeps_order_and_selection() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 3);

        let order: Vec<DroneId> = registry.list_ordered().iter().map(|e| e.id).collect();
        assert_eq!(order, ids);
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn test_single_highlight() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 3);

        assert!(registry.select(ids[0], &mut visuals));
        assert!(registry.select(ids[2], &mut visuals));
        let expected = registry.get(ids[2]).and_then(Drone::visual);
        assert_eq!(visuals.highlighted(), expected.into_iter().collect::<Vec<_>>());

        let rows = registry.list_ordered();
        assert!(rows[2].selected);
        assert_eq!(rows.iter().filter(|r| r.selected).count(), 1);

        assert_eq!(registry.deselect(&mut visuals), Some(ids[2]));
        assert!(visuals.highlighted().is_empty());
    }

    #[test]
    fn test_select_unknown_is_rejected() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 1);
        registry.select(ids[0], &mut visuals);

        assert!(!registry.select(DroneId::new(), &mut visuals));
        assert_eq!(registry.selected(), Some(ids[0]));
    }

    #[test]
    fn test_take_clears_selection_and_reports_index() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 3);
        registry.select(ids[1], &mut visuals);

        let (index, drone) = registry.take(ids[1]).unwrap();
        assert_eq!(index, 1);
        assert_eq!(drone.id(), ids[1]);
        assert_eq!(registry.selected(), None);
        assert!(registry.take(ids[1]).is_none());
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 2);

        let late = Drone::new("Late", [0.0; 3]);
        let late_id = late.id();
        assert_eq!(registry.insert_at(9, late), 2);
        assert_eq!(registry.index_of(late_id), Some(2));

        let early = Drone::new("Early", [0.0; 3]);
        let early_id = early.id();
        assert_eq!(registry.insert_at(1, early), 1);
        let order: Vec<DroneId> = registry.iter().map(Drone::id).collect();
        assert_eq!(order, vec![ids[0], early_id, ids[1], late_id]);
    }

    #[test]
    fn test_find_by_visual() {
        let mut visuals = HeadlessVisuals::new();
        let mut registry = DroneRegistry::new();
        let ids = populate(&mut registry, &mut visuals, 2);
        let handle = registry.get(ids[1]).and_then(Drone::visual).unwrap();
        assert_eq!(registry.find_by_visual(handle), Some(ids[1]));
        assert_eq!(registry.find_by_visual(VisualHandle(999)), None);
    }
}
