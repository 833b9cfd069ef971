// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual backend seam.
//!
//! Rendering, picking and ground projection live outside the session. The
//! session only talks to a [`VisualBackend`]; [`HeadlessVisuals`] is an
//! in-memory implementation used by the command-line host and by tests.

use crate::drone::Transform;
use indexmap::IndexMap;

/// Opaque handle to a visual owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Shape of a visual
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualKind {
    /// Sphere of the given radius
    Sphere {
        /// Radius in world units
        radius: f32,
    },
}

impl VisualKind {
    /// Pick radius in world units
    pub fn radius(&self) -> f32 {
        match self {
            Self::Sphere { radius } => *radius,
        }
    }
}

/// Rendering collaborator consumed by the session
pub trait VisualBackend {
    /// Create a visual and attach it to the scene
    fn create_visual(&mut self, kind: VisualKind, transform: &Transform) -> VisualHandle;

    /// Update a visual's transform
    fn set_transform(&mut self, handle: VisualHandle, transform: &Transform);

    /// Toggle the selection highlight
    fn set_highlighted(&mut self, handle: VisualHandle, highlighted: bool);

    /// Set the base color
    fn set_color(&mut self, handle: VisualHandle, color: [u8; 3]);

    /// Remove a visual from the scene, keeping its resources
    fn detach_visual(&mut self, handle: VisualHandle);

    /// Put a detached visual back into the scene
    fn attach_visual(&mut self, handle: VisualHandle);

    /// Release a visual for good
    fn dispose_visual(&mut self, handle: VisualHandle);

    /// Visual under a screen point, if any
    fn pick_visual_at(&self, screen: [f32; 2]) -> Option<VisualHandle>;

    /// Ground-plane point under a screen point, if any
    fn project_ground_point(&self, screen: [f32; 2]) -> Option<[f32; 3]>;

    /// Show the selection marker under a position, or hide it
    fn place_selection_marker(&mut self, position: Option<[f32; 3]>);
}

/// State of one headless visual
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRecord {
    /// Shape
    pub kind: VisualKind,
    /// Last transform pushed
    pub transform: Transform,
    /// Base color
    pub color: [u8; 3],
    /// Selection highlight
    pub highlighted: bool,
    /// Whether the visual is in the scene
    pub attached: bool,
    /// Number of `set_transform` calls received
    pub transform_updates: u64,
}

/// In-memory backend with a top-down orthographic camera.
///
/// Screen pixels map to the ground plane as `x = sx / ppu`, `z = sy / ppu`.
#[derive(Debug)]
pub struct HeadlessVisuals {
    visuals: IndexMap<VisualHandle, VisualRecord>,
    next_handle: u64,
    pixels_per_unit: f32,
    marker: Option<[f32; 3]>,
}

impl HeadlessVisuals {
    /// Create a backend at 100 pixels per world unit
    pub fn new() -> Self {
        Self::with_pixels_per_unit(100.0)
    }

    /// Create a backend with a custom projection scale
    pub fn with_pixels_per_unit(pixels_per_unit: f32) -> Self {
        Self {
            visuals: IndexMap::new(),
            next_handle: 1,
            pixels_per_unit: pixels_per_unit.max(f32::EPSILON),
            marker: None,
        }
    }

    /// Get the record of a visual (disposed visuals are gone)
    pub fn record(&self, handle: VisualHandle) -> Option<&VisualRecord> {
        self.visuals.get(&handle)
    }

    /// Handles currently highlighted
    pub fn highlighted(&self) -> Vec<VisualHandle> {
        self.visuals
            .iter()
            .filter(|(_, r)| r.highlighted && r.attached)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Number of attached visuals
    pub fn attached_count(&self) -> usize {
        self.visuals.values().filter(|r| r.attached).count()
    }

    /// Number of visuals not yet disposed
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    /// Whether every visual was disposed
    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// Where the selection marker is shown
    pub fn selection_marker(&self) -> Option<[f32; 3]> {
        self.marker
    }

    /// Screen point above a world position
    pub fn screen_point(&self, position: [f32; 3]) -> [f32; 2] {
        [
            position[0] * self.pixels_per_unit,
            position[2] * self.pixels_per_unit,
        ]
    }

    fn with_record(&mut self, handle: VisualHandle, f: impl FnOnce(&mut VisualRecord)) {
        match self.visuals.get_mut(&handle) {
            Some(record) => f(record),
            None => tracing::trace!(?handle, "Ignoring call on unknown visual"),
        }
    }
}

impl Default for HeadlessVisuals {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualBackend for HeadlessVisuals {
    fn create_visual(&mut self, kind: VisualKind, transform: &Transform) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(
            handle,
            VisualRecord {
                kind,
                transform: *transform,
                color: [255, 255, 255],
                highlighted: false,
                attached: true,
                transform_updates: 0,
            },
        );
        handle
    }

    fn set_transform(&mut self, handle: VisualHandle, transform: &Transform) {
        self.with_record(handle, |r| {
            r.transform = *transform;
            r.transform_updates += 1;
        });
    }

    fn set_highlighted(&mut self, handle: VisualHandle, highlighted: bool) {
        self.with_record(handle, |r| r.highlighted = highlighted);
    }

    fn set_color(&mut self, handle: VisualHandle, color: [u8; 3]) {
        self.with_record(handle, |r| r.color = color);
    }

    fn detach_visual(&mut self, handle: VisualHandle) {
        self.with_record(handle, |r| r.attached = false);
    }

    fn attach_visual(&mut self, handle: VisualHandle) {
        self.with_record(handle, |r| r.attached = true);
    }

    fn dispose_visual(&mut self, handle: VisualHandle) {
        self.visuals.shift_remove(&handle);
    }

    fn pick_visual_at(&self, screen: [f32; 2]) -> Option<VisualHandle> {
        let ground = self.project_ground_point(screen)?;
        self.visuals
            .iter()
            .filter(|(_, r)| r.attached)
            .map(|(handle, r)| {
                let dx = r.transform.position[0] - ground[0];
                let dz = r.transform.position[2] - ground[2];
                (*handle, (dx * dx + dz * dz).sqrt(), r.kind.radius())
            })
            .filter(|(_, distance, radius)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _, _)| handle)
    }

    fn project_ground_point(&self, screen: [f32; 2]) -> Option<[f32; 3]> {
        if !(screen[0].is_finite() && screen[1].is_finite()) {
            return None;
        }
        Some([
            screen[0] / self.pixels_per_unit,
            0.0,
            screen[1] / self.pixels_per_unit,
        ])
    }

    fn place_selection_marker(&mut self, position: Option<[f32; 3]>) {
        self.marker = position;
    }
}
