// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cameras: how a view maps screen points into the scene, and in what order views are asked.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};

/// Identifier of a camera, chosen by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u32);

/// How a camera turns a screen point into a hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TestMode {
    /// Nearest surface along the ray wins.
    World3D,
    /// Every intersection gathered, then sorted by widget depth.
    Ui3D,
    /// Point containment; highest raycast depth wins.
    World2D,
    /// Point containment, then sorted by widget depth.
    Ui2D,
}

impl TestMode {
    /// UI modes apply widget visibility, predicate, opacity and clip checks.
    pub fn is_ui(self) -> bool {
        matches!(self, Self::Ui3D | Self::Ui2D)
    }
}

/// A view onto the scene that can receive input.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Host-assigned identifier.
    pub id: CameraId,
    /// Higher priority cameras are tested first.
    pub priority: i32,
    /// Screen-space viewport; points outside are rejected immediately.
    pub viewport: Rect,
    /// Maps screen points into world space.
    pub screen_to_world: Affine,
    /// Cast strategy.
    pub mode: TestMode,
    /// Bit `n` set means regions on layer `n` are visible to this camera.
    pub layer_mask: u32,
    /// Intersections farther than this are ignored.
    pub range: Option<f64>,
    /// When false, world-mode hits are redirected to their rigid-body root.
    pub events_go_to_colliders: bool,
    /// Disabled cameras are skipped.
    pub enabled: bool,
}

impl Camera {
    /// Camera with an identity mapping, all layers, priority 0.
    pub fn new(id: CameraId, viewport: Rect, mode: TestMode) -> Self {
        Self {
            id,
            priority: 0,
            viewport,
            screen_to_world: Affine::IDENTITY,
            mode,
            layer_mask: u32::MAX,
            range: None,
            events_go_to_colliders: false,
            enabled: true,
        }
    }

    /// Whether `screen` lies inside the viewport (edges inclusive).
    pub fn contains_screen(&self, screen: Point) -> bool {
        let v = self.viewport;
        screen.x >= v.x0 && screen.x <= v.x1 && screen.y >= v.y0 && screen.y <= v.y1
    }

    /// Whether regions on `layer` are visible to this camera.
    pub fn sees_layer(&self, layer: u8) -> bool {
        layer < 32 && self.layer_mask & (1_u32 << layer) != 0
    }

    /// Screen point to world point.
    pub fn to_world(&self, screen: Point) -> Point {
        self.screen_to_world * screen
    }

    /// World point back to screen space.
    pub fn to_screen(&self, world: Point) -> Point {
        self.screen_to_world.inverse() * world
    }
}

/// Cameras ordered by descending priority.
///
/// Cameras with equal priority keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct CameraSet {
    cameras: Vec<Camera>,
}

impl CameraSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a camera, replacing any camera with the same id.
    pub fn insert(&mut self, camera: Camera) {
        self.remove(camera.id);
        let at = self
            .cameras
            .iter()
            .position(|c| c.priority < camera.priority)
            .unwrap_or(self.cameras.len());
        self.cameras.insert(at, camera);
    }

    /// Remove a camera by id, returning it.
    pub fn remove(&mut self, id: CameraId) -> Option<Camera> {
        let at = self.cameras.iter().position(|c| c.id == id)?;
        Some(self.cameras.remove(at))
    }

    /// Look up a camera by id.
    pub fn get(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    /// Mutable lookup; call [`CameraSet::insert`] again after changing `priority`.
    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|c| c.id == id)
    }

    /// Cameras in test order.
    pub fn iter(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.iter()
    }

    /// Number of cameras.
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// True if there are no cameras.
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// The camera that drives input: the first enabled one.
    pub fn event_handler(&self) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.enabled)
    }

    /// First enabled camera that sees `layer`.
    pub fn for_layer(&self, layer: u8) -> Option<&Camera> {
        self.cameras
            .iter()
            .find(|c| c.enabled && c.sees_layer(layer))
    }
}
