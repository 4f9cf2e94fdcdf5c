// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory region arena implementing [`RegionProvider`].

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};

use crate::region::{RawHit, RegionFlags, RegionProvider};
use crate::shape::Collider;

/// Generational handle of a region in a [`Scene`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RegionId(u32, u32);

impl RegionId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Local description of a region.
#[derive(Clone, Debug)]
pub struct LocalRegion {
    /// Pickable bounds in local space.
    pub bounds: Rect,
    /// Transform relative to the parent region.
    pub transform: Affine,
    /// Optional precise footprint, tested after `bounds`.
    pub collider: Option<Collider>,
    /// Extra pickable margin around `bounds` and `collider`, in local units.
    pub slop: f64,
    /// Draw depth; higher intercepts first in UI modes.
    pub depth: i32,
    /// State and capability flags.
    pub flags: RegionFlags,
    /// Layer index in `0..32`.
    pub layer: u8,
    /// Local clip rect for [`RegionFlags::PANEL`] regions; `None` shows everything.
    pub clip: Option<Rect>,
    /// Opacity of this region's own drawable rect.
    pub alpha: f32,
    /// Distance from the camera, for nearest-surface casts.
    pub distance: f64,
    /// Custom hit predicate over world points.
    pub hit_check: Option<fn(Point) -> bool>,
}

impl Default for LocalRegion {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            transform: Affine::IDENTITY,
            collider: None,
            slop: 0.0,
            depth: 0,
            flags: RegionFlags::default(),
            layer: 0,
            clip: None,
            alpha: 1.0,
            distance: 0.0,
            hit_check: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    local: LocalRegion,
}

/// A flat arena of regions with parent links.
///
/// Changes are visible to the next query; there is no commit step. Inactive
/// parents deactivate their whole subtree, as in a scene graph.
///
/// ```rust
/// use kurbo::Rect;
/// use sightline_hit::{LocalRegion, RegionFlags, RegionProvider, Scene};
///
/// let mut scene = Scene::new();
/// let panel = scene.insert(None, LocalRegion {
///     bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
///     flags: RegionFlags::default() | RegionFlags::PANEL,
///     ..LocalRegion::default()
/// });
/// let button = scene.insert(Some(panel), LocalRegion {
///     bounds: Rect::new(10.0, 10.0, 20.0, 20.0),
///     ..LocalRegion::default()
/// });
/// assert_eq!(scene.parent_of(button), Some(panel));
/// assert_eq!(scene.clip_ancestor(button), Some(panel));
///
/// scene.remove(panel);
/// assert!(!scene.is_alive(button));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Scene {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a region under `parent` (or as a root).
    pub fn insert(&mut self, parent: Option<RegionId>, local: LocalRegion) -> RegionId {
        let parent = parent.filter(|p| self.is_alive(*p));
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].saturating_add(1);
            idx
        } else {
            self.slots.push(None);
            self.generations.push(1);
            self.slots.len() - 1
        };
        let generation = self.generations[idx];
        self.slots[idx] = Some(Slot {
            generation,
            parent,
            children: Vec::new(),
            local,
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "RegionId uses 32-bit indices."
        )]
        let id = RegionId(idx as u32, generation);
        if let Some(p) = parent
            && let Some(slot) = self.slot_mut(p)
        {
            slot.children.push(id);
        }
        id
    }

    /// Remove a region and its subtree. Stale ids are ignored.
    pub fn remove(&mut self, id: RegionId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        let parent = slot.parent;
        let children = slot.children.clone();
        if let Some(p) = parent
            && let Some(ps) = self.slot_mut(p)
        {
            ps.children.retain(|c| *c != id);
        }
        for child in children {
            self.remove(child);
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Whether `id` refers to a live region.
    pub fn is_alive(&self, id: RegionId) -> bool {
        self.slot(id).is_some()
    }

    /// Local data of a live region.
    pub fn local(&self, id: RegionId) -> Option<&LocalRegion> {
        self.slot(id).map(|s| &s.local)
    }

    /// Mutable local data of a live region.
    pub fn local_mut(&mut self, id: RegionId) -> Option<&mut LocalRegion> {
        self.slot_mut(id).map(|s| &mut s.local)
    }

    /// Replace the flags of a live region.
    pub fn set_flags(&mut self, id: RegionId, flags: RegionFlags) {
        if let Some(local) = self.local_mut(id) {
            local.flags = flags;
        }
    }

    /// Toggle [`RegionFlags::ACTIVE`].
    pub fn set_active(&mut self, id: RegionId, active: bool) {
        if let Some(local) = self.local_mut(id) {
            local.flags.set(RegionFlags::ACTIVE, active);
        }
    }

    /// Toggle [`RegionFlags::ENABLED`].
    pub fn set_enabled(&mut self, id: RegionId, enabled: bool) {
        if let Some(local) = self.local_mut(id) {
            local.flags.set(RegionFlags::ENABLED, enabled);
        }
    }

    /// Replace the local transform.
    pub fn set_transform(&mut self, id: RegionId, transform: Affine) {
        if let Some(local) = self.local_mut(id) {
            local.transform = transform;
        }
    }

    /// Replace the draw depth.
    pub fn set_depth(&mut self, id: RegionId, depth: i32) {
        if let Some(local) = self.local_mut(id) {
            local.depth = depth;
        }
    }

    /// Children of a live region.
    pub fn children_of(&self, id: RegionId) -> &[RegionId] {
        self.slot(id).map_or(&[], |s| &s.children)
    }

    /// Local-to-world transform, composed up the parent chain.
    pub fn world_transform(&self, id: RegionId) -> Option<Affine> {
        let mut slot = self.slot(id)?;
        let mut tf = slot.local.transform;
        while let Some(p) = slot.parent {
            slot = self.slot(p)?;
            tf = slot.local.transform * tf;
        }
        Some(tf)
    }

    /// Every live region id, in slot order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "RegionId uses 32-bit indices."
    )]
    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|s| RegionId(idx as u32, s.generation)))
    }

    fn slot(&self, id: RegionId) -> Option<&Slot> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: RegionId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|s| s.generation == id.1)
    }

    fn active_in_hierarchy(&self, id: RegionId) -> bool {
        let mut current = Some(id);
        while let Some(k) = current {
            let Some(slot) = self.slot(k) else {
                return false;
            };
            if !slot.local.flags.contains(RegionFlags::ACTIVE) {
                return false;
            }
            current = slot.parent;
        }
        true
    }
}

impl RegionProvider<RegionId> for Scene {
    fn cast(&self, world: Point, out: &mut Vec<RawHit<RegionId>>) {
        for id in self.ids() {
            let (Some(slot), Some(tf)) = (self.slot(id), self.world_transform(id)) else {
                continue;
            };
            if tf.determinant() == 0.0 {
                continue;
            }
            let local = tf.inverse() * world;
            let slop = slot.local.slop.max(0.0);
            if !slot.local.bounds.inflate(slop, slop).contains(local) {
                continue;
            }
            if let Some(collider) = &slot.local.collider
                && collider.probe(local, slop).is_none()
            {
                continue;
            }
            out.push(RawHit {
                key: id,
                point: world,
                distance: slot.local.distance,
            });
        }
    }

    fn flags(&self, key: RegionId) -> RegionFlags {
        let Some(slot) = self.slot(key) else {
            return RegionFlags::empty();
        };
        let mut flags = slot.local.flags;
        if !self.active_in_hierarchy(key) {
            flags.remove(RegionFlags::ACTIVE);
        }
        flags
    }

    fn depth(&self, key: RegionId) -> Option<i32> {
        self.slot(key).map(|s| s.local.depth)
    }

    fn accepts(&self, key: RegionId, world: Point) -> bool {
        self.slot(key)
            .and_then(|s| s.local.hit_check)
            .is_none_or(|check| check(world))
    }

    fn opacity(&self, key: RegionId) -> f32 {
        let mut alpha = 1.0;
        let mut current = Some(key);
        while let Some(k) = current {
            let Some(slot) = self.slot(k) else {
                break;
            };
            alpha *= slot.local.alpha;
            current = slot.parent;
        }
        alpha
    }

    fn parent_of(&self, key: RegionId) -> Option<RegionId> {
        self.slot(key)?.parent
    }

    fn clip_contains(&self, panel: RegionId, world: Point) -> bool {
        let Some(slot) = self.slot(panel) else {
            return false;
        };
        let Some(clip) = slot.local.clip else {
            return true;
        };
        self.world_transform(panel)
            .filter(|tf| tf.determinant() != 0.0)
            .is_some_and(|tf| clip.contains(tf.inverse() * world))
    }

    fn layer(&self, key: RegionId) -> u8 {
        self.slot(key).map_or(0, |s| s.local.layer)
    }

    fn center(&self, key: RegionId) -> Option<Point> {
        let slot = self.slot(key)?;
        Some(self.world_transform(key)? * slot.local.bounds.center())
    }
}
