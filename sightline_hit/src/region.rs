// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene-facing side of hit testing: region flags and the provider trait.

use alloc::vec::Vec;

use kurbo::Point;

bitflags::bitflags! {
    /// State and capability flags of an interactive region.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u16 {
        /// Region is alive in the scene graph (its object and all parents are active).
        const ACTIVE         = 0b0000_0000_0001;
        /// Region accepts input.
        const ENABLED        = 0b0000_0000_0010;
        /// Region is visible through its owning panel chain.
        const VISIBLE        = 0b0000_0000_0100;
        /// Region carries a rendered widget component (depth, visibility, predicate apply).
        const WIDGET         = 0b0000_0000_1000;
        /// Region clips its descendants.
        const PANEL          = 0b0000_0001_0000;
        /// Region is a rigid-body root; world-mode hits on descendants route here.
        const RIGIDBODY      = 0b0000_0010_0000;
        /// Region claims keyboard focus when selected (for example a text field).
        const CAPTURES_INPUT = 0b0000_0100_0000;
    }
}

impl Default for RegionFlags {
    fn default() -> Self {
        Self::ACTIVE | Self::ENABLED | Self::VISIBLE | Self::WIDGET
    }
}

impl RegionFlags {
    /// Whether a region with these flags may receive input at all.
    pub fn is_interactive(self) -> bool {
        self.contains(Self::ACTIVE | Self::ENABLED)
    }
}

/// A raw intersection reported by [`RegionProvider::cast`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawHit<K> {
    /// Region hit.
    pub key: K,
    /// World-space point of the intersection.
    pub point: Point,
    /// Distance from the camera along the ray; used by nearest-surface modes and range.
    pub distance: f64,
}

/// Read-only view of a scene of interactive regions.
///
/// Lookups on a key that no longer exists must degrade gracefully: empty flags,
/// `None` depths and parents, `false` containment.
pub trait RegionProvider<K>
where
    K: Copy + Eq,
{
    /// Append every region whose collider contains `world` to `out`, in scene order.
    fn cast(&self, world: Point, out: &mut Vec<RawHit<K>>);

    /// Flags of `key`; empty when the region is gone.
    fn flags(&self, key: K) -> RegionFlags;

    /// Draw depth of a widget region (higher intercepts first).
    fn depth(&self, key: K) -> Option<i32>;

    /// Sort depth used for regions without a widget component.
    ///
    /// `None` marks the region as unsortable and it is skipped.
    fn raycast_depth(&self, key: K) -> Option<i32> {
        self.depth(key)
    }

    /// Custom hit predicate for the world point.
    fn accepts(&self, key: K, world: Point) -> bool {
        let _ = (key, world);
        true
    }

    /// Effective opacity of the closest enclosing drawable rect.
    fn opacity(&self, key: K) -> f32 {
        let _ = key;
        1.0
    }

    /// Parent region, if any.
    fn parent_of(&self, key: K) -> Option<K>;

    /// Whether the clipping panel `panel` shows `world`.
    fn clip_contains(&self, panel: K, world: Point) -> bool;

    /// Layer index in `0..32`, matched against camera layer masks.
    fn layer(&self, key: K) -> u8 {
        let _ = key;
        0
    }

    /// World-space center, used for navigation.
    fn center(&self, key: K) -> Option<Point>;

    /// Nearest clipping panel at or above `key`.
    fn clip_ancestor(&self, key: K) -> Option<K> {
        let mut current = Some(key);
        while let Some(k) = current {
            if self.flags(k).contains(RegionFlags::PANEL) {
                return Some(k);
            }
            current = self.parent_of(k);
        }
        None
    }

    /// Nearest rigid-body root at or above `key`, stopping at the first panel.
    fn rigidbody_root(&self, key: K) -> Option<K> {
        let mut current = Some(key);
        while let Some(k) = current {
            let flags = self.flags(k);
            if flags.contains(RegionFlags::PANEL) {
                return None;
            }
            if flags.contains(RegionFlags::RIGIDBODY) {
                return Some(k);
            }
            current = self.parent_of(k);
        }
        None
    }
}
