// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The single selected region and its text-input focus.

use sightline_hit::RegionFlags;

/// Selection registry: at most one selected region.
///
/// `has_focus` is only ever true while something is selected and that region
/// captures text input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection<K> {
    current: Option<K>,
    has_focus: bool,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            current: None,
            has_focus: false,
        }
    }
}

impl<K: Copy + Eq> Selection<K> {
    /// Selected region.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Whether the selection captures text input.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Swap in `region`, dropping focus. Returns the previous selection.
    pub fn replace(&mut self, region: Option<K>) -> Option<K> {
        self.has_focus = false;
        core::mem::replace(&mut self.current, region)
    }

    /// Recompute focus from the selected region's flags.
    pub fn refresh_focus(&mut self, flags: RegionFlags) {
        self.has_focus = self.current.is_some()
            && flags.contains(RegionFlags::ACTIVE | RegionFlags::CAPTURES_INPUT);
    }

    /// Drop focus, keeping the selection.
    pub fn clear_focus(&mut self) {
        self.has_focus = false;
    }

    /// Drop the selection without telling anyone.
    pub fn forget(&mut self) -> Option<K> {
        self.has_focus = false;
        self.current.take()
    }
}
