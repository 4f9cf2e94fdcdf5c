// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Work polled once per frame after the router has processed input.

use core::fmt;

use sightline_pointer::PointerTable;

use crate::types::Scheme;

/// Router state visible to a [`FrameTask`].
#[derive(Clone, Copy, Debug)]
pub struct RouterView<'a, K> {
    /// Frame time in milliseconds.
    pub time: u64,
    /// Selected region.
    pub selection: Option<K>,
    /// Region under the mouse, after fall-through.
    pub hovered: Option<K>,
    /// Active input scheme.
    pub scheme: Scheme,
    /// Every pointer.
    pub pointers: &'a PointerTable<K>,
}

/// Whether a task wants to be polled again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Poll again next frame.
    Pending,
    /// Unregister.
    Done,
}

/// A unit of per-frame work owned by the router.
pub trait FrameTask<K> {
    /// Advance by one frame.
    fn poll(&mut self, view: &RouterView<'_, K>) -> TaskStatus;
}

/// Completes once the selection moves away from a watched region.
///
/// The callback runs exactly once, with the new selection. Typical use: close a
/// popup list when it stops being selected.
pub struct SelectionWatch<K, F> {
    watched: K,
    on_change: Option<F>,
}

impl<K: fmt::Debug, F> fmt::Debug for SelectionWatch<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionWatch")
            .field("watched", &self.watched)
            .field("fired", &self.on_change.is_none())
            .finish_non_exhaustive()
    }
}

impl<K, F> SelectionWatch<K, F>
where
    K: Copy + Eq,
    F: FnOnce(Option<K>),
{
    /// Watch `region`.
    pub fn new(region: K, on_change: F) -> Self {
        Self {
            watched: region,
            on_change: Some(on_change),
        }
    }
}

impl<K, F> FrameTask<K> for SelectionWatch<K, F>
where
    K: Copy + Eq,
    F: FnOnce(Option<K>),
{
    fn poll(&mut self, view: &RouterView<'_, K>) -> TaskStatus {
        if view.selection == Some(self.watched) {
            return TaskStatus::Pending;
        }
        if let Some(f) = self.on_change.take() {
            f(view.selection);
        }
        TaskStatus::Done
    }
}
