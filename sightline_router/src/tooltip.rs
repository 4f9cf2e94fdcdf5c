// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tooltip timing.

/// Tooltip target and pending deadline.
///
/// A tooltip is *pending* while a deadline is set, and *shown* while it has a
/// target and no deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tooltip<K> {
    target: Option<K>,
    deadline: Option<u64>,
}

impl<K> Default for Tooltip<K> {
    fn default() -> Self {
        Self {
            target: None,
            deadline: None,
        }
    }
}

impl<K: Copy> Tooltip<K> {
    /// Region the tooltip belongs to.
    pub fn target(&self) -> Option<K> {
        self.target
    }

    /// Pending deadline, in milliseconds.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Whether a tooltip is up.
    pub fn is_shown(&self) -> bool {
        self.target.is_some() && self.deadline.is_none()
    }

    /// Start waiting for `delay` from `now`.
    pub fn schedule(&mut self, now: u64, delay: u64) {
        self.deadline = Some(now.saturating_add(delay));
    }

    /// Restart a pending wait. Returns false when nothing was pending.
    pub fn postpone(&mut self, now: u64, delay: u64) -> bool {
        if self.deadline.is_some() {
            self.schedule(now, delay);
            true
        } else {
            false
        }
    }

    /// Forget the pending wait.
    pub fn cancel_pending(&mut self) {
        self.deadline = None;
    }

    /// Whether the pending wait is over at `now`.
    pub fn is_due(&self, now: u64) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Mark `target` as shown.
    pub fn show(&mut self, target: Option<K>) {
        self.deadline = None;
        self.target = target;
    }

    /// Hide; returns the region that had the tooltip.
    pub fn hide(&mut self) -> Option<K> {
        self.deadline = None;
        self.target.take()
    }
}
