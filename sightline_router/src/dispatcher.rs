// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification delivery.
//!
//! The [`Dispatcher`] hands each [`Notification`] to a [`NotificationSink`]. Sinks may
//! react by queueing [`FollowUps`]: more notifications, which are delivered nested
//! inside the current one, or a selection change, which the router applies once the
//! delivery returns.
//!
//! ## Semantics
//!
//! - Targets that are not both active and enabled are skipped.
//! - Nesting is bounded: a notification arriving while [`MAX_NESTED_NOTIFICATIONS`]
//!   deliveries are already in flight is dropped, so a handler that keeps notifying
//!   itself sees at most `MAX_NESTED_NOTIFICATIONS + 1` deliveries.
//! - The generic handler, when set, receives a copy of every notification addressed
//!   to another region, with [`Notification::relayed_from`] naming the real target.
//!
//! ## Minimal example
//!
//! ```
//! use sightline_hit::{LocalRegion, Scene};
//! use sightline_router::dispatcher::{Dispatcher, FollowUps};
//! use sightline_router::{Notification, NotificationContext, NotificationKind};
//!
//! let mut scene = Scene::new();
//! let button = scene.insert(None, LocalRegion::default());
//!
//! let mut dispatcher = Dispatcher::new();
//! let mut seen = Vec::new();
//! dispatcher.notify(
//!     &scene,
//!     &mut seen,
//!     Notification {
//!         target: button,
//!         kind: NotificationKind::Click,
//!         context: NotificationContext::default(),
//!         relayed_from: None,
//!     },
//! );
//! assert_eq!(seen.len(), 1);
//! ```

use alloc::vec::Vec;
use core::fmt;

use sightline_hit::RegionProvider;
use smallvec::SmallVec;

use crate::types::{Notification, NotificationKind};

/// Deliveries allowed to be in flight before new ones are dropped.
pub const MAX_NESTED_NOTIFICATIONS: u32 = 10;

/// Work a sink asks for while handling a notification.
#[derive(Clone, Debug)]
pub struct FollowUps<K> {
    notifications: SmallVec<[(K, NotificationKind<K>); 4]>,
    selection: Option<Option<K>>,
}

impl<K> Default for FollowUps<K> {
    fn default() -> Self {
        Self {
            notifications: SmallVec::new(),
            selection: None,
        }
    }
}

impl<K> FollowUps<K> {
    /// Send `kind` to `target`, nested inside the current delivery.
    pub fn notify(&mut self, target: K, kind: NotificationKind<K>) {
        self.notifications.push((target, kind));
    }

    /// Change the selection once the current delivery returns. The last request wins.
    pub fn select(&mut self, region: Option<K>) {
        self.selection = Some(region);
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.selection.is_none()
    }
}

/// Receiver of notifications.
pub trait NotificationSink<K> {
    /// Handle one notification, optionally queueing follow-up work.
    fn deliver(&mut self, notification: &Notification<K>, follow_ups: &mut FollowUps<K>);
}

impl<K: Copy> NotificationSink<K> for Vec<Notification<K>> {
    fn deliver(&mut self, notification: &Notification<K>, _: &mut FollowUps<K>) {
        self.push(*notification);
    }
}

impl<K, S: NotificationSink<K> + ?Sized> NotificationSink<K> for &mut S {
    fn deliver(&mut self, notification: &Notification<K>, follow_ups: &mut FollowUps<K>) {
        (**self).deliver(notification, follow_ups);
    }
}

/// Adapts a closure into a [`NotificationSink`].
pub struct FnSink<F>(pub F);

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl<K, F> NotificationSink<K> for FnSink<F>
where
    F: FnMut(&Notification<K>, &mut FollowUps<K>),
{
    fn deliver(&mut self, notification: &Notification<K>, follow_ups: &mut FollowUps<K>) {
        (self.0)(notification, follow_ups);
    }
}

/// Depth-guarded notification delivery.
#[derive(Clone, Debug)]
pub struct Dispatcher<K> {
    depth: u32,
    dropped: u64,
    generic_handler: Option<K>,
    selection_request: Option<Option<K>>,
}

impl<K> Default for Dispatcher<K> {
    fn default() -> Self {
        Self {
            depth: 0,
            dropped: 0,
            generic_handler: None,
            selection_request: None,
        }
    }
}

impl<K> Dispatcher<K>
where
    K: Copy + Eq + fmt::Debug,
{
    /// Dispatcher with no generic handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Region receiving a copy of every notification.
    pub fn generic_handler(&self) -> Option<K> {
        self.generic_handler
    }

    /// Set or clear the generic handler.
    pub fn set_generic_handler(&mut self, handler: Option<K>) {
        self.generic_handler = handler;
    }

    /// Notifications dropped because nesting was too deep.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Deliveries currently in flight.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Take the selection change requested by the most recent deliveries, if any.
    pub fn take_selection_request(&mut self) -> Option<Option<K>> {
        self.selection_request.take()
    }

    /// Deliver `notification` and everything its handlers queue.
    pub fn notify<P, S>(&mut self, provider: &P, sink: &mut S, notification: Notification<K>)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        if self.depth > MAX_NESTED_NOTIFICATIONS {
            self.dropped += 1;
            log::debug!(
                "dropping {:?} for {:?}: {} deliveries already in flight",
                notification.kind,
                notification.target,
                self.depth
            );
            return;
        }
        if !provider.flags(notification.target).is_interactive() {
            log::trace!(
                "skipping {:?}: {:?} is inactive",
                notification.kind,
                notification.target
            );
            return;
        }

        self.depth += 1;
        log::trace!(
            "{:?} -> {:?} (pointer {:?})",
            notification.kind,
            notification.target,
            notification.context.pointer
        );
        let mut follow_ups = FollowUps::default();
        sink.deliver(&notification, &mut follow_ups);

        if let Some(handler) = self.generic_handler
            && handler != notification.target
            && provider.flags(handler).is_interactive()
        {
            let copy = Notification {
                target: handler,
                relayed_from: Some(notification.target),
                ..notification
            };
            sink.deliver(&copy, &mut follow_ups);
        }

        if let Some(selection) = follow_ups.selection {
            self.selection_request = Some(selection);
        }
        for (target, kind) in follow_ups.notifications {
            self.notify(
                provider,
                sink,
                Notification {
                    target,
                    kind,
                    context: notification.context,
                    relayed_from: None,
                },
            );
        }
        self.depth -= 1;
    }
}
