// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Pointer: the mutable record behind every input source.
//!
//! Each mouse button, each touch, and the controller/keyboard virtual pointer is
//! tracked by its own [`PointerState`]. The state remembers where the pointer is,
//! what it is over, what it pressed and is dragging, how far it travelled since the
//! press, and whether the eventual release may still count as a click.
//!
//! - [`PointerId`]: signed id; negative values are mouse buttons, non-negative values
//!   are touches, [`PointerId::CONTROLLER`] is the virtual pointer.
//! - [`PointerState`]: positions, deltas, region slots, timestamps, click eligibility.
//! - [`ClickEligibility`]: `Always`, `BasedOnDistance`, or `Disabled` for the current press.
//! - [`PointerTable`]: owns all pointer states. Mouse and controller entries live forever;
//!   touch entries are created on first sight and dropped on release.
//!
//! The crate is generic over the region handle `K`, which only needs to be `Copy + Eq`.
//! Timestamps are milliseconds from any monotonic origin chosen by the host.
//!
//! ```rust
//! use kurbo::Point;
//! use sightline_pointer::{ClickEligibility, PointerId, PointerTable};
//!
//! let mut table: PointerTable<u32> = PointerTable::new();
//! let (touch, created) = table.touch_or_insert(PointerId::touch(3));
//! assert!(created);
//!
//! touch.move_to(Point::new(10.0, 10.0));
//! touch.set_current(Some(7));
//! touch.begin_press(1_000);
//! assert_eq!(touch.pressed, Some(7));
//! assert_eq!(touch.click_eligibility, ClickEligibility::BasedOnDistance);
//!
//! assert!(table.remove_touch(PointerId::touch(3)).is_some());
//! assert_eq!(table.touch_count(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod id;
mod state;
mod table;

pub use id::PointerId;
pub use state::{ClickEligibility, LastClick, PointerState};
pub use table::PointerTable;
