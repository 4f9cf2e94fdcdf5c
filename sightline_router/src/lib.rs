// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Router: one frame-driven input router for mouse, touch, keyboard, and
//! controller.
//!
//! Every frame the host hands the [`Router`] an [`InputSource`], a
//! [`RegionProvider`](sightline_hit::RegionProvider) describing its scene, and a
//! [`NotificationSink`]. The router hit-tests each pointer through its
//! [`CameraSet`](sightline_hit::CameraSet), runs the press / drag / release cycle of
//! each pointer, and sends [`Notification`]s: hover, press, click, double click, drag
//! start / over / out / end, drop, select, scroll, tooltip, key, and long press.
//!
//! - [`Router`]: the state machine, selection registry, tooltip timer, and queries.
//! - [`dispatcher`]: bounded, reentrant delivery with a generic-handler relay.
//! - [`RouterConfig`]: thresholds, timings, and input toggles; [`RouterConfig::validate`]
//!   reports bad values as [`ConfigError`].
//! - [`Navigable`] / [`NavRegistry`]: regions taking part in directional navigation.
//! - [`FrameTask`]: work polled after each frame, such as [`SelectionWatch`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use sightline_hit::{Camera, CameraId, LocalRegion, Scene, TestMode};
//! use sightline_router::{FrameInput, Notification, NotificationKind, Router};
//!
//! let mut scene = Scene::new();
//! let button = scene.insert(None, LocalRegion {
//!     bounds: Rect::new(10.0, 10.0, 90.0, 40.0),
//!     ..LocalRegion::default()
//! });
//!
//! let mut router = Router::default();
//! router
//!     .cameras_mut()
//!     .insert(Camera::new(CameraId(0), Rect::new(0.0, 0.0, 800.0, 600.0), TestMode::Ui2D));
//!
//! let mut out: Vec<Notification<_>> = Vec::new();
//! let at = Point::new(50.0, 25.0);
//! router.update(&scene, &FrameInput::at(0).mouse_at(at).press(0), &mut out);
//! router.update(&scene, &FrameInput::at(80).mouse_at(at).release(0), &mut out);
//!
//! let kinds: Vec<_> = out.iter().filter(|n| n.target == button).map(|n| n.kind).collect();
//! assert_eq!(kinds, [
//!     NotificationKind::Press(true),
//!     NotificationKind::Select(true),
//!     NotificationKind::Press(false),
//!     NotificationKind::Hover(true),
//!     NotificationKind::Click,
//! ]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` floating-point math through `kurbo`'s `libm` feature.
//! - `serde`: `Serialize`/`Deserialize` for [`RouterConfig`], [`KeyCode`], and [`Scheme`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
pub mod dispatcher;
mod input;
mod navigation;
mod router;
mod selection;
mod tasks;
mod tooltip;
mod types;

pub use config::{ConfigError, RouterConfig};
pub use dispatcher::{FnSink, FollowUps, NotificationSink};
pub use input::{Axis, FrameInput, InputSource, TouchPhase, TouchSample};
pub use navigation::{NavRegistry, Navigable};
pub use router::Router;
pub use selection::Selection;
pub use tasks::{FrameTask, RouterView, SelectionWatch, TaskStatus};
pub use tooltip::Tooltip;
pub use types::{KeyCode, Notification, NotificationContext, NotificationKind, Scheme};
