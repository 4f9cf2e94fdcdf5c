// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Hit: camera-ordered hit testing over interactive regions.
//!
//! This crate answers one question per pointer per frame: *which interactive region is
//! under this screen point?* It does not own the scene. Hosts expose their regions
//! through the [`RegionProvider`] trait, describe how each view looks at the scene with
//! a [`Camera`], and run queries through a reusable [`HitTester`].
//!
//! - [`Camera`] / [`CameraSet`]: viewport, screen-to-world mapping, [`TestMode`], layer
//!   mask, optional range, and priority. Cameras are tried highest priority first and
//!   the first camera that produces a hit wins; results are never merged across cameras.
//! - [`RegionProvider`]: the read-only view of the scene (intersections, flags, depth,
//!   custom predicates, opacity, parent and clip-panel chains).
//! - [`HitTester`]: the query engine. World modes pick the nearest surface; UI modes
//!   gather every intersection, sort by depth (highest first) and return the first
//!   candidate that is visible, accepted by its predicate, and inside every clipping
//!   panel above it.
//! - [`Scene`]: a small generational-id region arena implementing [`RegionProvider`],
//!   handy for tests, tools, and hosts that do not already have a scene graph.
//! - [`Collider`]: precise local-space footprints (rect, circle, rounded rect, path).
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use sightline_hit::{Camera, CameraId, CameraSet, HitTester, LocalRegion, Scene, TestMode};
//!
//! let mut scene = Scene::new();
//! let _back = scene.insert(None, LocalRegion {
//!     bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
//!     depth: 5,
//!     ..LocalRegion::default()
//! });
//! let front = scene.insert(None, LocalRegion {
//!     bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
//!     depth: 10,
//!     ..LocalRegion::default()
//! });
//!
//! let mut cameras = CameraSet::new();
//! cameras.insert(Camera::new(CameraId(0), Rect::new(0.0, 0.0, 800.0, 600.0), TestMode::Ui2D));
//!
//! let mut tester = HitTester::new();
//! let hit = tester.hit_test(&cameras, &scene, Point::new(50.0, 50.0)).unwrap();
//! assert_eq!(hit.region, front);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` floating-point math through `kurbo`'s `libm` feature.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod camera;
mod region;
mod scene;
mod shape;
mod tester;

pub use camera::{Camera, CameraId, CameraSet, TestMode};
pub use region::{RawHit, RegionFlags, RegionProvider};
pub use scene::{LocalRegion, RegionId, Scene};
pub use shape::Collider;
pub use tester::{Hit, HitTester, MIN_OPACITY};
