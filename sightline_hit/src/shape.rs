// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collider shapes and narrow-phase point tests.
//!
//! A [`Collider`] describes the pickable footprint of a region in the region's
//! local coordinate space. The coarse bounds of a region are always a
//! rectangle; a collider narrows that down to the shape that actually reacts
//! to the pointer (a round button, a rounded panel, an arbitrary path).

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{BezPath, Circle, Point, Rect, RoundedRect, Shape};

/// Pickable footprint of a region, in local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Collider {
    /// Axis-aligned box.
    Rect(Rect),
    /// Filled disk.
    Circle(Circle),
    /// Rounded box; corner tolerance is approximated by the bounding box.
    RoundedRect(RoundedRect),
    /// Filled path, using kurbo's fill rule for `contains`.
    Path(BezPath),
}

impl Collider {
    /// Axis-aligned bounds of the collider in local space.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Circle(c) => c.bounding_box(),
            Self::RoundedRect(rr) => rr.bounding_box(),
            Self::Path(p) => p.bounding_box(),
        }
    }

    /// Test a local-space point against the collider.
    ///
    /// `tolerance` inflates the footprint by that many local units. Returns the
    /// distance from the true outline (zero inside), or `None` on a miss.
    pub fn probe(&self, pt: Point, tolerance: f64) -> Option<f64> {
        if !pt.x.is_finite() || !pt.y.is_finite() {
            return None;
        }
        match self {
            Self::Rect(r) => probe_rect(*r, pt, tolerance),
            Self::Circle(c) => {
                let dist = (pt - c.center).hypot();
                if dist <= c.radius + tolerance.max(0.0) {
                    Some((dist - c.radius).max(0.0))
                } else {
                    None
                }
            }
            Self::RoundedRect(rr) => probe_filled(rr, pt, tolerance),
            Self::Path(p) => probe_filled(p, pt, tolerance),
        }
    }

    /// Whether a local-space point lies on the collider (no tolerance).
    pub fn contains(&self, pt: Point) -> bool {
        self.probe(pt, 0.0).is_some()
    }
}

impl From<Rect> for Collider {
    fn from(r: Rect) -> Self {
        Self::Rect(r)
    }
}

impl From<Circle> for Collider {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<RoundedRect> for Collider {
    fn from(rr: RoundedRect) -> Self {
        Self::RoundedRect(rr)
    }
}

fn probe_rect(r: Rect, pt: Point, tolerance: f64) -> Option<f64> {
    let tol = tolerance.max(0.0);
    if !r.inflate(tol, tol).contains(pt) {
        return None;
    }
    let dx = (r.x0 - pt.x).max(pt.x - r.x1).max(0.0);
    let dy = (r.y0 - pt.y).max(pt.y - r.y1).max(0.0);
    Some((dx * dx + dy * dy).sqrt())
}

fn probe_filled<S: Shape>(shape: &S, pt: Point, tolerance: f64) -> Option<f64> {
    let tol = tolerance.max(0.0);
    if !shape.bounding_box().inflate(tol, tol).contains(pt) {
        return None;
    }
    if shape.contains(pt) {
        Some(0.0)
    } else if tol > 0.0 {
        // Exact distance to curved outlines is not computed.
        Some(tol)
    } else {
        None
    }
}
