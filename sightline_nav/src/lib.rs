// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Nav: directional navigation for controllers and keyboards.
//!
//! Given the currently selected region and a direction, pick the region the
//! selection should move to. Navigation is modeled as:
//!
//! - **Intents** ([`Navigation`]): the four screen directions plus Tab ([`Navigation::Next`])
//!   and Shift+Tab ([`Navigation::Prev`]).
//! - **Per-region data** ([`NavEntry`]): screen-space center, optional explicit links
//!   ([`NavLinks`]), and a [`Constraint`] limiting automatic movement.
//! - A **snapshot** of candidates ([`NavSpace`]) built by the host for one query.
//! - A pluggable **policy** ([`NavigationPolicy`]); [`ConePolicy`] is the stock one.
//!
//! ## Cone search
//!
//! [`ConePolicy`] first honors an explicit link for the direction when its target is
//! active. Otherwise, unless the origin's constraint forbids it, it looks at every other
//! enabled candidate, drops those more than ~45° off the requested direction, scales the
//! offset's perpendicular component by 2 so straight-line neighbors win, and returns the
//! candidate with the smallest resulting squared length.
//!
//! Tab tries right, down, up, then left; Shift+Tab tries left, up, down, then right.
//!
//! ```rust
//! use kurbo::Point;
//! use sightline_nav::{ConePolicy, NavEntry, NavSpace, Navigation, NavigationPolicy};
//!
//! let entries = [
//!     NavEntry::new(1_u32, Point::new(0.0, 0.0)),
//!     // Close, but 60° below the horizontal.
//!     NavEntry::new(2, Point::new(10.0, 17.3)),
//!     // Far, but straight to the right.
//!     NavEntry::new(3, Point::new(100.0, 0.0)),
//! ];
//! let space = NavSpace { entries: &entries };
//! let policy = ConePolicy::default();
//!
//! assert_eq!(policy.resolve(1, Navigation::Right, &space), Some(3));
//! assert_eq!(policy.resolve(1, Navigation::Down, &space), Some(2));
//! assert_eq!(policy.resolve(1, Navigation::Left, &space), None);
//! ```
//!
//! Coordinates are screen space with `y` growing downward.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

/// Navigation intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Toward smaller `y`.
    Up,
    /// Toward larger `y`.
    Down,
    /// Toward smaller `x`.
    Left,
    /// Toward larger `x`.
    Right,
    /// Tab.
    Next,
    /// Shift+Tab.
    Prev,
}

impl Navigation {
    /// Unit screen-space vector for the four directions.
    pub fn vector(self) -> Option<Vec2> {
        match self {
            Self::Up => Some(Vec2::new(0.0, -1.0)),
            Self::Down => Some(Vec2::new(0.0, 1.0)),
            Self::Left => Some(Vec2::new(-1.0, 0.0)),
            Self::Right => Some(Vec2::new(1.0, 0.0)),
            Self::Next | Self::Prev => None,
        }
    }

    /// Directions tried, in order, for this intent.
    pub fn fallback_order(self) -> &'static [Self] {
        match self {
            Self::Up => &[Self::Up],
            Self::Down => &[Self::Down],
            Self::Left => &[Self::Left],
            Self::Right => &[Self::Right],
            Self::Next => &[Self::Right, Self::Down, Self::Up, Self::Left],
            Self::Prev => &[Self::Left, Self::Up, Self::Down, Self::Right],
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Limits on automatic (non-linked) movement away from a region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Any direction may search.
    #[default]
    Unconstrained,
    /// Only up and down search; left and right follow explicit links only.
    Vertical,
    /// Only left and right search; up and down follow explicit links only.
    Horizontal,
    /// Explicit links only.
    Explicit,
}

impl Constraint {
    /// Whether automatic search is allowed toward `direction`.
    pub fn allows(self, direction: Navigation) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Vertical => direction.is_vertical(),
            Self::Horizontal => !direction.is_vertical(),
            Self::Explicit => false,
        }
    }
}

/// An explicit link to another region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NavLink<K> {
    /// Target region.
    pub target: K,
    /// Whether the target is currently active; inactive links are ignored.
    pub active: bool,
}

impl<K> NavLink<K> {
    /// Active link to `target`.
    pub fn new(target: K) -> Self {
        Self {
            target,
            active: true,
        }
    }
}

/// Explicit per-direction links of a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NavLinks<K> {
    /// Link for [`Navigation::Up`].
    pub up: Option<NavLink<K>>,
    /// Link for [`Navigation::Down`].
    pub down: Option<NavLink<K>>,
    /// Link for [`Navigation::Left`].
    pub left: Option<NavLink<K>>,
    /// Link for [`Navigation::Right`].
    pub right: Option<NavLink<K>>,
    /// Region selected when this one is clicked.
    pub on_click: Option<NavLink<K>>,
}

impl<K> Default for NavLinks<K> {
    fn default() -> Self {
        Self {
            up: None,
            down: None,
            left: None,
            right: None,
            on_click: None,
        }
    }
}

impl<K: Copy> NavLinks<K> {
    /// Active link target for a direction.
    pub fn active(&self, direction: Navigation) -> Option<K> {
        let link = match direction {
            Navigation::Up => self.up,
            Navigation::Down => self.down,
            Navigation::Left => self.left,
            Navigation::Right => self.right,
            Navigation::Next | Navigation::Prev => None,
        }?;
        link.active.then_some(link.target)
    }

    /// Active click link target.
    pub fn active_on_click(&self) -> Option<K> {
        self.on_click.filter(|l| l.active).map(|l| l.target)
    }
}

/// A navigable region within a [`NavSpace`].
#[derive(Clone, Debug)]
pub struct NavEntry<K> {
    /// Region handle.
    pub id: K,
    /// Screen-space center.
    pub center: Point,
    /// Explicit links.
    pub links: NavLinks<K>,
    /// Search constraint applied when this entry is the origin.
    pub constraint: Constraint,
    /// Disabled entries are never chosen by search.
    pub enabled: bool,
}

impl<K> NavEntry<K> {
    /// Enabled, unconstrained entry without links.
    pub fn new(id: K, center: Point) -> Self {
        Self {
            id,
            center,
            links: NavLinks::default(),
            constraint: Constraint::Unconstrained,
            enabled: true,
        }
    }
}

/// Read-only snapshot of navigable candidates.
#[derive(Clone, Copy, Debug)]
pub struct NavSpace<'a, K> {
    /// Candidates, in registration order.
    pub entries: &'a [NavEntry<K>],
}

impl<K: Copy + Eq> NavSpace<'_, K> {
    /// Entry for `id`.
    pub fn get(&self, id: K) -> Option<&NavEntry<K>> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// Chooses the next selection for a navigation intent.
pub trait NavigationPolicy<K>
where
    K: Copy + Eq,
{
    /// Region to select after moving from `origin` toward `direction`.
    fn resolve(&self, origin: K, direction: Navigation, space: &NavSpace<'_, K>) -> Option<K>;
}

/// Explicit links first, then a cone search with a perpendicular bias.
#[derive(Copy, Clone, Debug)]
pub struct ConePolicy {
    /// Minimum cosine between the direction and a candidate offset.
    pub min_dot: f64,
    /// Factor applied to the perpendicular component before comparing lengths.
    pub perpendicular_bias: f64,
}

impl Default for ConePolicy {
    fn default() -> Self {
        Self {
            min_dot: 0.707,
            perpendicular_bias: 2.0,
        }
    }
}

impl ConePolicy {
    /// One cardinal step from `origin`, honoring links and constraints.
    pub fn step<K: Copy + Eq>(
        &self,
        origin: &NavEntry<K>,
        direction: Navigation,
        space: &NavSpace<'_, K>,
    ) -> Option<K> {
        if let Some(target) = origin.links.active(direction) {
            return Some(target);
        }
        if !origin.constraint.allows(direction) {
            return None;
        }
        self.search(origin, direction, space)
    }

    /// Cone search ignoring links and constraints.
    pub fn search<K: Copy + Eq>(
        &self,
        origin: &NavEntry<K>,
        direction: Navigation,
        space: &NavSpace<'_, K>,
    ) -> Option<K> {
        let axis = direction.vector()?;
        let mut best: Option<(f64, K)> = None;
        for candidate in space.entries {
            if !candidate.enabled || candidate.id == origin.id {
                continue;
            }
            let offset = candidate.center - origin.center;
            let len = offset.hypot();
            if len <= 0.0 || !len.is_finite() {
                continue;
            }
            if axis.dot(offset / len) < self.min_dot {
                continue;
            }
            let scaled = if direction.is_vertical() {
                Vec2::new(offset.x * self.perpendicular_bias, offset.y)
            } else {
                Vec2::new(offset.x, offset.y * self.perpendicular_bias)
            };
            let score = scaled.hypot2();
            // Ties go to the later entry.
            if best.is_none_or(|(s, _)| score <= s) {
                best = Some((score, candidate.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

impl<K> NavigationPolicy<K> for ConePolicy
where
    K: Copy + Eq,
{
    fn resolve(&self, origin: K, direction: Navigation, space: &NavSpace<'_, K>) -> Option<K> {
        let entry = space.get(origin)?;
        direction
            .fallback_order()
            .iter()
            .find_map(|d| self.step(entry, *d, space))
    }
}
