// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer press cycle state.
//!
//! A press cycle runs `Idle -> Pressed -> (Dragging) -> Released -> Idle`. The
//! router drives the transitions; this module only holds the data and the small,
//! self-contained rules that go with it:
//!
//! - Click eligibility is monotonic within a press: once [`ClickEligibility::Disabled`],
//!   nothing but a new [`PointerState::begin_press`] turns it back on.
//! - `dragged` is only ever set while a press is active, and `drag_started` is
//!   reset together with it in [`PointerState::end_press`].
//! - Double clicks compare against the previous click on the same region.

use kurbo::{Point, Vec2};

/// Whether the release of the current press may still count as a click.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClickEligibility {
    /// Release always clicks (used by controller submit).
    Always,
    /// Release clicks unless the pointer travelled past the click threshold.
    #[default]
    BasedOnDistance,
    /// Release never clicks.
    Disabled,
}

/// The most recent click, for double-click detection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LastClick<K> {
    /// Click time in milliseconds.
    pub time: u64,
    /// Region clicked; `None` matches any region (armed by a multi-tap).
    pub region: Option<K>,
}

/// Mutable state of one input source.
#[derive(Clone, Debug)]
pub struct PointerState<K> {
    /// Current screen position.
    pub position: Point,
    /// Position in the previous frame.
    pub last_position: Point,
    /// Movement since the previous frame.
    pub delta: Vec2,
    /// Movement accumulated since the press.
    pub total_delta: Vec2,
    /// Region that received `press(true)`.
    pub pressed: Option<K>,
    /// Region being dragged.
    pub dragged: Option<K>,
    /// Region under the pointer this frame.
    pub current: Option<K>,
    /// Region under the pointer last time it was evaluated.
    pub last: Option<K>,
    /// Region that last received `dragOver` in this cycle.
    pub drag_over: Option<K>,
    /// Time of the press, in milliseconds.
    pub press_time: u64,
    /// Previous click, if any.
    pub last_click: Option<LastClick<K>>,
    /// Click eligibility for the current press.
    pub click_eligibility: ClickEligibility,
    /// Whether a drag has started in the current press.
    pub drag_started: bool,
    /// Whether the long press fired in the current press.
    pub long_pressed: bool,
}

impl<K> Default for PointerState<K> {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            last_position: Point::ZERO,
            delta: Vec2::ZERO,
            total_delta: Vec2::ZERO,
            pressed: None,
            dragged: None,
            current: None,
            last: None,
            drag_over: None,
            press_time: 0,
            last_click: None,
            click_eligibility: ClickEligibility::default(),
            drag_started: false,
            long_pressed: false,
        }
    }
}

impl<K> PointerState<K>
where
    K: Copy + Eq,
{
    /// Fresh state at `position` with no history.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            last_position: position,
            ..Self::default()
        }
    }

    /// Move to `position`, updating `last_position` and `delta`. Returns the delta.
    pub fn move_to(&mut self, position: Point) -> Vec2 {
        self.last_position = self.position;
        self.position = position;
        self.delta = position - self.last_position;
        self.delta
    }

    /// Replace the region under the pointer, remembering the previous one in `last`.
    pub fn set_current(&mut self, region: Option<K>) {
        self.last = self.current;
        self.current = region;
    }

    /// Start a press on the current region. Returns the previously pressed region, if any.
    pub fn begin_press(&mut self, now: u64) -> Option<K> {
        let previous = self.pressed.take();
        self.pressed = self.current;
        self.dragged = self.current;
        self.drag_over = None;
        self.total_delta = Vec2::ZERO;
        self.drag_started = false;
        self.long_pressed = false;
        self.click_eligibility = ClickEligibility::BasedOnDistance;
        self.press_time = now;
        previous
    }

    /// Clear the press slots at the end of a cycle.
    pub fn end_press(&mut self) {
        self.pressed = None;
        self.dragged = None;
        self.drag_over = None;
        self.drag_started = false;
    }

    /// Whether a press is active.
    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_started && self.dragged.is_some()
    }

    /// Add this frame's movement to the press total.
    pub fn accumulate(&mut self, delta: Vec2) {
        self.total_delta += delta;
    }

    /// Whether the press total is longer than `threshold`.
    pub fn travelled_past(&self, threshold: f64) -> bool {
        self.total_delta.hypot2() > threshold * threshold
    }

    /// Permanently disable clicking for the rest of this press.
    pub fn disable_click(&mut self) {
        self.click_eligibility = ClickEligibility::Disabled;
    }

    /// Disable clicking once the press total passes `threshold`.
    ///
    /// Returns true if this call changed the eligibility.
    pub fn disable_click_past(&mut self, threshold: f64) -> bool {
        if self.click_eligibility == ClickEligibility::BasedOnDistance
            && self.travelled_past(threshold)
        {
            self.disable_click();
            true
        } else {
            false
        }
    }

    /// Milliseconds since the press started.
    pub fn press_elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.press_time)
    }

    /// Let the next click within the window count as a double click on any region.
    pub fn arm_double_click(&mut self, now: u64) {
        self.last_click = Some(LastClick { time: now, region: None });
    }

    /// Record a click on `region` at `now`. Returns true when it completes a double click.
    ///
    /// A double click needs the previous click to be on the same region and no more
    /// than `window` milliseconds earlier.
    pub fn record_click(&mut self, region: K, now: u64, window: u64) -> bool {
        let double = self.last_click.is_some_and(|last| {
            last.region.is_none_or(|r| r == region)
                && now >= last.time
                && now - last.time <= window
        });
        self.last_click = Some(LastClick {
            time: now,
            region: Some(region),
        });
        double
    }
}
