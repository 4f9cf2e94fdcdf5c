// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame input snapshot the router reads from.

use hashbrown::HashSet;
use kurbo::Point;
use smallvec::SmallVec;

use crate::types::KeyCode;

/// Lifecycle phase of a touch sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Finger went down this frame.
    Began,
    /// Finger moved.
    Moved,
    /// Finger is down and did not move.
    Stationary,
    /// Finger lifted.
    Ended,
    /// The platform cancelled the touch.
    Canceled,
}

/// One touch as reported by the platform for this frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchSample {
    /// Platform finger id.
    pub id: i32,
    /// Phase.
    pub phase: TouchPhase,
    /// Screen position.
    pub position: Point,
    /// Number of quick successive taps, as counted by the platform.
    pub tap_count: u32,
}

/// Analog axes read for controller navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Up is positive.
    Vertical,
    /// Right is positive.
    Horizontal,
}

/// Source of raw input for one frame.
///
/// Mouse buttons are indexed `0..3` (left, right, middle). A button reported as
/// down this frame must also report as held.
pub trait InputSource {
    /// Frame time in milliseconds; must not decrease between frames.
    fn time_ms(&self) -> u64;
    /// Mouse position in screen space.
    fn mouse_position(&self) -> Point;
    /// Button went down this frame.
    fn mouse_down(&self, button: u8) -> bool;
    /// Button is down.
    fn mouse_held(&self, button: u8) -> bool;
    /// Button went up this frame.
    fn mouse_up(&self, button: u8) -> bool;
    /// Scroll wheel delta.
    fn scroll(&self) -> f64;
    /// Active touches.
    fn touches(&self) -> &[TouchSample];
    /// Key went down this frame.
    fn key_down(&self, key: KeyCode) -> bool;
    /// Key is down.
    fn key_held(&self, key: KeyCode) -> bool;
    /// Key went up this frame.
    fn key_up(&self, key: KeyCode) -> bool;
    /// Analog axis value in `-1.0..=1.0`.
    fn axis(&self, axis: Axis) -> f64;
}

/// A plain-data [`InputSource`], filled in by the host (or a test) every frame.
///
/// The builder methods keep the down/held invariant: [`FrameInput::press`] marks a
/// button both down and held.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    /// Frame time in milliseconds.
    pub time_ms: u64,
    /// Mouse position.
    pub mouse_position: Point,
    /// Buttons that went down.
    pub mouse_down: [bool; 3],
    /// Buttons held.
    pub mouse_held: [bool; 3],
    /// Buttons that went up.
    pub mouse_up: [bool; 3],
    /// Scroll delta.
    pub scroll: f64,
    /// Touches.
    pub touches: SmallVec<[TouchSample; 4]>,
    /// Keys that went down.
    pub keys_down: HashSet<KeyCode>,
    /// Keys held.
    pub keys_held: HashSet<KeyCode>,
    /// Keys that went up.
    pub keys_up: HashSet<KeyCode>,
    /// Vertical axis.
    pub vertical_axis: f64,
    /// Horizontal axis.
    pub horizontal_axis: f64,
}

impl FrameInput {
    /// Empty frame at `time_ms`.
    pub fn at(time_ms: u64) -> Self {
        Self {
            time_ms,
            ..Self::default()
        }
    }

    /// Place the mouse.
    pub fn mouse_at(mut self, position: Point) -> Self {
        self.mouse_position = position;
        self
    }

    /// Button goes down this frame.
    pub fn press(mut self, button: u8) -> Self {
        if let Some(i) = button_index(button) {
            self.mouse_down[i] = true;
            self.mouse_held[i] = true;
        }
        self
    }

    /// Button stays down.
    pub fn hold(mut self, button: u8) -> Self {
        if let Some(i) = button_index(button) {
            self.mouse_held[i] = true;
        }
        self
    }

    /// Button goes up this frame.
    pub fn release(mut self, button: u8) -> Self {
        if let Some(i) = button_index(button) {
            self.mouse_up[i] = true;
            self.mouse_held[i] = false;
        }
        self
    }

    /// Scroll by `delta`.
    pub fn scrolled(mut self, delta: f64) -> Self {
        self.scroll = delta;
        self
    }

    /// Add a touch sample with a single tap.
    pub fn touch(mut self, id: i32, phase: TouchPhase, position: Point) -> Self {
        self.touches.push(TouchSample {
            id,
            phase,
            position,
            tap_count: 1,
        });
        self
    }

    /// Add a touch sample with an explicit tap count.
    pub fn tap(mut self, id: i32, phase: TouchPhase, position: Point, tap_count: u32) -> Self {
        self.touches.push(TouchSample {
            id,
            phase,
            position,
            tap_count,
        });
        self
    }

    /// Key goes down this frame.
    pub fn key_press(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self.keys_held.insert(key);
        self
    }

    /// Key stays down.
    pub fn key_hold(mut self, key: KeyCode) -> Self {
        self.keys_held.insert(key);
        self
    }

    /// Key goes up this frame.
    pub fn key_release(mut self, key: KeyCode) -> Self {
        self.keys_up.insert(key);
        self.keys_held.remove(&key);
        self
    }

    /// Set both analog axes.
    pub fn axes(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_axis = horizontal;
        self.vertical_axis = vertical;
        self
    }
}

fn button_index(button: u8) -> Option<usize> {
    let i = usize::from(button);
    (i < 3).then_some(i)
}

impl InputSource for FrameInput {
    fn time_ms(&self) -> u64 {
        self.time_ms
    }

    fn mouse_position(&self) -> Point {
        self.mouse_position
    }

    fn mouse_down(&self, button: u8) -> bool {
        button_index(button).is_some_and(|i| self.mouse_down[i])
    }

    fn mouse_held(&self, button: u8) -> bool {
        button_index(button).is_some_and(|i| self.mouse_held[i])
    }

    fn mouse_up(&self, button: u8) -> bool {
        button_index(button).is_some_and(|i| self.mouse_up[i])
    }

    fn scroll(&self) -> f64 {
        self.scroll
    }

    fn touches(&self) -> &[TouchSample] {
        &self.touches
    }

    fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    fn key_up(&self, key: KeyCode) -> bool {
        self.keys_up.contains(&key)
    }

    fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.vertical_axis,
            Axis::Horizontal => self.horizontal_axis,
        }
    }
}
