// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router configuration.

use crate::types::KeyCode;

/// Tunables for [`Router`](crate::Router).
///
/// Distances are in screen pixels, times in milliseconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Process mouse input.
    pub use_mouse: bool,
    /// Process touch input.
    pub use_touch: bool,
    /// Process keyboard navigation and submit keys.
    pub use_keyboard: bool,
    /// Process controller axes and buttons.
    pub use_controller: bool,
    /// Track every finger separately; otherwise all touches map to one pointer.
    pub allow_multi_touch: bool,
    /// Keep a tooltip up while the mouse moves within the same region.
    pub sticky_tooltip: bool,
    /// Show hover tooltips.
    pub show_tooltips: bool,
    /// Hover time before a tooltip, and hold time before a long press.
    pub tooltip_delay_ms: u64,
    /// Show the tooltip on long press.
    pub long_press_tooltip: bool,
    /// Mouse travel before a drag starts.
    pub mouse_drag_threshold: f64,
    /// Mouse travel after which a release no longer clicks.
    pub mouse_click_threshold: f64,
    /// Touch travel before a drag starts.
    pub touch_drag_threshold: f64,
    /// Touch travel after which a release no longer clicks.
    pub touch_click_threshold: f64,
    /// Maximum time between two clicks of a double click.
    pub double_click_window_ms: u64,
    /// Minimum time between idle hover raycasts.
    pub hover_raycast_interval_ms: u64,
    /// Axis magnitude that counts as a direction.
    pub axis_threshold: f64,
    /// Delay between repeated axis directions.
    pub axis_repeat_ms: u64,
    /// Keys acting as the controller's "press".
    pub submit_keys: [Option<KeyCode>; 2],
    /// Keys that cancel.
    pub cancel_keys: [Option<KeyCode>; 2],
    /// Report the left button as the right button while Control is held.
    pub command_click: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            use_mouse: true,
            use_touch: true,
            use_keyboard: true,
            use_controller: true,
            allow_multi_touch: true,
            sticky_tooltip: true,
            show_tooltips: true,
            tooltip_delay_ms: 1000,
            long_press_tooltip: false,
            mouse_drag_threshold: 4.0,
            mouse_click_threshold: 10.0,
            touch_drag_threshold: 40.0,
            touch_click_threshold: 40.0,
            double_click_window_ms: 350,
            hover_raycast_interval_ms: 20,
            axis_threshold: 0.75,
            axis_repeat_ms: 250,
            submit_keys: [Some(KeyCode::Return), Some(KeyCode::JoystickButton0)],
            cancel_keys: [Some(KeyCode::Escape), Some(KeyCode::JoystickButton1)],
            command_click: false,
        }
    }
}

/// A rejected [`RouterConfig`] value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A distance threshold is negative, NaN, or infinite.
    #[error("`{name}` must be a finite, non-negative distance (got {value})")]
    InvalidThreshold {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The double-click window is zero.
    #[error("`double_click_window_ms` must be greater than zero")]
    ZeroDoubleClickWindow,
    /// The axis threshold is outside `(0, 1]`.
    #[error("`axis_threshold` must be in (0, 1] (got {0})")]
    AxisThreshold(f64),
}

impl RouterConfig {
    /// Check every value the router relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("mouse_drag_threshold", self.mouse_drag_threshold),
            ("mouse_click_threshold", self.mouse_click_threshold),
            ("touch_drag_threshold", self.touch_drag_threshold),
            ("touch_click_threshold", self.touch_click_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.double_click_window_ms == 0 {
            return Err(ConfigError::ZeroDoubleClickWindow);
        }
        if !(self.axis_threshold > 0.0 && self.axis_threshold <= 1.0) {
            return Err(ConfigError::AxisThreshold(self.axis_threshold));
        }
        Ok(())
    }

    /// Bound submit keys, skipping empty slots.
    pub fn bound_submit_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.submit_keys.iter().flatten().copied()
    }

    /// Bound cancel keys, skipping empty slots.
    pub fn bound_cancel_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.cancel_keys.iter().flatten().copied()
    }
}
