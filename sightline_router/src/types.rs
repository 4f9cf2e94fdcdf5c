// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification model: what the router tells regions, and in which context.

use kurbo::Vec2;
use sightline_hit::CameraId;
use sightline_pointer::PointerId;

/// Which input family produced the most recent activity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scheme {
    /// Mouse buttons and movement.
    #[default]
    Mouse,
    /// Touch screen.
    Touch,
    /// Controller or keyboard navigation.
    Controller,
}

/// Keys the router reads or reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(missing_docs, reason = "Key names are self-describing.")]
pub enum KeyCode {
    Return,
    Escape,
    Tab,
    Space,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
    W,
    A,
    S,
    D,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    JoystickButton0,
    JoystickButton1,
    Mouse0,
    Mouse1,
    Mouse2,
    /// Host-defined key.
    Other(u32),
}

impl KeyCode {
    /// Key code reported for mouse button `button`.
    pub fn mouse(button: u8) -> Self {
        match button {
            0 => Self::Mouse0,
            1 => Self::Mouse1,
            _ => Self::Mouse2,
        }
    }
}

/// What happened to the target region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NotificationKind<K> {
    /// Pointer entered (`true`) or left (`false`) the region.
    Hover(bool),
    /// Pointer went down (`true`) or up (`false`) on the region.
    Press(bool),
    /// Press and release on the same region.
    Click,
    /// Second click within the double-click window.
    DoubleClick,
    /// Drag began on the region.
    DragStart,
    /// Dragged region moved by this delta.
    Drag(Vec2),
    /// The carried region is being dragged over the target.
    DragOver(K),
    /// The carried region was dragged off the target.
    DragOut(K),
    /// Drag of the target ended.
    DragEnd,
    /// The carried region was dropped on the target.
    Drop(K),
    /// Region gained (`true`) or lost (`false`) the selection.
    Select(bool),
    /// Mouse wheel over the region.
    Scroll(f64),
    /// Tooltip should show (`true`) or hide (`false`).
    Tooltip(bool),
    /// Key pressed while the region is selected.
    Key(KeyCode),
    /// Pointer held still on the region past the tooltip delay.
    LongPress,
}

/// Router state at the time a notification was sent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationContext {
    /// Pointer being processed, if any.
    pub pointer: Option<PointerId>,
    /// Active input scheme.
    pub scheme: Scheme,
    /// Key or button behind the event, if any.
    pub key: Option<KeyCode>,
    /// Camera that produced the hit or the press.
    pub camera: Option<CameraId>,
    /// Frame time in milliseconds.
    pub time: u64,
}

/// A notification addressed to one region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Notification<K> {
    /// Receiving region.
    pub target: K,
    /// Event.
    pub kind: NotificationKind<K>,
    /// Router context.
    pub context: NotificationContext,
    /// Set on copies relayed to the generic handler: the original target.
    pub relayed_from: Option<K>,
}
