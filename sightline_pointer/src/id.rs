// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Signed pointer identifier.
///
/// - `-1`, `-2`, `-3`: left, right, and middle mouse buttons.
/// - `-100`: the controller/keyboard virtual pointer.
/// - `0..`: touches, by finger id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i32);

impl PointerId {
    /// Left mouse button.
    pub const MOUSE_LEFT: Self = Self(-1);
    /// Right mouse button.
    pub const MOUSE_RIGHT: Self = Self(-2);
    /// Middle mouse button.
    pub const MOUSE_MIDDLE: Self = Self(-3);
    /// Controller and keyboard.
    pub const CONTROLLER: Self = Self(-100);

    /// Mouse button `0..3`.
    pub const fn mouse(button: u8) -> Option<Self> {
        match button {
            0 => Some(Self::MOUSE_LEFT),
            1 => Some(Self::MOUSE_RIGHT),
            2 => Some(Self::MOUSE_MIDDLE),
            _ => None,
        }
    }

    /// Touch pointer for finger `id`; negative ids are clamped to zero.
    pub const fn touch(id: i32) -> Self {
        if id < 0 { Self(0) } else { Self(id) }
    }

    /// Mouse button index, if this is a mouse pointer.
    pub const fn mouse_button(self) -> Option<u8> {
        match self.0 {
            -1 => Some(0),
            -2 => Some(1),
            -3 => Some(2),
            _ => None,
        }
    }

    /// True for the three mouse buttons.
    pub const fn is_mouse(self) -> bool {
        self.mouse_button().is_some()
    }

    /// True for finger ids.
    pub const fn is_touch(self) -> bool {
        self.0 >= 0
    }

    /// True for the controller virtual pointer.
    pub const fn is_controller(self) -> bool {
        self.0 == Self::CONTROLLER.0
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mouse_button() {
            Some(b) => write!(f, "mouse{b}"),
            None if self.is_controller() => f.write_str("controller"),
            None => write!(f, "touch{}", self.0),
        }
    }
}
