// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage for every pointer the router knows about.

use hashbrown::HashMap;

use crate::id::PointerId;
use crate::state::PointerState;

/// All pointer states, keyed by [`PointerId`].
#[derive(Clone, Debug)]
pub struct PointerTable<K> {
    mouse: [PointerState<K>; 3],
    controller: PointerState<K>,
    touches: HashMap<PointerId, PointerState<K>>,
}

impl<K> Default for PointerTable<K> {
    fn default() -> Self {
        Self {
            mouse: [
                PointerState::default(),
                PointerState::default(),
                PointerState::default(),
            ],
            controller: PointerState::default(),
            touches: HashMap::new(),
        }
    }
}

impl<K> PointerTable<K>
where
    K: Copy + Eq,
{
    /// Empty table with idle mouse and controller pointers.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `id`, if it exists.
    pub fn get(&self, id: PointerId) -> Option<&PointerState<K>> {
        if let Some(b) = id.mouse_button() {
            return self.mouse.get(usize::from(b));
        }
        if id.is_controller() {
            return Some(&self.controller);
        }
        self.touches.get(&id)
    }

    /// Mutable state for `id`, if it exists.
    pub fn get_mut(&mut self, id: PointerId) -> Option<&mut PointerState<K>> {
        if let Some(b) = id.mouse_button() {
            return self.mouse.get_mut(usize::from(b));
        }
        if id.is_controller() {
            return Some(&mut self.controller);
        }
        self.touches.get_mut(&id)
    }

    /// Mouse button `button` (0..3); out-of-range indices clamp to the left button.
    pub fn mouse(&self, button: u8) -> &PointerState<K> {
        &self.mouse[usize::from(button).min(2)]
    }

    /// Mutable mouse button state.
    pub fn mouse_mut(&mut self, button: u8) -> &mut PointerState<K> {
        &mut self.mouse[usize::from(button).min(2)]
    }

    /// All three mouse buttons.
    pub fn mice_mut(&mut self) -> &mut [PointerState<K>; 3] {
        &mut self.mouse
    }

    /// The controller virtual pointer.
    pub fn controller(&self) -> &PointerState<K> {
        &self.controller
    }

    /// Mutable controller virtual pointer.
    pub fn controller_mut(&mut self) -> &mut PointerState<K> {
        &mut self.controller
    }

    /// State for touch `id`, creating it if needed. The flag is true on creation.
    pub fn touch_or_insert(&mut self, id: PointerId) -> (&mut PointerState<K>, bool) {
        let mut created = false;
        let state = self.touches.entry(id).or_insert_with(|| {
            created = true;
            PointerState::default()
        });
        (state, created)
    }

    /// Drop a touch after release.
    pub fn remove_touch(&mut self, id: PointerId) -> Option<PointerState<K>> {
        self.touches.remove(&id)
    }

    /// Number of live touches.
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Drop every touch.
    pub fn clear_touches(&mut self) {
        self.touches.clear();
    }

    /// Every pointer state with its id. Touch order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (PointerId, &PointerState<K>)> {
        [PointerId::MOUSE_LEFT, PointerId::MOUSE_RIGHT, PointerId::MOUSE_MIDDLE]
            .into_iter()
            .zip(self.mouse.iter())
            .chain(core::iter::once((PointerId::CONTROLLER, &self.controller)))
            .chain(self.touches.iter().map(|(id, s)| (*id, s)))
    }

    /// Number of pointers currently pressing something.
    pub fn pressed_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.is_pressed()).count()
    }

    /// Number of pointers currently dragging something.
    pub fn drag_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.is_dragging()).count()
    }

    /// Whether any pointer is pressing `region`.
    pub fn is_pressed(&self, region: K) -> bool {
        self.iter().any(|(_, s)| s.pressed == Some(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_and_controller_always_exist() {
        let table: PointerTable<u32> = PointerTable::new();
        assert!(table.get(PointerId::MOUSE_MIDDLE).is_some());
        assert!(table.get(PointerId::CONTROLLER).is_some());
        assert!(table.get(PointerId::touch(0)).is_none());
        assert_eq!(table.iter().count(), 4);
    }

    #[test]
    fn touches_are_created_and_dropped() {
        let mut table: PointerTable<u32> = PointerTable::new();
        let (_, created) = table.touch_or_insert(PointerId::touch(2));
        assert!(created);
        let (state, created) = table.touch_or_insert(PointerId::touch(2));
        assert!(!created);
        state.set_current(Some(11));
        state.begin_press(0);
        assert!(table.is_pressed(11));
        assert_eq!(table.pressed_count(), 1);
        assert!(table.remove_touch(PointerId::touch(2)).is_some());
        assert!(!table.is_pressed(11));
    }

    #[test]
    fn drag_count_spans_sources() {
        let mut table: PointerTable<u32> = PointerTable::new();
        let m = table.mouse_mut(0);
        m.set_current(Some(1));
        m.begin_press(0);
        m.drag_started = true;
        let (t, _) = table.touch_or_insert(PointerId::touch(0));
        t.set_current(Some(2));
        t.begin_press(0);
        t.drag_started = true;
        assert_eq!(table.drag_count(), 2);
        table.clear_touches();
        assert_eq!(table.drag_count(), 1);
    }
}
