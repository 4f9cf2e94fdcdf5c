// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame-driven input router.
//!
//! [`Router::update`] runs once per frame. It reads an [`InputSource`], hit-tests every
//! pointer against the cameras, advances each pointer's press cycle, and sends the
//! resulting [`Notification`]s through the [`Dispatcher`] to a [`NotificationSink`].
//!
//! ## Frame order
//!
//! 1. Touches (or, with no touches, the mouse).
//! 2. Cancel keys clear the selection while mouse input is on.
//! 3. A selection that became inactive is dropped without notification.
//! 4. Submit, direction, tab, and cancel keys for the selection.
//! 5. Scroll and pending tooltip for the hovered region.
//! 6. Frame tasks.
//!
//! ## Press cycle
//!
//! Press sends `Press(true)` and selects the pressed region. Movement past the drag
//! threshold, or leaving the pressed region, starts a drag: `DragStart`, then
//! `DragOver`/`DragOut` as the region under the pointer changes, and `Drag` for every
//! movement. Release sends `DragOut` and `DragEnd` (if dragging), `Press(false)`, and then
//! either `Click` (and `DoubleClick`) or `Drop`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use sightline_hit::{CameraId, CameraSet, Hit, HitTester, RegionFlags, RegionProvider};
use sightline_nav::{ConePolicy, Navigation};
use sightline_pointer::{ClickEligibility, PointerId, PointerState, PointerTable};

use crate::config::{ConfigError, RouterConfig};
use crate::dispatcher::{Dispatcher, NotificationSink};
use crate::input::{Axis, InputSource, TouchPhase};
use crate::navigation::{NavRegistry, Navigable};
use crate::selection::Selection;
use crate::tasks::{FrameTask, RouterView, TaskStatus};
use crate::tooltip::Tooltip;
use crate::types::{KeyCode, Notification, NotificationContext, NotificationKind, Scheme};

/// Nested selection changes allowed before further requests are ignored.
const MAX_NESTED_SELECTIONS: u8 = 10;

/// Movement below this squared length is not movement.
const MIN_MOVE_SQUARED: f64 = 0.001;

/// Unified router for mouse, touch, keyboard, and controller input.
pub struct Router<K> {
    config: RouterConfig,
    cameras: CameraSet,
    tester: HitTester<K>,
    pointers: PointerTable<K>,
    pressed_cameras: HashMap<PointerId, CameraId>,
    dispatcher: Dispatcher<K>,
    selection: Selection<K>,
    scheme: Scheme,
    /// Region that received `Hover(true)`.
    hover: Option<K>,
    /// Result of the latest mouse or touch raycast, after fall-through.
    hovered: Option<K>,
    last_hit: Option<Hit<K>>,
    last_touch_position: Point,
    tooltip: Tooltip<K>,
    fall_through: Option<K>,
    navigation: NavRegistry<K>,
    nav_policy: ConePolicy,
    tasks: Vec<Box<dyn FrameTask<K>>>,
    ctx: NotificationContext,
    now: u64,
    next_raycast: u64,
    next_axis_event: u64,
    touches_last_frame: bool,
    selecting: u8,
}

impl<K: fmt::Debug> fmt::Debug for Router<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("scheme", &self.scheme)
            .field("selection", &self.selection)
            .field("hover", &self.hover)
            .field("hovered", &self.hovered)
            .field("tooltip", &self.tooltip)
            .field("cameras", &self.cameras.len())
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl<K> Default for Router<K>
where
    K: Copy + Eq + fmt::Debug,
{
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<K> Router<K>
where
    K: Copy + Eq + fmt::Debug,
{
    /// Router with `config` and no cameras.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            cameras: CameraSet::new(),
            tester: HitTester::new(),
            pointers: PointerTable::new(),
            pressed_cameras: HashMap::new(),
            dispatcher: Dispatcher::new(),
            selection: Selection::default(),
            scheme: Scheme::Mouse,
            hover: None,
            hovered: None,
            last_hit: None,
            last_touch_position: Point::ZERO,
            tooltip: Tooltip::default(),
            fall_through: None,
            navigation: NavRegistry::new(),
            nav_policy: ConePolicy::default(),
            tasks: Vec::new(),
            ctx: NotificationContext::default(),
            now: 0,
            next_raycast: 0,
            next_axis_event: 0,
            touches_last_frame: false,
            selecting: 0,
        }
    }

    /// Router with a validated `config`.
    pub fn with_config(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Mutable configuration; takes effect next frame.
    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    /// Cameras used for hit testing.
    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    /// Mutable cameras.
    pub fn cameras_mut(&mut self) -> &mut CameraSet {
        &mut self.cameras
    }

    /// Region that receives events for pointers over nothing.
    pub fn set_fall_through(&mut self, region: Option<K>) {
        self.fall_through = region;
    }

    /// Region that receives a copy of every notification, and misses when no
    /// fall-through is set.
    pub fn set_generic_handler(&mut self, region: Option<K>) {
        self.dispatcher.set_generic_handler(region);
    }

    /// Policy used to resolve directional navigation.
    pub fn set_navigation_policy(&mut self, policy: ConePolicy) {
        self.nav_policy = policy;
    }

    /// Navigation registrations.
    pub fn navigation(&self) -> &NavRegistry<K> {
        &self.navigation
    }

    /// Register a navigable region. With `starts_selected`, it becomes the selection
    /// under the controller scheme when nothing active is selected.
    pub fn register_navigable<P, S>(&mut self, provider: &P, sink: &mut S, navigable: Navigable<K>)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let region = navigable.region;
        let starts_selected = navigable.starts_selected;
        self.navigation.register(navigable);
        if starts_selected
            && self
                .selection
                .current()
                .is_none_or(|s| !provider.flags(s).contains(RegionFlags::ACTIVE))
        {
            self.set_scheme(Scheme::Controller);
            self.set_selection(provider, sink, Some(region));
        }
    }

    /// Remove a navigable region.
    pub fn unregister_navigable(&mut self, region: K) -> Option<Navigable<K>> {
        self.navigation.unregister(region)
    }

    /// Add a task polled after every update.
    pub fn add_task(&mut self, task: Box<dyn FrameTask<K>>) {
        self.tasks.push(task);
    }

    /// Tasks still pending.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Override click eligibility for a pointer's current press.
    ///
    /// Returns false if the pointer does not exist.
    pub fn set_click_eligibility(&mut self, pointer: PointerId, eligibility: ClickEligibility) -> bool {
        match self.pointers.get_mut(pointer) {
            Some(state) => {
                state.click_eligibility = eligibility;
                true
            }
            None => false,
        }
    }

    /// Hit test a screen point without touching router state.
    pub fn hit_test<P>(&mut self, provider: &P, screen: Point) -> Option<Hit<K>>
    where
        P: RegionProvider<K> + ?Sized,
    {
        self.tester.hit_test(&self.cameras, provider, screen)
    }

    // --- queries ---

    /// Active input scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Selected region.
    pub fn selection(&self) -> Option<K> {
        self.selection.current()
    }

    /// Whether the selection captures text input.
    pub fn input_has_focus(&self) -> bool {
        self.selection.has_focus()
    }

    /// Region under the pointer from the latest raycast, after fall-through.
    pub fn hovered(&self) -> Option<K> {
        self.hovered
    }

    /// Region that currently has `Hover(true)`.
    pub fn hover_target(&self) -> Option<K> {
        self.hover
    }

    /// Latest real hit.
    pub fn last_hit(&self) -> Option<Hit<K>> {
        self.last_hit
    }

    /// Last mouse or touch position processed.
    pub fn last_touch_position(&self) -> Point {
        self.last_touch_position
    }

    /// Region currently showing or waiting for a tooltip.
    pub fn tooltip(&self) -> &Tooltip<K> {
        &self.tooltip
    }

    /// Pointer state.
    pub fn pointer(&self, id: PointerId) -> Option<&PointerState<K>> {
        self.pointers.get(id)
    }

    /// Whether any pointer is pressing `region`.
    pub fn is_pressed(&self, region: K) -> bool {
        self.pointers.is_pressed(region)
    }

    /// Number of pointers in a press.
    pub fn input_source_count(&self) -> usize {
        self.pointers.pressed_count()
    }

    /// Number of pointers dragging.
    pub fn drag_count(&self) -> usize {
        self.pointers.drag_count()
    }

    /// Mouse: `region` is hovered. Controller: `region` is selected. Touch: never.
    pub fn is_highlighted(&self, region: K) -> bool {
        match self.scheme {
            Scheme::Mouse => self.hovered == Some(region),
            Scheme::Controller => self.selection.current() == Some(region),
            Scheme::Touch => false,
        }
    }

    /// Notifications dropped because they nested too deep.
    pub fn dropped_notifications(&self) -> u64 {
        self.dispatcher.dropped()
    }

    // --- selection ---

    /// Select `region`, sending `Select(false)` to the old and `Select(true)` to the
    /// new selection. Selecting the current selection does nothing.
    ///
    /// Outside pointer processing the controller pointer is borrowed as the
    /// notification context, with the camera that sees the new region.
    pub fn set_selection<P, S>(&mut self, provider: &P, sink: &mut S, region: Option<K>)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        if self.selection.current() == region {
            return;
        }
        if self.selecting >= MAX_NESTED_SELECTIONS {
            log::debug!("ignoring selection of {region:?}: nested too deep");
            return;
        }
        self.selecting += 1;

        let borrowed = self.ctx.pointer.is_none();
        let saved = self.ctx;
        if borrowed {
            self.ctx.pointer = Some(PointerId::CONTROLLER);
            self.set_scheme(Scheme::Controller);
        }

        self.selection.clear_focus();
        let old = self.selection.current();
        self.emit(provider, sink, old, NotificationKind::Select(false));
        self.selection.replace(region);
        log::debug!("selection {old:?} -> {region:?}");

        if let Some(new) = region {
            if borrowed {
                self.ctx.camera = self.cameras.for_layer(provider.layer(new)).map(|c| c.id);
            }
            self.selection.refresh_focus(provider.flags(new));
            self.emit(provider, sink, Some(new), NotificationKind::Select(true));
        }

        if borrowed {
            self.ctx = saved;
        }
        self.selecting -= 1;
    }

    // --- frame ---

    /// Process one frame of input.
    pub fn update<P, I, S>(&mut self, provider: &P, input: &I, sink: &mut S)
    where
        P: RegionProvider<K> + ?Sized,
        I: InputSource + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        self.now = input.time_ms();
        self.ctx = NotificationContext {
            time: self.now,
            ..NotificationContext::default()
        };

        if self.config.use_touch {
            self.process_touches(provider, input, sink);
        } else if self.config.use_mouse {
            self.process_mouse(provider, input, sink);
        }

        if self.config.use_mouse
            && self.selection.current().is_some()
            && let Some(key) = self.cancel_key_down(input)
        {
            self.set_scheme(Scheme::Controller);
            self.ctx.key = Some(key);
            self.set_selection(provider, sink, None);
            self.ctx.key = None;
        }

        match self.selection.current() {
            None => self.selection.clear_focus(),
            Some(s) if !provider.flags(s).contains(RegionFlags::ACTIVE) => {
                log::debug!("selection {s:?} became inactive");
                self.selection.forget();
            }
            Some(_) => {}
        }

        if (self.config.use_keyboard || self.config.use_controller)
            && self.selection.current().is_some()
        {
            self.process_others(provider, input, sink);
        }

        if self.config.use_mouse && self.hover.is_some() {
            self.ctx.pointer = Some(PointerId::MOUSE_LEFT);
            let scroll = input.scroll();
            if scroll != 0.0 {
                self.emit(provider, sink, self.hover, NotificationKind::Scroll(scroll));
            }
            if self.config.show_tooltips
                && self.tooltip.deadline().is_some()
                && (self.tooltip.is_due(self.now) || shift_held(input))
            {
                self.show_tooltip(provider, sink, self.hover);
            }
            self.ctx.pointer = None;
        }

        self.poll_tasks();
    }

    fn poll_tasks(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let view = RouterView {
            time: self.now,
            selection: self.selection.current(),
            hovered: self.hovered,
            scheme: self.scheme,
            pointers: &self.pointers,
        };
        self.tasks
            .retain_mut(|task| task.poll(&view) == TaskStatus::Pending);
    }

    fn cancel_key_down<I: InputSource + ?Sized>(&self, input: &I) -> Option<KeyCode> {
        self.config.bound_cancel_keys().find(|k| input.key_down(*k))
    }

    fn set_scheme(&mut self, scheme: Scheme) {
        if self.scheme != scheme {
            log::debug!("input scheme {:?} -> {scheme:?}", self.scheme);
            self.scheme = scheme;
        }
    }

    fn emit<P, S>(&mut self, provider: &P, sink: &mut S, target: Option<K>, kind: NotificationKind<K>)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let Some(target) = target else {
            return;
        };
        let context = NotificationContext {
            scheme: self.scheme,
            ..self.ctx
        };
        self.dispatcher.notify(
            provider,
            sink,
            Notification {
                target,
                kind,
                context,
                relayed_from: None,
            },
        );
        if let Some(request) = self.dispatcher.take_selection_request() {
            self.set_selection(provider, sink, request);
        }
    }

    fn show_tooltip<P, S>(&mut self, provider: &P, sink: &mut S, target: Option<K>)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        self.tooltip.show(target);
        log::debug!("tooltip shown on {target:?}");
        self.emit(provider, sink, target, NotificationKind::Tooltip(true));
    }

    fn hide_tooltip<P, S>(&mut self, provider: &P, sink: &mut S)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let target = self.tooltip.hide();
        log::debug!("tooltip hidden on {target:?}");
        self.emit(provider, sink, target, NotificationKind::Tooltip(false));
    }

    fn raycast<P>(&mut self, provider: &P, screen: Point) -> Option<K>
    where
        P: RegionProvider<K> + ?Sized,
    {
        self.last_hit = self.tester.hit_test(&self.cameras, provider, screen);
        self.hovered = match self.last_hit {
            Some(hit) => Some(hit.region),
            None => self.fall_through.or(self.dispatcher.generic_handler()),
        };
        self.hovered
    }

    fn hit_camera(&self) -> Option<CameraId> {
        self.last_hit.map(|h| h.camera)
    }

    // --- mouse ---

    fn process_mouse<P, I, S>(&mut self, provider: &P, input: &I, sink: &mut S)
    where
        P: RegionProvider<K> + ?Sized,
        I: InputSource + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let mut is_pressed = false;
        let mut just_pressed = false;
        for b in 0..3 {
            if input.mouse_down(b) {
                self.set_scheme(Scheme::Mouse);
                just_pressed = true;
                is_pressed = true;
            } else if input.mouse_held(b) {
                self.set_scheme(Scheme::Mouse);
                is_pressed = true;
            }
        }
        if self.scheme == Scheme::Touch {
            return;
        }

        let position = input.mouse_position();
        let delta = position - self.pointers.mouse(0).position;
        let moved = delta.hypot2();
        let position_changed = if self.scheme != Scheme::Mouse {
            if moved < MIN_MOVE_SQUARED {
                return;
            }
            self.set_scheme(Scheme::Mouse);
            true
        } else {
            moved > MIN_MOVE_SQUARED
        };

        self.last_touch_position = position;
        for state in self.pointers.mice_mut() {
            state.last_position = state.position;
            state.position = position;
            state.delta = delta;
        }

        if is_pressed || position_changed || self.now >= self.next_raycast {
            self.next_raycast = self.now + self.config.hover_raycast_interval_ms;
            let hit = self.raycast(provider, position);
            for state in self.pointers.mice_mut() {
                state.current = hit;
            }
        }
        self.ctx.camera = self.hit_camera();

        let under = self.pointers.mouse(0).current;
        let highlight_changed = self.pointers.mouse(0).last != under;
        if highlight_changed {
            self.set_scheme(Scheme::Mouse);
        }
        self.ctx.pointer = Some(PointerId::MOUSE_LEFT);

        if is_pressed {
            self.tooltip.cancel_pending();
        } else if position_changed && (!self.config.sticky_tooltip || highlight_changed) {
            if !self.tooltip.postpone(self.now, self.config.tooltip_delay_ms)
                && self.tooltip.target().is_some()
            {
                self.hide_tooltip(provider, sink);
            }
        }

        if (just_pressed || !is_pressed) && self.hover.is_some() && highlight_changed {
            if self.tooltip.target().is_some() {
                self.hide_tooltip(provider, sink);
            }
            let old = self.hover.take();
            self.emit(provider, sink, old, NotificationKind::Hover(false));
        }

        let control = input.key_held(KeyCode::LeftControl) || input.key_held(KeyCode::RightControl);
        for b in 0..3_u8 {
            let pressed = input.mouse_down(b);
            let released = input.mouse_up(b);
            if pressed || released {
                self.set_scheme(Scheme::Mouse);
            }
            let Some(slot) = PointerId::mouse(b) else {
                continue;
            };
            let reported = if self.config.command_click && b == 0 && control {
                PointerId::MOUSE_RIGHT
            } else {
                slot
            };
            self.ctx.pointer = Some(reported);
            self.ctx.key = Some(KeyCode::mouse(b));

            let mut state = core::mem::take(self.pointers.mouse_mut(b));
            self.ctx.camera = self.hit_camera();
            if pressed {
                if let Some(camera) = self.ctx.camera {
                    self.pressed_cameras.insert(reported, camera);
                }
            } else if state.is_pressed() {
                if let Some(camera) = self.pressed_cameras.get(&reported) {
                    self.ctx.camera = Some(*camera);
                }
            }
            self.process_touch(provider, sink, &mut state, pressed, released);
            *self.pointers.mouse_mut(b) = state;
            self.ctx.key = None;
        }

        if !is_pressed && highlight_changed {
            self.set_scheme(Scheme::Mouse);
            self.tooltip.schedule(self.now, self.config.tooltip_delay_ms);
            // A release this frame may already have hovered `under`.
            if self.hover != under {
                self.hover = under;
                self.ctx.pointer = Some(PointerId::MOUSE_LEFT);
                self.ctx.camera = self.hit_camera();
                self.emit(provider, sink, under, NotificationKind::Hover(true));
            }
        }
        self.ctx.pointer = None;
        self.ctx.camera = None;

        let under = self.pointers.mouse(0).current;
        for state in self.pointers.mice_mut() {
            state.last = under;
        }
    }

    // --- touch ---

    fn process_touches<P, I, S>(&mut self, provider: &P, input: &I, sink: &mut S)
    where
        P: RegionProvider<K> + ?Sized,
        I: InputSource + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let touches = input.touches();
        for touch in touches {
            let id = if self.config.allow_multi_touch {
                PointerId::touch(touch.id)
            } else {
                PointerId::touch(1)
            };
            self.ctx.pointer = Some(id);

            let (slot, created) = self.pointers.touch_or_insert(id);
            let mut state = core::mem::take(slot);
            let pressed = touch.phase == TouchPhase::Began || created;
            let released = matches!(touch.phase, TouchPhase::Ended | TouchPhase::Canceled);
            self.set_scheme(Scheme::Touch);

            state.delta = if pressed {
                Vec2::ZERO
            } else {
                touch.position - state.position
            };
            state.last_position = if created { touch.position } else { state.position };
            state.position = touch.position;

            let hit = self.raycast(provider, touch.position);
            state.set_current(hit);
            self.last_touch_position = touch.position;

            self.ctx.camera = self.hit_camera();
            if pressed {
                if let Some(camera) = self.ctx.camera {
                    self.pressed_cameras.insert(id, camera);
                }
            } else if state.is_pressed() {
                if let Some(camera) = self.pressed_cameras.get(&id) {
                    self.ctx.camera = Some(*camera);
                }
            }

            if touch.tap_count > 1 {
                state.arm_double_click(self.now);
            }

            self.process_touch(provider, sink, &mut state, pressed, released);
            state.last = None;

            if released {
                self.pointers.remove_touch(id);
                self.pressed_cameras.remove(&id);
            } else if let Some(slot) = self.pointers.get_mut(id) {
                *slot = state;
            }

            if !self.config.allow_multi_touch {
                break;
            }
        }
        self.ctx.pointer = None;
        self.ctx.camera = None;

        if touches.is_empty() {
            // Skip the mouse for one frame after touches end; platforms often
            // synthesize a mouse event at the last touch position.
            if self.touches_last_frame {
                self.touches_last_frame = false;
            } else if self.config.use_mouse {
                self.process_mouse(provider, input, sink);
            }
        } else {
            self.touches_last_frame = true;
        }
    }

    // --- keyboard and controller ---

    fn process_others<P, I, S>(&mut self, provider: &P, input: &I, sink: &mut S)
    where
        P: RegionProvider<K> + ?Sized,
        I: InputSource + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        self.ctx.pointer = Some(PointerId::CONTROLLER);
        self.ctx.camera = self
            .selection
            .current()
            .and_then(|s| self.cameras.for_layer(provider.layer(s)))
            .map(|c| c.id);

        let mut submit_down = false;
        let mut submit_up = false;
        for key in self.config.bound_submit_keys() {
            if input.key_down(key) {
                self.ctx.key = Some(key);
                submit_down = true;
            }
            if input.key_up(key) {
                self.ctx.key = Some(key);
                submit_up = true;
            }
        }

        if submit_down || submit_up {
            self.set_scheme(Scheme::Controller);
            let mut state = core::mem::take(self.pointers.controller_mut());
            state.set_current(self.selection.current());
            self.process_touch(provider, sink, &mut state, submit_down, submit_up);
            state.last = None;
            *self.pointers.controller_mut() = state;
        }

        let mut vertical = 0;
        let mut horizontal = 0;
        if self.config.use_keyboard {
            if self.selection.has_focus() {
                vertical += key_direction(input, &[KeyCode::UpArrow], &[KeyCode::DownArrow]);
                horizontal += key_direction(input, &[KeyCode::RightArrow], &[KeyCode::LeftArrow]);
            } else {
                vertical += key_direction(
                    input,
                    &[KeyCode::W, KeyCode::UpArrow],
                    &[KeyCode::S, KeyCode::DownArrow],
                );
                horizontal += key_direction(
                    input,
                    &[KeyCode::D, KeyCode::RightArrow],
                    &[KeyCode::A, KeyCode::LeftArrow],
                );
            }
        }
        if self.config.use_controller {
            vertical += self.axis_direction(input.axis(Axis::Vertical));
            horizontal += self.axis_direction(input.axis(Axis::Horizontal));
        }

        if vertical != 0 {
            let (key, direction) = if vertical > 0 {
                (KeyCode::UpArrow, Navigation::Up)
            } else {
                (KeyCode::DownArrow, Navigation::Down)
            };
            self.key_to_selection(provider, sink, key, direction);
        }
        if horizontal != 0 {
            let (key, direction) = if horizontal > 0 {
                (KeyCode::RightArrow, Navigation::Right)
            } else {
                (KeyCode::LeftArrow, Navigation::Left)
            };
            self.key_to_selection(provider, sink, key, direction);
        }

        if self.config.use_keyboard && input.key_down(KeyCode::Tab) {
            let direction = if shift_held(input) {
                Navigation::Prev
            } else {
                Navigation::Next
            };
            self.key_to_selection(provider, sink, KeyCode::Tab, direction);
        }

        if let Some(key) = self.cancel_key_down(input) {
            self.ctx.key = Some(key);
            self.set_scheme(Scheme::Controller);
            self.emit(
                provider,
                sink,
                self.selection.current(),
                NotificationKind::Key(KeyCode::Escape),
            );
        }

        self.ctx.pointer = None;
        self.ctx.key = None;
        self.ctx.camera = None;
    }

    fn key_to_selection<P, S>(
        &mut self,
        provider: &P,
        sink: &mut S,
        key: KeyCode,
        direction: Navigation,
    ) where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        self.set_scheme(Scheme::Controller);
        self.ctx.key = Some(key);
        let Some(origin) = self.selection.current() else {
            return;
        };
        self.emit(provider, sink, Some(origin), NotificationKind::Key(key));

        // A handler may have moved the selection already.
        if self.selection.current() != Some(origin) || !self.navigation.contains(origin) {
            return;
        }
        if let Some(next) =
            self.navigation
                .resolve(provider, &self.cameras, &self.nav_policy, origin, direction)
        {
            self.set_selection(provider, sink, Some(next));
        }
    }

    fn axis_direction(&mut self, value: f64) -> i32 {
        if self.now < self.next_axis_event {
            return 0;
        }
        let threshold = self.config.axis_threshold;
        let direction = if value > threshold {
            1
        } else if value < -threshold {
            -1
        } else {
            return 0;
        };
        self.set_scheme(Scheme::Controller);
        self.next_axis_event = self.now + self.config.axis_repeat_ms;
        direction
    }

    // --- press cycle ---

    fn thresholds(&self) -> (f64, f64) {
        if self.scheme == Scheme::Mouse {
            (self.config.mouse_drag_threshold, self.config.mouse_click_threshold)
        } else {
            (self.config.touch_drag_threshold, self.config.touch_click_threshold)
        }
    }

    fn process_touch<P, S>(
        &mut self,
        provider: &P,
        sink: &mut S,
        state: &mut PointerState<K>,
        pressed: bool,
        released: bool,
    ) where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        let is_mouse = self.scheme == Scheme::Mouse;
        if state.is_pressed() {
            if released {
                self.process_release(provider, sink, state, is_mouse);
            }
            self.process_press(provider, sink, state, pressed);

            if state.is_pressed()
                && state.pressed == state.current
                && state.click_eligibility != ClickEligibility::Disabled
                && !state.drag_started
                && !state.long_pressed
                && state.press_elapsed(self.now) > self.config.tooltip_delay_ms
            {
                state.disable_click();
                state.long_pressed = true;
                if self.config.long_press_tooltip {
                    self.show_tooltip(provider, sink, state.pressed);
                }
                self.emit(provider, sink, state.current, NotificationKind::LongPress);
            }
        } else if is_mouse || pressed || released {
            self.process_press(provider, sink, state, pressed);
            if released {
                self.process_release(provider, sink, state, is_mouse);
            }
        }
    }

    fn process_press<P, S>(&mut self, provider: &P, sink: &mut S, state: &mut PointerState<K>, pressed: bool)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        if pressed {
            self.tooltip.cancel_pending();
            if self.tooltip.target().is_some() {
                self.hide_tooltip(provider, sink);
            }
            let previous = state.begin_press(self.now);
            self.emit(provider, sink, previous, NotificationKind::Press(false));
            self.emit(provider, sink, state.pressed, NotificationKind::Press(true));
            self.set_selection(provider, sink, state.pressed);
            return;
        }

        let Some(dragged) = state.dragged else {
            return;
        };
        if !state.is_pressed() || (state.delta == Vec2::ZERO && state.current == state.last) {
            return;
        }

        let (drag_threshold, click_threshold) = self.thresholds();
        state.accumulate(state.delta);

        let mut just_started = false;
        let mut left_origin = false;
        if !state.drag_started && state.last != state.current {
            // Leaving the pressed region starts the drag regardless of distance.
            state.drag_started = true;
            state.delta = state.total_delta;
            left_origin = true;
            log::debug!("drag of {dragged:?} started by leaving it");
            self.emit(provider, sink, Some(dragged), NotificationKind::DragStart);
            state.drag_over = state.last;
            self.emit(provider, sink, state.last, NotificationKind::DragOver(dragged));
            if state.current.is_some() {
                self.emit(provider, sink, state.last, NotificationKind::DragOut(dragged));
                state.drag_over = state.current;
                self.emit(provider, sink, state.current, NotificationKind::DragOver(dragged));
            }
        } else if !state.drag_started && state.travelled_past(drag_threshold) {
            state.drag_started = true;
            state.delta = state.total_delta;
            just_started = true;
        }

        if !state.drag_started {
            return;
        }
        if self.tooltip.target().is_some() {
            self.hide_tooltip(provider, sink);
        }
        if just_started {
            log::debug!("drag of {dragged:?} started");
            self.emit(provider, sink, Some(dragged), NotificationKind::DragStart);
            state.drag_over = state.current;
            self.emit(provider, sink, state.current, NotificationKind::DragOver(dragged));
        } else if !left_origin && state.last != state.current {
            let out = state.drag_over;
            self.emit(provider, sink, out, NotificationKind::DragOut(dragged));
            state.drag_over = state.current;
            self.emit(provider, sink, state.current, NotificationKind::DragOver(dragged));
        }
        self.emit(provider, sink, Some(dragged), NotificationKind::Drag(state.delta));
        state.last = state.current;
        state.disable_click_past(click_threshold);
    }

    fn process_release<P, S>(&mut self, provider: &P, sink: &mut S, state: &mut PointerState<K>, is_mouse: bool)
    where
        P: RegionProvider<K> + ?Sized,
        S: NotificationSink<K> + ?Sized,
    {
        if let Some(pressed) = state.pressed {
            let (_, click_threshold) = self.thresholds();

            if state.drag_started
                && let Some(dragged) = state.dragged
            {
                self.emit(provider, sink, state.drag_over, NotificationKind::DragOut(dragged));
                self.emit(provider, sink, Some(dragged), NotificationKind::DragEnd);
            }

            self.emit(provider, sink, Some(pressed), NotificationKind::Press(false));
            if is_mouse {
                if self.hover.is_some() && self.hover != state.current {
                    let old = self.hover.take();
                    self.emit(provider, sink, old, NotificationKind::Hover(false));
                }
                self.emit(provider, sink, state.current, NotificationKind::Hover(true));
            }
            self.hover = state.current;

            let within_click = state.total_delta.hypot2() < click_threshold * click_threshold;
            if state.dragged == state.current
                || (self.scheme != Scheme::Controller
                    && state.click_eligibility != ClickEligibility::Disabled
                    && within_click)
            {
                if state.click_eligibility != ClickEligibility::Disabled
                    && state.current == Some(pressed)
                {
                    self.emit(provider, sink, Some(pressed), NotificationKind::Click);
                    if state.record_click(pressed, self.now, self.config.double_click_window_ms) {
                        self.emit(provider, sink, Some(pressed), NotificationKind::DoubleClick);
                    }
                    if let Some(target) = self.navigation.click_target(provider, pressed) {
                        self.set_selection(provider, sink, Some(target));
                    }
                }
            } else if state.drag_started
                && let Some(dragged) = state.dragged
            {
                self.emit(provider, sink, state.current, NotificationKind::Drop(dragged));
            }
        }
        state.end_press();
    }
}

fn shift_held<I: InputSource + ?Sized>(input: &I) -> bool {
    input.key_held(KeyCode::LeftShift) || input.key_held(KeyCode::RightShift)
}

fn key_direction<I: InputSource + ?Sized>(input: &I, positive: &[KeyCode], negative: &[KeyCode]) -> i32 {
    if positive.iter().any(|k| input.key_down(*k)) {
        1
    } else if negative.iter().any(|k| input.key_down(*k)) {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use kurbo::Rect;
    use sightline_hit::{Camera, LocalRegion, RegionId, Scene, TestMode};

    use crate::dispatcher::{FnSink, FollowUps};
    use crate::input::FrameInput;
    use crate::tasks::SelectionWatch;

    type Log = Vec<Notification<RegionId>>;
    type Kind = NotificationKind<RegionId>;

    fn router() -> Router<RegionId> {
        let mut router = Router::default();
        router.cameras_mut().insert(Camera::new(
            CameraId(0),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            TestMode::Ui2D,
        ));
        router
    }

    fn touch_router() -> Router<RegionId> {
        let mut router = router();
        router.config_mut().touch_drag_threshold = 10.0;
        router.config_mut().touch_click_threshold = 10.0;
        router
    }

    fn square(scene: &mut Scene, x0: f64, y0: f64, size: f64, depth: i32) -> RegionId {
        scene.insert(
            None,
            LocalRegion {
                bounds: Rect::new(x0, y0, x0 + size, y0 + size),
                depth,
                ..LocalRegion::default()
            },
        )
    }

    fn mouse(t: u64, x: f64, y: f64) -> FrameInput {
        FrameInput::at(t).mouse_at(Point::new(x, y))
    }

    fn touch(t: u64, id: i32, phase: TouchPhase, x: f64, y: f64) -> FrameInput {
        FrameInput::at(t).touch(id, phase, Point::new(x, y))
    }

    /// Everything except selection and hover traffic.
    fn pointer_events(log: &Log) -> Vec<(RegionId, Kind)> {
        log.iter()
            .filter(|n| !matches!(n.kind, Kind::Select(_) | Kind::Hover(_)))
            .map(|n| (n.target, n.kind))
            .collect()
    }

    fn count(log: &Log, kind: Kind) -> usize {
        log.iter().filter(|n| n.kind == kind).count()
    }

    #[test]
    fn occluded_press_goes_to_top_region() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 100.0, 5);
        let b = square(&mut scene, 50.0, 50.0, 100.0, 10);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 75.0, 75.0).press(0), &mut log);
        let presses: Vec<_> = log
            .iter()
            .filter(|n| n.kind == Kind::Press(true))
            .map(|n| n.target)
            .collect();
        assert_eq!(presses, [b]);
        assert!(!router.is_pressed(a), "occluded region is not pressed");
        assert!(router.is_pressed(b), "top region is pressed");
    }

    #[test]
    fn leaving_the_origin_into_empty_space_drags_and_never_clicks() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        router.update(&scene, &touch(0, 0, TouchPhase::Began, 20.0, 20.0), &mut log);
        router.update(&scene, &touch(16, 0, TouchPhase::Moved, 70.0, 20.0), &mut log);
        router.update(&scene, &touch(32, 0, TouchPhase::Ended, 70.0, 20.0), &mut log);
        assert_eq!(
            pointer_events(&log),
            [
                (a, Kind::Press(true)),
                (a, Kind::DragStart),
                (a, Kind::DragOver(a)),
                (a, Kind::Drag(Vec2::new(50.0, 0.0))),
                (a, Kind::DragOut(a)),
                (a, Kind::DragEnd),
                (a, Kind::Press(false)),
            ]
        );
        assert_eq!(router.input_source_count(), 0, "touch destroyed on release");
    }

    #[test]
    fn drag_past_threshold_inside_region_suppresses_click() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 100.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        router.update(&scene, &touch(0, 3, TouchPhase::Began, 20.0, 20.0), &mut log);
        router.update(&scene, &touch(16, 3, TouchPhase::Moved, 25.0, 20.0), &mut log);
        assert_eq!(count(&log, Kind::DragStart), 0, "below the drag threshold");
        router.update(&scene, &touch(32, 3, TouchPhase::Moved, 35.0, 20.0), &mut log);
        assert_eq!(router.drag_count(), 1);
        router.update(&scene, &touch(48, 3, TouchPhase::Ended, 35.0, 20.0), &mut log);
        assert_eq!(
            pointer_events(&log),
            [
                (a, Kind::Press(true)),
                (a, Kind::DragStart),
                (a, Kind::DragOver(a)),
                (a, Kind::Drag(Vec2::new(15.0, 0.0))),
                (a, Kind::DragOut(a)),
                (a, Kind::DragEnd),
                (a, Kind::Press(false)),
            ]
        );
    }

    #[test]
    fn mouse_drag_between_regions_ends_in_drop() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0), &mut log);
        assert!(router.is_highlighted(a), "hovered under the mouse scheme");
        log.clear();

        router.update(&scene, &mouse(100, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(200, 30.0, 20.0).hold(0), &mut log);
        assert_eq!(router.drag_count(), 1);
        router.update(&scene, &mouse(300, 120.0, 20.0).hold(0), &mut log);
        router.update(&scene, &mouse(400, 120.0, 20.0).release(0), &mut log);

        let events: Vec<_> = log
            .iter()
            .filter(|n| !matches!(n.kind, Kind::Select(_)))
            .map(|n| (n.target, n.kind))
            .collect();
        assert_eq!(
            events,
            [
                (a, Kind::Press(true)),
                (a, Kind::DragStart),
                (a, Kind::DragOver(a)),
                (a, Kind::Drag(Vec2::new(10.0, 0.0))),
                (a, Kind::DragOut(a)),
                (b, Kind::DragOver(a)),
                (a, Kind::Drag(Vec2::new(90.0, 0.0))),
                (b, Kind::DragOut(a)),
                (a, Kind::DragEnd),
                (a, Kind::Press(false)),
                (a, Kind::Hover(false)),
                (b, Kind::Hover(true)),
                (b, Kind::Drop(a)),
            ]
        );
        assert_eq!(router.hover_target(), Some(b));
        assert_eq!(router.drag_count(), 0);
    }

    #[test]
    fn flick_onto_target_drags_over_it() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(16, 120.0, 20.0).hold(0), &mut log);
        assert_eq!(router.drag_count(), 1);
        router.update(&scene, &mouse(32, 120.0, 20.0).release(0), &mut log);
        assert_eq!(
            pointer_events(&log),
            [
                (a, Kind::Press(true)),
                (a, Kind::DragStart),
                (a, Kind::DragOver(a)),
                (a, Kind::DragOut(a)),
                (b, Kind::DragOver(a)),
                (a, Kind::Drag(Vec2::new(100.0, 0.0))),
                (b, Kind::DragOut(a)),
                (a, Kind::DragEnd),
                (a, Kind::Press(false)),
                (b, Kind::Drop(a)),
            ]
        );
    }

    #[test]
    fn release_while_moving_hovers_once() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0), &mut log);
        router.update(&scene, &mouse(16, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(32, 30.0, 20.0).hold(0), &mut log);
        router.update(&scene, &mouse(48, 120.0, 20.0).release(0), &mut log);
        let hovers: Vec<_> = log
            .iter()
            .filter(|n| matches!(n.kind, Kind::Hover(_)))
            .map(|n| (n.target, n.kind))
            .collect();
        assert_eq!(
            hovers,
            [(a, Kind::Hover(true)), (a, Kind::Hover(false)), (b, Kind::Hover(true))]
        );
        assert_eq!(router.hover_target(), Some(b));
        assert_eq!(count(&log, Kind::Drop(a)), 1);

        log.clear();
        router.update(&scene, &mouse(64, 121.0, 20.0), &mut log);
        assert_eq!(count(&log, Kind::Hover(true)), 0, "already hovered");
    }

    fn double_clicks(second_release: u64) -> usize {
        let mut scene = Scene::new();
        let _a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0), &mut log);
        router.update(&scene, &mouse(10, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(60, 20.0, 20.0).release(0), &mut log);
        router.update(&scene, &mouse(second_release - 50, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(second_release, 20.0, 20.0).release(0), &mut log);
        assert_eq!(count(&log, Kind::Click), 2, "both releases click");
        count(&log, Kind::DoubleClick)
    }

    #[test]
    fn double_click_needs_second_click_inside_window() {
        assert_eq!(double_clicks(60 + 350), 1, "350 ms apart");
        assert_eq!(double_clicks(60 + 400), 0, "400 ms apart");
    }

    #[test]
    fn press_release_precedes_click() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(40, 20.0, 20.0).release(0), &mut log);
        let release = log.iter().position(|n| n.kind == Kind::Press(false));
        let click = log.iter().position(|n| n.kind == Kind::Click);
        assert!(release.is_some() && release < click, "press(false) first");
        assert!(log.iter().all(|n| n.target == a), "all on the button");
    }

    #[test]
    fn re_press_releases_previous_region_first() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        router.update(&scene, &touch(0, 1, TouchPhase::Began, 20.0, 20.0), &mut log);
        router.update(&scene, &touch(16, 1, TouchPhase::Began, 120.0, 20.0), &mut log);
        let presses: Vec<_> = log
            .iter()
            .filter(|n| matches!(n.kind, Kind::Press(_)))
            .map(|n| (n.target, n.kind))
            .collect();
        assert_eq!(
            presses,
            [(a, Kind::Press(true)), (a, Kind::Press(false)), (b, Kind::Press(true))]
        );
        assert_eq!(router.selection(), Some(b));
    }

    #[test]
    fn set_selection_none_only_deselects() {
        let mut scene = Scene::new();
        let x = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.set_selection(&scene, &mut log, Some(x));
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].context.pointer, Some(PointerId::CONTROLLER));
        assert_eq!(log[0].context.camera, Some(CameraId(0)), "camera seeing the layer");
        log.clear();

        router.set_selection(&scene, &mut log, None);
        assert_eq!(log.len(), 1);
        assert_eq!((log[0].target, log[0].kind), (x, Kind::Select(false)));
        assert_eq!(router.scheme(), Scheme::Controller);
        assert_eq!(router.selection(), None);

        log.clear();
        router.set_selection(&scene, &mut log, None);
        assert!(log.is_empty(), "unchanged selection is a no-op");
    }

    #[test]
    fn hover_is_idempotent_and_ordered() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 10.0, 10.0), &mut log);
        router.update(&scene, &mouse(30, 20.0, 20.0), &mut log);
        router.update(&scene, &mouse(60, 30.0, 20.0), &mut log);
        router.update(&scene, &mouse(90, 120.0, 20.0), &mut log);
        let hovers: Vec<_> = log.iter().map(|n| (n.target, n.kind)).collect();
        assert_eq!(
            hovers,
            [(a, Kind::Hover(true)), (a, Kind::Hover(false)), (b, Kind::Hover(true))]
        );
    }

    #[test]
    fn tooltip_shows_after_delay_and_hides_on_leave() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0), &mut log);
        router.update(&scene, &mouse(500, 20.0, 20.0), &mut log);
        assert_eq!(count(&log, Kind::Tooltip(true)), 0, "still waiting");
        router.update(&scene, &mouse(1000, 20.0, 20.0), &mut log);
        assert_eq!(log.last().map(|n| (n.target, n.kind)), Some((a, Kind::Tooltip(true))));
        assert!(router.tooltip().is_shown(), "shown");

        log.clear();
        router.update(&scene, &mouse(1100, 25.0, 20.0), &mut log);
        assert!(log.is_empty(), "sticky tooltip survives movement inside the region");

        router.update(&scene, &mouse(1200, 120.0, 20.0), &mut log);
        let events: Vec<_> = log.iter().map(|n| (n.target, n.kind)).collect();
        assert_eq!(
            events,
            [
                (a, Kind::Tooltip(false)),
                (a, Kind::Hover(false)),
                (b, Kind::Hover(true))
            ]
        );
    }

    #[test]
    fn shift_forces_pending_tooltip_and_scroll_reaches_hover() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0), &mut log);
        router.update(
            &scene,
            &mouse(50, 20.0, 20.0).key_hold(KeyCode::LeftShift),
            &mut log,
        );
        assert_eq!(count(&log, Kind::Tooltip(true)), 1);
        log.clear();
        router.update(&scene, &mouse(80, 20.0, 20.0).scrolled(3.0), &mut log);
        assert_eq!(log.iter().map(|n| (n.target, n.kind)).collect::<Vec<_>>(), [(a, Kind::Scroll(3.0))]);
    }

    #[test]
    fn long_press_fires_once_and_cancels_click() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        router.update(&scene, &touch(0, 0, TouchPhase::Began, 20.0, 20.0), &mut log);
        router.update(&scene, &touch(500, 0, TouchPhase::Stationary, 20.0, 20.0), &mut log);
        assert_eq!(count(&log, Kind::LongPress), 0, "too early");
        router.update(&scene, &touch(1100, 0, TouchPhase::Stationary, 20.0, 20.0), &mut log);
        assert!(
            router.pointer(PointerId::touch(0)).is_some_and(|p| p.long_pressed),
            "pointer remembers the long press"
        );
        router.update(&scene, &touch(1300, 0, TouchPhase::Stationary, 20.0, 20.0), &mut log);
        router.update(&scene, &touch(1400, 0, TouchPhase::Ended, 20.0, 20.0), &mut log);
        assert_eq!(count(&log, Kind::LongPress), 1);
        assert_eq!(count(&log, Kind::Click), 0, "long press cancels the click");
        assert!(log.iter().all(|n| n.target == a), "all on the region");
    }

    #[test]
    fn cancel_key_clears_selection() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(30, 20.0, 20.0).release(0), &mut log);
        assert_eq!(router.selection(), Some(a));
        log.clear();
        router.update(
            &scene,
            &mouse(60, 20.0, 20.0).key_press(KeyCode::Escape),
            &mut log,
        );
        assert_eq!(router.selection(), None);
        assert_eq!(router.scheme(), Scheme::Controller);
        assert_eq!(
            log.iter().map(|n| (n.target, n.kind)).collect::<Vec<_>>(),
            [(a, Kind::Select(false))]
        );
        assert_eq!(log[0].context.key, Some(KeyCode::Escape));
    }

    fn row(scene: &mut Scene) -> [RegionId; 3] {
        [
            square(scene, 30.0, 0.0, 40.0, 1),
            square(scene, 130.0, 0.0, 40.0, 1),
            square(scene, 230.0, 0.0, 40.0, 1),
        ]
    }

    #[test]
    fn arrows_and_tab_navigate_registered_regions() {
        let mut scene = Scene::new();
        let [left, center, right] = row(&mut scene);
        let mut router = router();
        let mut log = Log::new();
        for r in [left, center, right] {
            router.register_navigable(&scene, &mut log, Navigable::new(r));
        }
        router.set_selection(&scene, &mut log, Some(center));
        log.clear();

        router.update(&scene, &FrameInput::at(0).key_press(KeyCode::RightArrow), &mut log);
        assert_eq!(
            log.iter().map(|n| (n.target, n.kind)).collect::<Vec<_>>(),
            [
                (center, Kind::Key(KeyCode::RightArrow)),
                (center, Kind::Select(false)),
                (right, Kind::Select(true)),
            ]
        );

        router.update(&scene, &FrameInput::at(16).key_press(KeyCode::Tab), &mut log);
        assert_eq!(router.selection(), Some(center), "tab falls back to the left");

        router.update(
            &scene,
            &FrameInput::at(32)
                .key_hold(KeyCode::LeftShift)
                .key_press(KeyCode::Tab),
            &mut log,
        );
        assert_eq!(router.selection(), Some(left), "shift+tab goes left first");
    }

    #[test]
    fn focused_input_only_navigates_with_arrows() {
        let mut scene = Scene::new();
        let field = scene.insert(
            None,
            LocalRegion {
                bounds: Rect::new(0.0, 0.0, 100.0, 20.0),
                flags: RegionFlags::default() | RegionFlags::CAPTURES_INPUT,
                ..LocalRegion::default()
            },
        );
        let mut router = router();
        let mut log = Log::new();
        router.set_selection(&scene, &mut log, Some(field));
        assert!(router.input_has_focus(), "text field captures input");
        log.clear();

        router.update(&scene, &FrameInput::at(0).key_press(KeyCode::W), &mut log);
        assert!(log.is_empty(), "letters go to the field, not navigation");
        router.update(&scene, &FrameInput::at(16).key_press(KeyCode::UpArrow), &mut log);
        assert_eq!(count(&log, Kind::Key(KeyCode::UpArrow)), 1);
    }

    #[test]
    fn axis_repeats_are_gated() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.set_selection(&scene, &mut log, Some(a));
        log.clear();
        for t in [0, 100, 200, 260] {
            router.update(&scene, &FrameInput::at(t).axes(1.0, 0.0), &mut log);
        }
        assert_eq!(count(&log, Kind::Key(KeyCode::RightArrow)), 2);
        router.update(&scene, &FrameInput::at(600).axes(0.5, 0.0), &mut log);
        assert_eq!(count(&log, Kind::Key(KeyCode::RightArrow)), 2, "below threshold");
    }

    #[test]
    fn starts_selected_and_click_links() {
        let mut scene = Scene::new();
        let [a, b, _] = row(&mut scene);
        let mut router = router();
        let mut log = Log::new();
        router.register_navigable(&scene, &mut log, Navigable::new(a).on_click(b).starts_selected());
        assert_eq!(router.selection(), Some(a));
        assert_eq!(router.scheme(), Scheme::Controller);
        assert_eq!(
            log.iter().map(|n| (n.target, n.kind)).collect::<Vec<_>>(),
            [(a, Kind::Select(true))]
        );

        log.clear();
        router.update(&scene, &FrameInput::at(0).key_press(KeyCode::Return), &mut log);
        router.update(&scene, &FrameInput::at(50).key_release(KeyCode::Return), &mut log);
        assert_eq!(
            log.iter().map(|n| (n.target, n.kind)).collect::<Vec<_>>(),
            [
                (a, Kind::Press(true)),
                (a, Kind::Press(false)),
                (a, Kind::Click),
                (a, Kind::Select(false)),
                (b, Kind::Select(true)),
            ]
        );
        assert!(
            log.iter().all(|n| n.context.pointer == Some(PointerId::CONTROLLER)),
            "controller pointer throughout"
        );
    }

    #[test]
    fn inactive_selection_is_dropped_silently() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.set_selection(&scene, &mut log, Some(a));
        log.clear();
        scene.set_active(a, false);
        router.update(&scene, &FrameInput::at(0), &mut log);
        assert_eq!(router.selection(), None);
        assert!(log.is_empty(), "no select(false) for a dropped selection");
    }

    #[test]
    fn misses_go_to_fall_through() {
        let mut scene = Scene::new();
        let catcher = square(&mut scene, 5000.0, 5000.0, 1.0, 0);
        let mut router = router();
        router.set_fall_through(Some(catcher));
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 400.0, 300.0).press(0), &mut log);
        assert_eq!(router.hovered(), Some(catcher));
        assert!(router.last_hit().is_none(), "no real hit");
        assert!(
            log.iter().any(|n| n.target == catcher && n.kind == Kind::Press(true)),
            "fall-through pressed"
        );
    }

    #[test]
    fn misses_go_to_generic_handler_without_fall_through() {
        let mut scene = Scene::new();
        let handler = square(&mut scene, 5000.0, 5000.0, 1.0, 0);
        let mut router = router();
        router.set_generic_handler(Some(handler));
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 400.0, 300.0).press(0), &mut log);
        assert_eq!(router.hovered(), Some(handler));
        assert!(router.last_hit().is_none(), "no real hit");
        assert!(router.is_pressed(handler), "generic handler pressed");
        assert!(
            log.iter().any(|n| n.target == handler
                && n.kind == Kind::Press(true)
                && n.relayed_from.is_none()),
            "delivered directly, not relayed"
        );
    }

    #[test]
    fn touches_are_independent_pointers() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        let both = FrameInput::at(0)
            .touch(1, TouchPhase::Began, Point::new(20.0, 20.0))
            .touch(2, TouchPhase::Began, Point::new(120.0, 20.0));
        router.update(&scene, &both, &mut log);
        assert_eq!(router.input_source_count(), 2);
        assert!(router.is_pressed(a) && router.is_pressed(b), "both pressed");
        assert_eq!(router.last_touch_position(), Point::new(120.0, 20.0));

        let end = FrameInput::at(30)
            .touch(1, TouchPhase::Ended, Point::new(20.0, 20.0))
            .touch(2, TouchPhase::Ended, Point::new(120.0, 20.0));
        router.update(&scene, &end, &mut log);
        assert_eq!(router.input_source_count(), 0);
        assert_eq!(count(&log, Kind::Click), 2);
    }

    #[test]
    fn single_touch_mode_uses_one_pointer() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        router.config_mut().allow_multi_touch = false;
        let mut log = Log::new();
        let both = FrameInput::at(0)
            .touch(5, TouchPhase::Began, Point::new(20.0, 20.0))
            .touch(6, TouchPhase::Began, Point::new(120.0, 20.0));
        router.update(&scene, &both, &mut log);
        assert!(router.is_pressed(a), "first touch processed");
        assert!(!router.is_pressed(b), "second touch ignored");
        assert!(router.pointer(PointerId::touch(1)).is_some(), "mapped to id 1");
    }

    #[test]
    fn multi_tap_completes_double_click() {
        let mut scene = Scene::new();
        let _a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = touch_router();
        let mut log = Log::new();
        let p = Point::new(20.0, 20.0);
        router.update(&scene, &FrameInput::at(0).tap(0, TouchPhase::Began, p, 1), &mut log);
        router.update(&scene, &FrameInput::at(50).tap(0, TouchPhase::Ended, p, 1), &mut log);
        router.update(&scene, &FrameInput::at(200).tap(0, TouchPhase::Began, p, 2), &mut log);
        router.update(&scene, &FrameInput::at(250).tap(0, TouchPhase::Ended, p, 2), &mut log);
        assert_eq!(count(&log, Kind::Click), 2);
        assert_eq!(count(&log, Kind::DoubleClick), 1);
    }

    #[test]
    fn command_click_reports_right_button() {
        let mut scene = Scene::new();
        let _a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        router.config_mut().command_click = true;
        let mut log = Log::new();
        router.update(
            &scene,
            &mouse(0, 20.0, 20.0).key_hold(KeyCode::LeftControl).press(0),
            &mut log,
        );
        let press = log.iter().find(|n| n.kind == Kind::Press(true));
        assert_eq!(press.map(|n| n.context.pointer), Some(Some(PointerId::MOUSE_RIGHT)));
        assert_eq!(press.map(|n| n.context.key), Some(Some(KeyCode::Mouse0)));
    }

    #[test]
    fn pressed_camera_is_kept_for_the_whole_press() {
        let mut scene = Scene::new();
        let _a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = Router::default();
        router.cameras_mut().insert(Camera::new(
            CameraId(7),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            TestMode::Ui2D,
        ));
        let mut log = Log::new();
        router.update(&scene, &mouse(0, 20.0, 20.0).press(0), &mut log);
        router.update(&scene, &mouse(20, 300.0, 300.0).hold(0), &mut log);
        let start = log.iter().find(|n| n.kind == Kind::DragStart);
        assert_eq!(start.map(|n| n.context.camera), Some(Some(CameraId(7))));
        assert!(router.last_hit().is_none(), "pointer is over nothing");
    }

    #[test]
    fn handlers_can_move_the_selection() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let b = square(&mut scene, 100.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut sink = FnSink(|n: &Notification<RegionId>, f: &mut FollowUps<RegionId>| {
            if n.target == a && n.kind == Kind::Click {
                f.select(Some(b));
            }
        });
        router.update(&scene, &mouse(0, 20.0, 20.0).press(0), &mut sink);
        router.update(&scene, &mouse(30, 20.0, 20.0).release(0), &mut sink);
        assert_eq!(router.selection(), Some(b));
    }

    #[test]
    fn selection_watch_runs_after_the_frame() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0, 40.0, 1);
        let mut router = router();
        let mut log = Log::new();
        router.set_selection(&scene, &mut log, Some(a));
        let closed = alloc::rc::Rc::new(Cell::new(false));
        let flag = closed.clone();
        router.add_task(Box::new(SelectionWatch::new(a, move |_| flag.set(true))));
        router.update(&scene, &FrameInput::at(0), &mut log);
        assert_eq!(router.task_count(), 1, "still selected");
        router.update(&scene, &FrameInput::at(16).key_press(KeyCode::Escape), &mut log);
        assert!(closed.get(), "watch fired");
        assert_eq!(router.task_count(), 0, "watch unregistered");
    }

    #[test]
    fn config_validation_and_overrides() {
        let bad = RouterConfig {
            mouse_click_threshold: -2.0,
            ..RouterConfig::default()
        };
        assert!(Router::<RegionId>::with_config(bad).is_err(), "rejected");
        let mut router = router();
        assert!(
            router.set_click_eligibility(PointerId::CONTROLLER, ClickEligibility::Always),
            "controller always exists"
        );
        assert!(
            !router.set_click_eligibility(PointerId::touch(9), ClickEligibility::Always),
            "no such touch"
        );
    }
}
