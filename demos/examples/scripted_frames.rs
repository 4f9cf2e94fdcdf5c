// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive the router over a scripted sequence of frames and print every notification.
//!
//! The scene is a clipped panel holding a round button, an inventory item, and a drop
//! slot, plus a text field outside the panel. The script hovers, clicks, drags the item
//! into the slot, taps with a finger, and finally navigates with the keyboard.
//!
//! Run:
//! - `cargo run -p sightline_demos --example scripted_frames`

use kurbo::{Circle, Point, Rect};
use sightline_hit::{
    Camera, CameraId, Collider, LocalRegion, RegionFlags, RegionId, Scene, TestMode,
};
use sightline_nav::Navigation;
use sightline_router::{
    FnSink, FollowUps, FrameInput, KeyCode, Navigable, Notification, NotificationKind, Router,
    TouchPhase,
};

struct Regions {
    button: RegionId,
    item: RegionId,
    slot: RegionId,
    field: RegionId,
}

fn build_scene() -> (Scene, Regions) {
    let mut scene = Scene::new();
    let panel = scene.insert(
        None,
        LocalRegion {
            bounds: Rect::new(0.0, 0.0, 400.0, 200.0),
            clip: Some(Rect::new(0.0, 0.0, 400.0, 200.0)),
            flags: RegionFlags::ACTIVE | RegionFlags::ENABLED | RegionFlags::VISIBLE | RegionFlags::PANEL,
            depth: 0,
            ..LocalRegion::default()
        },
    );
    let button = scene.insert(
        Some(panel),
        LocalRegion {
            bounds: Rect::new(20.0, 20.0, 80.0, 80.0),
            collider: Some(Collider::Circle(Circle::new((50.0, 50.0), 30.0))),
            // Forgiving edge for touch input.
            slop: 4.0,
            depth: 10,
            ..LocalRegion::default()
        },
    );
    let item = scene.insert(
        Some(panel),
        LocalRegion {
            bounds: Rect::new(120.0, 20.0, 180.0, 80.0),
            depth: 10,
            ..LocalRegion::default()
        },
    );
    let slot = scene.insert(
        Some(panel),
        LocalRegion {
            bounds: Rect::new(260.0, 20.0, 340.0, 100.0),
            depth: 5,
            ..LocalRegion::default()
        },
    );
    let field = scene.insert(
        None,
        LocalRegion {
            bounds: Rect::new(20.0, 240.0, 380.0, 280.0),
            depth: 10,
            flags: RegionFlags::default() | RegionFlags::CAPTURES_INPUT,
            ..LocalRegion::default()
        },
    );
    (
        scene,
        Regions {
            button,
            item,
            slot,
            field,
        },
    )
}

fn name(regions: &Regions, id: RegionId) -> &'static str {
    match id {
        id if id == regions.button => "button",
        id if id == regions.item => "item",
        id if id == regions.slot => "slot",
        id if id == regions.field => "field",
        _ => "panel",
    }
}

fn main() {
    let (scene, regions) = build_scene();

    let mut router = Router::default();
    router.cameras_mut().insert(Camera::new(
        CameraId(0),
        Rect::new(0.0, 0.0, 800.0, 600.0),
        TestMode::Ui2D,
    ));

    let mut sink = FnSink(|n: &Notification<RegionId>, follow_ups: &mut FollowUps<RegionId>| {
        println!(
            "t={:>5}  {:<7} {:<26} pointer={:?}",
            n.context.time,
            name(&regions, n.target),
            format!("{:?}", n.kind),
            n.context.pointer.map(|p| p.to_string()),
        );
        // Dropping the item on the slot moves the selection to the text field.
        if n.kind == NotificationKind::Drop(regions.item) && n.target == regions.slot {
            follow_ups.select(Some(regions.field));
        }
    });

    for (region, target) in [
        (regions.button, regions.item),
        (regions.item, regions.slot),
        (regions.slot, regions.field),
    ] {
        router.register_navigable(&scene, &mut sink, Navigable::new(region).link(Navigation::Right, target));
    }

    let at = |t: u64, x: f64, y: f64| FrameInput::at(t).mouse_at(Point::new(x, y));
    let script = [
        ("hover the button", at(0, 50.0, 50.0)),
        ("tooltip appears", at(1000, 50.0, 50.0)),
        ("press", at(1100, 50.0, 50.0).press(0)),
        ("release: click", at(1150, 50.0, 50.0).release(0)),
        ("over the item", at(1300, 150.0, 50.0)),
        ("press the item", at(1400, 150.0, 50.0).press(0)),
        ("drag", at(1450, 170.0, 50.0).hold(0)),
        ("drag onto the slot", at(1500, 300.0, 60.0).hold(0)),
        ("drop", at(1550, 300.0, 60.0).release(0)),
        (
            "finger taps the button",
            FrameInput::at(2000).touch(0, TouchPhase::Began, Point::new(50.0, 50.0)),
        ),
        (
            "finger lifts",
            FrameInput::at(2050).touch(0, TouchPhase::Ended, Point::new(50.0, 50.0)),
        ),
        ("quiet frame", FrameInput::at(2100)),
        ("arrow right", FrameInput::at(2200).key_press(KeyCode::RightArrow)),
        ("escape", FrameInput::at(2300).key_press(KeyCode::Escape)),
    ];

    for (label, frame) in &script {
        println!("-- {label}");
        router.update(&scene, frame, &mut sink);
    }

    println!(
        "selection={:?} scheme={:?} dropped={}",
        router.selection().map(|s| name(&regions, s)),
        router.scheme(),
        router.dropped_notifications()
    );
}
