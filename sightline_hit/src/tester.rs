// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hit-test query engine.

use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use crate::camera::{Camera, CameraId, CameraSet, TestMode};
use crate::region::{RawHit, RegionFlags, RegionProvider};

/// Opacity below which a region without a widget component is treated as invisible.
pub const MIN_OPACITY: f32 = 0.001;

/// Result of a successful hit test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit<K> {
    /// Region that should receive the event.
    pub region: K,
    /// World-space point of the intersection.
    pub world_point: Point,
    /// Camera that produced the hit.
    pub camera: CameraId,
    /// Distance along the camera ray.
    pub distance: f64,
}

/// Reusable hit-test engine.
///
/// Holds scratch buffers so repeated queries do not allocate.
#[derive(Clone, Debug)]
pub struct HitTester<K> {
    raw: Vec<RawHit<K>>,
    ranked: SmallVec<[(i32, usize); 8]>,
}

impl<K> Default for HitTester<K> {
    fn default() -> Self {
        Self {
            raw: Vec::new(),
            ranked: SmallVec::new(),
        }
    }
}

impl<K> HitTester<K>
where
    K: Copy + Eq,
{
    /// Create an empty tester.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the region under `screen`, trying cameras in priority order.
    ///
    /// The first camera that produces a hit wins. NaN coordinates never hit.
    pub fn hit_test<P>(&mut self, cameras: &CameraSet, provider: &P, screen: Point) -> Option<Hit<K>>
    where
        P: RegionProvider<K> + ?Sized,
    {
        if !screen.is_finite() {
            return None;
        }
        cameras
            .iter()
            .find_map(|camera| self.hit_test_camera(camera, provider, screen))
    }

    /// Hit test through a single camera.
    pub fn hit_test_camera<P>(
        &mut self,
        camera: &Camera,
        provider: &P,
        screen: Point,
    ) -> Option<Hit<K>>
    where
        P: RegionProvider<K> + ?Sized,
    {
        if !camera.enabled {
            return None;
        }
        if !screen.is_finite() || !camera.contains_screen(screen) {
            log::trace!("camera {:?}: {screen:?} outside viewport", camera.id);
            return None;
        }
        let world = camera.to_world(screen);
        if !world.is_finite() {
            return None;
        }

        self.raw.clear();
        provider.cast(world, &mut self.raw);
        self.raw.retain(|h| {
            let flags = provider.flags(h.key);
            flags.is_interactive()
                && !(flags.contains(RegionFlags::WIDGET) && !flags.contains(RegionFlags::VISIBLE))
                && camera.sees_layer(provider.layer(h.key))
                && camera.range.is_none_or(|r| h.distance <= r)
        });
        if self.raw.is_empty() {
            return None;
        }

        let picked = match camera.mode {
            TestMode::World3D => self.nearest(),
            TestMode::World2D => self.topmost(provider),
            TestMode::Ui3D | TestMode::Ui2D => self.first_visible(provider),
        }?;

        let mut region = picked.key;
        if !camera.mode.is_ui()
            && !camera.events_go_to_colliders
            && let Some(root) = provider.rigidbody_root(region)
        {
            region = root;
        }
        Some(Hit {
            region,
            world_point: picked.point,
            camera: camera.id,
            distance: picked.distance,
        })
    }

    fn nearest(&self) -> Option<RawHit<K>> {
        self.raw
            .iter()
            .copied()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn topmost<P>(&self, provider: &P) -> Option<RawHit<K>>
    where
        P: RegionProvider<K> + ?Sized,
    {
        let mut best: Option<(i32, RawHit<K>)> = None;
        for h in &self.raw {
            let depth = provider.raycast_depth(h.key).unwrap_or(i32::MIN);
            if best.is_none_or(|(d, _)| depth > d) {
                best = Some((depth, *h));
            }
        }
        best.map(|(_, h)| h)
    }

    fn first_visible<P>(&mut self, provider: &P) -> Option<RawHit<K>>
    where
        P: RegionProvider<K> + ?Sized,
    {
        self.ranked.clear();
        for (i, h) in self.raw.iter().enumerate() {
            let flags = provider.flags(h.key);
            let depth = if flags.contains(RegionFlags::WIDGET) {
                if !provider.accepts(h.key, h.point) {
                    continue;
                }
                provider.depth(h.key)
            } else {
                if provider.opacity(h.key) < MIN_OPACITY {
                    continue;
                }
                provider.raycast_depth(h.key)
            };
            if let Some(depth) = depth {
                self.ranked.push((depth, i));
            }
        }
        // Stable: equal depths keep cast order.
        self.ranked.sort_by(|a, b| b.0.cmp(&a.0));

        self.ranked
            .iter()
            .map(|&(_, i)| self.raw[i])
            .find(|h| clip_chain_contains(provider, h.key, h.point))
    }
}

/// Every clipping panel from `key` upward must show `world`.
fn clip_chain_contains<K, P>(provider: &P, key: K, world: Point) -> bool
where
    K: Copy + Eq,
    P: RegionProvider<K> + ?Sized,
{
    let mut panel = provider.clip_ancestor(key);
    while let Some(p) = panel {
        if !provider.clip_contains(p, world) {
            return false;
        }
        panel = provider.parent_of(p).and_then(|q| provider.clip_ancestor(q));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LocalRegion, RegionId, Scene};
    use kurbo::{Affine, Rect};

    fn region(depth: i32) -> LocalRegion {
        LocalRegion {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            depth,
            ..LocalRegion::default()
        }
    }

    fn right_edge_only(p: Point) -> bool {
        p.x > 90.0
    }

    fn ui_cameras() -> CameraSet {
        let mut set = CameraSet::new();
        set.insert(Camera::new(
            CameraId(0),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            TestMode::Ui2D,
        ));
        set
    }

    fn pick(scene: &Scene, cameras: &CameraSet, x: f64, y: f64) -> Option<RegionId> {
        HitTester::new()
            .hit_test(cameras, scene, Point::new(x, y))
            .map(|h| h.region)
    }

    #[test]
    fn higher_depth_occludes() {
        let mut scene = Scene::new();
        let a = scene.insert(None, region(5));
        let b = scene.insert(None, region(10));
        let cams = ui_cameras();
        assert_eq!(pick(&scene, &cams, 50.0, 50.0), Some(b));
        scene.set_depth(a, 11);
        assert_eq!(pick(&scene, &cams, 50.0, 50.0), Some(a));
    }

    #[test]
    fn equal_depth_keeps_cast_order() {
        let mut scene = Scene::new();
        let a = scene.insert(None, region(3));
        let _b = scene.insert(None, region(3));
        assert_eq!(pick(&scene, &ui_cameras(), 1.0, 1.0), Some(a));
    }

    #[test]
    fn hidden_disabled_and_rejected_fall_through() {
        let mut scene = Scene::new();
        let low = scene.insert(None, region(1));
        let hidden = scene.insert(None, region(9));
        let mut flags = RegionFlags::default();
        flags.remove(RegionFlags::VISIBLE);
        scene.set_flags(hidden, flags);
        let disabled = scene.insert(None, region(8));
        scene.set_enabled(disabled, false);
        scene.insert(
            None,
            LocalRegion {
                hit_check: Some(right_edge_only),
                ..region(7)
            },
        );
        let cams = ui_cameras();
        assert_eq!(pick(&scene, &cams, 50.0, 50.0), Some(low));
        assert_ne!(pick(&scene, &cams, 95.0, 50.0), Some(low));
    }

    #[test]
    fn transparent_non_widget_is_skipped() {
        let mut scene = Scene::new();
        let solid = scene.insert(None, region(0));
        scene.insert(
            None,
            LocalRegion {
                flags: RegionFlags::ACTIVE | RegionFlags::ENABLED,
                alpha: 0.0,
                ..region(50)
            },
        );
        assert_eq!(pick(&scene, &ui_cameras(), 10.0, 10.0), Some(solid));
    }

    #[test]
    fn outer_clip_rejects_whole_chain() {
        let mut scene = Scene::new();
        let panel_flags = RegionFlags::default() | RegionFlags::PANEL;
        let backdrop = scene.insert(None, region(0));
        let outer = scene.insert(
            None,
            LocalRegion {
                flags: panel_flags,
                clip: Some(Rect::new(0.0, 0.0, 40.0, 100.0)),
                ..region(1)
            },
        );
        let inner = scene.insert(
            Some(outer),
            LocalRegion {
                flags: panel_flags,
                clip: Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
                ..region(2)
            },
        );
        let button = scene.insert(Some(inner), region(20));
        let cams = ui_cameras();
        assert_eq!(pick(&scene, &cams, 20.0, 20.0), Some(button));
        // Inside the inner clip but outside the outer one.
        assert_eq!(pick(&scene, &cams, 60.0, 20.0), Some(backdrop));
    }

    #[test]
    fn nan_and_viewport_miss() {
        let mut scene = Scene::new();
        scene.insert(None, region(0));
        let cams = ui_cameras();
        assert_eq!(pick(&scene, &cams, f64::NAN, 10.0), None);
        assert_eq!(pick(&scene, &cams, 10.0, 900.0), None);
    }

    #[test]
    fn first_camera_with_a_hit_wins() {
        let mut scene = Scene::new();
        let hud = scene.insert(
            None,
            LocalRegion {
                layer: 5,
                ..region(0)
            },
        );
        let world = scene.insert(None, region(100));
        let mut cams = CameraSet::new();
        let mut top = Camera::new(
            CameraId(1),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            TestMode::Ui2D,
        );
        top.priority = 10;
        top.layer_mask = 1 << 5;
        let mut bottom = Camera::new(
            CameraId(2),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            TestMode::Ui2D,
        );
        bottom.layer_mask = 1;
        cams.insert(bottom);
        cams.insert(top);

        let hit = HitTester::new()
            .hit_test(&cams, &scene, Point::new(10.0, 10.0))
            .unwrap();
        assert_eq!(hit.region, hud);
        assert_eq!(hit.camera, CameraId(1));

        scene.set_active(hud, false);
        let hit = HitTester::new()
            .hit_test(&cams, &scene, Point::new(10.0, 10.0))
            .unwrap();
        assert_eq!(hit.region, world);
        assert_eq!(hit.camera, CameraId(2));
    }

    #[test]
    fn world3d_nearest_range_and_rigidbody() {
        let mut scene = Scene::new();
        let body = scene.insert(
            None,
            LocalRegion {
                flags: RegionFlags::ACTIVE | RegionFlags::ENABLED | RegionFlags::RIGIDBODY,
                distance: 50.0,
                ..region(0)
            },
        );
        let wheel = scene.insert(
            Some(body),
            LocalRegion {
                flags: RegionFlags::ACTIVE | RegionFlags::ENABLED,
                distance: 5.0,
                ..region(0)
            },
        );
        let mut cam = Camera::new(
            CameraId(0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            TestMode::World3D,
        );
        let mut tester = HitTester::new();
        let hit = tester
            .hit_test_camera(&cam, &scene, Point::new(1.0, 1.0))
            .unwrap();
        assert_eq!(hit.region, body, "redirected to rigid-body root");
        assert_eq!(hit.distance, 5.0);

        cam.events_go_to_colliders = true;
        let hit = tester
            .hit_test_camera(&cam, &scene, Point::new(1.0, 1.0))
            .unwrap();
        assert_eq!(hit.region, wheel);

        cam.range = Some(1.0);
        assert!(tester
            .hit_test_camera(&cam, &scene, Point::new(1.0, 1.0))
            .is_none());
    }

    fn never(_: Point) -> bool {
        false
    }

    #[test]
    fn world2d_picks_highest_depth_without_widget_filters() {
        let mut scene = Scene::new();
        let body = scene.insert(
            None,
            LocalRegion {
                flags: RegionFlags::default() | RegionFlags::RIGIDBODY,
                ..region(0)
            },
        );
        // Would be skipped by the UI modes: rejects every point and is transparent.
        let part = scene.insert(
            Some(body),
            LocalRegion {
                hit_check: Some(never),
                alpha: 0.0,
                ..region(9)
            },
        );
        let other = scene.insert(None, region(5));
        let mut cam = Camera::new(
            CameraId(0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            TestMode::World2D,
        );
        let mut tester = HitTester::new();
        let at = Point::new(50.0, 50.0);
        assert_eq!(
            tester.hit_test_camera(&cam, &scene, at).map(|h| h.region),
            Some(body),
            "deepest collider redirected to its rigid-body root"
        );

        cam.events_go_to_colliders = true;
        assert_eq!(tester.hit_test_camera(&cam, &scene, at).map(|h| h.region), Some(part));

        scene.set_depth(other, 10);
        assert_eq!(tester.hit_test_camera(&cam, &scene, at).map(|h| h.region), Some(other));

        cam.mode = TestMode::Ui2D;
        scene.set_depth(other, 1);
        assert_eq!(
            tester.hit_test_camera(&cam, &scene, at).map(|h| h.region),
            Some(other),
            "UI mode skips the filtered part"
        );
    }

    #[test]
    fn screen_to_world_mapping_applies() {
        let mut scene = Scene::new();
        let far = scene.insert(
            None,
            LocalRegion {
                bounds: Rect::new(1000.0, 1000.0, 1010.0, 1010.0),
                ..LocalRegion::default()
            },
        );
        let mut cam = Camera::new(
            CameraId(0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            TestMode::Ui2D,
        );
        cam.screen_to_world = Affine::translate((1000.0, 1000.0));
        let hit = HitTester::new()
            .hit_test_camera(&cam, &scene, Point::new(5.0, 5.0))
            .unwrap();
        assert_eq!(hit.region, far);
        assert_eq!(hit.world_point, Point::new(1005.0, 1005.0));
    }
}
