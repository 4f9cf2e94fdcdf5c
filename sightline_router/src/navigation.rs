// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of regions that take part in controller and keyboard navigation.

use alloc::vec::Vec;

use sightline_hit::{CameraSet, RegionFlags, RegionProvider};
use sightline_nav::{Constraint, NavEntry, NavLink, NavLinks, NavSpace, Navigation, NavigationPolicy};

/// A region registered for navigation.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigable<K> {
    /// The region.
    pub region: K,
    /// Explicit links; a link only counts while its target is active.
    pub links: NavLinks<K>,
    /// Which directions are searched automatically.
    pub constraint: Constraint,
    /// Select this region on registration when nothing active is selected.
    pub starts_selected: bool,
}

impl<K> Navigable<K> {
    /// Unconstrained navigable region with no links.
    pub fn new(region: K) -> Self {
        Self {
            region,
            links: NavLinks::default(),
            constraint: Constraint::Unconstrained,
            starts_selected: false,
        }
    }

    /// Builder: set the constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Builder: link `direction` to `target`. `Next`/`Prev` are not linkable and are ignored.
    pub fn link(mut self, direction: Navigation, target: K) -> Self {
        let slot = match direction {
            Navigation::Up => &mut self.links.up,
            Navigation::Down => &mut self.links.down,
            Navigation::Left => &mut self.links.left,
            Navigation::Right => &mut self.links.right,
            Navigation::Next | Navigation::Prev => return self,
        };
        *slot = Some(NavLink::new(target));
        self
    }

    /// Builder: select `target` when this region is clicked.
    pub fn on_click(mut self, target: K) -> Self {
        self.links.on_click = Some(NavLink::new(target));
        self
    }

    /// Builder: request selection on registration.
    pub fn starts_selected(mut self) -> Self {
        self.starts_selected = true;
        self
    }
}

/// Navigable regions in registration order.
#[derive(Clone, Debug)]
pub struct NavRegistry<K> {
    entries: Vec<Navigable<K>>,
    scratch: Vec<NavEntry<K>>,
}

impl<K> Default for NavRegistry<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            scratch: Vec::new(),
        }
    }
}

impl<K> NavRegistry<K>
where
    K: Copy + Eq,
{
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `navigable`, replacing an earlier registration of the same region.
    pub fn register(&mut self, navigable: Navigable<K>) {
        match self.entries.iter_mut().find(|e| e.region == navigable.region) {
            Some(slot) => *slot = navigable,
            None => self.entries.push(navigable),
        }
    }

    /// Remove `region`. Returns its registration.
    pub fn unregister(&mut self, region: K) -> Option<Navigable<K>> {
        let i = self.entries.iter().position(|e| e.region == region)?;
        Some(self.entries.remove(i))
    }

    /// Registration of `region`.
    pub fn get(&self, region: K) -> Option<&Navigable<K>> {
        self.entries.iter().find(|e| e.region == region)
    }

    /// Whether `region` is registered.
    pub fn contains(&self, region: K) -> bool {
        self.get(region).is_some()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active target of `region`'s click link.
    pub fn click_target<P>(&self, provider: &P, region: K) -> Option<K>
    where
        P: RegionProvider<K> + ?Sized,
    {
        let link = self.get(region)?.links.on_click?;
        (link.active && provider.flags(link.target).contains(RegionFlags::ACTIVE))
            .then_some(link.target)
    }

    /// Resolve a move from `origin` in `direction` among the active registrations.
    ///
    /// Centers are projected to screen space through the camera that sees each
    /// region's layer, so regions drawn by different cameras compare on screen.
    pub fn resolve<P, N>(
        &mut self,
        provider: &P,
        cameras: &CameraSet,
        policy: &N,
        origin: K,
        direction: Navigation,
    ) -> Option<K>
    where
        P: RegionProvider<K> + ?Sized,
        N: NavigationPolicy<K> + ?Sized,
    {
        self.scratch.clear();
        for nav in &self.entries {
            let flags = provider.flags(nav.region);
            if !flags.contains(RegionFlags::ACTIVE) {
                continue;
            }
            let Some(world) = provider.center(nav.region) else {
                continue;
            };
            let center = cameras
                .for_layer(provider.layer(nav.region))
                .map_or(world, |camera| camera.to_screen(world));
            let live = |link: Option<NavLink<K>>| {
                link.map(|l| NavLink {
                    target: l.target,
                    active: l.active && provider.flags(l.target).contains(RegionFlags::ACTIVE),
                })
            };
            self.scratch.push(NavEntry {
                id: nav.region,
                center,
                links: NavLinks {
                    up: live(nav.links.up),
                    down: live(nav.links.down),
                    left: live(nav.links.left),
                    right: live(nav.links.right),
                    on_click: live(nav.links.on_click),
                },
                constraint: nav.constraint,
                enabled: flags.is_interactive(),
            });
        }
        let space = NavSpace {
            entries: &self.scratch,
        };
        policy.resolve(origin, direction, &space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use sightline_hit::{LocalRegion, Scene};
    use sightline_nav::ConePolicy;

    fn square(scene: &mut Scene, x: f64, y: f64) -> sightline_hit::RegionId {
        scene.insert(
            None,
            LocalRegion {
                bounds: Rect::new(x - 5.0, y - 5.0, x + 5.0, y + 5.0),
                ..LocalRegion::default()
            },
        )
    }

    #[test]
    fn resolves_by_geometry_and_skips_inactive() {
        let mut scene = Scene::new();
        let origin = square(&mut scene, 0.0, 0.0);
        let near = square(&mut scene, 50.0, 0.0);
        let far = square(&mut scene, 120.0, 0.0);
        let mut registry = NavRegistry::new();
        for r in [origin, near, far] {
            registry.register(Navigable::new(r));
        }
        let cameras = CameraSet::new();
        let policy = ConePolicy::default();
        assert_eq!(
            registry.resolve(&scene, &cameras, &policy, origin, Navigation::Right),
            Some(near)
        );
        scene.set_active(near, false);
        assert_eq!(
            registry.resolve(&scene, &cameras, &policy, origin, Navigation::Right),
            Some(far)
        );
    }

    #[test]
    fn links_to_inactive_targets_fall_back_to_search() {
        let mut scene = Scene::new();
        let origin = square(&mut scene, 0.0, 0.0);
        let below = square(&mut scene, 0.0, 40.0);
        let linked = square(&mut scene, 0.0, 200.0);
        let mut registry = NavRegistry::new();
        registry.register(Navigable::new(origin).link(Navigation::Down, linked));
        registry.register(Navigable::new(below));
        registry.register(Navigable::new(linked));
        let cameras = CameraSet::new();
        let policy = ConePolicy::default();
        assert_eq!(
            registry.resolve(&scene, &cameras, &policy, origin, Navigation::Down),
            Some(linked),
            "active link wins over geometry"
        );
        scene.set_active(linked, false);
        assert_eq!(
            registry.resolve(&scene, &cameras, &policy, origin, Navigation::Down),
            Some(below)
        );
    }

    #[test]
    fn register_replaces_and_click_target_respects_activity() {
        let mut scene = Scene::new();
        let a = square(&mut scene, 0.0, 0.0);
        let b = square(&mut scene, 30.0, 0.0);
        let mut registry = NavRegistry::new();
        registry.register(Navigable::new(a));
        registry.register(Navigable::new(a).on_click(b));
        assert_eq!(registry.len(), 1, "same region registered once");
        assert_eq!(registry.click_target(&scene, a), Some(b));
        scene.set_active(b, false);
        assert_eq!(registry.click_target(&scene, a), None);
        assert!(registry.unregister(a).is_some(), "was registered");
        assert!(registry.is_empty(), "empty after unregister");
    }
}
