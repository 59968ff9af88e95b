//! Cabinet / monitor composition
//!
//! The arena is a fixed `WORLD_SIZE` square seen through the "monitor"
//! camera, a square viewport inset in the middle of the screen. Everything
//! else (background wall, controls) is drawn by the full-screen "cabinet"
//! camera. Each drawable belongs to exactly one layer and each camera sees
//! exactly one layer, so nothing shows up on both.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MONITOR_FRACTION, WORLD_SIZE};

/// Which camera may see a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Arena contents: player, hazard, bullet, border
    World,
    /// Screen-space background, controls and overlays
    Cabinet,
}

/// Screen-space rectangle (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x <= self.x + self.width && p.y <= self.y + self.height
    }
}

/// The square monitor inset for a viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldGeometry {
    /// Side length in pixels
    pub size: f32,
    /// Top-left corner in pixels
    pub origin: Vec2,
}

impl PlayfieldGeometry {
    /// Monitor geometry for a `width` x `height` viewport
    pub fn from_viewport(width: f32, height: f32) -> Self {
        let size = width.min(height) * MONITOR_FRACTION;
        Self {
            size,
            origin: Vec2::new((width - size) / 2.0, (height - size) / 2.0),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.size, self.size)
    }

    /// Pixels per world unit
    pub fn zoom(&self) -> f32 {
        self.size / WORLD_SIZE
    }
}

/// A camera: what part of the screen it draws into, how it scales and which
/// layer it renders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub viewport: Rect,
    pub zoom: f32,
    /// Point in the camera's own coordinate space shown at the viewport center
    pub center: Vec2,
    pub layer: Layer,
}

impl Camera {
    #[inline]
    pub fn sees(&self, layer: Layer) -> bool {
        self.layer == layer
    }

    /// Map a point in the camera's coordinate space to screen pixels
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        self.viewport.center() + (p - self.center) * self.zoom
    }

    /// Map screen pixels back into the camera's coordinate space
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        self.center + (screen - self.viewport.center()) / self.zoom
    }
}

/// Keeps both cameras in sync with the viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compositor {
    viewport: (f32, f32),
    geometry: PlayfieldGeometry,
    cabinet: Camera,
    monitor: Camera,
}

impl Compositor {
    pub fn new(width: f32, height: f32) -> Self {
        // Placeholder cameras, replaced by the first resize
        let placeholder = Camera {
            viewport: Rect::new(0.0, 0.0, 100.0, 100.0),
            zoom: 1.0,
            center: Vec2::ZERO,
            layer: Layer::Cabinet,
        };
        let mut compositor = Self {
            viewport: (100.0, 100.0),
            geometry: PlayfieldGeometry::from_viewport(100.0, 100.0),
            cabinet: placeholder,
            monitor: Camera {
                layer: Layer::World,
                ..placeholder
            },
        };
        compositor.resize(width, height);
        compositor
    }

    /// Recompute both cameras for a new viewport size.
    ///
    /// Degenerate sizes (zero, negative, NaN) keep the previous layout.
    /// Returns true if the layout was applied.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return false;
        }

        self.viewport = (width, height);
        self.geometry = PlayfieldGeometry::from_viewport(width, height);

        self.cabinet = Camera {
            viewport: Rect::new(0.0, 0.0, width, height),
            zoom: 1.0,
            center: Vec2::new(width / 2.0, height / 2.0),
            layer: Layer::Cabinet,
        };
        self.monitor = Camera {
            viewport: self.geometry.rect(),
            zoom: self.geometry.zoom(),
            center: Vec2::splat(WORLD_SIZE / 2.0),
            layer: Layer::World,
        };

        log::debug!(
            "Viewport {}x{}: monitor {:.1}px at ({:.1}, {:.1}), zoom {:.3}",
            width,
            height,
            self.geometry.size,
            self.geometry.origin.x,
            self.geometry.origin.y,
            self.monitor.zoom
        );
        true
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn geometry(&self) -> PlayfieldGeometry {
        self.geometry
    }

    /// Full-screen camera (background, controls)
    pub fn cabinet_camera(&self) -> &Camera {
        &self.cabinet
    }

    /// Inset camera looking at the arena
    pub fn monitor_camera(&self) -> &Camera {
        &self.monitor
    }

    /// Both cameras, cabinet first (draw order)
    pub fn cameras(&self) -> [&Camera; 2] {
        [&self.cabinet, &self.monitor]
    }

    /// World coordinates under a screen point, if it is inside the monitor
    pub fn screen_to_world(&self, screen: Vec2) -> Option<Vec2> {
        if !self.monitor.viewport.contains(screen) {
            return None;
        }
        Some(self.monitor.to_local(screen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_aspect_flip_recenters() {
        let mut compositor = Compositor::new(800.0, 600.0);
        let landscape = compositor.geometry();
        assert!(approx(landscape.size, 570.0));
        assert!(approx(landscape.origin.x, 115.0));
        assert!(approx(landscape.origin.y, 15.0));

        assert!(compositor.resize(600.0, 800.0));
        let portrait = compositor.geometry();
        assert!(approx(portrait.size, 570.0));
        assert!(approx(portrait.origin.x, 15.0));
        assert!(approx(portrait.origin.y, 115.0));

        let monitor = compositor.monitor_camera();
        let rect = monitor.viewport;
        assert!(approx(rect.x, 15.0) && approx(rect.y, 115.0));
        assert!(approx(rect.width, 570.0) && approx(rect.height, 570.0));
        assert!(approx(monitor.zoom, 0.57));
        assert_eq!(monitor.center, Vec2::splat(500.0));
    }

    #[test]
    fn test_degenerate_resize_keeps_layout() {
        let mut compositor = Compositor::new(1024.0, 768.0);
        let before = compositor.geometry();
        assert!(!compositor.resize(0.0, 768.0));
        assert!(!compositor.resize(1024.0, f32::NAN));
        assert_eq!(compositor.geometry(), before);
        assert_eq!(compositor.viewport(), (1024.0, 768.0));
    }

    #[test]
    fn test_layer_partition() {
        let compositor = Compositor::new(1280.0, 720.0);
        let cabinet = compositor.cabinet_camera();
        let monitor = compositor.monitor_camera();

        assert!(cabinet.sees(Layer::Cabinet) && !cabinet.sees(Layer::World));
        assert!(monitor.sees(Layer::World) && !monitor.sees(Layer::Cabinet));
        for layer in [Layer::World, Layer::Cabinet] {
            let viewers = compositor.cameras().iter().filter(|c| c.sees(layer)).count();
            assert_eq!(viewers, 1);
        }
    }

    #[test]
    fn test_world_corners_land_on_monitor_edges() {
        let compositor = Compositor::new(1280.0, 720.0);
        let monitor = compositor.monitor_camera();
        let rect = monitor.viewport;

        let top_left = monitor.to_screen(Vec2::ZERO);
        let bottom_right = monitor.to_screen(Vec2::splat(WORLD_SIZE));
        assert!(approx(top_left.x, rect.x) && approx(top_left.y, rect.y));
        assert!(approx(bottom_right.x, rect.x + rect.width));
        assert!(approx(bottom_right.y, rect.y + rect.height));
    }

    #[test]
    fn test_screen_to_world() {
        let compositor = Compositor::new(800.0, 600.0);
        let center = compositor.screen_to_world(Vec2::new(400.0, 300.0)).unwrap();
        assert!(approx(center.x, 500.0) && approx(center.y, 500.0));
        assert!(compositor.screen_to_world(Vec2::new(10.0, 300.0)).is_none());
    }

    proptest! {
        #[test]
        fn prop_inset_is_centered_square(w in 1.0f32..5000.0, h in 1.0f32..5000.0) {
            let mut compositor = Compositor::new(640.0, 480.0);
            prop_assert!(compositor.resize(w, h));
            let g = compositor.geometry();
            let monitor = compositor.monitor_camera();

            prop_assert!(approx(g.size, w.min(h) * 0.95));
            prop_assert!(approx(g.origin.x + g.size / 2.0, w / 2.0));
            prop_assert!(approx(g.origin.y + g.size / 2.0, h / 2.0));
            prop_assert!(approx(monitor.zoom, g.size / WORLD_SIZE));

            // Never leaves the physical viewport
            prop_assert!(g.origin.x >= 0.0 && g.origin.y >= 0.0);
            prop_assert!(g.origin.x + g.size <= w + 1e-3);
            prop_assert!(g.origin.y + g.size <= h + 1e-3);

            prop_assert_eq!(compositor.cabinet_camera().viewport, Rect::new(0.0, 0.0, w, h));
        }
    }
}
