//! Per-frame display list
//!
//! Game objects are turned into layered shapes here. World shapes are in
//! arena units, cabinet shapes in screen pixels; the renderer draws each
//! layer with the camera that sees it.

use glam::Vec2;

use super::shapes::Shape;
use super::vertex::{Vertex, colors};
use crate::compositor::{Camera, Compositor, Layer};
use crate::consts::*;
use crate::platform::input::ControlSurface;
use crate::sim::GameLoop;

/// Bezel thickness around the monitor, in screen pixels
const BEZEL_WIDTH: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub layer: Layer,
    pub shape: Shape,
    pub color: [f32; 4],
}

/// Shapes in draw order
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    items: Vec<Drawable>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer, shape: Shape, color: [f32; 4]) {
        self.items.push(Drawable { layer, shape, color });
    }

    pub fn items(&self) -> &[Drawable] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drawables the given camera renders
    pub fn visible_to<'a>(&'a self, camera: &'a Camera) -> impl Iterator<Item = &'a Drawable> + 'a {
        self.items.iter().filter(move |d| camera.sees(d.layer))
    }

    /// Triangles for one camera, in that camera's coordinate space
    pub fn vertices_for(&self, camera: &Camera) -> Vec<Vertex> {
        let mut vertices = Vec::new();
        for drawable in self.visible_to(camera) {
            drawable.shape.tessellate(drawable.color, &mut vertices);
        }
        vertices
    }
}

/// Build this frame's display list
///
/// `run` is None on the splash screen (empty arena). `controls` is drawn only
/// when its touch widgets are enabled.
pub fn build_scene(run: Option<&GameLoop>, controls: Option<&ControlSurface>, compositor: &Compositor) -> DisplayList {
    let mut list = DisplayList::new();
    push_cabinet(&mut list, compositor);
    push_arena(&mut list);

    if let Some(run) = run {
        push_run(&mut list, run);
    }
    if let Some(controls) = controls.filter(|c| c.touch_enabled) {
        push_controls(&mut list, controls);
    }
    list
}

fn push_cabinet(list: &mut DisplayList, compositor: &Compositor) {
    let rect = compositor.geometry().rect();
    let min = Vec2::new(rect.x, rect.y) - Vec2::splat(BEZEL_WIDTH);
    let max = Vec2::new(rect.x + rect.width, rect.y + rect.height) + Vec2::splat(BEZEL_WIDTH);
    list.push(
        Layer::Cabinet,
        Shape::RectOutline {
            min,
            max,
            thickness: BEZEL_WIDTH,
        },
        colors::BEZEL,
    );
}

fn push_arena(list: &mut DisplayList) {
    let max = Vec2::splat(WORLD_SIZE);
    list.push(Layer::World, Shape::Rect { min: Vec2::ZERO, max }, colors::ARENA);
    list.push(
        Layer::World,
        Shape::RectOutline {
            min: Vec2::ZERO,
            max,
            thickness: BORDER_WIDTH,
        },
        colors::ARENA_BORDER,
    );
}

fn push_run(list: &mut DisplayList, run: &GameLoop) {
    let state = run.state();

    list.push(
        Layer::World,
        Shape::Circle {
            center: state.hazard.shape.center,
            radius: state.hazard.shape.radius,
        },
        colors::HAZARD,
    );

    let player_color = if run.is_over() {
        colors::PLAYER_DEAD
    } else {
        colors::PLAYER
    };
    list.push(Layer::World, Shape::Triangle(state.player.triangle()), player_color);

    if let Some(bullet) = run.bullets().bullet() {
        let aabb = bullet.aabb();
        list.push(
            Layer::World,
            Shape::Rect {
                min: aabb.min,
                max: aabb.max,
            },
            colors::BULLET,
        );
    }
}

fn push_controls(list: &mut DisplayList, controls: &ControlSurface) {
    let stick = &controls.joystick;
    list.push(
        Layer::Cabinet,
        Shape::Ring {
            center: stick.center,
            inner_radius: stick.radius - 3.0,
            outer_radius: stick.radius,
        },
        colors::JOYSTICK_BASE,
    );
    list.push(
        Layer::Cabinet,
        Shape::Circle {
            center: stick.thumb_pos(),
            radius: JOYSTICK_THUMB_RADIUS,
        },
        colors::JOYSTICK_THUMB,
    );

    let button = &controls.fire_button;
    let color = if button.is_pressed() {
        colors::FIRE_BUTTON_PRESSED
    } else {
        colors::FIRE_BUTTON
    };
    list.push(
        Layer::Cabinet,
        Shape::Circle {
            center: button.center,
            radius: button.radius,
        },
        color,
    );
}
