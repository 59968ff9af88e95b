//! Input sources
//!
//! Every control device boils down to the same `TickInput` snapshot. Sources
//! latch a fire press and hand it out exactly once, so holding the key or
//! button never auto-fires.

use glam::Vec2;

use crate::consts::*;
use crate::sim::TickInput;

/// Anything that can produce a per-tick input snapshot
pub trait InputSource {
    /// Current snapshot; consumes any pending fire pulse
    fn snapshot(&mut self) -> TickInput;
}

/// A missing device: never reports anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn snapshot(&mut self) -> TickInput {
        TickInput::default()
    }
}

/// Logical keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            " " => Some(Key::Fire),
            _ => None,
        }
    }
}

/// Arrow keys plus space
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    fire_held: bool,
    fire_pulse: bool,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Up => self.up = true,
            Key::Down => self.down = true,
            Key::Fire => {
                // Auto-repeat keydowns arrive while already held
                if !self.fire_held {
                    self.fire_pulse = true;
                }
                self.fire_held = true;
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Up => self.up = false,
            Key::Down => self.down = false,
            Key::Fire => self.fire_held = false,
        }
    }

    /// Drop every held key (window lost focus)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

impl InputSource for Keyboard {
    fn snapshot(&mut self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            fire: std::mem::take(&mut self.fire_pulse),
        }
    }
}

/// On-screen 8-direction stick
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    pub center: Vec2,
    pub radius: f32,
    /// Thumb offset from the center, clamped to the base radius
    thumb: Vec2,
    /// Pointer currently dragging the thumb
    pointer: Option<i32>,
}

impl VirtualJoystick {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            thumb: Vec2::ZERO,
            pointer: None,
        }
    }

    /// Thumb position in screen space
    pub fn thumb_pos(&self) -> Vec2 {
        self.center + self.thumb
    }

    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }

    /// Start dragging if the press lands on the base. Returns true if captured.
    pub fn press(&mut self, pointer: i32, pos: Vec2) -> bool {
        if self.pointer.is_some() || pos.distance(self.center) > self.radius {
            return false;
        }
        self.pointer = Some(pointer);
        self.set_thumb(pos);
        true
    }

    pub fn drag(&mut self, pointer: i32, pos: Vec2) {
        if self.pointer == Some(pointer) {
            self.set_thumb(pos);
        }
    }

    pub fn release(&mut self, pointer: i32) {
        if self.pointer == Some(pointer) {
            self.pointer = None;
            self.thumb = Vec2::ZERO;
        }
    }

    fn set_thumb(&mut self, pos: Vec2) {
        self.thumb = (pos - self.center).clamp_length_max(self.radius);
    }

    /// Directional part of the snapshot
    pub fn directions(&self) -> TickInput {
        let mut input = TickInput::default();
        if self.thumb.length() < self.radius * JOYSTICK_DEAD_ZONE {
            return input;
        }

        // Sector 0 is right, counting clockwise (y down) in 45° steps
        let angle = self.thumb.y.atan2(self.thumb.x);
        let sector = (angle / std::f32::consts::FRAC_PI_4).round().rem_euclid(8.0) as u8;
        match sector {
            0 => input.right = true,
            1 => {
                input.right = true;
                input.down = true;
            }
            2 => input.down = true,
            3 => {
                input.left = true;
                input.down = true;
            }
            4 => input.left = true,
            5 => {
                input.left = true;
                input.up = true;
            }
            6 => input.up = true,
            _ => {
                input.right = true;
                input.up = true;
            }
        }
        input
    }
}

impl InputSource for VirtualJoystick {
    fn snapshot(&mut self) -> TickInput {
        self.directions()
    }
}

/// On-screen fire button
#[derive(Debug, Clone)]
pub struct FireButton {
    pub center: Vec2,
    pub radius: f32,
    /// Pointer holding the button down
    pointer: Option<i32>,
    pulse: bool,
}

impl FireButton {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            pointer: None,
            pulse: false,
        }
    }

    /// Press if `pos` is on the button. Returns true if it was hit.
    pub fn press(&mut self, pointer: i32, pos: Vec2) -> bool {
        if pos.distance(self.center) > self.radius {
            return false;
        }
        if self.pointer.is_none() {
            self.pointer = Some(pointer);
            self.pulse = true;
        }
        true
    }

    /// Only the pointer that pressed the button releases it
    pub fn release(&mut self, pointer: i32) {
        if self.pointer == Some(pointer) {
            self.pointer = None;
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pointer.is_some()
    }
}

impl InputSource for FireButton {
    fn snapshot(&mut self) -> TickInput {
        TickInput {
            fire: std::mem::take(&mut self.pulse),
            ..Default::default()
        }
    }
}

/// Keyboard, joystick and fire button merged into one source
#[derive(Debug, Clone)]
pub struct ControlSurface {
    pub keyboard: Keyboard,
    pub joystick: VirtualJoystick,
    pub fire_button: FireButton,
    /// Whether the touch widgets are shown and accept presses
    pub touch_enabled: bool,
}

impl ControlSurface {
    pub fn new(width: f32, height: f32, touch_enabled: bool) -> Self {
        let mut controls = Self {
            keyboard: Keyboard::new(),
            joystick: VirtualJoystick::new(Vec2::ZERO, JOYSTICK_BASE_RADIUS),
            fire_button: FireButton::new(Vec2::ZERO, FIRE_BUTTON_RADIUS),
            touch_enabled,
        };
        controls.layout(width, height);
        controls
    }

    /// Pin the widgets to the bottom corners of the screen
    pub fn layout(&mut self, width: f32, height: f32) {
        self.joystick.center = Vec2::new(
            JOYSTICK_OFFSET.0,
            height - JOYSTICK_OFFSET.1 - CONTROLS_BOTTOM_SAFE_AREA,
        );
        self.fire_button.center = Vec2::new(
            width - FIRE_BUTTON_OFFSET.0,
            height - FIRE_BUTTON_OFFSET.1 - CONTROLS_BOTTOM_SAFE_AREA,
        );
    }

    /// Route a pointer press to the widgets. Returns true if one captured it.
    pub fn pointer_down(&mut self, pointer: i32, pos: Vec2) -> bool {
        if !self.touch_enabled {
            return false;
        }
        self.fire_button.press(pointer, pos) || self.joystick.press(pointer, pos)
    }

    pub fn pointer_move(&mut self, pointer: i32, pos: Vec2) {
        if self.touch_enabled {
            self.joystick.drag(pointer, pos);
        }
    }

    pub fn pointer_up(&mut self, pointer: i32) {
        self.joystick.release(pointer);
        self.fire_button.release(pointer);
    }
}

impl InputSource for ControlSurface {
    fn snapshot(&mut self) -> TickInput {
        let keys = self.keyboard.snapshot();
        let stick = self.joystick.snapshot();
        let button = self.fire_button.snapshot();

        TickInput {
            left: keys.left || stick.left,
            right: keys.right || stick.right,
            up: keys.up || stick.up,
            down: keys.down || stick.down,
            fire: keys.fire || button.fire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_is_empty() {
        assert!(NoInput.snapshot().is_empty());
    }

    #[test]
    fn test_keyboard_fire_is_edge_triggered() {
        let mut kb = Keyboard::new();
        kb.key_down(Key::Fire);
        kb.key_down(Key::Fire); // auto-repeat
        assert!(kb.snapshot().fire);
        assert!(!kb.snapshot().fire);

        kb.key_up(Key::Fire);
        kb.key_down(Key::Fire);
        assert!(kb.snapshot().fire);
    }

    #[test]
    fn test_keyboard_held_directions() {
        let mut kb = Keyboard::new();
        kb.key_down(Key::Left);
        kb.key_down(Key::Up);
        let snap = kb.snapshot();
        assert!(snap.left && snap.up && !snap.right && !snap.down);
        assert!(kb.snapshot().left);

        kb.release_all();
        assert!(kb.snapshot().is_empty());
    }

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom_key("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom_key(" "), Some(Key::Fire));
        assert_eq!(Key::from_dom_key("Escape"), None);
    }

    #[test]
    fn test_joystick_sectors() {
        let center = Vec2::new(100.0, 500.0);
        let mut stick = VirtualJoystick::new(center, 60.0);

        let cases = [
            (Vec2::new(50.0, 0.0), (false, true, false, false)),
            (Vec2::new(0.0, -50.0), (false, false, true, false)),
            (Vec2::new(-40.0, -40.0), (true, false, true, false)),
            (Vec2::new(40.0, 40.0), (false, true, false, true)),
            (Vec2::new(-50.0, 0.0), (true, false, false, false)),
        ];
        for (offset, (left, right, up, down)) in cases {
            assert!(stick.press(1, center));
            stick.drag(1, center + offset);
            let snap = stick.snapshot();
            assert_eq!((snap.left, snap.right, snap.up, snap.down), (left, right, up, down));
            stick.release(1);
        }
    }

    #[test]
    fn test_joystick_dead_zone_and_release() {
        let center = Vec2::new(100.0, 500.0);
        let mut stick = VirtualJoystick::new(center, 60.0);
        assert!(stick.press(3, center + Vec2::new(5.0, 5.0)));
        assert!(stick.snapshot().is_empty());

        // Thumb is clamped to the base radius
        stick.drag(3, center + Vec2::new(500.0, 0.0));
        assert!((stick.thumb_pos() - (center + Vec2::new(60.0, 0.0))).length() < 1e-4);

        // Other pointers can't steal the stick
        stick.drag(4, center + Vec2::new(-50.0, 0.0));
        assert!(stick.snapshot().right);

        stick.release(3);
        assert!(!stick.is_active());
        assert!(stick.snapshot().is_empty());
    }

    #[test]
    fn test_fire_button_pulse() {
        let mut button = FireButton::new(Vec2::new(700.0, 466.0), 40.0);
        assert!(!button.press(1, Vec2::new(600.0, 466.0)));
        assert!(button.press(1, Vec2::new(710.0, 470.0)));
        assert!(button.snapshot().fire);
        assert!(!button.snapshot().fire);

        // A second finger on the held button does not fire again
        assert!(button.press(2, Vec2::new(700.0, 466.0)));
        assert!(!button.snapshot().fire);
        button.release(2);
        assert!(button.is_pressed());
        button.release(1);
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_joystick_release_keeps_fire_held() {
        let mut controls = ControlSurface::new(800.0, 600.0, true);
        assert!(controls.pointer_down(1, Vec2::new(700.0, 466.0)));
        assert!(controls.pointer_down(2, Vec2::new(100.0, 466.0)));

        controls.pointer_up(2);
        assert!(controls.fire_button.is_pressed());
        assert!(!controls.joystick.is_active());

        controls.pointer_up(1);
        assert!(!controls.fire_button.is_pressed());
    }

    #[test]
    fn test_control_surface_layout_and_merge() {
        let mut controls = ControlSurface::new(800.0, 600.0, true);
        assert_eq!(controls.joystick.center, Vec2::new(100.0, 466.0));
        assert_eq!(controls.fire_button.center, Vec2::new(700.0, 466.0));

        controls.keyboard.key_down(Key::Up);
        assert!(controls.pointer_down(1, Vec2::new(700.0, 466.0)));
        assert!(controls.pointer_down(2, Vec2::new(100.0, 466.0)));
        controls.pointer_move(2, Vec2::new(150.0, 466.0));

        let snap = controls.snapshot();
        assert!(snap.up && snap.right && snap.fire);
        assert!(!controls.snapshot().fire);

        controls.layout(600.0, 800.0);
        assert_eq!(controls.fire_button.center, Vec2::new(500.0, 666.0));
    }

    #[test]
    fn test_touch_disabled_ignores_pointers() {
        let mut controls = ControlSurface::new(800.0, 600.0, false);
        assert!(!controls.pointer_down(1, Vec2::new(700.0, 466.0)));
        assert!(controls.snapshot().is_empty());
    }
}
