//! Per-frame input snapshot: movement keys and a virtual cursor driven by relative mouse motion.

use glam::DVec2;
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKey {
    StrafeLeft,
    StrafeRight,
    Forward,
    Back,
    Up,
    Down,
}

impl MoveKey {
    pub const COUNT: usize = 6;

    pub const ALL: [MoveKey; Self::COUNT] = [
        MoveKey::StrafeLeft,
        MoveKey::StrafeRight,
        MoveKey::Forward,
        MoveKey::Back,
        MoveKey::Up,
        MoveKey::Down,
    ];

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyA => Some(MoveKey::StrafeLeft),
            KeyCode::KeyD => Some(MoveKey::StrafeRight),
            KeyCode::KeyW => Some(MoveKey::Forward),
            KeyCode::KeyS => Some(MoveKey::Back),
            KeyCode::Space => Some(MoveKey::Up),
            KeyCode::ShiftLeft => Some(MoveKey::Down),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputState {
    cursor: DVec2,
    pressed: [bool; MoveKey::COUNT],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is one of the movement keys.
    pub fn handle_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        match MoveKey::from_key_code(code) {
            Some(key) => {
                self.set_pressed(key, pressed);
                true
            }
            None => false,
        }
    }

    pub fn set_pressed(&mut self, key: MoveKey, pressed: bool) {
        self.pressed[key as usize] = pressed;
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        self.pressed[key as usize]
    }

    /// Forget held keys, e.g. when the window loses focus and release events go elsewhere.
    pub fn release_all(&mut self) {
        self.pressed = Default::default();
    }

    /// Accumulate raw mouse motion into the virtual cursor (screen convention, +y down).
    /// Non-finite components are dropped.
    pub fn add_mouse_motion(&mut self, dx: f64, dy: f64) {
        let finite = |d: f64| if d.is_finite() { d } else { 0.0 };
        self.cursor += DVec2::new(finite(dx), finite(dy));
    }

    pub fn cursor(&self) -> DVec2 {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_space_shift_map_to_move_keys() {
        let mapped: Vec<_> = [
            KeyCode::KeyA,
            KeyCode::KeyD,
            KeyCode::KeyW,
            KeyCode::KeyS,
            KeyCode::Space,
            KeyCode::ShiftLeft,
        ]
        .into_iter()
        .filter_map(MoveKey::from_key_code)
        .collect();
        assert_eq!(mapped, MoveKey::ALL.to_vec());
        assert_eq!(MoveKey::from_key_code(KeyCode::KeyQ), None);
    }

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        assert!(input.handle_key(KeyCode::KeyW, true));
        assert!(input.is_pressed(MoveKey::Forward));
        input.handle_key(KeyCode::KeyW, false);
        assert!(!input.is_pressed(MoveKey::Forward));
        assert!(!input.handle_key(KeyCode::Escape, true));
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut input = InputState::new();
        input.set_pressed(MoveKey::Up, true);
        input.set_pressed(MoveKey::StrafeLeft, true);
        input.release_all();
        assert!(MoveKey::ALL.iter().all(|&k| !input.is_pressed(k)));
    }

    #[test]
    fn mouse_motion_accumulates() {
        let mut input = InputState::new();
        input.add_mouse_motion(3.0, -1.0);
        input.add_mouse_motion(2.0, 4.0);
        assert_eq!(input.cursor(), DVec2::new(5.0, 3.0));
    }

    #[test]
    fn non_finite_motion_leaves_cursor_usable() {
        let mut input = InputState::new();
        input.add_mouse_motion(f64::NAN, 2.0);
        input.add_mouse_motion(f64::INFINITY, f64::NEG_INFINITY);
        input.add_mouse_motion(4.0, 1.0);
        assert_eq!(input.cursor(), DVec2::new(4.0, 3.0));
    }
}
