use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }
}

/// Drag and wheel movement gathered since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Cursor travel in pixels while the orbit button was held.
    pub drag: Vec2,
    /// Wheel steps; positive zooms in.
    pub wheel: f32,
}

impl OrbitInput {
    pub fn is_idle(&self) -> bool {
        self.drag == Vec2::ZERO && self.wheel == 0.0
    }
}

/// Pointer snapshot fed by window events.
#[derive(Debug, Default)]
pub struct PointerState {
    buttons: HashSet<MouseButton>,
    position: Option<Vec2>,
    drag: Vec2,
    wheel: f32,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button_down(&mut self, button: MouseButton) {
        self.buttons.insert(button);
    }

    pub fn set_button_up(&mut self, button: MouseButton) {
        self.buttons.remove(&button);
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Records a cursor move; travel counts as drag only while the left
    /// button is held.
    pub fn set_position(&mut self, position: Vec2) {
        if let Some(previous) = self.position {
            if self.is_button_down(MouseButton::LEFT) {
                self.drag += position - previous;
            }
        }
        self.position = Some(position);
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn add_wheel(&mut self, steps: f32) {
        self.wheel += steps;
    }

    /// Returns the accumulated movement and resets it.
    pub fn take_orbit_input(&mut self) -> OrbitInput {
        let input = OrbitInput {
            drag: self.drag,
            wheel: self.wheel,
        };
        self.drag = Vec2::ZERO;
        self.wheel = 0.0;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_accumulates_only_while_button_held() {
        let mut state = PointerState::new();
        state.set_position(Vec2::new(10.0, 10.0));
        state.set_position(Vec2::new(30.0, 10.0));
        assert!(state.take_orbit_input().is_idle());

        state.set_button_down(MouseButton::LEFT);
        state.set_position(Vec2::new(40.0, 5.0));
        state.set_position(Vec2::new(45.0, 0.0));
        state.set_button_up(MouseButton::LEFT);
        state.set_position(Vec2::new(100.0, 100.0));

        let input = state.take_orbit_input();
        assert_eq!(input.drag, Vec2::new(15.0, -10.0));
        assert!(state.take_orbit_input().is_idle());
    }

    #[test]
    fn wheel_steps_are_summed() {
        let mut state = PointerState::new();
        state.add_wheel(1.0);
        state.add_wheel(-0.5);
        assert_eq!(state.take_orbit_input().wheel, 0.5);
    }

    #[test]
    fn tracks_buttons_by_index() {
        let mut state = PointerState::new();
        state.set_button_down(MouseButton::new(2));
        assert!(state.is_button_down(MouseButton::MIDDLE));
        state.set_button_up(MouseButton::MIDDLE);
        assert!(!state.is_button_down(MouseButton::MIDDLE));
    }
}
