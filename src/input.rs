use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::OrbitControls;
use crate::error::Dimension;

/// Keys the configurator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Left,
    Right,
    Up,
    Down,
}

impl NamedKey {
    /// Accepts DOM `KeyboardEvent.key` names as well as the short forms.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            _ => return None,
        };
        Some(key)
    }
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// What an input event asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Nudge a dimension input by whole steps.
    Step { dimension: Dimension, steps: i32 },
    /// Orbit by angles in radians.
    Orbit { left: f32, up: f32 },
    /// Wheel notches, positive towards the target.
    Dolly(f32),
}

impl Action {
    /// Feeds camera actions into the orbit controls. Returns false for
    /// actions that belong to the door controls.
    pub fn apply_to(self, controls: &mut OrbitControls) -> bool {
        match self {
            Self::Orbit { left, up } => {
                controls.rotate_left(left);
                controls.rotate_up(up);
                true
            }
            Self::Dolly(notches) => {
                controls.dolly(notches);
                true
            }
            Self::Step { .. } => false,
        }
    }
}

/// Left and right step the width, up and down step the height.
pub fn key_action(key: NamedKey) -> Action {
    let (dimension, steps) = match key {
        NamedKey::Left => (Dimension::Width, -1),
        NamedKey::Right => (Dimension::Width, 1),
        NamedKey::Up => (Dimension::Height, 1),
        NamedKey::Down => (Dimension::Height, -1),
    };
    Action::Step { dimension, steps }
}

/// Pointer drag tracking for orbiting.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    dragging: bool,
    last: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: MouseButton, position: Vec2) {
        if button == MouseButton::LEFT {
            self.dragging = true;
            self.last = Some(position);
        }
    }

    pub fn release(&mut self, button: MouseButton) {
        if button == MouseButton::LEFT {
            self.dragging = false;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// A full viewport height of travel turns the camera once around.
    pub fn move_to(&mut self, position: Vec2, viewport_height: u32) -> Option<Action> {
        let previous = self.last.replace(position);
        if !self.dragging {
            return None;
        }
        let delta = position - previous?;
        if delta == Vec2::ZERO {
            return None;
        }
        let height = viewport_height.max(1) as f32;
        Some(Action::Orbit {
            left: TAU * delta.x / height,
            up: TAU * delta.y / height,
        })
    }

    /// `delta_y` follows DOM wheel events: positive scrolls away from the target.
    pub fn wheel(&self, delta_y: f32) -> Option<Action> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return None;
        }
        Some(Action::Dolly(-delta_y.signum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dom_and_short_key_names() {
        assert_eq!(NamedKey::from_name("ArrowLeft"), Some(NamedKey::Left));
        assert_eq!(NamedKey::from_name("Down"), Some(NamedKey::Down));
        assert_eq!(NamedKey::from_name("Space"), None);
    }

    #[test]
    fn arrows_step_the_door_inputs() {
        assert_eq!(
            key_action(NamedKey::Right),
            Action::Step {
                dimension: Dimension::Width,
                steps: 1
            }
        );
        assert_eq!(
            key_action(NamedKey::Down),
            Action::Step {
                dimension: Dimension::Height,
                steps: -1
            }
        );
    }

    #[test]
    fn dragging_produces_orbit_angles() {
        let mut pointer = PointerState::new();
        assert!(pointer.move_to(Vec2::new(10.0, 10.0), 600).is_none());
        pointer.press(MouseButton::LEFT, Vec2::new(10.0, 10.0));
        let action = pointer.move_to(Vec2::new(310.0, 10.0), 600).unwrap();
        match action {
            Action::Orbit { left, up } => {
                assert!((left - std::f32::consts::PI).abs() < 1e-5);
                assert_eq!(up, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        pointer.release(MouseButton::LEFT);
        assert!(pointer.move_to(Vec2::new(0.0, 0.0), 600).is_none());
    }

    #[test]
    fn right_button_does_not_orbit() {
        let mut pointer = PointerState::new();
        pointer.press(MouseButton::new(2), Vec2::ZERO);
        assert!(!pointer.is_dragging());
    }

    #[test]
    fn wheel_direction_maps_to_dolly() {
        let pointer = PointerState::new();
        assert_eq!(pointer.wheel(120.0), Some(Action::Dolly(-1.0)));
        assert_eq!(pointer.wheel(-3.0), Some(Action::Dolly(1.0)));
        assert_eq!(pointer.wheel(0.0), None);
        let mut controls = OrbitControls::new();
        assert!(Action::Dolly(1.0).apply_to(&mut controls));
        assert!(controls.is_moving());
        assert!(!key_action(NamedKey::Up).apply_to(&mut controls));
    }
}
