use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{config::ControlConfig, SceneError, TransformState};

/// Keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    S,
    A,
    D,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Plus,
    Minus,
    C,
    F4,
}

impl Key {
    pub fn action(self) -> InputAction {
        match self {
            Key::W => InputAction::Adjust(Command::TiltUp),
            Key::S => InputAction::Adjust(Command::TiltDown),
            Key::A => InputAction::Adjust(Command::TurnLeft),
            Key::D => InputAction::Adjust(Command::TurnRight),
            Key::Left => InputAction::Adjust(Command::MoveLeft),
            Key::Right => InputAction::Adjust(Command::MoveRight),
            Key::Up => InputAction::Adjust(Command::MoveAway),
            Key::Down => InputAction::Adjust(Command::MoveCloser),
            Key::PageUp => InputAction::Adjust(Command::Grow),
            Key::PageDown => InputAction::Adjust(Command::Shrink),
            Key::Plus => InputAction::Adjust(Command::ZoomIn),
            Key::Minus => InputAction::Adjust(Command::ZoomOut),
            Key::C => InputAction::StartAnimation,
            Key::F4 => InputAction::Terminate,
        }
    }
}

impl FromStr for Key {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "s" => Key::S,
            "a" => Key::A,
            "d" => Key::D,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "plus" | "+" => Key::Plus,
            "minus" | "-" => Key::Minus,
            "c" => Key::C,
            "f4" => Key::F4,
            other => return Err(SceneError::msg(format!("unknown key `{other}`"))),
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single bounded adjustment of the transform state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TiltUp,
    TiltDown,
    TurnLeft,
    TurnRight,
    MoveLeft,
    MoveRight,
    MoveAway,
    MoveCloser,
    Grow,
    Shrink,
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Adjust(Command),
    StartAnimation,
    Terminate,
}

/// What happened to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Applied,
    /// Controls were locked or a limit was reached. Nothing changed.
    Rejected,
    /// The caller should start the eject sequence.
    StartAnimation,
    Terminate,
}

/// Maps key presses to clamped adjustments of a [`TransformState`].
#[derive(Debug, Clone, Default)]
pub struct InputController {
    controls: ControlConfig,
}

impl InputController {
    pub fn new(controls: ControlConfig) -> Self {
        Self { controls }
    }

    /// Returns `state` with `command` applied, or `state` unchanged when the
    /// controls are locked or the command would leave its valid range.
    pub fn apply(&self, state: TransformState, command: Command) -> TransformState {
        if state.locked {
            return state;
        }

        let c = &self.controls;
        let mut next = state;
        match command {
            Command::TiltUp => {
                if state.rotation_x - c.rotation_step >= 0.0 {
                    next.rotation_x -= c.rotation_step;
                }
            }
            Command::TiltDown => {
                if state.rotation_x + c.rotation_step <= c.max_rotation_x {
                    next.rotation_x += c.rotation_step;
                }
            }
            Command::TurnLeft => next.rotation_y -= c.rotation_step,
            Command::TurnRight => next.rotation_y += c.rotation_step,
            Command::MoveLeft | Command::MoveRight => {
                let delta = if command == Command::MoveLeft {
                    -c.translation_step
                } else {
                    c.translation_step
                };
                if let Some(x) = c.x_axis.step(state.object_x, delta, state.object_scale) {
                    next.object_x = x;
                }
            }
            Command::MoveAway | Command::MoveCloser => {
                let delta = if command == Command::MoveAway {
                    -c.translation_step
                } else {
                    c.translation_step
                };
                if let Some(z) = c.z_axis.step(state.object_z, delta, state.object_scale) {
                    next.object_z = z;
                }
            }
            Command::Grow => {
                if state.object_scale + c.scale_step < c.max_scale {
                    next.object_scale += c.scale_step;
                }
            }
            Command::Shrink => {
                if state.object_scale - c.scale_step > 0.0 {
                    next.object_scale -= c.scale_step;
                }
            }
            Command::ZoomIn => next.scene_distance -= c.distance_step,
            Command::ZoomOut => next.scene_distance += c.distance_step,
        }
        next
    }

    /// Applies the key to `state` in place.
    ///
    /// The animation trigger is lock-gated like every other mutating key;
    /// termination is always honoured.
    pub fn handle_key(&self, key: Key, state: &mut TransformState) -> KeyOutcome {
        match key.action() {
            InputAction::Terminate => KeyOutcome::Terminate,
            _ if state.locked => {
                tracing::trace!(%key, "controls locked, key ignored");
                KeyOutcome::Rejected
            }
            InputAction::StartAnimation => KeyOutcome::StartAnimation,
            InputAction::Adjust(command) => {
                let next = self.apply(*state, command);
                if next == *state {
                    tracing::trace!(%key, "adjustment clamped");
                    KeyOutcome::Rejected
                } else {
                    *state = next;
                    KeyOutcome::Applied
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [Key; 14] = [
        Key::W,
        Key::S,
        Key::A,
        Key::D,
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::PageUp,
        Key::PageDown,
        Key::Plus,
        Key::Minus,
        Key::C,
        Key::F4,
    ];

    fn controller() -> InputController {
        InputController::new(ControlConfig::default())
    }

    #[test]
    fn locked_state_ignores_every_key() {
        let controller = controller();
        let mut state = TransformState {
            locked: true,
            object_x: 40.0,
            ..TransformState::default()
        };
        let before = state;

        for key in ALL_KEYS {
            let outcome = controller.handle_key(key, &mut state);
            if key == Key::F4 {
                assert_eq!(outcome, KeyOutcome::Terminate);
            } else {
                assert_eq!(outcome, KeyOutcome::Rejected, "{key} was not rejected");
            }
            assert_eq!(state, before);
        }
    }

    #[test]
    fn rotation_x_stays_within_quarter_turn() {
        let controller = controller();
        let mut state = TransformState::default();

        for _ in 0..30 {
            controller.handle_key(Key::S, &mut state);
            assert!((0.0..=90.0).contains(&state.rotation_x));
        }
        assert_eq!(state.rotation_x, 90.0);

        for _ in 0..30 {
            controller.handle_key(Key::W, &mut state);
            assert!((0.0..=90.0).contains(&state.rotation_x));
        }
        assert_eq!(state.rotation_x, 0.0);
        assert_eq!(controller.handle_key(Key::W, &mut state), KeyOutcome::Rejected);
    }

    #[test]
    fn rotation_y_spins_freely() {
        let controller = controller();
        let mut state = TransformState::default();
        for _ in 0..100 {
            controller.handle_key(Key::A, &mut state);
        }
        assert_eq!(state.rotation_y, -500.0);
    }

    #[test]
    fn scale_stays_in_open_interval() {
        let controller = controller();
        let mut state = TransformState::default();

        for _ in 0..40 {
            controller.handle_key(Key::PageUp, &mut state);
            assert!(state.object_scale > 0.0 && state.object_scale < 1.3);
        }
        for _ in 0..40 {
            controller.handle_key(Key::PageDown, &mut state);
            assert!(state.object_scale > 0.0 && state.object_scale < 1.3);
        }
    }

    #[test]
    fn zoom_moves_distance_by_fixed_steps() {
        let controller = controller();
        let mut state = TransformState::default();
        controller.handle_key(Key::Plus, &mut state);
        assert_eq!(state.scene_distance, 1800.0);
        controller.handle_key(Key::Minus, &mut state);
        controller.handle_key(Key::Minus, &mut state);
        assert_eq!(state.scene_distance, 3200.0);
    }

    fn furthest_right(scale: f32) -> f32 {
        let controller = controller();
        let mut state = TransformState {
            object_scale: scale,
            ..TransformState::default()
        };
        for _ in 0..100 {
            controller.handle_key(Key::Right, &mut state);
        }
        state.object_x
    }

    #[test]
    fn larger_object_stops_earlier() {
        let large = furthest_right(1.3);
        let small = furthest_right(0.3);
        assert!(large < small, "{large} should be below {small}");
        assert!(large < 80.0);
        assert!(small < 680.0);
    }

    #[test]
    fn depth_travel_depends_on_scale() {
        let controller = controller();
        let mut big = TransformState {
            object_scale: 1.25,
            ..TransformState::default()
        };
        let mut small = TransformState {
            object_scale: 0.5,
            ..TransformState::default()
        };
        for _ in 0..100 {
            controller.handle_key(Key::Down, &mut big);
            controller.handle_key(Key::Down, &mut small);
        }
        assert!(big.object_z < small.object_z);
    }

    #[test]
    fn trigger_is_reported_not_applied() {
        let controller = controller();
        let mut state = TransformState::default();
        assert_eq!(
            controller.handle_key(Key::C, &mut state),
            KeyOutcome::StartAnimation
        );
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn parses_key_names() {
        assert_eq!("PageUp".parse::<Key>().unwrap(), Key::PageUp);
        assert_eq!(" + ".parse::<Key>().unwrap(), Key::Plus);
        assert_eq!("f4".parse::<Key>().unwrap(), Key::F4);
        assert!("space".parse::<Key>().is_err());
    }
}
