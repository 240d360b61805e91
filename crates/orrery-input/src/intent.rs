//! The per-frame input value passed into the simulation step.

use glam::Vec2;

use crate::action_map::{Action, ActionState};
use crate::mouse::MouseState;

/// Six independent movement intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    /// Read the movement actions that are currently held.
    #[must_use]
    pub fn from_actions(actions: &ActionState) -> Self {
        Self {
            forward: actions.is_held(Action::MoveForward),
            backward: actions.is_held(Action::MoveBackward),
            left: actions.is_held(Action::MoveLeft),
            right: actions.is_held(Action::MoveRight),
            up: actions.is_held(Action::MoveUp),
            down: actions.is_held(Action::MoveDown),
        }
    }
}

/// Discrete time-scale adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScaleCommand {
    Increase,
    Decrease,
    Reset,
}

/// Pointer capture requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCommand {
    Lock,
    Release,
}

/// Everything the simulation reads from the user in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub movement: InputState,
    /// In the order the keys were pressed.
    pub time_scale: Vec<TimeScaleCommand>,
    /// Captured mouse motion in device units.
    pub look: Vec2,
    pub pointer: Option<PointerCommand>,
}

impl FrameInput {
    /// Collect one frame of input from resolved actions and the mouse.
    #[must_use]
    pub fn collect(actions: &ActionState, mouse: &MouseState) -> Self {
        let time_scale = actions
            .triggered_in_order()
            .iter()
            .filter_map(|action| match action {
                Action::TimeScaleUp => Some(TimeScaleCommand::Increase),
                Action::TimeScaleDown => Some(TimeScaleCommand::Decrease),
                Action::TimeScaleReset => Some(TimeScaleCommand::Reset),
                _ => None,
            })
            .collect();

        // Release wins when both arrive in one frame.
        let pointer = if actions.was_triggered(Action::ReleasePointer) {
            Some(PointerCommand::Release)
        } else if actions.was_triggered(Action::LockPointer) && !mouse.is_captured() {
            Some(PointerCommand::Lock)
        } else {
            None
        };

        Self {
            movement: InputState::from_actions(actions),
            time_scale,
            look: mouse.motion(),
            pointer,
        }
    }

    /// Input with only movement intents set.
    #[must_use]
    pub fn moving(movement: InputState) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }
}
