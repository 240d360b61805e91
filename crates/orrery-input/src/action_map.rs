//! Action bindings: which physical inputs drive which [`Action`].
//!
//! [`InputMap`] is the user-editable binding table. [`ActionResolver`] reads
//! keyboard and mouse state once per frame into an [`ActionState`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// Serde support for [`KeyCode`], stored by its variant name (`"KeyW"`).
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    macro_rules! named_keys {
        ($($name:ident),* $(,)?) => {
            fn key_from_name(name: &str) -> Option<KeyCode> {
                match name {
                    $(stringify!($name) => Some(KeyCode::$name),)*
                    _ => None,
                }
            }
        };
    }

    named_keys!(
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
        KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ, Digit0, Digit1,
        Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Space, Enter, Escape,
        Tab, ShiftLeft, ShiftRight, ControlLeft, ControlRight, AltLeft, AltRight, ArrowUp,
        ArrowDown, ArrowLeft, ArrowRight, BracketLeft, BracketRight, Minus, Equal, PageUp,
        PageDown,
    );

    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        key_from_name(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

/// Everything the user can ask the orrery to do.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    /// Rise along world +Y.
    MoveUp,
    /// Sink along world -Y.
    MoveDown,
    /// Add one step to the time scale.
    TimeScaleUp,
    /// Remove one step from the time scale.
    TimeScaleDown,
    /// Set the time scale back to 1.
    TimeScaleReset,
    /// Capture the pointer for mouse look.
    LockPointer,
    /// Give the pointer back to the desktop.
    ReleasePointer,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 11] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::TimeScaleUp,
        Action::TimeScaleDown,
        Action::TimeScaleReset,
        Action::LockPointer,
        Action::ReleasePointer,
    ];
}

/// Serializable mouse button.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButtonBinding {
    Left,
    Right,
    Middle,
}

impl MouseButtonBinding {
    #[must_use]
    pub fn to_winit(self) -> MouseButton {
        match self {
            Self::Left => MouseButton::Left,
            Self::Right => MouseButton::Right,
            Self::Middle => MouseButton::Middle,
        }
    }
}

/// A physical input that can trigger an action.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum InputBinding {
    /// A keyboard key by physical position.
    Key(#[serde(with = "keycode_serde")] KeyCode),
    MouseButton(MouseButtonBinding),
}

/// Maps each [`Action`] to any number of [`InputBinding`]s (OR logic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    pub bindings: HashMap<Action, Vec<InputBinding>>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::default_orrery()
    }
}

impl InputMap {
    /// A map with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// WASD to fly, Space/Shift for height, `]` `[` `0` for time, click to
    /// capture the mouse and Escape to let go.
    #[must_use]
    pub fn default_orrery() -> Self {
        use InputBinding::Key;

        let bindings = HashMap::from([
            (Action::MoveForward, vec![Key(KeyCode::KeyW)]),
            (Action::MoveBackward, vec![Key(KeyCode::KeyS)]),
            (Action::MoveLeft, vec![Key(KeyCode::KeyA)]),
            (Action::MoveRight, vec![Key(KeyCode::KeyD)]),
            (Action::MoveUp, vec![Key(KeyCode::Space)]),
            (
                Action::MoveDown,
                vec![Key(KeyCode::ShiftLeft), Key(KeyCode::ShiftRight)],
            ),
            (Action::TimeScaleUp, vec![Key(KeyCode::BracketRight)]),
            (Action::TimeScaleDown, vec![Key(KeyCode::BracketLeft)]),
            (Action::TimeScaleReset, vec![Key(KeyCode::Digit0)]),
            (
                Action::LockPointer,
                vec![InputBinding::MouseButton(MouseButtonBinding::Left)],
            ),
            (Action::ReleasePointer, vec![Key(KeyCode::Escape)]),
        ]);

        Self { bindings }
    }

    /// Replace the bindings of `action`.
    pub fn set_bindings(&mut self, action: Action, bindings: Vec<InputBinding>) {
        self.bindings.insert(action, bindings);
    }

    #[must_use]
    pub fn get_bindings(&self, action: Action) -> &[InputBinding] {
        self.bindings.get(&action).map_or(&[], Vec::as_slice)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse from RON.
    ///
    /// # Errors
    /// Returns an error if the RON string is malformed.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Actions held this frame and actions whose press edge arrived this frame.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    held: HashSet<Action>,
    triggered: HashSet<Action>,
    /// Key-driven triggers in press order, then mouse-driven ones.
    sequence: Vec<Action>,
}

impl ActionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Any binding of `action` is down.
    #[must_use]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Any binding of `action` was pressed since the previous frame.
    #[must_use]
    pub fn was_triggered(&self, action: Action) -> bool {
        self.triggered.contains(&action)
    }

    /// Every press edge this frame mapped to its actions, in the order the
    /// presses arrived. Mouse buttons carry no ordering against keys and are
    /// listed last.
    #[must_use]
    pub fn triggered_in_order(&self) -> &[Action] {
        &self.sequence
    }
}

/// Turns raw device state into an [`ActionState`].
pub struct ActionResolver;

impl ActionResolver {
    /// Resolve every bound action. Call once per frame, before the device
    /// states drop their edges.
    pub fn resolve(
        input_map: &InputMap,
        keyboard: &KeyboardState,
        mouse: &MouseState,
        state: &mut ActionState,
    ) {
        state.held.clear();
        state.triggered.clear();
        state.sequence.clear();

        for (action, bindings) in &input_map.bindings {
            for binding in bindings {
                let (held, pressed) = match *binding {
                    InputBinding::Key(code) => (keyboard.is_held(code), keyboard.was_pressed(code)),
                    InputBinding::MouseButton(button) => {
                        let button = button.to_winit();
                        (mouse.is_held(button), mouse.was_pressed(button))
                    }
                };
                if held {
                    state.held.insert(*action);
                }
                if pressed {
                    state.triggered.insert(*action);
                }
            }
        }

        for &code in keyboard.presses() {
            let binding = InputBinding::Key(code);
            state.sequence.extend(
                Action::ALL
                    .into_iter()
                    .filter(|a| input_map.get_bindings(*a).contains(&binding)),
            );
        }
        for action in Action::ALL {
            let clicked = input_map.get_bindings(action).iter().any(|b| {
                matches!(b, InputBinding::MouseButton(button) if mouse.was_pressed(button.to_winit()))
            });
            if clicked {
                state.sequence.push(action);
            }
        }
    }
}
