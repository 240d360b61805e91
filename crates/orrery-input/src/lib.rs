//! Input capture: keyboard and mouse state, action bindings, and the
//! per-frame [`FrameInput`] handed to the simulation.

pub mod action_map;
pub mod intent;
pub mod keybindings;
pub mod keyboard;
pub mod mouse;

pub use action_map::{
    Action, ActionResolver, ActionState, InputBinding, InputMap, MouseButtonBinding,
};
pub use intent::{FrameInput, InputState, PointerCommand, TimeScaleCommand};
pub use keybindings::{Conflict, KEYBINDINGS_FILE_NAME, KeybindingError};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
