//! Keybinding persistence and conflict detection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::action_map::{Action, InputBinding, InputMap};

/// File name of the binding table inside the config directory.
pub const KEYBINDINGS_FILE_NAME: &str = "keybindings.ron";

/// Errors from saving or loading a binding table.
#[derive(Debug, thiserror::Error)]
pub enum KeybindingError {
    #[error("keybinding file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize keybindings: {0}")]
    Serialize(#[from] ron::Error),
    #[error("malformed keybinding file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// One binding claimed by more than one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub binding: InputBinding,
    /// Sorted for stable reporting.
    pub actions: Vec<Action>,
}

impl InputMap {
    /// Every binding used by two or more actions.
    #[must_use]
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut owners: HashMap<InputBinding, Vec<Action>> = HashMap::new();
        for (action, bindings) in &self.bindings {
            for binding in bindings {
                owners.entry(*binding).or_default().push(*action);
            }
        }

        owners
            .into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(binding, mut actions)| {
                actions.sort();
                Conflict { binding, actions }
            })
            .collect()
    }

    /// Write the map to `path` as RON, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), KeybindingError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Read a map from `path`.
    ///
    /// # Errors
    /// Returns an error if the file is unreadable or malformed.
    pub fn try_load(path: &Path) -> Result<Self, KeybindingError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_ron(&contents)?)
    }

    /// Read a map from `path`, falling back to the defaults with a warning.
    /// Conflicting bindings are reported but kept.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let map = match Self::try_load(path) {
            Ok(map) => map,
            Err(KeybindingError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(e) => {
                warn!("{}: {e}; using default keybindings", path.display());
                return Self::default();
            }
        };

        for conflict in map.detect_conflicts() {
            warn!(
                "{:?} is bound to several actions: {:?}",
                conflict.binding, conflict.actions
            );
        }
        map
    }

    /// `keybindings.ron` inside `config_dir`.
    #[must_use]
    pub fn config_path(config_dir: &Path) -> PathBuf {
        config_dir.join(KEYBINDINGS_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_default_map_has_no_conflicts() {
        assert!(InputMap::default().detect_conflicts().is_empty());
    }

    #[test]
    fn test_shared_key_is_reported() {
        let mut map = InputMap::default();
        map.set_bindings(Action::MoveUp, vec![InputBinding::Key(KeyCode::KeyW)]);
        let conflicts = map.detect_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].binding, InputBinding::Key(KeyCode::KeyW));
        assert_eq!(
            conflicts[0].actions,
            vec![Action::MoveForward, Action::MoveUp]
        );
    }

    #[test]
    fn test_save_then_load_keeps_rebinding() {
        let dir = tempfile::tempdir().unwrap();
        let path = InputMap::config_path(&dir.path().join("cfg"));

        let mut map = InputMap::default();
        map.set_bindings(Action::TimeScaleUp, vec![InputBinding::Key(KeyCode::Equal)]);
        map.save(&path).unwrap();

        assert_eq!(InputMap::load(&path), map);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEYBINDINGS_FILE_NAME);
        std::fs::write(&path, "(bindings: {{{").unwrap();

        assert!(matches!(
            InputMap::try_load(&path),
            Err(KeybindingError::Parse(_))
        ));
        assert_eq!(InputMap::load(&path), InputMap::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ron");
        assert_eq!(InputMap::load(&path), InputMap::default());
    }
}
