//! OS directory resolution for config and log files.

use std::path::{Path, PathBuf};
use std::{fmt, io};

const APP_NAME: &str = "orrery";

/// Errors that can occur while resolving or creating directories.
#[derive(Debug)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    NoConfigDir,
    /// Directory creation failed.
    Io(io::Error),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfigDir => write!(f, "could not determine OS configuration directory"),
            Self::Io(e) => write!(f, "platform I/O error: {e}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NoConfigDir => None,
        }
    }
}

impl From<io::Error> for PlatformError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Where the orrery keeps `config.ron`, `keybindings.ron` and its logs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve the OS-conventional directories (XDG, Known Folders, Library)
    /// without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);

        let data_dir = dirs::data_dir()
            .map_or_else(|| app_config.join("data"), |dir| dir.join(APP_NAME));

        Ok(Self {
            config_dir: app_config.clone(),
            data_dir,
            log_dir: app_config.join("logs"),
        })
    }

    /// Resolve the defaults, then replace the config directory when the user
    /// named one. Logs follow an overridden config directory.
    ///
    /// # Errors
    ///
    /// Fails only when no override is given and resolution fails.
    pub fn resolve_with_override(config_dir: Option<&Path>) -> Result<Self, PlatformError> {
        match config_dir {
            Some(dir) => Ok(Self {
                config_dir: dir.to_path_buf(),
                data_dir: dir.join("data"),
                log_dir: dir.join("logs"),
            }),
            None => Self::resolve(),
        }
    }

    /// Directories rooted under `root`, for tests.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            data_dir: app_dir.join("data"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Create every directory on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_absolute() {
        let dirs = PlatformDirs::resolve().expect("PlatformDirs::resolve() failed");
        assert!(dirs.config_dir.is_absolute(), "config_dir is not absolute");
        assert!(dirs.data_dir.is_absolute(), "data_dir is not absolute");
        assert!(dirs.log_dir.starts_with(&dirs.config_dir));
        assert!(dirs.config_dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_override_replaces_config_and_logs() {
        let dirs = PlatformDirs::resolve_with_override(Some(Path::new("/tmp/orrery-cfg")))
            .expect("override never fails");
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/orrery-cfg"));
        assert_eq!(dirs.log_dir, PathBuf::from("/tmp/orrery-cfg/logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().expect("create_dirs failed");
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.data_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PlatformError::NoConfigDir.to_string(),
            "could not determine OS configuration directory"
        );
        let io = PlatformError::from(io::Error::other("disk full"));
        assert!(io.to_string().contains("disk full"));
        assert!(std::error::Error::source(&io).is_some());
    }
}
