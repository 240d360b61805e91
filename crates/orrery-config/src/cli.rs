//! Command-line argument parsing for the `orrery` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Fly through a procedurally displaced solar system")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Directory containing `media/` and `models/`.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Number of asteroids in the belt.
    #[arg(long)]
    pub asteroids: Option<u32>,

    /// Initial time scale (negative runs the system backwards).
    #[arg(long, allow_hyphen_values = true)]
    pub time_scale: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(ref root) = args.assets {
            self.scene.asset_root = root.clone();
        }
        if let Some(count) = args.asteroids {
            self.scene.asteroid_count = count;
        }
        if let Some(scale) = args.time_scale {
            self.scene.time_scale = scale;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
