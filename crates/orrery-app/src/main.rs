//! The `orrery` binary: a first-person flight through a procedurally
//! displaced solar system.
//!
//! Run with: `cargo run -p orrery-app -- --assets path/to/assets`

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use orrery_app::{Orrery, PlatformDirs, system_settings};
use orrery_config::{CliArgs, Config};
use orrery_input::InputMap;
use orrery_scene::{AssetLoader, FsAssetSource, Scene, SolarSystem};
use tracing::{error, info, warn};

/// Background threads decoding textures and models.
const ASSET_WORKERS: usize = 2;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve_with_override(args.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create platform directories: {e}");
    }

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("{e}; using default configuration");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    info!("Orrery starting");
    info!("  config: {}", dirs.config_dir.display());
    info!("  logs:   {}", dirs.log_dir.display());
    info!("  assets: {}", config.scene.asset_root.display());

    let keybindings = InputMap::config_path(&dirs.config_dir);
    let input_map = InputMap::load(&keybindings);
    if !keybindings.exists()
        && let Err(e) = input_map.save(&keybindings)
    {
        warn!("Could not write {}: {e}", keybindings.display());
    }

    let source = Arc::new(FsAssetSource::new(config.scene.asset_root.clone()));
    let scene = Scene::new(AssetLoader::new(source, ASSET_WORKERS));
    let system = SolarSystem::build(scene, &system_settings(&config), &mut rand::rng());
    let orrery = Orrery::from_config(system, &config);

    match orrery_app::run(config, orrery, input_map) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
