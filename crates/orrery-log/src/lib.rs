//! Structured logging for the orrery.
//!
//! Console output with uptime timestamps and module paths, plus a JSON file
//! log in debug builds. The level comes from `RUST_LOG` when set, otherwise
//! from `debug.log_level` in the configuration.

use orrery_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives appended to every filter so GPU backends stay quiet.
const GPU_NOISE_DIRECTIVES: &str = "wgpu=warn,naga=warn";

/// File written inside the log directory in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether file logging is enabled
/// * `config` - source of the `debug.log_level` override
///
/// ```no_run
/// use orrery_config::Config;
/// use orrery_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directive(config.map(|c| c.debug.log_level.as_str()));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // asset loader threads are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(
            "logging with filter `{filter_str}`, file {}",
            log_dir.join(LOG_FILE_NAME).display()
        );
        return;
    }

    subscriber.init();
    tracing::debug!("logging with filter `{filter_str}`");
}

/// Build the filter string for a configured level.
///
/// An empty or missing level means `info`. A bare level such as `debug` gets
/// the GPU noise directives appended; a string that already carries
/// per-target directives is used verbatim.
pub fn filter_directive(level: Option<&str>) -> String {
    match level.map(str::trim) {
        None | Some("") => format!("info,{GPU_NOISE_DIRECTIVES}"),
        Some(level) if level.contains('=') || level.contains(',') => level.to_string(),
        Some(level) => format!("{level},{GPU_NOISE_DIRECTIVES}"),
    }
}

/// The filter used when nothing is configured.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directive(None))
}
