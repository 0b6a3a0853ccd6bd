use super::config::Config;
use log::LevelFilter;

/// Maps the config `log_level` string to a filter; unknown values turn logging off.
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

/// Initializes `env_logger`. `RUST_LOG` still refines the configured level.
///
/// Returns `false` when a logger was already installed; the first one stays.
pub fn setup_logger(config: &Config) -> bool {
    match env_logger::Builder::new()
        .filter_level(level_from_str(&config.log_level))
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Logger not initialized: {}", err);
            false
        }
    }
}
