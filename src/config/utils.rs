/// Configuration utilities - loading and access helpers
///
/// - Loading configuration from disk
/// - Thread-safe access helpers
use super::schemas::Config;
use once_cell::sync::OnceCell;
use std::sync::RwLock;

/// Global configuration instance
///
/// This is the single source of truth for all configuration values.
/// Access it using the helper functions below.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from the default path
pub fn load_config() -> Result<(), String> {
    load_config_from_path(CONFIG_FILE_PATH)
}

/// Parse a configuration file, falling back to defaults when it is missing
pub fn read_config_file(path: &str) -> Result<Config, String> {
    if !std::path::Path::new(path).exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
}

/// Load configuration from a specific file path and initialize the global CONFIG
///
/// If the config file doesn't exist, default values from the schema
/// definitions are used.
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = read_config_file(path)?;

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(())
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when the global config was never loaded.
///
/// # Example
/// ```
/// use launchpad_sync::config::with_config;
///
/// let batch_size = with_config(|cfg| cfg.sync.bonding_batch_size);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => match lock.read() {
            Ok(config) => f(&config),
            Err(poisoned) => f(&poisoned.into_inner()),
        },
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
///
/// Useful when config values must be held across await points.
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}
