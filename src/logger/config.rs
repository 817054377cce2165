/// Logger configuration derived from command-line flags
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{get_cmd_args, has_arg};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped (Debug/Verbose have extra gates)
    pub min_level: LogLevel,
    /// Tags with --debug-<tag>
    pub debug_tags: HashSet<String>,
    /// Tags with --verbose-<tag>
    pub verbose_tags: HashSet<String>,
    /// Restrict output to these tags (empty = all)
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the logger configuration from the global argument store
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    if has_arg("--verbose") {
        config.min_level = LogLevel::Verbose;
    } else if has_arg("--quiet") {
        config.min_level = LogLevel::Warning;
    }

    for tag in LogTag::all() {
        let key = tag.to_debug_key();
        if has_arg(&format!("--debug-{}", key)) {
            config.debug_tags.insert(key.clone());
            if config.min_level < LogLevel::Debug {
                config.min_level = LogLevel::Debug;
            }
        }
        if has_arg(&format!("--verbose-{}", key)) {
            config.verbose_tags.insert(key);
            config.min_level = LogLevel::Verbose;
        }
    }

    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == "--log-only" {
            if let Some(list) = args.get(i + 1) {
                config.enabled_tags = list
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }
    }

    set_logger_config(config);
}

pub(crate) fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().debug_tags.contains(&tag.to_debug_key())
}

pub(crate) fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().verbose_tags.contains(&tag.to_debug_key())
}
