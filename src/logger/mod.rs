//! Structured logging for the launchpad sync service
//!
//! Thin, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Dual output: colored console + file persistence
//!
//! ## Usage
//!
//! ```rust
//! use launchpad_sync::logger::{self, LogTag};
//!
//! logger::error(LogTag::Store, "Failed to persist pool link");
//! logger::info(LogTag::Sync, "Full sweep finished");
//! logger::debug(LogTag::PoolOracle, "Batch of 50 mints"); // Only if --debug-pool-oracle
//! logger::verbose(LogTag::AthOracle, "Raw response ..."); // Only if --verbose
//! ```
//!
//! Call [`init`] once at startup, before any logging occurs. Without it the
//! logger still prints to the console with default filtering, which is what
//! unit tests rely on.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// 1. Parse command-line arguments for debug flags
/// 2. Initialize file logging under `logs/`
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless --quiet raises the threshold)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when the matching `--debug-<module>` flag was passed.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level
///
/// Only shown with `--verbose` or `--verbose-<module>`.
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
