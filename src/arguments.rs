/// Centralized argument handling for the sync service
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Flag and value lookups shared by the logger and the binary
/// - Mode flags for the binary (--once, --refresh-creator, --help)
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// MODE FLAGS
// =============================================================================

/// Help requested
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Run one full bonding sweep and exit
pub fn is_once_mode() -> bool {
    has_arg("--once")
}

/// Creator wallet for a one-shot per-creator refresh
pub fn get_refresh_creator() -> Option<String> {
    get_arg_value("--refresh-creator").filter(|v| !v.starts_with("--"))
}

/// Config file override
pub fn get_config_path() -> Option<String> {
    get_arg_value("--config").filter(|v| !v.starts_with("--"))
}

pub fn print_help() {
    println!("launchpad-sync - reconciles launchpad tokens with on-chain oracles");
    println!();
    println!("USAGE:");
    println!("    launchpad-sync [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>              Config file (default: data/config.toml)");
    println!("    --once                       Run one full bonding sweep and exit");
    println!("    --refresh-creator <wallet>   Refresh all tokens of a blacklisted creator");
    println!("    --quiet                      Only show warnings and errors");
    println!("    --verbose                    Show verbose logs for every module");
    println!("    --debug-<module>             Debug logs for sync, pool-oracle, ath-oracle,");
    println!("                                 store, cache, lifecycle, config, system");
    println!("    --log-only <tags>            Comma separated list of tags to display");
    println!("    -h, --help                   Print this help");
}
