/// Log tags identify the subsystem a message comes from.
///
/// Each tag maps to a `--debug-<key>` / `--verbose-<key>` command-line flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Sync,
    PoolOracle,
    AthOracle,
    Store,
    Cache,
    Lifecycle,
    Other(String),
}

impl LogTag {
    /// Key used by debug flags, e.g. `--debug-pool-oracle`
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Sync => "sync".to_string(),
            LogTag::PoolOracle => "pool-oracle".to_string(),
            LogTag::AthOracle => "ath-oracle".to_string(),
            LogTag::Store => "store".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Lifecycle => "lifecycle".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Uncolored label used in log files
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Sync => "SYNC".to_string(),
            LogTag::PoolOracle => "POOLORCL".to_string(),
            LogTag::AthOracle => "ATHORCL".to_string(),
            LogTag::Store => "STORE".to_string(),
            LogTag::Cache => "CACHE".to_string(),
            LogTag::Lifecycle => "LIFECYCLE".to_string(),
            LogTag::Other(s) => s.to_uppercase(),
        }
    }

    /// All tags that can be toggled from the command line
    pub fn all() -> Vec<LogTag> {
        vec![
            LogTag::System,
            LogTag::Config,
            LogTag::Sync,
            LogTag::PoolOracle,
            LogTag::AthOracle,
            LogTag::Store,
            LogTag::Cache,
            LogTag::Lifecycle,
        ]
    }
}
