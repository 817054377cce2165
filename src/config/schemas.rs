//! Configuration schemas - all config structures defined once with defaults
//!
//! Each struct is defined using the config_struct! macro which provides:
//! - Single-source definition (no repetition)
//! - Embedded defaults
//! - Serde support

// ============================================================================
// POOL REGISTRY ORACLE
// ============================================================================

config_struct! {
    /// AMM pool registry (GraphQL) used to detect bonded tokens
    pub struct PoolOracleConfig {
        /// GraphQL endpoint; `api_key` and `network` are appended as query parameters
        endpoint: String = "https://programs.shyft.to/v0/graphql/".to_string(),
        network: String = "mainnet-beta".to_string(),
        /// Empty key disables the oracle (every lookup yields no evidence)
        api_key: String = String::new(),
        /// Name of the pool collection in the GraphQL schema
        pool_collection: String = "pump_fun_amm_Pool".to_string(),
        timeout_seconds: u64 = 15,
        /// Hard cap on mints per request; callers pre-chunk
        max_batch_size: usize = 50,
    }
}

// ============================================================================
// TRADE HISTORY (ATH) ORACLE
// ============================================================================

config_struct! {
    /// Trade aggregation service used to estimate all-time-high market cap
    pub struct AthOracleConfig {
        endpoint: String = "https://streaming.bitquery.io/eap".to_string(),
        /// Bearer token; empty disables the oracle
        access_token: String = String::new(),
        timeout_seconds: u64 = 20,
        max_batch_size: usize = 50,
        /// Price quantile used as the ATH estimator (0.98 = 98th percentile)
        quantile_level: f64 = 0.98,
        /// Fixed total supply used to turn a price into a market cap
        total_supply: f64 = 1_000_000_000.0,
    }
}

// ============================================================================
// RECONCILIATION
// ============================================================================

config_struct! {
    /// Reconciliation engine tuning
    pub struct SyncConfig {
        bonding_batch_size: usize = 50,
        bonding_batch_delay_ms: u64 = 500,
        ath_batch_size: usize = 50,
        ath_batch_delay_ms: u64 = 1000,
        /// ATH trades are considered from now minus this many days
        ath_lookback_days: i64 = 30,
        /// Per-creator refresh writes bonded=false for mints the oracle no longer reports
        reset_unbonded_on_creator_refresh: bool = true,
        /// Load persisted pool links into the mapping cache on start
        warm_pool_cache_on_start: bool = true,
        /// Upper bound for the final sweep run by stop()
        final_sweep_timeout_secs: u64 = 120,
    }
}

// ============================================================================
// DATABASE
// ============================================================================

config_struct! {
    pub struct DatabaseConfig {
        path: String = "data/tokens.db".to_string(),
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        pool_oracle: PoolOracleConfig = PoolOracleConfig::default(),
        ath_oracle: AthOracleConfig = AthOracleConfig::default(),
        sync: SyncConfig = SyncConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
    }
}
