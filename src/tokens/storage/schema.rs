// Database schema definitions for the token store
// All CREATE TABLE statements with proper indexes and constraints

/// SQL statements to initialize the database schema
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // One row per launched token; created by discovery, mutated by reconciliation
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        mint TEXT PRIMARY KEY,
        creator TEXT NOT NULL,
        name TEXT,
        symbol TEXT,
        bonded INTEGER NOT NULL DEFAULT 0,
        pool_address TEXT,
        base_mint TEXT,
        quote_mint TEXT,
        ath_price_usd REAL,
        ath_market_cap_usd REAL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tokens_creator ON tokens(creator)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tokens_bonded_created ON tokens(bonded, created_at DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tokens_pool ON tokens(pool_address)
    "#,
    // Creators under active monitoring
    r#"
    CREATE TABLE IF NOT EXISTS blacklisted_creators (
        creator TEXT PRIMARY KEY,
        reason TEXT,
        added_at INTEGER NOT NULL
    )
    "#,
];

/// Pragmas for file-backed databases (set through pragma_update)
pub const PERFORMANCE_PRAGMAS: &[(&str, &str)] = &[
    ("synchronous", "NORMAL"),
    ("temp_store", "memory"),
    ("cache_size", "10000"),
];

/// Busy timeout for lock contention
pub const BUSY_TIMEOUT_MS: u64 = 30_000;
