/// Core token data structures shared by the store, the oracle clients and
/// the reconciliation engine
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One launched token as persisted by the token store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub mint: String,
    pub creator: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Migrated off the bonding curve into an AMM pool
    pub bonded: bool,
    pub pool_address: Option<String>,
    pub base_mint: Option<String>,
    pub quote_mint: Option<String>,
    pub ath_price_usd: Option<f64>,
    pub ath_market_cap_usd: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Fresh record as created by discovery: unbonded, no pool, no ATH
    pub fn new(mint: impl Into<String>, creator: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            mint: mint.into(),
            creator: creator.into(),
            name: None,
            symbol: None,
            bonded: false,
            pool_address: None,
            base_mint: None,
            quote_mint: None,
            ath_price_usd: None,
            ath_market_cap_usd: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn has_pool_link(&self) -> bool {
        self.pool_address.is_some()
    }
}

/// AMM pool identity as reported by the pool registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pool_id: String,
    pub base_mint: String,
    pub quote_mint: String,
}

/// Persisted pool address -> mint pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolLink {
    pub pool_id: String,
    pub mint: String,
}

/// All-time-high estimate for one mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthRecord {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Quantile price proxy, not the literal maximum trade price
    pub ath_price_usd: f64,
    /// `ath_price_usd` times the fixed total supply
    pub ath_market_cap_usd: f64,
}
