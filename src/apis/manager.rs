/// Oracle client set built once from configuration
///
/// The engine only sees the `PoolOracle` / `AthOracle` traits; this is the
/// one place that picks the concrete HTTP clients.
use std::sync::Arc;

use crate::config::Config;
use crate::logger::{self, LogTag};

use super::pool_registry::{PoolOracle, ShyftPoolRegistry};
use super::trade_history::{AthOracle, BitqueryTradeHistory};

pub struct OracleManager {
    pub pool_registry: Arc<dyn PoolOracle>,
    pub trade_history: Arc<dyn AthOracle>,
}

impl OracleManager {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let pool_cfg = config.pool_oracle.clone();
        let ath_cfg = config.ath_oracle.clone();

        if pool_cfg.api_key.trim().is_empty() {
            logger::warning(
                LogTag::PoolOracle,
                "pool_oracle.api_key is empty - bonding sweeps will find no evidence",
            );
        }
        if ath_cfg.access_token.trim().is_empty() {
            logger::warning(
                LogTag::AthOracle,
                "ath_oracle.access_token is empty - ATH refreshes will be skipped",
            );
        }

        let pool_registry = ShyftPoolRegistry::new(pool_cfg)
            .map_err(|e| format!("Failed to initialize pool registry client: {}", e))?;
        let trade_history = BitqueryTradeHistory::new(ath_cfg)
            .map_err(|e| format!("Failed to initialize trade history client: {}", e))?;

        Ok(Self {
            pool_registry: Arc::new(pool_registry),
            trade_history: Arc::new(trade_history),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_defaults() {
        assert!(OracleManager::from_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.ath_oracle.timeout_seconds = 0;
        let err = OracleManager::from_config(&config).err().unwrap();
        assert!(err.contains("trade history"));
    }
}
