/// External data oracles
///
/// - `pool_registry`: AMM pool registry, reveals bonded tokens
/// - `trade_history`: trade aggregation, estimates ATH market cap
/// - `client`: shared HTTP + GraphQL plumbing and rate limiting
pub mod client;
pub mod manager;
pub mod pool_registry;
pub mod trade_history;

pub use manager::OracleManager;
pub use pool_registry::{BondingStatus, PoolOracle, ShyftPoolRegistry};
pub use trade_history::{fetch_ath_in_batches, AthBatchOutcome, AthOracle, BitqueryTradeHistory};
