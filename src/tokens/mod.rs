/// Token records and their persistence
///
/// `types` carries the data shapes shared with the oracle clients, `store`
/// the async contract consumed by the reconciliation engine and `storage`
/// the SQLite implementation.
pub mod storage;
pub mod store;
pub mod types;

pub use storage::SqliteTokenStore;
pub use store::TokenStore;
pub use types::{AthRecord, PoolInfo, PoolLink, TokenRecord};
