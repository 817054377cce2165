/// Token store contract consumed by the reconciliation engine
///
/// All writes are idempotent under retry: writing the same target state for
/// the same mint twice leaves one row with the same linkage and a refreshed
/// `updated_at`.
use crate::errors::SyncResult;
use crate::tokens::types::{AthRecord, PoolInfo, PoolLink};
use async_trait::async_trait;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Unbonded mints whose creator is not blacklisted, newest first
    async fn select_unbonded_excluding_blacklist(&self) -> SyncResult<Vec<String>>;

    /// Every mint launched by `creator`, bonded or not, newest first
    async fn select_all_by_creator(&self, creator: &str) -> SyncResult<Vec<String>>;

    /// Set the bonded flag for each mint, leaving pool columns untouched.
    /// Returns the number of rows written.
    async fn upsert_bonded(&self, mints: &[String], bonded: bool) -> SyncResult<usize>;

    /// Mark one mint bonded together with its pool identity
    async fn upsert_bonded_with_pool(&self, mint: &str, pool: &PoolInfo) -> SyncResult<()>;

    /// Record an ATH estimate. The stored market cap only ever grows; returns
    /// `true` only when this estimate raised it.
    async fn upsert_ath(&self, record: &AthRecord) -> SyncResult<bool>;

    async fn is_creator_blacklisted(&self, creator: &str) -> SyncResult<bool>;

    async fn token_exists(&self, mint: &str) -> SyncResult<bool>;

    /// Pool links of bonded tokens, used to warm the pool -> mint cache
    async fn select_pool_links(&self) -> SyncResult<Vec<PoolLink>>;
}
