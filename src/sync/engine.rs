/// Reconciliation engine
///
/// Keeps persisted token records consistent with the pool registry (bonding)
/// and the trade aggregator (ATH). Every pass has the same shape:
///
/// 1. Select candidate mints from the store
/// 2. Chunk them into fixed-size batches
/// 3. Fetch + classify each batch with one oracle call
/// 4. Persist, then pause before the next batch (never after the last)
///
/// Batches inside one pass run strictly sequentially. Concurrent passes are
/// made safe by per-mint locks (held across fetch+persist of a bonding
/// batch) and a per-creator lock for on-demand refreshes.
use super::locks::KeyedLocks;
use super::pacing::{chunk_mints, BatchPacer};
use super::pool_cache::PoolMintCache;
use super::shutdown::ShutdownSignal;
use crate::apis::pool_registry::{BondingStatus, PoolOracle};
use crate::apis::trade_history::{fetch_ath_in_batches, AthOracle};
use crate::config::Config;
use crate::errors::SyncResult;
use crate::logger::{self, LogTag};
use crate::tokens::store::TokenStore;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Engine tuning, decoupled from the global config so tests can build it
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub bonding_batch_size: usize,
    pub bonding_batch_delay: Duration,
    pub ath_batch_size: usize,
    pub ath_batch_delay: Duration,
    pub ath_lookback: chrono::Duration,
    pub reset_unbonded_on_creator_refresh: bool,
}

impl SyncSettings {
    /// Sweep batches never exceed what the oracles accept; the clients treat
    /// an over-cap batch as "no evidence" without touching the network.
    pub fn from_config(config: &Config) -> Self {
        let sync = &config.sync;
        Self {
            bonding_batch_size: clamp_batch_size(
                "bonding_batch_size",
                sync.bonding_batch_size,
                config.pool_oracle.max_batch_size,
            ),
            bonding_batch_delay: Duration::from_millis(sync.bonding_batch_delay_ms),
            ath_batch_size: clamp_batch_size(
                "ath_batch_size",
                sync.ath_batch_size,
                config.ath_oracle.max_batch_size,
            ),
            ath_batch_delay: Duration::from_millis(sync.ath_batch_delay_ms),
            ath_lookback: chrono::Duration::days(sync.ath_lookback_days.max(0)),
            reset_unbonded_on_creator_refresh: sync.reset_unbonded_on_creator_refresh,
        }
    }
}

fn clamp_batch_size(name: &str, requested: usize, oracle_cap: usize) -> usize {
    let cap = oracle_cap.max(1);
    if requested > cap {
        logger::warning(
            LogTag::Sync,
            &format!(
                "sync.{} = {} exceeds the oracle cap of {}; using {}",
                name, requested, cap, cap
            ),
        );
    }
    requested.clamp(1, cap)
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Every unbonded mint of non-blacklisted creators
    FullBonding,
    /// Every mint of one creator, bonded or not
    CreatorBonding,
    /// ATH refresh for every mint of one creator
    CreatorAth,
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepKind::FullBonding => write!(f, "full-bonding"),
            SweepKind::CreatorBonding => write!(f, "creator-bonding"),
            SweepKind::CreatorAth => write!(f, "creator-ath"),
        }
    }
}

/// What one pass did
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub kind: SweepKind,
    pub candidates: usize,
    /// Planned batches (`ceil(candidates / batch_size)`)
    pub batches: usize,
    pub oracle_calls: usize,
    /// Mints the registry reported bonded during this pass
    pub newly_bonded: usize,
    /// Bonded mints persisted together with a pool (and cached)
    pub pool_links: usize,
    /// Bonded mints persisted without pool identity
    pub fallback_bonded: usize,
    /// Mints written back to `bonded = false`
    pub reset_unbonded: usize,
    /// Mints whose stored ATH market cap was raised
    pub ath_updates: usize,
    pub cancelled: bool,
}

impl SweepReport {
    pub fn new(kind: SweepKind) -> Self {
        Self {
            kind,
            candidates: 0,
            batches: 0,
            oracle_calls: 0,
            newly_bonded: 0,
            pool_links: 0,
            fallback_bonded: 0,
            reset_unbonded: 0,
            ath_updates: 0,
            cancelled: false,
        }
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sweep: {} candidates, {}/{} batches, bonded {} (pool {} / fallback {}), reset {}, ath {}{}",
            self.kind,
            self.candidates,
            self.oracle_calls,
            self.batches,
            self.newly_bonded,
            self.pool_links,
            self.fallback_bonded,
            self.reset_unbonded,
            self.ath_updates,
            if self.cancelled { " [cancelled]" } else { "" }
        )
    }
}

/// Outcome of an on-demand refresh for one creator
#[derive(Debug, Clone, PartialEq)]
pub struct CreatorRefreshReport {
    pub creator: String,
    pub bonding: SweepReport,
    pub ath: SweepReport,
}

pub struct ReconciliationEngine {
    store: Arc<dyn TokenStore>,
    pool_oracle: Arc<dyn PoolOracle>,
    ath_oracle: Arc<dyn AthOracle>,
    cache: Arc<PoolMintCache>,
    settings: SyncSettings,
    mint_locks: KeyedLocks,
    creator_locks: KeyedLocks,
}

impl ReconciliationEngine {
    pub fn new(
        store: Arc<dyn TokenStore>,
        pool_oracle: Arc<dyn PoolOracle>,
        ath_oracle: Arc<dyn AthOracle>,
        cache: Arc<PoolMintCache>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            store,
            pool_oracle,
            ath_oracle,
            cache,
            settings,
            mint_locks: KeyedLocks::new(),
            creator_locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<PoolMintCache> {
        &self.cache
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Reconcile every unbonded mint of non-blacklisted creators.
    ///
    /// Previously bonded records are never touched here.
    pub async fn full_bonding_sweep(&self, shutdown: &ShutdownSignal) -> SyncResult<SweepReport> {
        let mints = self.store.select_unbonded_excluding_blacklist().await?;
        logger::info(
            LogTag::Sync,
            &format!("Full bonding sweep started for {} unbonded tokens", mints.len()),
        );
        let report = self
            .bonding_pass(SweepKind::FullBonding, &mints, false, shutdown)
            .await?;
        logger::info(LogTag::Sync, &report.to_string());
        Ok(report)
    }

    /// Reconcile bonding for every mint of `creator`
    pub async fn refresh_creator_bonding(
        &self,
        creator: &str,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<SweepReport> {
        let creator_guard = self.creator_locks.lock(creator).await;
        let mints = self.store.select_all_by_creator(creator).await?;
        let result = self
            .bonding_pass(
                SweepKind::CreatorBonding,
                &mints,
                self.settings.reset_unbonded_on_creator_refresh,
                shutdown,
            )
            .await;
        drop(creator_guard);
        self.creator_locks.prune();
        result
    }

    /// Refresh ATH figures for every mint of `creator`
    pub async fn refresh_creator_ath(
        &self,
        creator: &str,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<SweepReport> {
        let creator_guard = self.creator_locks.lock(creator).await;
        let mints = self.store.select_all_by_creator(creator).await?;
        let result = self.ath_pass(&mints, shutdown).await;
        drop(creator_guard);
        self.creator_locks.prune();
        result
    }

    /// Bonding and ATH refresh for one creator, run side by side.
    ///
    /// The ATH pass only writes ATH columns through a commutative max, so it
    /// needs no mint locks and can overlap the bonding pass safely.
    pub async fn refresh_creator(
        &self,
        creator: &str,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<CreatorRefreshReport> {
        let creator_guard = self.creator_locks.lock(creator).await;
        let result = self.refresh_creator_locked(creator, shutdown).await;
        drop(creator_guard);
        self.creator_locks.prune();
        result
    }

    async fn refresh_creator_locked(
        &self,
        creator: &str,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<CreatorRefreshReport> {
        let mints = self.store.select_all_by_creator(creator).await?;
        logger::info(
            LogTag::Sync,
            &format!("Refreshing creator {} ({} tokens)", creator, mints.len()),
        );

        let (bonding, ath) = tokio::join!(
            self.bonding_pass(
                SweepKind::CreatorBonding,
                &mints,
                self.settings.reset_unbonded_on_creator_refresh,
                shutdown,
            ),
            self.ath_pass(&mints, shutdown)
        );
        let report = CreatorRefreshReport {
            creator: creator.to_string(),
            bonding: bonding?,
            ath: ath?,
        };

        logger::info(LogTag::Sync, &report.bonding.to_string());
        logger::info(LogTag::Sync, &report.ath.to_string());
        Ok(report)
    }

    async fn bonding_pass(
        &self,
        kind: SweepKind,
        mints: &[String],
        reset_unbonded: bool,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<SweepReport> {
        let result = self.bonding_batches(kind, mints, reset_unbonded, shutdown).await;
        self.mint_locks.prune();
        result
    }

    async fn bonding_batches(
        &self,
        kind: SweepKind,
        mints: &[String],
        reset_unbonded: bool,
        shutdown: &ShutdownSignal,
    ) -> SyncResult<SweepReport> {
        let mut report = SweepReport::new(kind);
        report.candidates = mints.len();
        if mints.is_empty() {
            logger::debug(LogTag::Sync, &format!("{} sweep: nothing to reconcile", kind));
            return Ok(report);
        }

        let batches = chunk_mints(mints, self.settings.bonding_batch_size);
        report.batches = batches.len();
        let pacer = BatchPacer::new(self.settings.bonding_batch_delay, shutdown.clone());

        for (index, batch) in batches.iter().enumerate() {
            if shutdown.is_triggered() {
                report.cancelled = true;
                break;
            }

            let guards = self.mint_locks.lock_all(batch).await;
            let status = self.pool_oracle.fetch_bonding_status_batch(batch).await;
            report.oracle_calls += 1;
            self.persist_bonding(batch, &status, reset_unbonded, &mut report)
                .await?;
            drop(guards);

            if !pacer.pause(index, batches.len()).await {
                report.cancelled = index + 1 < batches.len();
                break;
            }
        }

        if report.cancelled {
            logger::warning(
                LogTag::Sync,
                &format!(
                    "{} sweep cancelled after {}/{} batches",
                    kind, report.oracle_calls, report.batches
                ),
            );
        }
        Ok(report)
    }

    async fn persist_bonding(
        &self,
        batch: &[String],
        status: &BondingStatus,
        reset_unbonded: bool,
        report: &mut SweepReport,
    ) -> SyncResult<()> {
        let (bonded, still_unbonded): (Vec<String>, Vec<String>) =
            batch.iter().cloned().partition(|mint| status.is_bonded(mint));
        report.newly_bonded += bonded.len();

        // Each pool link is written on its own so earlier successes survive a later failure
        let mut without_pool = Vec::new();
        for mint in bonded {
            match status.pool_for(&mint) {
                Some(pool) => {
                    self.store.upsert_bonded_with_pool(&mint, pool).await?;
                    self.cache.put(&pool.pool_id, &mint);
                    report.pool_links += 1;
                }
                None => without_pool.push(mint),
            }
        }

        if !without_pool.is_empty() {
            logger::debug(
                LogTag::Sync,
                &format!("{} bonded mints without pool info", without_pool.len()),
            );
            self.store.upsert_bonded(&without_pool, true).await?;
            report.fallback_bonded += without_pool.len();
        }

        // An unanswered batch is no evidence either way
        if reset_unbonded && status.answered && !still_unbonded.is_empty() {
            report.reset_unbonded += self.store.upsert_bonded(&still_unbonded, false).await?;
        }

        Ok(())
    }

    async fn ath_pass(&self, mints: &[String], shutdown: &ShutdownSignal) -> SyncResult<SweepReport> {
        let mut report = SweepReport::new(SweepKind::CreatorAth);
        report.candidates = mints.len();
        if mints.is_empty() {
            return Ok(report);
        }
        report.batches = chunk_mints(mints, self.settings.ath_batch_size).len();

        let since = Utc::now() - self.settings.ath_lookback;
        let pacer = BatchPacer::new(self.settings.ath_batch_delay, shutdown.clone());
        let outcome = fetch_ath_in_batches(
            self.ath_oracle.as_ref(),
            mints,
            since,
            self.settings.ath_batch_size,
            &pacer,
        )
        .await;
        report.oracle_calls = outcome.calls;
        report.cancelled = outcome.cancelled;

        for record in &outcome.records {
            if self.store.upsert_ath(record).await? {
                report.ath_updates += 1;
            }
        }
        Ok(report)
    }
}
