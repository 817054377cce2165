/// Lifecycle controller for the reconciliation engine
///
/// `Uninitialized -> Initializing -> Ready -> Stopping -> Uninitialized`
///
/// - `start` dispatches the initial full sweep without blocking the caller
/// - `refresh_creator` is the synchronous hook used before creator stats are computed
/// - `stop` aborts the in-flight sweep between batches, then runs one final sweep
use super::engine::{CreatorRefreshReport, ReconciliationEngine};
use super::shutdown::ShutdownSignal;
use crate::config::SyncConfig;
use crate::errors::SyncResult;
use crate::logger::{self, LogTag};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Stopping,
}

#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    pub warm_pool_cache_on_start: bool,
    pub final_sweep_timeout: Duration,
}

impl LifecycleOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            warm_pool_cache_on_start: config.warm_pool_cache_on_start,
            final_sweep_timeout: Duration::from_secs(config.final_sweep_timeout_secs),
        }
    }
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

pub struct LifecycleController {
    engine: Arc<ReconciliationEngine>,
    options: LifecycleOptions,
    state: Arc<Mutex<LifecycleState>>,
    shutdown: Mutex<ShutdownSignal>,
    initial_sweep: Mutex<Option<JoinHandle<()>>>,
}

impl LifecycleController {
    pub fn new(engine: Arc<ReconciliationEngine>, options: LifecycleOptions) -> Self {
        Self {
            engine,
            options,
            state: Arc::new(Mutex::new(LifecycleState::Uninitialized)),
            shutdown: Mutex::new(ShutdownSignal::new()),
            initial_sweep: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        &self.engine
    }

    /// Dispatch the initial sweep. Returns `false` if already started.
    pub fn start(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state != LifecycleState::Uninitialized {
                logger::debug(
                    LogTag::Lifecycle,
                    &format!("start() ignored, controller is {:?}", *state),
                );
                return false;
            }
            *state = LifecycleState::Initializing;
        }

        let shutdown = ShutdownSignal::new();
        *self.shutdown.lock() = shutdown.clone();

        let engine = self.engine.clone();
        let state = self.state.clone();
        let warm_cache = self.options.warm_pool_cache_on_start;

        let handle = tokio::spawn(async move {
            if warm_cache {
                match engine.store().select_pool_links().await {
                    Ok(links) => {
                        engine.cache().warm(&links);
                    }
                    Err(e) => logger::error(
                        LogTag::Lifecycle,
                        &format!("Pool cache warm-up failed: {}", e),
                    ),
                }
            }

            if let Err(e) = engine.full_bonding_sweep(&shutdown).await {
                logger::error(
                    LogTag::Lifecycle,
                    &format!("Initial bonding sweep failed: {}", e),
                );
            }

            let mut state = state.lock();
            if *state == LifecycleState::Initializing {
                *state = LifecycleState::Ready;
                logger::info(LogTag::Lifecycle, "Reconciliation ready");
            }
        });
        *self.initial_sweep.lock() = Some(handle);

        logger::info(LogTag::Lifecycle, "Reconciliation starting (initial sweep dispatched)");
        true
    }

    /// Best-effort refresh for a blacklisted creator.
    ///
    /// `Ok(None)` when the creator is not blacklisted. Store failures are
    /// logged and returned so the caller can degrade its response.
    pub async fn refresh_creator(&self, creator: &str) -> SyncResult<Option<CreatorRefreshReport>> {
        let blacklisted = match self.engine.store().is_creator_blacklisted(creator).await {
            Ok(blacklisted) => blacklisted,
            Err(e) => {
                logger::error(
                    LogTag::Lifecycle,
                    &format!("Blacklist lookup for {} failed: {}", creator, e),
                );
                return Err(e);
            }
        };
        if !blacklisted {
            logger::debug(
                LogTag::Lifecycle,
                &format!("Creator {} not blacklisted, no refresh", creator),
            );
            return Ok(None);
        }

        let shutdown = self.shutdown.lock().clone();
        match self.engine.refresh_creator(creator, &shutdown).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                logger::error(
                    LogTag::Lifecycle,
                    &format!("Creator refresh for {} failed: {}", creator, e),
                );
                Err(e)
            }
        }
    }

    /// Abort the in-flight sweep, run one final sweep and reset.
    /// Returns `false` if there was nothing to stop.
    pub async fn stop(&self) -> bool {
        {
            let mut state = self.state.lock();
            match *state {
                LifecycleState::Uninitialized | LifecycleState::Stopping => return false,
                _ => *state = LifecycleState::Stopping,
            }
        }
        logger::info(LogTag::Lifecycle, "Reconciliation stopping");

        self.shutdown.lock().trigger();
        let initial = self.initial_sweep.lock().take();
        if let Some(handle) = initial {
            if let Err(e) = handle.await {
                logger::error(
                    LogTag::Lifecycle,
                    &format!("Initial sweep task ended abnormally: {}", e),
                );
            }
        }

        let final_signal = ShutdownSignal::new();
        match tokio::time::timeout(
            self.options.final_sweep_timeout,
            self.engine.full_bonding_sweep(&final_signal),
        )
        .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => logger::error(
                LogTag::Lifecycle,
                &format!("Final bonding sweep failed: {}", e),
            ),
            Err(_) => logger::warning(
                LogTag::Lifecycle,
                &format!(
                    "Final bonding sweep exceeded {}s, abandoned",
                    self.options.final_sweep_timeout.as_secs()
                ),
            ),
        }

        *self.shutdown.lock() = ShutdownSignal::new();
        *self.state.lock() = LifecycleState::Uninitialized;
        logger::info(LogTag::Lifecycle, "Reconciliation stopped");
        true
    }
}
