//! External-truth reconciliation
//!
//! The [`engine`] drives the two oracles against the token store, the
//! [`lifecycle`] controller owns start-up, on-demand and shutdown sweeps,
//! and [`pool_cache`] publishes pool -> mint links to the trade classifier.

pub mod engine;
pub mod lifecycle;
pub mod locks;
pub mod pacing;
pub mod pool_cache;
pub mod shutdown;


pub use engine::{CreatorRefreshReport, ReconciliationEngine, SweepKind, SweepReport, SyncSettings};
pub use lifecycle::{LifecycleController, LifecycleOptions, LifecycleState};
pub use pool_cache::{global_pool_cache, PoolMintCache};
pub use shutdown::ShutdownSignal;
