use launchpad_sync::{
    apis::OracleManager,
    arguments::{get_config_path, get_refresh_creator, is_help_requested, is_once_mode, print_help},
    config::{get_config_clone, load_config, load_config_from_path, CONFIG_FILE_PATH},
    logger::{self, LogTag},
    sync::{
        global_pool_cache, LifecycleController, LifecycleOptions, ReconciliationEngine,
        ShutdownSignal, SyncSettings,
    },
    tokens::SqliteTokenStore,
};
use std::sync::Arc;

/// Launchpad reconciliation service
///
/// - default: start the engine, wait for Ctrl-C, stop (with a final sweep)
/// - `--once`: one full bonding sweep, then exit
/// - `--refresh-creator <wallet>`: refresh one creator and print the report
#[tokio::main]
async fn main() {
    logger::init();

    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            logger::error(LogTag::System, &e);
            1
        }
    };

    logger::flush();
    std::process::exit(exit_code);
}

async fn run() -> Result<(), String> {
    match get_config_path() {
        Some(path) => {
            load_config_from_path(&path)?;
            logger::info(LogTag::Config, &format!("Configuration loaded from {}", path));
        }
        None => {
            load_config()?;
            logger::info(
                LogTag::Config,
                &format!("Configuration loaded from {}", CONFIG_FILE_PATH),
            );
        }
    }
    let config = get_config_clone();

    let store = SqliteTokenStore::open(&config.database.path).map_err(|e| e.to_string())?;
    let oracles = OracleManager::from_config(&config)?;
    let engine = Arc::new(ReconciliationEngine::new(
        Arc::new(store),
        oracles.pool_registry,
        oracles.trade_history,
        global_pool_cache(),
        SyncSettings::from_config(&config),
    ));

    if is_once_mode() {
        logger::info(LogTag::System, "Running a single full bonding sweep");
        let report = engine
            .full_bonding_sweep(&ShutdownSignal::new())
            .await
            .map_err(|e| e.to_string())?;
        println!("{}", report);
        return Ok(());
    }

    let controller = LifecycleController::new(engine, LifecycleOptions::from_config(&config.sync));

    if let Some(creator) = get_refresh_creator() {
        return match controller.refresh_creator(&creator).await {
            Ok(Some(report)) => {
                println!("{}", report.bonding);
                println!("{}", report.ath);
                Ok(())
            }
            Ok(None) => {
                println!("Creator {} is not blacklisted; nothing refreshed", creator);
                Ok(())
            }
            Err(e) => Err(format!("Creator refresh failed: {}", e)),
        };
    }

    logger::info(LogTag::System, "launchpad-sync starting");
    controller.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::error(LogTag::System, &format!("Failed to listen for Ctrl-C: {}", e));
    }
    logger::info(LogTag::System, "Shutdown requested");

    controller.stop().await;
    Ok(())
}
