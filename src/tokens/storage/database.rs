// SQLite-backed token store
use super::operations;
use super::schema::{BUSY_TIMEOUT_MS, PERFORMANCE_PRAGMAS, SCHEMA_STATEMENTS};
use crate::errors::{SyncError, SyncResult};
use crate::logger::{self, LogTag};
use crate::tokens::store::TokenStore;
use crate::tokens::types::{AthRecord, PoolInfo, PoolLink, TokenRecord};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// SQLite database for token records and the creator blacklist
#[derive(Clone)]
pub struct SqliteTokenStore {
    connection: Arc<Mutex<Connection>>,
}

/// Configure a file-backed connection for concurrent readers
fn configure_database_connection(connection: &Connection) -> rusqlite::Result<()> {
    // journal_mode returns the resulting mode as a row
    let mode: String =
        connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        logger::warning(
            LogTag::Store,
            &format!("SQLite refused WAL journal mode, running in '{}'", mode),
        );
    }
    for (pragma, value) in PERFORMANCE_PRAGMAS {
        connection.pragma_update(None, pragma, value)?;
    }
    connection.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(())
}

fn apply_schema(connection: &Connection) -> rusqlite::Result<()> {
    for statement in SCHEMA_STATEMENTS {
        connection.execute(statement, [])?;
    }
    Ok(())
}

impl SqliteTokenStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: &str) -> SyncResult<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SyncError::store(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let connection = Connection::open(path)?;
        configure_database_connection(&connection)?;
        apply_schema(&connection)?;

        logger::info(LogTag::Store, &format!("Token database ready at {}", path));

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> SyncResult<Self> {
        let connection = Connection::open_in_memory()?;
        apply_schema(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn with_sync<F, T>(&self, op: F) -> SyncResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut conn = self
            .connection
            .lock()
            .map_err(|e| SyncError::store(format!("Database lock error: {}", e)))?;
        op(&mut *conn).map_err(SyncError::from)
    }

    /// Run a blocking operation off the async runtime
    async fn with_connection<F, T>(&self, op: F) -> SyncResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.with_sync(op)).await?
    }

    // =========================================================================
    // Synchronous helpers for discovery and administration
    // =========================================================================

    /// Insert a newly discovered token; returns false if the mint already exists
    pub fn insert_token(&self, record: &TokenRecord) -> SyncResult<bool> {
        self.with_sync(|conn| operations::insert_token(conn, record))
    }

    pub fn get_token(&self, mint: &str) -> SyncResult<Option<TokenRecord>> {
        self.with_sync(|conn| operations::get_token(conn, mint))
    }

    pub fn add_blacklisted_creator(&self, creator: &str, reason: Option<&str>) -> SyncResult<()> {
        let now = Utc::now().timestamp();
        self.with_sync(|conn| operations::add_blacklisted_creator(conn, creator, reason, now))
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn select_unbonded_excluding_blacklist(&self) -> SyncResult<Vec<String>> {
        self.with_connection(|conn| operations::select_unbonded_excluding_blacklist(conn))
            .await
    }

    async fn select_all_by_creator(&self, creator: &str) -> SyncResult<Vec<String>> {
        let creator = creator.to_string();
        self.with_connection(move |conn| operations::select_all_by_creator(conn, &creator))
            .await
    }

    async fn upsert_bonded(&self, mints: &[String], bonded: bool) -> SyncResult<usize> {
        if mints.is_empty() {
            return Ok(0);
        }
        let mints = mints.to_vec();
        let now = Utc::now().timestamp();
        let written = self
            .with_connection(move |conn| operations::set_bonded(conn, &mints, bonded, now))
            .await?;

        logger::debug(
            LogTag::Store,
            &format!("Wrote bonded={} for {} tokens", bonded, written),
        );
        Ok(written)
    }

    async fn upsert_bonded_with_pool(&self, mint: &str, pool: &PoolInfo) -> SyncResult<()> {
        let mint = mint.to_string();
        let pool = pool.clone();
        let now = Utc::now().timestamp();
        let written = self
            .with_connection(move |conn| {
                operations::set_bonded_with_pool(conn, &mint, &pool, now)
            })
            .await?;

        if written == 0 {
            logger::warning(
                LogTag::Store,
                "Pool link write matched no token row (mint not tracked)",
            );
        }
        Ok(())
    }

    async fn upsert_ath(&self, record: &AthRecord) -> SyncResult<bool> {
        let record = record.clone();
        let now = Utc::now().timestamp();
        self.with_connection(move |conn| operations::raise_ath(conn, &record, now))
            .await
    }

    async fn is_creator_blacklisted(&self, creator: &str) -> SyncResult<bool> {
        let creator = creator.to_string();
        self.with_connection(move |conn| operations::is_creator_blacklisted(conn, &creator))
            .await
    }

    async fn token_exists(&self, mint: &str) -> SyncResult<bool> {
        let mint = mint.to_string();
        self.with_connection(move |conn| operations::token_exists(conn, &mint))
            .await
    }

    async fn select_pool_links(&self) -> SyncResult<Vec<PoolLink>> {
        self.with_connection(|conn| operations::select_pool_links(conn))
            .await
    }
}
