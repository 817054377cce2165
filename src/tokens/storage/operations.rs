// Synchronous CRUD operations on the token tables.
//
// Every function takes a plain connection so the async store can run them
// inside spawn_blocking and tests can run them directly.

use crate::tokens::types::{AthRecord, PoolInfo, PoolLink, TokenRecord};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};

const TOKEN_COLUMNS: &str = "mint, creator, name, symbol, bonded, pool_address, base_mint, \
     quote_mint, ath_price_usd, ath_market_cap_usd, created_at, updated_at";

fn to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now)
}

fn parse_token_row(row: &Row) -> SqliteResult<TokenRecord> {
    Ok(TokenRecord {
        mint: row.get(0)?,
        creator: row.get(1)?,
        name: row.get(2)?,
        symbol: row.get(3)?,
        bonded: row.get::<_, i64>(4)? != 0,
        pool_address: row.get(5)?,
        base_mint: row.get(6)?,
        quote_mint: row.get(7)?,
        ath_price_usd: row.get(8)?,
        ath_market_cap_usd: row.get(9)?,
        created_at: to_datetime(row.get(10)?),
        updated_at: to_datetime(row.get(11)?),
    })
}

fn collect_strings(conn: &Connection, sql: &str, param: Option<&str>) -> SqliteResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(param.iter()), |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Insert a token as discovered (ignored if the mint already exists)
pub fn insert_token(conn: &Connection, record: &TokenRecord) -> SqliteResult<bool> {
    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO tokens (
            mint, creator, name, symbol, bonded, pool_address, base_mint, quote_mint,
            ath_price_usd, ath_market_cap_usd, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            record.mint,
            record.creator,
            record.name,
            record.symbol,
            record.bonded as i64,
            record.pool_address,
            record.base_mint,
            record.quote_mint,
            record.ath_price_usd,
            record.ath_market_cap_usd,
            record.created_at.timestamp(),
            record.updated_at.timestamp(),
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get_token(conn: &Connection, mint: &str) -> SqliteResult<Option<TokenRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM tokens WHERE mint = ?1", TOKEN_COLUMNS),
        params![mint],
        parse_token_row,
    )
    .optional()
}

pub fn token_exists(conn: &Connection, mint: &str) -> SqliteResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tokens WHERE mint = ?1)",
        params![mint],
        |row| row.get::<_, i64>(0),
    )
    .map(|v| v != 0)
}

pub fn select_unbonded_excluding_blacklist(conn: &Connection) -> SqliteResult<Vec<String>> {
    collect_strings(
        conn,
        r#"
        SELECT t.mint FROM tokens t
        WHERE t.bonded = 0
          AND t.creator NOT IN (SELECT creator FROM blacklisted_creators)
        ORDER BY t.created_at DESC, t.mint
        "#,
        None,
    )
}

pub fn select_all_by_creator(conn: &Connection, creator: &str) -> SqliteResult<Vec<String>> {
    collect_strings(
        conn,
        "SELECT mint FROM tokens WHERE creator = ?1 ORDER BY created_at DESC, mint",
        Some(creator),
    )
}

/// Set the bonded flag for a list of mints in one transaction
pub fn set_bonded(conn: &mut Connection, mints: &[String], bonded: bool, now: i64) -> SqliteResult<usize> {
    let tx = conn.transaction()?;
    let mut written = 0;
    {
        let mut stmt = tx.prepare("UPDATE tokens SET bonded = ?2, updated_at = ?3 WHERE mint = ?1")?;
        for mint in mints {
            written += stmt.execute(params![mint, bonded as i64, now])?;
        }
    }
    tx.commit()?;
    Ok(written)
}

pub fn set_bonded_with_pool(conn: &Connection, mint: &str, pool: &PoolInfo, now: i64) -> SqliteResult<usize> {
    conn.execute(
        r#"
        UPDATE tokens SET
            bonded = 1,
            pool_address = ?2,
            base_mint = ?3,
            quote_mint = ?4,
            updated_at = ?5
        WHERE mint = ?1
        "#,
        params![mint, pool.pool_id, pool.base_mint, pool.quote_mint, now],
    )
}

/// Keep the highest market cap seen; the price moves together with it.
/// SET expressions read the pre-update row, so both CASEs see the old cap.
/// Returns whether the stored market cap grew; `false` for unknown mints.
pub fn raise_ath(conn: &Connection, record: &AthRecord, now: i64) -> SqliteResult<bool> {
    let previous: Option<Option<f64>> = conn
        .query_row(
            "SELECT ath_market_cap_usd FROM tokens WHERE mint = ?1",
            params![record.mint],
            |row| row.get(0),
        )
        .optional()?;
    let previous = match previous {
        Some(previous) => previous,
        None => return Ok(false),
    };

    conn.execute(
        r#"
        UPDATE tokens SET
            ath_price_usd = CASE
                WHEN ath_market_cap_usd IS NULL OR ?3 > ath_market_cap_usd THEN ?2
                ELSE ath_price_usd END,
            ath_market_cap_usd = CASE
                WHEN ath_market_cap_usd IS NULL OR ?3 > ath_market_cap_usd THEN ?3
                ELSE ath_market_cap_usd END,
            name = COALESCE(name, ?4),
            symbol = COALESCE(symbol, ?5),
            updated_at = ?6
        WHERE mint = ?1
        "#,
        params![
            record.mint,
            record.ath_price_usd,
            record.ath_market_cap_usd,
            record.name,
            record.symbol,
            now
        ],
    )?;

    Ok(previous.map_or(true, |cap| record.ath_market_cap_usd > cap))
}

pub fn select_pool_links(conn: &Connection) -> SqliteResult<Vec<PoolLink>> {
    let mut stmt = conn.prepare(
        "SELECT pool_address, mint FROM tokens WHERE bonded = 1 AND pool_address IS NOT NULL",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PoolLink {
            pool_id: row.get(0)?,
            mint: row.get(1)?,
        })
    })?;
    rows.collect()
}

// ===================== CREATOR BLACKLIST OPS =====================

pub fn add_blacklisted_creator(conn: &Connection, creator: &str, reason: Option<&str>, now: i64) -> SqliteResult<()> {
    conn.execute(
        r#"
        INSERT INTO blacklisted_creators (creator, reason, added_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(creator) DO UPDATE SET
            reason = COALESCE(?2, reason)
        "#,
        params![creator, reason, now],
    )?;
    Ok(())
}

pub fn is_creator_blacklisted(conn: &Connection, creator: &str) -> SqliteResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM blacklisted_creators WHERE creator = ?1)",
        params![creator],
        |row| row.get::<_, i64>(0),
    )
    .map(|v| v != 0)
}
