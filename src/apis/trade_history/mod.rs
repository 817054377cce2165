/// Trade aggregation client estimating all-time-high market caps
///
/// The ATH is the configured price quantile (98th percentile by default)
/// of trades since a reference time, times the fixed launchpad supply. The
/// literal maximum is avoided because single outlier or self trades distort it.
/// Failures never surface: they are logged and yield an empty list.
pub mod types;

pub use self::types::{parse_price, rows_to_ath_records, TradeAggregateRow};

use crate::apis::client::{GraphQlRequest, HttpClient, RateLimiter};
use crate::config::AthOracleConfig;
use crate::logger::{self, LogTag};
use crate::sync::pacing::{chunk_mints, BatchPacer};
use crate::tokens::types::AthRecord;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Aggregator requests per minute
pub const RATE_LIMIT_PER_MINUTE: usize = 60;

const OPERATION_NAME: &str = "AthByTokens";

#[async_trait]
pub trait AthOracle: Send + Sync {
    async fn fetch_ath_market_cap(&self, mints: &[String], since: DateTime<Utc>) -> Vec<AthRecord>;
}

pub struct BitqueryTradeHistory {
    http: HttpClient,
    limiter: RateLimiter,
    config: AthOracleConfig,
    query: String,
}

fn build_query(quantile_level: f64, total_supply: f64) -> String {
    format!(
        r#"query {op}($tokens: [String!], $since: DateTime) {{
  Solana(dataset: combined) {{
    DEXTradeByTokens(
      where: {{
        Trade: {{ Currency: {{ MintAddress: {{ in: $tokens }} }} }}
        Block: {{ Time: {{ since: $since }} }}
        Transaction: {{ Result: {{ Success: true }} }}
      }}
    ) {{
      Trade {{
        Currency {{
          MintAddress
          Name
          Symbol
        }}
        PriceInUSD(maximum: Block_Time)
      }}
      max: quantile(of: Trade_PriceInUSD, level: {level})
      ATH_Marketcap: calculate(expression: "$max * {supply}")
    }}
  }}
}}"#,
        op = OPERATION_NAME,
        level = quantile_level,
        supply = total_supply
    )
}

/// Locate the trade rows: `{Solana: {DEXTradeByTokens}}` or flattened
fn trade_rows(data: &Value) -> Option<&Value> {
    data.get("Solana")
        .and_then(|solana| solana.get("DEXTradeByTokens"))
        .or_else(|| data.get("DEXTradeByTokens"))
}

impl BitqueryTradeHistory {
    pub fn new(config: AthOracleConfig) -> Result<Self, String> {
        let http = HttpClient::new(config.timeout_seconds)?;
        let query = build_query(config.quantile_level, config.total_supply);
        Ok(Self {
            http,
            limiter: RateLimiter::new(RATE_LIMIT_PER_MINUTE),
            config,
            query,
        })
    }

    pub fn config(&self) -> &AthOracleConfig {
        &self.config
    }

    async fn request(&self, mints: &[String], since: DateTime<Utc>) -> Result<Vec<AthRecord>, String> {
        let request = GraphQlRequest {
            query: &self.query,
            variables: json!({
                "tokens": mints,
                "since": since.to_rfc3339_opts(SecondsFormat::Secs, true),
            }),
            operation_name: OPERATION_NAME,
        };
        let builder = self
            .http
            .client()
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.access_token);

        let (data, elapsed) = self
            .http
            .post_graphql::<_, Value>(builder, &request, &self.limiter)
            .await?;

        let rows = trade_rows(&data).ok_or_else(|| "Response has no DEXTradeByTokens".to_string())?;
        let rows: Vec<TradeAggregateRow> =
            serde_json::from_value(rows.clone()).map_err(|e| format!("Malformed trade rows: {}", e))?;

        let records = rows_to_ath_records(mints, &rows, self.config.total_supply);
        logger::debug(
            LogTag::AthOracle,
            &format!(
                "{} mints queried, {} rows, {} ATH records ({} ms)",
                mints.len(),
                rows.len(),
                records.len(),
                elapsed
            ),
        );
        Ok(records)
    }
}

#[async_trait]
impl AthOracle for BitqueryTradeHistory {
    async fn fetch_ath_market_cap(&self, mints: &[String], since: DateTime<Utc>) -> Vec<AthRecord> {
        if mints.is_empty() {
            return Vec::new();
        }
        if mints.len() > self.config.max_batch_size {
            logger::error(
                LogTag::AthOracle,
                &format!(
                    "Batch of {} mints exceeds cap {}; caller must pre-chunk",
                    mints.len(),
                    self.config.max_batch_size
                ),
            );
            return Vec::new();
        }
        if self.config.access_token.trim().is_empty() {
            logger::warning(LogTag::AthOracle, "Trade history access token not configured");
            return Vec::new();
        }

        match self.request(mints, since).await {
            Ok(records) => records,
            Err(e) => {
                logger::warning(
                    LogTag::AthOracle,
                    &format!("ATH lookup for {} mints failed: {}", mints.len(), e),
                );
                Vec::new()
            }
        }
    }
}

/// Result of [`fetch_ath_in_batches`]
#[derive(Debug, Default)]
pub struct AthBatchOutcome {
    pub records: Vec<AthRecord>,
    /// Chunks actually sent to the oracle
    pub calls: usize,
    /// Shutdown cut the run short
    pub cancelled: bool,
}

/// Query an arbitrary number of mints in chunks of `batch_size`, pausing
/// between chunks. Stops early (keeping what it has) on shutdown.
pub async fn fetch_ath_in_batches(
    oracle: &dyn AthOracle,
    mints: &[String],
    since: DateTime<Utc>,
    batch_size: usize,
    pacer: &BatchPacer,
) -> AthBatchOutcome {
    let chunks = chunk_mints(mints, batch_size);
    let total = chunks.len();
    let mut outcome = AthBatchOutcome::default();

    for (index, chunk) in chunks.into_iter().enumerate() {
        if pacer.shutdown().is_triggered() {
            outcome.cancelled = true;
            break;
        }
        outcome.records.extend(oracle.fetch_ath_market_cap(chunk, since).await);
        outcome.calls += 1;
        if !pacer.pause(index, total).await {
            outcome.cancelled = index + 1 < total;
            break;
        }
    }

    outcome
}
