/// AMM pool registry client (GraphQL)
///
/// Reports which mints have migrated into an AMM pool. One POST per call,
/// no retries. Every failure (missing key, transport, non-2xx, GraphQL
/// `errors`, malformed payload) degrades to [`BondingStatus::no_evidence`].
pub mod types;

pub use self::types::{classify_pool_rows, BondingStatus, PoolRow};

use crate::apis::client::{GraphQlRequest, HttpClient, RateLimiter};
use crate::config::PoolOracleConfig;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Registry requests per minute
pub const RATE_LIMIT_PER_MINUTE: usize = 120;

const OPERATION_NAME: &str = "PoolsByMint";

/// Source of bonding evidence for a pre-chunked list of mints
#[async_trait]
pub trait PoolOracle: Send + Sync {
    async fn fetch_bonding_status_batch(&self, mints: &[String]) -> BondingStatus;
}

pub struct ShyftPoolRegistry {
    http: HttpClient,
    limiter: RateLimiter,
    config: PoolOracleConfig,
    query: String,
}

fn build_query(collection: &str) -> String {
    format!(
        r#"query {op}($tokens: [String!]) {{
  {collection}(
    where: {{ _or: [{{ base_mint: {{ _in: $tokens }} }}, {{ quote_mint: {{ _in: $tokens }} }}] }}
  ) {{
    base_mint
    creator
    lp_mint
    pool_bump
    pool_quote_token_account
    quote_mint
    pubkey
  }}
}}"#,
        op = OPERATION_NAME,
        collection = collection
    )
}

impl ShyftPoolRegistry {
    pub fn new(config: PoolOracleConfig) -> Result<Self, String> {
        let http = HttpClient::new(config.timeout_seconds)?;
        let query = build_query(&config.pool_collection);
        Ok(Self {
            http,
            limiter: RateLimiter::new(RATE_LIMIT_PER_MINUTE),
            config,
            query,
        })
    }

    pub fn config(&self) -> &PoolOracleConfig {
        &self.config
    }

    fn extract_rows(&self, data: &Value) -> Result<Vec<PoolRow>, String> {
        let rows = data
            .get(&self.config.pool_collection)
            .ok_or_else(|| format!("Response has no '{}' collection", self.config.pool_collection))?;
        serde_json::from_value(rows.clone()).map_err(|e| format!("Malformed pool rows: {}", e))
    }
}

#[async_trait]
impl PoolOracle for ShyftPoolRegistry {
    async fn fetch_bonding_status_batch(&self, mints: &[String]) -> BondingStatus {
        if mints.is_empty() {
            return BondingStatus::no_evidence();
        }
        if mints.len() > self.config.max_batch_size {
            logger::error(
                LogTag::PoolOracle,
                &format!(
                    "Batch of {} mints exceeds cap {}; caller must pre-chunk",
                    mints.len(),
                    self.config.max_batch_size
                ),
            );
            return BondingStatus::no_evidence();
        }
        if self.config.api_key.trim().is_empty() {
            logger::warning(LogTag::PoolOracle, "Pool registry API key not configured");
            return BondingStatus::no_evidence();
        }

        let request = GraphQlRequest {
            query: &self.query,
            variables: json!({ "tokens": mints }),
            operation_name: OPERATION_NAME,
        };
        let builder = self.http.client().post(&self.config.endpoint).query(&[
            ("api_key", self.config.api_key.as_str()),
            ("network", self.config.network.as_str()),
        ]);

        let result = self
            .http
            .post_graphql::<_, Value>(builder, &request, &self.limiter)
            .await
            .and_then(|(data, elapsed)| self.extract_rows(&data).map(|rows| (rows, elapsed)));

        match result {
            Ok((rows, elapsed)) => {
                let status = classify_pool_rows(mints, &rows);
                logger::debug(
                    LogTag::PoolOracle,
                    &format!(
                        "{} mints queried, {} pools returned, {} bonded ({} ms)",
                        mints.len(),
                        rows.len(),
                        status.bonded.len(),
                        elapsed
                    ),
                );
                status
            }
            Err(e) => {
                logger::warning(
                    LogTag::PoolOracle,
                    &format!("Pool lookup for {} mints failed: {}", mints.len(), e),
                );
                BondingStatus::no_evidence()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/graphql";

    fn config(endpoint: &str) -> PoolOracleConfig {
        PoolOracleConfig {
            endpoint: endpoint.to_string(),
            api_key: "test-key".to_string(),
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn mints(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn test_scenario_a_single_pool() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .query_param("api_key", "test-key")
                    .query_param("network", "mainnet-beta")
                    .body_contains("pump_fun_amm_Pool")
                    .json_body_partial(
                        r#"{"operationName":"PoolsByMint","variables":{"tokens":["MintA","MintB","MintC"]}}"#,
                    );
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {
                            "pump_fun_amm_Pool": [{
                                "base_mint": "MintB",
                                "creator": "Creator",
                                "lp_mint": "Lp",
                                "pool_bump": 254,
                                "pool_quote_token_account": "QuoteAcc",
                                "quote_mint": "So11111111111111111111111111111111111111112",
                                "pubkey": "Pool1"
                            }]
                        }
                    }));
            })
            .await;
        let oracle = ShyftPoolRegistry::new(config(&server.url("/graphql"))).unwrap();

        let status = oracle
            .fetch_bonding_status_batch(&mints(&["MintA", "MintB", "MintC"]))
            .await;

        assert!(status.answered);
        assert_eq!(status.bonded.len(), 1);
        assert_eq!(status.pool_for("MintB").unwrap().pool_id, "Pool1");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_scenario_b_http_500_is_no_evidence() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(500).body(r#"{"message":"boom"}"#);
            })
            .await;
        let oracle = ShyftPoolRegistry::new(config(&server.url("/graphql"))).unwrap();

        let status = oracle.fetch_bonding_status_batch(&mints(&["MintA"])).await;
        assert_eq!(status, BondingStatus::no_evidence());
        m.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_graphql_errors_are_no_evidence() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "errors": [{ "message": "field not found" }] }));
            })
            .await;
        let oracle = ShyftPoolRegistry::new(config(&server.url("/graphql"))).unwrap();

        let status = oracle.fetch_bonding_status_batch(&mints(&["MintA"])).await;
        assert!(!status.answered);
        assert!(status.bonded.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_evidence() {
        let oracle = ShyftPoolRegistry::new(config(UNREACHABLE_URL)).unwrap();
        let status = oracle.fetch_bonding_status_batch(&mints(&["MintA"])).await;
        assert_eq!(status, BondingStatus::no_evidence());
    }

    #[tokio::test]
    async fn test_empty_answer_is_answered_without_bonds() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "data": { "pump_fun_amm_Pool": [] } }));
            })
            .await;
        let oracle = ShyftPoolRegistry::new(config(&server.url("/graphql"))).unwrap();

        let status = oracle.fetch_bonding_status_batch(&mints(&["MintA"])).await;
        assert!(status.answered);
        assert!(status.bonded.is_empty());
    }

    #[tokio::test]
    async fn test_guards_skip_network() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "data": { "pump_fun_amm_Pool": [] } }));
            })
            .await;

        let oracle = ShyftPoolRegistry::new(config(&server.url("/graphql"))).unwrap();
        assert_eq!(
            oracle.fetch_bonding_status_batch(&[]).await,
            BondingStatus::no_evidence()
        );

        let oversized: Vec<String> = (0..51).map(|i| format!("Mint{}", i)).collect();
        assert!(!oracle.fetch_bonding_status_batch(&oversized).await.answered);

        let keyless = ShyftPoolRegistry::new(PoolOracleConfig {
            api_key: String::new(),
            ..config(&server.url("/graphql"))
        })
        .unwrap();
        assert!(!keyless.fetch_bonding_status_batch(&mints(&["MintA"])).await.answered);

        m.assert_hits_async(0).await;
    }
}
