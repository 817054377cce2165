/// Base HTTP client with rate limiting and GraphQL POST support
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Rate limiter for API clients
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    max_per_minute: usize,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)), // Only 1 concurrent request
            last_request: Arc::new(Mutex::new(None)),
            min_interval,
            max_per_minute,
        }
    }

    /// Wait until we can make a request (respects rate limits)
    pub async fn acquire(&self) -> Result<RateLimitGuard, String> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("Failed to acquire rate limiter permit: {}", e))?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// GraphQL request envelope: `{query, variables, operationName}`
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

/// GraphQL response envelope: either `data` or a non-empty `errors` array
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

impl<T> GraphQlResponse<T> {
    /// Collapse the envelope; any reported error wins over partial data
    pub fn into_result(self) -> Result<T, String> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(format!("GraphQL errors: {}", messages.join("; ")));
        }
        self.data
            .ok_or_else(|| "GraphQL response carried neither data nor errors".to_string())
    }
}

/// HTTP client wrapper with a per-request timeout
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, String> {
        if timeout_secs == 0 {
            return Err("Timeout must be greater than zero".to_string());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn execute_request(
        &self,
        builder: RequestBuilder,
        limiter: &RateLimiter,
    ) -> Result<(reqwest::Response, u128), String> {
        let guard = limiter
            .acquire()
            .await
            .map_err(|e| format!("Rate limiter error: {}", e))?;

        let start = Instant::now();
        let response = builder.timeout(self.timeout).send().await;
        drop(guard);

        response
            .map(|r| (r, start.elapsed().as_millis()))
            .map_err(|e| format!("Request failed: {}", e))
    }

    /// POST a GraphQL request and decode `data`.
    ///
    /// Transport failures, non-2xx statuses, undecodable bodies and GraphQL
    /// `errors` arrays all come back as `Err(String)`; callers decide how to
    /// degrade. Returns the decoded data and the round-trip time in ms.
    pub async fn post_graphql<V, T>(
        &self,
        builder: RequestBuilder,
        request: &GraphQlRequest<'_, V>,
        limiter: &RateLimiter,
    ) -> Result<(T, u128), String>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let (response, elapsed) = self.execute_request(builder.json(request), limiter).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, body));
        }

        let envelope = response
            .json::<GraphQlResponse<T>>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        envelope.into_result().map(|data| (data, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_graphql_request_serializes_operation_name() {
        let request = GraphQlRequest {
            query: "query Q { x }",
            variables: json!({ "tokens": ["A"] }),
            operation_name: "Q",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["operationName"], "Q");
        assert_eq!(value["variables"]["tokens"][0], "A");
    }

    #[test]
    fn test_graphql_errors_win_over_data() {
        let envelope: GraphQlResponse<serde_json::Value> = serde_json::from_value(json!({
            "data": { "x": 1 },
            "errors": [{ "message": "rate limited" }]
        }))
        .unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(err.contains("rate limited"));

        let empty_errors: GraphQlResponse<serde_json::Value> =
            serde_json::from_value(json!({ "data": { "x": 1 }, "errors": [] })).unwrap();
        assert!(empty_errors.into_result().is_ok());

        let nothing: GraphQlResponse<serde_json::Value> =
            serde_json::from_value(json!({})).unwrap();
        assert!(nothing.into_result().is_err());
    }

    #[derive(Debug, Deserialize)]
    struct PoolPage {
        pools: Vec<String>,
    }

    fn decode_envelope<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, String> {
        serde_json::from_value::<GraphQlResponse<T>>(body)
            .map_err(|e| e.to_string())?
            .into_result()
    }

    #[test]
    fn test_envelope_decodes_payloads_without_default() {
        let page: PoolPage = decode_envelope(json!({ "data": { "pools": ["P1"] } })).unwrap();
        assert_eq!(page.pools, vec!["P1".to_string()]);

        let missing = decode_envelope::<PoolPage>(json!({ "errors": [{ "message": "denied" }] }));
        assert!(missing.unwrap_err().contains("denied"));
    }

    #[tokio::test]
    async fn test_post_graphql_decodes_data_and_surfaces_status() {
        let server = MockServer::start_async().await;
        let ok = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/ok")
                    .json_body_partial(r#"{"operationName":"Pools"}"#);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "data": { "pools": ["P1", "P2"] } }));
            })
            .await;
        let failing = server
            .mock_async(|when, then| {
                when.method(POST).path("/down");
                then.status(503).body("maintenance");
            })
            .await;

        let http = HttpClient::new(5).unwrap();
        let limiter = RateLimiter::new(600);
        let request = GraphQlRequest {
            query: "query Pools { pools }",
            variables: json!({}),
            operation_name: "Pools",
        };

        let (page, _elapsed): (PoolPage, u128) = http
            .post_graphql(http.client().post(server.url("/ok")), &request, &limiter)
            .await
            .unwrap();
        assert_eq!(page.pools.len(), 2);
        ok.assert_async().await;

        let err = http
            .post_graphql::<_, PoolPage>(http.client().post(server.url("/down")), &request, &limiter)
            .await
            .unwrap_err();
        assert!(err.contains("503"));
        assert!(err.contains("maintenance"));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        tokio::time::pause();
        let limiter = RateLimiter::new(60);
        assert_eq!(limiter.min_interval(), Duration::from_secs(1));

        let start = tokio::time::Instant::now();
        drop(limiter.acquire().await.unwrap());
        drop(limiter.acquire().await.unwrap());
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(HttpClient::new(0).is_err());
        assert!(HttpClient::new(5).is_ok());
    }
}
