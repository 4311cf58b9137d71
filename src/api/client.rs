//! Authenticated request client with signing, pacing and retry.
//!
//! # Responsibilities
//! - Own one HTTP session and one signer (never shared across workers)
//! - Re-sign every attempt with a fresh nonce/signature/session descriptor
//! - Classify responses: success, rate limited, transient failure
//! - Retry transient failures according to the retry policy
//! - Pace successful requests to stay under informal rate limits

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::api::headers::{signed_headers, static_headers};
use crate::api::types::{ApiError, ApiResult, Envelope};
use crate::config::{ApiConfig, RetryConfig};
use crate::resilience::backoff::pacing_delay;
use crate::resilience::RetryPolicy;
use crate::signing::{CanonicalPayload, Signer};

/// Longest response body excerpt written to the log.
const LOG_BODY_LIMIT: usize = 300;

/// A single API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/token/balance_list`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// JSON body for non-GET requests.
    pub payload: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            payload: None,
        }
    }

    pub fn post(path: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            payload: Some(payload),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// What the signer signs: the JSON body if present, else the query.
    pub fn canonical_payload(&self) -> CanonicalPayload {
        match &self.payload {
            Some(body) => CanonicalPayload::from_json(body),
            None => CanonicalPayload::from_query(&self.query),
        }
    }
}

/// How a single attempt ended.
#[derive(Debug)]
enum Attempt<T> {
    Done(T),
    RateLimited,
    Failed,
}

/// HTTP client that signs, paces and retries every request.
pub struct ApiClient {
    http: reqwest::Client,
    signer: Arc<dyn Signer>,
    config: ApiConfig,
    retry: RetryPolicy,
    base_headers: HeaderMap,
}

impl ApiClient {
    /// Build a client around its own HTTP session and the given signer.
    pub fn new(config: ApiConfig, retry: &RetryConfig, signer: Arc<dyn Signer>) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs));
        builder = match &config.proxy {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy).map_err(|e| ApiError::Client(e.to_string()))?,
            ),
            None => builder.no_proxy(),
        };
        let http = builder.build().map_err(|e| ApiError::Client(e.to_string()))?;
        let base_headers = static_headers(&config.headers)?;

        Ok(Self {
            http,
            signer,
            config,
            retry: RetryPolicy::new(retry),
            base_headers,
        })
    }

    /// Send a request until it yields `{"data": T}`.
    ///
    /// Transient failures are retried per the retry policy (unbounded by
    /// default). Only signer exhaustion or a bounded policy running out
    /// returns an error.
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let url = self.url_for(&request.path)?;
        let payload = request.canonical_payload();
        let mut attempt: u32 = 1;

        loop {
            let signature = self
                .signer
                .sign(&payload, &request.method, &request.path)
                .await?;
            let headers = signed_headers(&signature)?;

            match self.attempt::<T>(request, &url, headers).await {
                Attempt::Done(data) => {
                    sleep(pacing_delay(self.config.pacing_ms, self.config.pacing_jitter_ms)).await;
                    return Ok(data);
                }
                Attempt::RateLimited => {
                    sleep(pacing_delay(self.config.pacing_ms, self.config.pacing_jitter_ms)).await;
                }
                Attempt::Failed => {}
            }

            if !self.retry.allows(attempt + 1) {
                tracing::error!(
                    method = %request.method,
                    url = %url,
                    attempts = attempt,
                    "Giving up on request"
                );
                return Err(ApiError::RetriesExhausted {
                    method: request.method.to_string(),
                    url: url.to_string(),
                    attempts: attempt,
                });
            }
            sleep(self.retry.delay_after(attempt)).await;
            attempt += 1;
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        url: &reqwest::Url,
        headers: HeaderMap,
    ) -> Attempt<T> {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(self.base_headers.clone())
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.payload {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(method = %request.method, url = %url, error = %e, "Request failed");
                return Attempt::Failed;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(method = %request.method, url = %url, %status, error = %e, "Failed to read response body");
                return Attempt::Failed;
            }
        };

        match status {
            StatusCode::OK => match serde_json::from_str::<Envelope<T>>(&body) {
                Ok(envelope) => Attempt::Done(envelope.data),
                Err(e) => {
                    tracing::error!(
                        url = %url,
                        error = %e,
                        body = %truncate(&body, LOG_BODY_LIMIT),
                        "Response does not include expected data"
                    );
                    Attempt::Failed
                }
            },
            StatusCode::TOO_MANY_REQUESTS if body.contains(&self.config.rate_limit_marker) => {
                tracing::warn!(url = %url, "Too many requests, pacing");
                Attempt::RateLimited
            }
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::error!(url = %url, body = %truncate(&body, LOG_BODY_LIMIT), "Unknown 429 response");
                Attempt::Failed
            }
            _ => {
                tracing::error!(
                    method = %request.method,
                    url = %url,
                    %status,
                    query = ?request.query,
                    body = %truncate(&body, LOG_BODY_LIMIT),
                    "Bad response status"
                );
                Attempt::Failed
            }
        }
    }

    fn url_for(&self, path: &str) -> ApiResult<reqwest::Url> {
        let raw = format!("{}{}", self.config.base_url, path);
        reqwest::Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    /// Stop the signer owned by this client.
    pub async fn shutdown(&self) {
        self.signer.shutdown().await;
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("max_attempts", &self.retry.max_attempts())
            .finish()
    }
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_payload_prefers_body() {
        let get = ApiRequest::get("/token/balance_list")
            .query("user_addr", "0xa")
            .query("chain", "eth");
        assert_eq!(get.canonical_payload().as_str(), r#"{"chain":"eth","user_addr":"0xa"}"#);

        let post = ApiRequest::post("/x", serde_json::json!({"b": 1, "a": 2}));
        assert_eq!(post.canonical_payload().as_str(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
