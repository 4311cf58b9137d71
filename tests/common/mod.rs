//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use balance_checker::config::{ApiConfig, CheckerConfig, RetryConfig};
use balance_checker::signing::{
    CanonicalPayload, RequestSignature, Signer, SignerFactory, SigningResult,
};

/// A request as seen by the mock API.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl MockRequest {
    pub fn param(&self, key: &str) -> &str {
        self.query.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Handle to a running mock API.
pub struct MockApi {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockApi {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

/// Start a programmable mock API on an ephemeral port.
///
/// The handler maps each request to `(status, body)`. Every connection
/// serves exactly one request.
pub async fn start_mock_api<F>(handler: F) -> MockApi
where
    F: Fn(&MockRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        log.lock().unwrap().push(request.clone());

                        let (status, body) = handler(&request);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockApi { addr, requests }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;

    let url = url::Url::parse(&format!("http://mock{}", target)).ok()?;
    let query = url.query_pairs().into_owned().collect();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    Some(MockRequest {
        method,
        path: url.path().to_string(),
        query,
        headers,
    })
}

/// `{"data": ...}` body.
pub fn envelope(data: serde_json::Value) -> String {
    serde_json::json!({ "data": data }).to_string()
}

/// A token as the balance endpoints return it.
pub fn token(symbol: &str, amount: f64, price: Option<f64>) -> serde_json::Value {
    serde_json::json!({
        "amount": amount,
        "name": symbol,
        "optimized_symbol": symbol,
        "price": price,
        "logo_url": null,
    })
}

/// In-process signer that counts its calls.
#[derive(Default)]
pub struct CountingSigner {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Signer for CountingSigner {
    async fn sign(
        &self,
        _payload: &CanonicalPayload,
        _method: &Method,
        _path: &str,
    ) -> SigningResult<RequestSignature> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RequestSignature {
            nonce: format!("n_{}", n),
            signature: format!("sig{}", n),
            timestamp: 1_690_894_427,
        })
    }
}

pub fn counting_signer_factory() -> SignerFactory {
    Arc::new(|| Arc::new(CountingSigner::default()) as Arc<dyn Signer>)
}

/// API settings pointed at the mock, without pacing.
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        pacing_ms: 0,
        pacing_jitter_ms: 0,
        ..ApiConfig::default()
    }
}

/// Retry settings with short delays.
pub fn fast_retries(max_attempts: Option<u32>) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay_ms: 5,
        max_delay_ms: 5,
    }
}

/// Full configuration for an orchestrated run against the mock.
pub fn checker_config(base_url: &str, workers: usize) -> CheckerConfig {
    let mut config = CheckerConfig {
        api: api_config(base_url),
        retries: fast_retries(None),
        ..CheckerConfig::default()
    };
    config.workers.count = workers;
    config.observability.progress = false;
    config
}
