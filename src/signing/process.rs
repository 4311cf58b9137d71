//! Signer backed by an external line-oriented process.
//!
//! # Protocol
//! ```text
//! stdin  → <json-payload>|<METHOD>|<path>\n
//! stdout ← {"nonce": "...", "signature": "...", "ts": 1690894427}\n
//! ```
//!
//! # Responsibilities
//! - Start the process lazily on first use
//! - Kill and restart it after any failed exchange
//! - Give up after `max_attempts` exchanges with `SigningError::Unavailable`
//! - Never leave the process running: explicit shutdown plus kill-on-drop

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::config::SignerConfig;
use crate::signing::types::{
    CanonicalPayload, RequestSignature, Signer, SigningError, SigningResult,
};

/// A running signing process with its pipes.
struct SignerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl SignerProcess {
    fn spawn(config: &SignerConfig) -> SigningResult<Self> {
        let spawn_err = |source: std::io::Error| SigningError::Spawn {
            command: config.command.clone(),
            source,
        };

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            spawn_err(std::io::Error::other("stdin was not captured"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            spawn_err(std::io::Error::other("stdout was not captured"))
        })?;

        tracing::debug!(pid = ?child.id(), command = %config.command, "Signer process started");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    async fn exchange(&mut self, line: &str, wait: Duration) -> SigningResult<RequestSignature> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let response = match timeout(wait, self.stdout.next_line()).await {
            Ok(Ok(Some(response))) => response,
            Ok(Ok(None)) | Err(_) => return Err(SigningError::Timeout(wait.as_millis() as u64)),
            Ok(Err(e)) => return Err(SigningError::Io(e)),
        };

        let response = response.trim();
        serde_json::from_str(response).map_err(|source| SigningError::Protocol {
            line: response.to_string(),
            source,
        })
    }

    async fn terminate(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!(error = %e, "Signer process already gone");
        }
    }
}

/// Signer that delegates to an external process, restarting it on faults.
pub struct ProcessSigner {
    config: SignerConfig,
    process: Mutex<Option<SignerProcess>>,
}

impl ProcessSigner {
    /// Create a signer. The process is not started until the first request.
    pub fn new(config: SignerConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    /// Whether a process is currently running.
    pub async fn is_running(&self) -> bool {
        self.process.lock().await.is_some()
    }
}

/// Build the protocol request line.
pub fn request_line(payload: &CanonicalPayload, method: &Method, path: &str) -> String {
    format!("{}|{}|{}\n", payload.as_str(), method.as_str(), path)
}

#[async_trait]
impl Signer for ProcessSigner {
    async fn sign(
        &self,
        payload: &CanonicalPayload,
        method: &Method,
        path: &str,
    ) -> SigningResult<RequestSignature> {
        let line = request_line(payload, method, path);
        let wait = Duration::from_millis(self.config.response_timeout_ms);
        let mut slot = self.process.lock().await;
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            if slot.is_none() {
                match SignerProcess::spawn(&self.config) {
                    Ok(process) => *slot = Some(process),
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Signer failed to start");
                        last_error = Some(e);
                        continue;
                    }
                }
            }

            let Some(process) = slot.as_mut() else {
                continue;
            };

            match process.exchange(&line, wait).await {
                Ok(signature) => return Ok(signature),
                Err(e) => {
                    tracing::warn!(attempt, path, error = %e, "Signer exchange failed, restarting process");
                    if let Some(dead) = slot.take() {
                        dead.terminate().await;
                    }
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        tracing::error!(attempts = self.config.max_attempts, %last, "Signer unavailable");
        Err(SigningError::Unavailable {
            attempts: self.config.max_attempts,
            last,
        })
    }

    async fn shutdown(&self) {
        if let Some(process) = self.process.lock().await.take() {
            process.terminate().await;
            tracing::debug!("Signer process stopped");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_signer(script: &str, max_attempts: u32) -> ProcessSigner {
        ProcessSigner::new(SignerConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            response_timeout_ms: 500,
            max_attempts,
        })
    }

    fn payload() -> CanonicalPayload {
        CanonicalPayload::from_query(&[("id".to_string(), "0xabc".to_string())])
    }

    #[test]
    fn test_request_line_format() {
        let line = request_line(&payload(), &Method::GET, "/user/used_chains");
        assert_eq!(line, "{\"id\":\"0xabc\"}|GET|/user/used_chains\n");
    }

    #[tokio::test]
    async fn test_sign_with_echoing_process() {
        let signer = sh_signer(
            r#"while read line; do echo '{"nonce":"n","signature":"s","ts":7}'; done"#,
            3,
        );
        let sig = signer.sign(&payload(), &Method::GET, "/x").await.unwrap();
        assert_eq!(sig.timestamp, 7);
        assert!(signer.is_running().await);

        // Process is reused for the next request.
        let again = signer.sign(&payload(), &Method::GET, "/y").await.unwrap();
        assert_eq!(again, sig);

        signer.shutdown().await;
        assert!(!signer.is_running().await);
    }

    #[tokio::test]
    async fn test_garbage_line_exhausts_attempts() {
        let signer = sh_signer("while read line; do echo not-json; done", 3);
        let err = signer.sign(&payload(), &Method::GET, "/x").await.unwrap_err();
        match err {
            SigningError::Unavailable { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.contains("undecodable"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!signer.is_running().await);
    }

    #[tokio::test]
    async fn test_silent_process_times_out() {
        let signer = sh_signer("read line; sleep 5", 1);
        let err = signer.sign(&payload(), &Method::GET, "/x").await.unwrap_err();
        assert!(matches!(err, SigningError::Unavailable { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let signer = ProcessSigner::new(SignerConfig {
            command: "/nonexistent/signer-binary".to_string(),
            args: Vec::new(),
            response_timeout_ms: 100,
            max_attempts: 2,
        });
        let err = signer.sign(&payload(), &Method::GET, "/x").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("failed to start"));
    }
}
