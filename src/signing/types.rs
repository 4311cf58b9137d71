//! Signer contract, signature triple and error definitions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-request authentication material produced by the signing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSignature {
    pub nonce: String,
    pub signature: String,
    /// Unix timestamp the signature was produced for.
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

/// Errors that can occur while obtaining a signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The signing process could not be launched.
    #[error("failed to start signer '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request or reading the response failed.
    #[error("signer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The process produced no response line.
    #[error("signer produced no response within {0} ms")]
    Timeout(u64),

    /// The response line could not be decoded.
    #[error("signer returned an undecodable line '{line}': {source}")]
    Protocol {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// All restart attempts failed.
    #[error("signer unavailable after {attempts} attempts: {last}")]
    Unavailable { attempts: u32, last: String },
}

impl SigningError {
    /// Whether the error is terminal for the current request chain.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SigningError::Unavailable { .. })
    }
}

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Something that can sign an API request.
///
/// Implementations own their transport (a subprocess, a library, ...) and are
/// expected to recover from transient faults internally; a returned error
/// means the signer has given up on this request.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `payload` for a `method` request to `path`.
    async fn sign(
        &self,
        payload: &CanonicalPayload,
        method: &Method,
        path: &str,
    ) -> SigningResult<RequestSignature>;

    /// Release any external resources. Further `sign` calls may restart them.
    async fn shutdown(&self) {}
}

/// Request parameters in the canonical form the signer expects: compact JSON
/// with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    /// Canonical payload of a GET request's query parameters.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let map: BTreeMap<&str, &str> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        // A map of strings always serializes.
        Self(serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Canonical payload of a JSON body.
    pub fn from_json(body: &serde_json::Value) -> Self {
        // serde_json::Value keeps object keys sorted without `preserve_order`.
        Self(body.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_payload_is_sorted_and_compact() {
        let params = vec![
            ("user_addr".to_string(), "0xabc".to_string()),
            ("chain".to_string(), "eth".to_string()),
        ];
        let payload = CanonicalPayload::from_query(&params);
        assert_eq!(payload.as_str(), r#"{"chain":"eth","user_addr":"0xabc"}"#);
    }

    #[test]
    fn test_empty_query_payload() {
        assert_eq!(CanonicalPayload::from_query(&[]).as_str(), "{}");
    }

    #[test]
    fn test_signature_decodes_ts_field() {
        let sig: RequestSignature =
            serde_json::from_str(r#"{"nonce":"n_1","signature":"ab12","ts":1690894427}"#).unwrap();
        assert_eq!(sig.nonce, "n_1");
        assert_eq!(sig.signature, "ab12");
        assert_eq!(sig.timestamp, 1690894427);
    }

    #[test]
    fn test_only_unavailable_is_fatal() {
        assert!(SigningError::Unavailable { attempts: 3, last: "x".into() }.is_fatal());
        assert!(!SigningError::Timeout(10).is_fatal());
    }
}
