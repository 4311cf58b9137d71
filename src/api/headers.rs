//! Per-request authentication headers.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

use crate::api::types::{ApiError, ApiResult};
use crate::signing::RequestSignature;

pub const NONCE_HEADER: &str = "x-api-nonce";
pub const SIGN_HEADER: &str = "x-api-sign";
pub const TIMESTAMP_HEADER: &str = "x-api-ts";
pub const ACCOUNT_HEADER: &str = "account";

/// Random session descriptor sent in the `account` header.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDescriptor {
    pub random_at: String,
    /// 32 lowercase hex characters.
    pub random_id: String,
    pub user_addr: Option<String>,
}

impl AccountDescriptor {
    /// Fresh descriptor for one request.
    pub fn generate() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            random_at: now.to_string(),
            random_id: Uuid::new_v4().simple().to_string(),
            user_addr: None,
        }
    }

    pub fn to_header_value(&self) -> ApiResult<HeaderValue> {
        let json = serde_json::to_string(self)
            .map_err(|e| ApiError::Client(format!("account descriptor: {}", e)))?;
        HeaderValue::from_str(&json)
            .map_err(|e| ApiError::Client(format!("account descriptor: {}", e)))
    }
}

/// Static headers from configuration.
pub fn static_headers<'a>(
    headers: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> ApiResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Client(format!("header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Client(format!("header '{}': {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Headers carrying a fresh signature and session descriptor.
pub fn signed_headers(signature: &RequestSignature) -> ApiResult<HeaderMap> {
    let value = |v: &str| {
        HeaderValue::from_str(v).map_err(|e| ApiError::Client(format!("signature header: {}", e)))
    };

    let mut map = HeaderMap::new();
    map.insert(NONCE_HEADER, value(&signature.nonce)?);
    map.insert(SIGN_HEADER, value(&signature.signature)?);
    map.insert(TIMESTAMP_HEADER, value(&signature.timestamp.to_string())?);
    map.insert(ACCOUNT_HEADER, AccountDescriptor::generate().to_header_value()?);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        let descriptor = AccountDescriptor::generate();
        assert_eq!(descriptor.random_id.len(), 32);
        assert!(descriptor.random_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(descriptor.random_at.parse::<u64>().is_ok());

        let json: serde_json::Value =
            serde_json::from_str(descriptor.to_header_value().unwrap().to_str().unwrap()).unwrap();
        assert!(json["user_addr"].is_null());
    }

    #[test]
    fn test_signed_headers() {
        let sig = RequestSignature {
            nonce: "n_abc".to_string(),
            signature: "deadbeef".to_string(),
            timestamp: 1690894427,
        };
        let headers = signed_headers(&sig).unwrap();
        assert_eq!(headers[NONCE_HEADER], "n_abc");
        assert_eq!(headers[SIGN_HEADER], "deadbeef");
        assert_eq!(headers[TIMESTAMP_HEADER], "1690894427");
        assert!(headers.contains_key(ACCOUNT_HEADER));
    }

    #[test]
    fn test_static_headers_reject_bad_names() {
        let bad = [("bad header".to_string(), "v".to_string())];
        assert!(static_headers(bad.iter().map(|(k, v)| (k, v))).is_err());
    }
}
