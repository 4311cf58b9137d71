//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker count, attempts, thresholds)
//! - Check the API base URL and proxy are usable URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{CheckerConfig, SelectionMode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CheckerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.base_url", e.to_string())),
    }
    if config.api.base_url.ends_with('/') {
        errors.push(ValidationError::new("api.base_url", "must not end with '/'"));
    }
    if let Some(proxy) = &config.api.proxy {
        if let Err(e) = url::Url::parse(proxy) {
            errors.push(ValidationError::new("api.proxy", e.to_string()));
        }
    }
    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::new("api.request_timeout_secs", "must be > 0"));
    }
    if config.api.rate_limit_marker.is_empty() {
        errors.push(ValidationError::new("api.rate_limit_marker", "must not be empty"));
    }

    if config.signer.command.trim().is_empty() {
        errors.push(ValidationError::new("signer.command", "must not be empty"));
    }
    if config.signer.response_timeout_ms == 0 {
        errors.push(ValidationError::new("signer.response_timeout_ms", "must be > 0"));
    }
    if config.signer.max_attempts == 0 {
        errors.push(ValidationError::new("signer.max_attempts", "must be >= 1"));
    }

    if config.retries.max_attempts == Some(0) {
        errors.push(ValidationError::new(
            "retries.max_attempts",
            "must be >= 1 (omit it to retry forever)",
        ));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.workers.count == 0 {
        errors.push(ValidationError::new("workers.count", "must be >= 1"));
    }

    if !config.selection.min_usd.is_finite() || config.selection.min_usd < 0.0 {
        errors.push(ValidationError::new(
            "selection.min_usd",
            "must be a non-negative number",
        ));
    }
    if config.selection.mode == SelectionMode::Configured && config.selection.targets.is_empty() {
        errors.push(ValidationError::new(
            "selection.targets",
            "configured mode needs at least one target",
        ));
    }
    if matches!(&config.selection.ticker, Some(t) if t.trim().is_empty()) {
        errors.push(ValidationError::new("selection.ticker", "must not be blank"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
