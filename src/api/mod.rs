//! Balance API integration subsystem.
//!
//! # Data Flow
//! ```text
//! endpoints.rs (typed call, e.g. token_balances(wallet, chain))
//!     → client.rs (ApiRequest → sign → HTTP → classify → retry/pace)
//!         → signing::Signer (nonce, signature, ts)
//!         → headers.rs (signed headers + random account descriptor)
//!     → types.rs (Envelope<T> → wire types → CoinEntry)
//! ```
//!
//! # Constraints
//! - One client per worker; sessions and signers are never shared
//! - Network-layer errors are absorbed and retried here
//! - Only signer exhaustion (or a bounded retry policy) escapes as an error

pub mod client;
pub mod endpoints;
pub mod headers;
pub mod types;

pub use client::{ApiClient, ApiRequest};
pub use types::{ApiError, ApiResult};
