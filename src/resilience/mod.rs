//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! API request attempt fails:
//!     → retries.rs (may we try again?)
//!     → backoff.rs (how long to wait)
//! API request succeeds:
//!     → backoff.rs (pacing pause before the next request)
//! ```
//!
//! # Design Decisions
//! - Network failures are absorbed here, never surfaced to workers
//! - Pacing is randomized so parallel workers drift apart

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
