//! Request signing subsystem.
//!
//! # Data Flow
//! ```text
//! api::client (method, path, query/body)
//!     → types.rs (CanonicalPayload: sorted compact JSON)
//!     → Signer::sign
//!         → process.rs (line protocol over stdin/stdout of an external process)
//!     → RequestSignature { nonce, signature, ts }
//!     → x-api-nonce / x-api-sign / x-api-ts headers
//! ```
//!
//! # Design Decisions
//! - Callers only see the `Signer` trait; the process transport can be swapped
//! - The only bounded retry in the pipeline lives here (restart + retry)
//! - One signer per client; processes are never shared between workers

pub mod process;
pub mod types;

use std::sync::Arc;

pub use process::ProcessSigner;
pub use types::{CanonicalPayload, RequestSignature, Signer, SigningError, SigningResult};

/// Builds a fresh, exclusively owned signer for each client.
pub type SignerFactory = Arc<dyn Fn() -> Arc<dyn Signer> + Send + Sync>;

/// Factory producing one `ProcessSigner` per call.
pub fn process_signer_factory(config: crate::config::SignerConfig) -> SignerFactory {
    Arc::new(move || Arc::new(ProcessSigner::new(config.clone())) as Arc<dyn Signer>)
}
