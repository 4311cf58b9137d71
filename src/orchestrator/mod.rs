//! Run orchestration.
//!
//! # Data Flow
//! ```text
//! wallets
//!     → DiscoverChains   (serial, own client: union of used chains)
//!     → DiscoverPools    (serial, own client: pool → wallet → coins)
//!     → SelectTargets    (selection.rs: chains sorted, then pools sorted)
//!     → FetchChainBalances (per chain: N tasks in, N results out)
//!     → FetchWalletTotals  (N tasks in, N results out)
//!     → Shutdown         (poison, join workers, queue empty)
//!     → Aggregated       (aggregate + totals → RunReport)
//! ```
//!
//! # Design Decisions
//! - Phases never overlap; each barrier drains exactly what it enqueued
//! - Discovery failures cost a wallet its data; only an exhausted signer
//!   ends the run
//! - A failed fetch task is fatal, but only after its phase is drained
//!   and the pool has shut down

pub mod phase;
pub mod selection;
pub mod workflow;

use thiserror::Error;

use crate::api::ApiError;
use crate::model::Wallet;
use crate::pool::PoolError;

pub use phase::Phase;
pub use selection::{
    selector_from_config, AutoSelector, ConfiguredSelector, Selection, TargetSelector,
};
pub use workflow::{Orchestrator, RunReport};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no wallets to check")]
    NoWallets,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A worker could not complete a task.
    #[error("{task} task for wallet {wallet} failed: {error}")]
    Fatal {
        task: &'static str,
        wallet: Wallet,
        chain: Option<String>,
        error: String,
    },
}
