//! Work items sent to the pool and the results they produce.

use serde::Serialize;

use crate::model::coin::{CoinEntry, CoinFilter};
use crate::model::wallet::Wallet;

/// A unit of work for a pool worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Token balances of one wallet on one chain, filtered.
    ChainBalance {
        wallet: Wallet,
        chain: String,
        filter: CoinFilter,
    },
    /// Latest total USD net worth of one wallet.
    WalletTotal { wallet: Wallet },
    /// Stop signal; each worker forwards it once before exiting.
    Poison,
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::ChainBalance { .. } => "chain_balance",
            Task::WalletTotal { .. } => "wallet_total",
            Task::Poison => "poison",
        }
    }
}

/// Outcome of a task, keyed explicitly so arrival order never matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskResult {
    ChainBalance {
        chain: String,
        wallet: Wallet,
        coins: Vec<CoinEntry>,
    },
    WalletTotal {
        wallet: Wallet,
        usd_value: f64,
    },
    /// The task's request chain hit a fatal error.
    Failed {
        task: &'static str,
        wallet: Wallet,
        chain: Option<String>,
        error: String,
    },
}

impl TaskResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskResult::Failed { .. })
    }
}
