//! Result aggregation.
//!
//! # Data Flow
//! ```text
//! selected targets × wallets → empty coin lists (no key ever missing)
//!     → discovered pool coins merged for selected pools
//!     → drained TaskResults applied by explicit (chain, wallet) / wallet keys
//!     → Aggregate { targets, coins, balances }
//!     → totals.rs (summary for the report)
//! ```
//!
//! # Design Decisions
//! - Keys, not arrival order, decide where a result lands
//! - BTreeMaps so equal inputs give byte-identical output

pub mod totals;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::{CoinEntry, TaskResult, Wallet};

pub use totals::Totals;

/// Coins per wallet for one target.
pub type WalletCoins = BTreeMap<Wallet, Vec<CoinEntry>>;

/// Pools discovered before selection: pool name → wallet → coins.
pub type PoolMap = BTreeMap<String, WalletCoins>;

/// Final per-target, per-wallet view handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    /// Selected chains and pools in selection order.
    pub targets: Vec<String>,
    /// target → wallet → coins.
    pub coins: BTreeMap<String, WalletCoins>,
    /// wallet → latest total USD net worth.
    pub balances: BTreeMap<Wallet, f64>,
}

impl Aggregate {
    pub fn wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.balances.keys()
    }
}

/// Builds an `Aggregate` from pool discovery and drained results.
#[derive(Debug)]
pub struct Aggregator {
    targets: Vec<String>,
    wallets: Vec<Wallet>,
    coins: BTreeMap<String, WalletCoins>,
    balances: BTreeMap<Wallet, f64>,
}

impl Aggregator {
    /// Start with an empty coin list for every target and wallet.
    pub fn new(targets: &[String], wallets: &[Wallet]) -> Self {
        let mut seen = HashSet::new();
        let targets: Vec<String> = targets
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        let coins = targets
            .iter()
            .map(|target| {
                let per_wallet = wallets.iter().map(|w| (w.clone(), Vec::new())).collect();
                (target.clone(), per_wallet)
            })
            .collect();

        Self {
            targets,
            wallets: wallets.to_vec(),
            coins,
            balances: BTreeMap::new(),
        }
    }

    /// Copy coins of the selected pools; unselected pools are ignored.
    pub fn merge_pools(&mut self, pools: &PoolMap) {
        for (name, per_wallet) in pools {
            let Some(slot) = self.coins.get_mut(name) else {
                continue;
            };
            for (wallet, coins) in per_wallet {
                if let Some(entry) = slot.get_mut(wallet) {
                    *entry = coins.clone();
                }
            }
        }
    }

    /// Apply one drained result. Results for unknown keys are logged and dropped.
    pub fn apply(&mut self, result: TaskResult) {
        match result {
            TaskResult::ChainBalance {
                chain,
                wallet,
                coins,
            } => match self.coins.get_mut(&chain).and_then(|m| m.get_mut(&wallet)) {
                Some(entry) => *entry = coins,
                None => tracing::warn!(chain = %chain, wallet = %wallet, "Result for unselected chain or unknown wallet"),
            },
            TaskResult::WalletTotal { wallet, usd_value } => {
                if self.wallets.contains(&wallet) {
                    self.balances.insert(wallet, usd_value);
                } else {
                    tracing::warn!(wallet = %wallet, "Total for unknown wallet");
                }
            }
            TaskResult::Failed { .. } => {}
        }
    }

    pub fn apply_all(&mut self, results: impl IntoIterator<Item = TaskResult>) {
        for result in results {
            self.apply(result);
        }
    }

    /// Finish. Wallets without a total result get `0.0`.
    pub fn finish(mut self) -> Aggregate {
        for wallet in &self.wallets {
            self.balances.entry(wallet.clone()).or_insert(0.0);
        }
        Aggregate {
            targets: self.targets,
            coins: self.coins,
            balances: self.balances,
        }
    }
}
