//! Workflow phases, strictly sequential.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DiscoverChains,
    DiscoverPools,
    SelectTargets,
    FetchChainBalances,
    FetchWalletTotals,
    Shutdown,
    Aggregated,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::DiscoverChains,
        Phase::DiscoverPools,
        Phase::SelectTargets,
        Phase::FetchChainBalances,
        Phase::FetchWalletTotals,
        Phase::Shutdown,
        Phase::Aggregated,
    ];

    /// The phase that follows, `None` once aggregated.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::DiscoverChains => Some(Phase::DiscoverPools),
            Phase::DiscoverPools => Some(Phase::SelectTargets),
            Phase::SelectTargets => Some(Phase::FetchChainBalances),
            Phase::FetchChainBalances => Some(Phase::FetchWalletTotals),
            Phase::FetchWalletTotals => Some(Phase::Shutdown),
            Phase::Shutdown => Some(Phase::Aggregated),
            Phase::Aggregated => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::DiscoverChains => "discover_chains",
            Phase::DiscoverPools => "discover_pools",
            Phase::SelectTargets => "select_targets",
            Phase::FetchChainBalances => "fetch_chain_balances",
            Phase::FetchWalletTotals => "fetch_wallet_totals",
            Phase::Shutdown => "shutdown",
            Phase::Aggregated => "aggregated",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
