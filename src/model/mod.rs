//! Domain types shared by every stage of the pipeline.

pub mod coin;
pub mod task;
pub mod wallet;

pub use coin::{CoinEntry, CoinFilter};
pub use task::{Task, TaskResult};
pub use wallet::{load_wallets, parse_wallets, Wallet};

/// Name under which a DeFi position is listed: `"{project} ({chain})"`.
pub fn pool_name(project: &str, chain: &str) -> String {
    format!("{} ({})", project, chain)
}
