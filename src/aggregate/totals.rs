//! Summary totals of an aggregate.
//!
//! Two sums treat unknown prices differently and are kept that way on
//! purpose so reports match earlier output: chain totals skip coins with an
//! unknown price, wallet totals count them as zero. Both give the same
//! number, but only chain totals expose how many values were unknown.
//!
//! With a ticker set, every sum counts only coins of that ticker. Pool coins
//! are never filtered at fetch time, so this is where they are narrowed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::model::Wallet;

/// Totals derived from an `Aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    /// target → sum of known USD values.
    pub chain_totals: BTreeMap<String, f64>,
    /// target → number of coin entries whose value is unknown.
    pub unknown_values: BTreeMap<String, usize>,
    /// target → total token amount (meaningful when a ticker filter is set).
    pub ticker_amounts: BTreeMap<String, f64>,
    /// wallet → USD across the selected targets, unknown prices as 0.
    pub wallet_totals: BTreeMap<Wallet, f64>,
    /// Sum of `wallet_totals`.
    pub selected_usd: f64,
    /// Sum of the API's net worth over all wallets.
    pub net_worth_usd: f64,
}

impl Totals {
    /// Totals over `aggregate`, restricted to `ticker` when given.
    pub fn compute(aggregate: &Aggregate, ticker: Option<&str>) -> Self {
        let mut chain_totals = BTreeMap::new();
        let mut unknown_values = BTreeMap::new();
        let mut ticker_amounts = BTreeMap::new();
        let mut wallet_totals: BTreeMap<Wallet, f64> =
            aggregate.wallets().map(|w| (w.clone(), 0.0)).collect();

        for target in &aggregate.targets {
            let Some(per_wallet) = aggregate.coins.get(target) else {
                continue;
            };

            let mut known = 0.0;
            let mut unknown = 0;
            let mut amount = 0.0;
            for (wallet, coins) in per_wallet {
                for coin in coins.iter().filter(|c| ticker.map_or(true, |t| c.ticker == t)) {
                    match coin.usd_value() {
                        Some(usd) => known += usd,
                        None => unknown += 1,
                    }
                    amount += coin.amount;
                    *wallet_totals.entry(wallet.clone()).or_insert(0.0) += coin.usd_value_or_zero();
                }
            }

            chain_totals.insert(target.clone(), known);
            unknown_values.insert(target.clone(), unknown);
            ticker_amounts.insert(target.clone(), amount);
        }

        let selected_usd = wallet_totals.values().sum();
        let net_worth_usd = aggregate.balances.values().sum();

        Self {
            chain_totals,
            unknown_values,
            ticker_amounts,
            wallet_totals,
            selected_usd,
            net_worth_usd,
        }
    }
}
