//! Coin entries and the value filter applied to chain balances.

use serde::{Deserialize, Serialize};

/// One token holding of a wallet on a chain or inside a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinEntry {
    pub ticker: String,
    pub amount: f64,
    /// Unit price in USD; `None` when the API has no price for the token.
    pub price: Option<f64>,
    pub name: String,
    pub logo_url: Option<String>,
}

impl CoinEntry {
    /// USD value of the holding, unknown when the price is unknown.
    pub fn usd_value(&self) -> Option<f64> {
        self.price.map(|price| self.amount * price)
    }

    /// USD value with an unknown price counted as zero.
    ///
    /// Only the per-wallet selected total uses this; chain totals skip
    /// unknown values instead.
    pub fn usd_value_or_zero(&self) -> f64 {
        self.amount * self.price.unwrap_or(0.0)
    }
}

/// Which chain-balance entries to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinFilter {
    /// Keep only this ticker; every ticker when absent.
    pub ticker: Option<String>,
    /// Keep only entries worth strictly more than this many USD.
    pub min_usd: f64,
}

impl CoinFilter {
    pub fn new(ticker: Option<String>, min_usd: f64) -> Self {
        Self { ticker, min_usd }
    }

    /// Entries with an unknown price always pass the value check.
    pub fn accepts(&self, coin: &CoinEntry) -> bool {
        if let Some(ticker) = &self.ticker {
            if coin.ticker != *ticker {
                return false;
            }
        }
        match coin.usd_value() {
            Some(usd) => usd > self.min_usd,
            None => true,
        }
    }

    /// Keep the accepted entries, preserving order.
    pub fn apply(&self, coins: Vec<CoinEntry>) -> Vec<CoinEntry> {
        coins.into_iter().filter(|c| self.accepts(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(ticker: &str, amount: f64, price: Option<f64>) -> CoinEntry {
        CoinEntry {
            ticker: ticker.to_string(),
            amount,
            price,
            name: ticker.to_string(),
            logo_url: None,
        }
    }

    #[test]
    fn test_ticker_and_threshold() {
        let filter = CoinFilter::new(Some("ETH".to_string()), 5.0);
        assert!(filter.accepts(&coin("ETH", 2.0, Some(3.0))));
        assert!(!filter.accepts(&coin("ETH", 1.0, Some(2.0))));
        assert!(!filter.accepts(&coin("BTC", 100.0, Some(60_000.0))));
    }

    #[test]
    fn test_unknown_price_passes() {
        let filter = CoinFilter::new(None, 1_000_000.0);
        assert!(filter.accepts(&coin("SCAM", 1.0, None)));
    }

    #[test]
    fn test_threshold_is_strict() {
        let filter = CoinFilter::new(None, 6.0);
        assert!(!filter.accepts(&coin("ETH", 2.0, Some(3.0))));
    }

    #[test]
    fn test_apply_keeps_order() {
        let filter = CoinFilter::new(None, 1.0);
        let kept = filter.apply(vec![
            coin("A", 5.0, Some(1.0)),
            coin("B", 0.1, Some(1.0)),
            coin("C", 1.0, None),
        ]);
        let tickers: Vec<_> = kept.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "C"]);
    }

    #[test]
    fn test_usd_values() {
        assert_eq!(coin("X", 2.0, Some(3.0)).usd_value(), Some(6.0));
        assert_eq!(coin("X", 2.0, None).usd_value(), None);
        assert_eq!(coin("X", 2.0, None).usd_value_or_zero(), 0.0);
    }
}
