//! API error definitions and wire types of the balance endpoints.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::model::CoinEntry;
use crate::signing::SigningError;

/// Errors that can escape the authenticated request client.
///
/// Transient HTTP and network failures never show up here; they are retried
/// inside the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The signer gave up; the current request chain is aborted.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// A bounded retry policy ran out of attempts.
    #[error("{method} {url} failed after {attempts} attempts")]
    RetriesExhausted {
        method: String,
        url: String,
        attempts: u32,
    },

    /// The HTTP session could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// The request URL could not be formed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Every successful response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `data` of `/user/used_chains`.
#[derive(Debug, Deserialize)]
pub struct UsedChains {
    pub chains: Vec<String>,
}

/// One token as returned by balance and portfolio endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub optimized_symbol: String,
    pub price: Option<f64>,
    pub logo_url: Option<String>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<TokenBalance> for CoinEntry {
    fn from(token: TokenBalance) -> Self {
        Self {
            ticker: token.optimized_symbol,
            amount: token.amount,
            price: token.price,
            name: token.name,
            logo_url: token.logo_url,
        }
    }
}

/// One DeFi project entry of `/portfolio/project_list`.
#[derive(Debug, Deserialize)]
pub struct Project {
    pub name: String,
    pub chain: String,
    #[serde(default)]
    pub portfolio_item_list: Vec<PortfolioItem>,
}

/// A position inside a project.
#[derive(Debug, Deserialize)]
pub struct PortfolioItem {
    #[serde(default)]
    pub asset_token_list: Vec<TokenBalance>,
}

/// `data` of `/asset/net_curve_24h`.
#[derive(Debug, Deserialize)]
pub struct NetCurve {
    /// `[timestamp, usd_value]` points, oldest first.
    pub usd_value_list: Vec<(f64, f64)>,
}

impl NetCurve {
    /// USD value of the most recent point.
    pub fn latest(&self) -> Option<f64> {
        self.usd_value_list.last().map(|(_, usd)| *usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_to_coin() {
        let token: TokenBalance = serde_json::from_str(
            r#"{"amount": 1.5, "name": "Ether", "optimized_symbol": "ETH",
                "price": 2000.0, "logo_url": "https://x/eth.png", "decimals": 18}"#,
        )
        .unwrap();
        let coin = CoinEntry::from(token);
        assert_eq!(coin.ticker, "ETH");
        assert_eq!(coin.usd_value(), Some(3000.0));
    }

    #[test]
    fn test_null_price_and_logo() {
        let token: TokenBalance = serde_json::from_str(
            r#"{"amount": 3, "name": "Airdrop", "optimized_symbol": "DROP", "price": null, "logo_url": null}"#,
        )
        .unwrap();
        assert!(token.price.is_none());
        assert!(token.logo_url.is_none());
    }

    #[test]
    fn test_null_or_missing_names() {
        let tokens: Vec<TokenBalance> = serde_json::from_str(
            r#"[{"amount": 1, "name": null, "optimized_symbol": null, "price": 2.0, "logo_url": null},
                {"amount": 4, "optimized_symbol": "ARB", "price": 1.0, "logo_url": null}]"#,
        )
        .unwrap();
        assert_eq!(tokens[0].optimized_symbol, "");
        assert_eq!(tokens[0].name, "");
        assert_eq!(tokens[1].name, "");
        assert_eq!(CoinEntry::from(tokens[1].clone()).ticker, "ARB");
    }

    #[test]
    fn test_net_curve_latest() {
        let env: Envelope<NetCurve> = serde_json::from_str(
            r#"{"data": {"usd_value_list": [[1690000000, 10.5], [1690003600, 12.25]]}}"#,
        )
        .unwrap();
        assert_eq!(env.data.latest(), Some(12.25));

        let empty = NetCurve { usd_value_list: Vec::new() };
        assert_eq!(empty.latest(), None);
    }

    #[test]
    fn test_project_defaults() {
        let env: Envelope<Vec<Project>> =
            serde_json::from_str(r#"{"data": [{"name": "Uniswap V3", "chain": "eth"}]}"#).unwrap();
        assert!(env.data[0].portfolio_item_list.is_empty());
    }

    #[test]
    fn test_missing_data_field_rejected() {
        let res: Result<Envelope<UsedChains>, _> = serde_json::from_str(r#"{"error_code": 1}"#);
        assert!(res.is_err());
    }
}
