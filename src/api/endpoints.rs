//! Typed calls to the four balance endpoints.

use std::collections::BTreeMap;

use crate::api::client::{ApiClient, ApiRequest};
use crate::api::types::{ApiResult, NetCurve, Project, TokenBalance, UsedChains};
use crate::model::{pool_name, CoinEntry, Wallet};

pub const USED_CHAINS_PATH: &str = "/user/used_chains";
pub const PROJECT_LIST_PATH: &str = "/portfolio/project_list";
pub const BALANCE_LIST_PATH: &str = "/token/balance_list";
pub const NET_CURVE_PATH: &str = "/asset/net_curve_24h";

impl ApiClient {
    /// Chains the wallet has ever used.
    pub async fn used_chains(&self, wallet: &Wallet) -> ApiResult<Vec<String>> {
        let request = ApiRequest::get(USED_CHAINS_PATH).query("id", wallet.as_str());
        let data: UsedChains = self.send(&request).await?;
        Ok(data.chains)
    }

    /// DeFi positions of the wallet, keyed by pool name.
    ///
    /// A project listed twice for the same chain has its tokens concatenated.
    pub async fn project_list(&self, wallet: &Wallet) -> ApiResult<BTreeMap<String, Vec<CoinEntry>>> {
        let request = ApiRequest::get(PROJECT_LIST_PATH).query("user_addr", wallet.as_str());
        let projects: Vec<Project> = self.send(&request).await?;
        Ok(pools_from_projects(projects))
    }

    /// Unfiltered token balances of the wallet on one chain.
    pub async fn token_balances(&self, wallet: &Wallet, chain: &str) -> ApiResult<Vec<CoinEntry>> {
        let request = ApiRequest::get(BALANCE_LIST_PATH)
            .query("user_addr", wallet.as_str())
            .query("chain", chain);
        let tokens: Vec<TokenBalance> = self.send(&request).await?;
        Ok(tokens.into_iter().map(CoinEntry::from).collect())
    }

    /// Latest USD net worth across all chains.
    pub async fn latest_net_worth(&self, wallet: &Wallet) -> ApiResult<f64> {
        let request = ApiRequest::get(NET_CURVE_PATH).query("user_addr", wallet.as_str());
        let curve: NetCurve = self.send(&request).await?;
        Ok(curve.latest().unwrap_or_else(|| {
            tracing::warn!(wallet = %wallet, "Net worth curve is empty, using 0");
            0.0
        }))
    }
}

/// Group project tokens by pool name.
pub fn pools_from_projects(projects: Vec<Project>) -> BTreeMap<String, Vec<CoinEntry>> {
    let mut pools: BTreeMap<String, Vec<CoinEntry>> = BTreeMap::new();
    for project in projects {
        let coins = pools.entry(pool_name(&project.name, &project.chain)).or_default();
        for item in project.portfolio_item_list {
            coins.extend(item.asset_token_list.into_iter().map(CoinEntry::from));
        }
    }
    pools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_from_projects() {
        let projects: Vec<Project> = serde_json::from_str(
            r#"[
                {"name": "Aave V3", "chain": "eth", "portfolio_item_list": [
                    {"asset_token_list": [
                        {"amount": 1.0, "name": "USD Coin", "optimized_symbol": "USDC", "price": 1.0, "logo_url": null}
                    ]},
                    {"asset_token_list": [
                        {"amount": 0.5, "name": "Ether", "optimized_symbol": "ETH", "price": 2000.0, "logo_url": null}
                    ]}
                ]},
                {"name": "Aave V3", "chain": "arb", "portfolio_item_list": []},
                {"name": "Aave V3", "chain": "eth", "portfolio_item_list": [
                    {"asset_token_list": [
                        {"amount": 2.0, "name": "Dai", "optimized_symbol": "DAI", "price": 1.0, "logo_url": null}
                    ]}
                ]}
            ]"#,
        )
        .unwrap();

        let pools = pools_from_projects(projects);
        assert_eq!(pools.len(), 2);
        assert!(pools["Aave V3 (arb)"].is_empty());
        let tickers: Vec<_> = pools["Aave V3 (eth)"].iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["USDC", "ETH", "DAI"]);
    }
}
