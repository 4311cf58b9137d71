//! The phase-by-phase run.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregate::{Aggregate, Aggregator, PoolMap, Totals};
use crate::api::{ApiClient, ApiError};
use crate::config::CheckerConfig;
use crate::model::{CoinFilter, Task, TaskResult, Wallet};
use crate::observability::Progress;
use crate::orchestrator::phase::Phase;
use crate::orchestrator::selection::{selector_from_config, Selection, TargetSelector};
use crate::orchestrator::OrchestratorError;
use crate::pool::WorkerPool;
use crate::signing::SignerFactory;

/// Everything handed to reporting once a run completes.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ticker: Option<String>,
    pub min_usd: f64,
    pub aggregate: Aggregate,
    pub totals: Totals,
}

/// Drives one run through every phase.
pub struct Orchestrator {
    config: CheckerConfig,
    signers: SignerFactory,
    selector: Box<dyn TargetSelector>,
    progress: Progress,
    phase: Phase,
}

impl Orchestrator {
    /// Selector and progress follow the configuration.
    pub fn new(config: CheckerConfig, signers: SignerFactory) -> Self {
        let selector = selector_from_config(&config.selection);
        let progress = Progress::new(config.observability.progress);
        Self {
            config,
            signers,
            selector,
            progress,
            phase: Phase::DiscoverChains,
        }
    }

    pub fn with_selector(mut self, selector: Box<dyn TargetSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// The phase the last run reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        tracing::info!(from = %self.phase, to = %phase, "Phase transition");
        self.phase = phase;
    }

    /// Run every phase for `wallets`.
    pub async fn run(&mut self, wallets: &[Wallet]) -> Result<RunReport, OrchestratorError> {
        if wallets.is_empty() {
            return Err(OrchestratorError::NoWallets);
        }
        self.phase = Phase::DiscoverChains;
        tracing::info!(wallets = wallets.len(), phase = %self.phase, "Run started");

        let discovery = ApiClient::new(
            self.config.api.clone(),
            &self.config.retries,
            (self.signers)(),
        )?;
        let discovered = self.discover(&discovery, wallets).await;
        discovery.shutdown().await;
        let (chains, pools) = discovered?;

        self.enter(Phase::SelectTargets);
        let mut candidates: Vec<String> = chains.iter().cloned().collect();
        candidates.extend(pools.keys().cloned());
        let selection = self.selector.select(&candidates);
        tracing::info!(
            candidates = candidates.len(),
            targets = selection.targets.len(),
            min_usd = selection.min_usd,
            "Targets selected"
        );

        self.enter(Phase::FetchChainBalances);
        let mut pool = WorkerPool::spawn(
            self.config.workers.count,
            &self.config.api,
            &self.config.retries,
            &self.signers,
        )?;
        let fetched = self.fetch(&mut pool, wallets, &chains, &selection).await;

        self.enter(Phase::Shutdown);
        let shutdown = pool.shutdown().await;
        let results = fetched?;
        let report = shutdown?;
        tracing::debug!(
            workers = report.exits.len(),
            leftover = report.leftover,
            "Workers joined"
        );

        self.enter(Phase::Aggregated);
        let mut aggregator = Aggregator::new(&selection.targets, wallets);
        aggregator.merge_pools(&pools);
        aggregator.apply_all(results);
        let aggregate = aggregator.finish();
        let totals = Totals::compute(&aggregate, self.config.selection.ticker.as_deref());

        Ok(RunReport {
            ticker: self.config.selection.ticker.clone(),
            min_usd: selection.min_usd,
            aggregate,
            totals,
        })
    }

    /// Both discovery phases on the orchestrator's own client.
    async fn discover(
        &mut self,
        client: &ApiClient,
        wallets: &[Wallet],
    ) -> Result<(BTreeSet<String>, PoolMap), OrchestratorError> {
        let chains = self.discover_chains(client, wallets).await?;
        self.enter(Phase::DiscoverPools);
        let pools = self.discover_pools(client, wallets).await?;
        Ok((chains, pools))
    }

    async fn discover_chains(
        &self,
        client: &ApiClient,
        wallets: &[Wallet],
    ) -> Result<BTreeSet<String>, OrchestratorError> {
        let bar = self.progress.bar("chains", wallets.len());
        let mut chains = BTreeSet::new();

        for wallet in wallets {
            match client.used_chains(wallet).await {
                Ok(used) => {
                    tracing::debug!(wallet = %wallet, chains = used.len(), "Chains discovered");
                    chains.extend(used);
                }
                Err(ApiError::Signing(e)) if e.is_fatal() => {
                    bar.finish_and_clear();
                    tracing::error!(wallet = %wallet, error = %e, "Signer unavailable during chain discovery");
                    return Err(ApiError::Signing(e).into());
                }
                Err(e) => {
                    tracing::warn!(wallet = %wallet, error = %e, "Chain discovery failed, wallet skipped")
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        tracing::info!(chains = chains.len(), "Chain discovery finished");
        Ok(chains)
    }

    /// Every discovered pool lists every wallet, possibly with no coins.
    async fn discover_pools(
        &self,
        client: &ApiClient,
        wallets: &[Wallet],
    ) -> Result<PoolMap, OrchestratorError> {
        let bar = self.progress.bar("pools", wallets.len());
        let mut pools = PoolMap::new();

        for wallet in wallets {
            match client.project_list(wallet).await {
                Ok(found) => {
                    tracing::debug!(wallet = %wallet, pools = found.len(), "Pools discovered");
                    for (name, coins) in found {
                        pools.entry(name).or_default().insert(wallet.clone(), coins);
                    }
                }
                Err(ApiError::Signing(e)) if e.is_fatal() => {
                    bar.finish_and_clear();
                    tracing::error!(wallet = %wallet, error = %e, "Signer unavailable during pool discovery");
                    return Err(ApiError::Signing(e).into());
                }
                Err(e) => {
                    tracing::warn!(wallet = %wallet, error = %e, "Pool discovery failed, wallet skipped")
                }
            }
            bar.inc(1);
        }

        for per_wallet in pools.values_mut() {
            for wallet in wallets {
                per_wallet.entry(wallet.clone()).or_default();
            }
        }

        bar.finish_and_clear();
        tracing::info!(pools = pools.len(), "Pool discovery finished");
        Ok(pools)
    }

    /// Both fetch phases. Stops at the first phase that drained a failure.
    async fn fetch(
        &mut self,
        pool: &mut WorkerPool,
        wallets: &[Wallet],
        chains: &BTreeSet<String>,
        selection: &Selection,
    ) -> Result<Vec<TaskResult>, OrchestratorError> {
        let filter = CoinFilter::new(self.config.selection.ticker.clone(), selection.min_usd);
        let mut results = Vec::new();

        for chain in selection.targets.iter().filter(|t| chains.contains(*t)) {
            let tasks = wallets
                .iter()
                .map(|wallet| Task::ChainBalance {
                    wallet: wallet.clone(),
                    chain: chain.clone(),
                    filter: filter.clone(),
                })
                .collect();
            results.extend(self.barrier(pool, chain, tasks).await?);
            tracing::info!(chain = %chain, "Chain balances fetched");
        }

        self.enter(Phase::FetchWalletTotals);
        let tasks = wallets
            .iter()
            .map(|wallet| Task::WalletTotal {
                wallet: wallet.clone(),
            })
            .collect();
        results.extend(self.barrier(pool, "totals", tasks).await?);

        Ok(results)
    }

    /// Enqueue `tasks` and wait for exactly as many results.
    async fn barrier(
        &self,
        pool: &mut WorkerPool,
        label: &str,
        tasks: Vec<Task>,
    ) -> Result<Vec<TaskResult>, OrchestratorError> {
        let expected = tasks.len();
        let bar = self.progress.bar(label, expected);
        for task in tasks {
            pool.submit(task);
        }

        let drained = pool.collect(expected, |_| bar.inc(1)).await;
        bar.finish_and_clear();
        let results = drained?;

        let failed = results.iter().filter(|r| r.is_failure()).count();
        if failed > 0 {
            tracing::error!(phase = %self.phase, label, failed, expected, "Phase drained with failures");
        }
        let failure = results.iter().find_map(|result| match result {
            TaskResult::Failed {
                task,
                wallet,
                chain,
                error,
            } => Some(OrchestratorError::Fatal {
                task: *task,
                wallet: wallet.clone(),
                chain: chain.clone(),
                error: error.clone(),
            }),
            _ => None,
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}
