//! Pool worker: pulls tasks, performs the retrieval, pushes results.

use crate::api::{ApiClient, ApiError};
use crate::model::{CoinFilter, Task, TaskResult, Wallet};
use crate::pool::queue::{ResultSender, TaskQueue};

/// Summary returned when a worker exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    pub id: usize,
    /// Non-poison tasks handled.
    pub processed: usize,
    /// Whether the worker forwarded the poison task before exiting.
    pub forwarded_poison: bool,
}

/// A single pool worker with its own authenticated client.
pub struct Worker {
    id: usize,
    client: ApiClient,
    tasks: TaskQueue,
    results: ResultSender,
}

impl Worker {
    pub fn new(id: usize, client: ApiClient, tasks: TaskQueue, results: ResultSender) -> Self {
        Self {
            id,
            client,
            tasks,
            results,
        }
    }

    /// Serve tasks until poisoned.
    pub async fn run(self) -> WorkerExit {
        tracing::debug!(worker = self.id, "Worker started");
        let mut processed = 0;
        let mut forwarded_poison = false;

        while let Some(task) = self.tasks.pop().await {
            tracing::trace!(worker = self.id, task = task.kind(), "Task received");
            let result = match task {
                Task::Poison => {
                    self.tasks.push(Task::Poison);
                    forwarded_poison = true;
                    break;
                }
                Task::ChainBalance {
                    wallet,
                    chain,
                    filter,
                } => self.chain_balance(wallet, chain, &filter).await,
                Task::WalletTotal { wallet } => self.wallet_total(wallet).await,
            };

            processed += 1;
            if self.results.send(result).is_err() {
                tracing::warn!(worker = self.id, "Result channel closed, worker exiting");
                break;
            }
        }

        self.client.shutdown().await;
        tracing::debug!(worker = self.id, processed, "Worker stopped");
        WorkerExit {
            id: self.id,
            processed,
            forwarded_poison,
        }
    }

    async fn chain_balance(&self, wallet: Wallet, chain: String, filter: &CoinFilter) -> TaskResult {
        match self.client.token_balances(&wallet, &chain).await {
            Ok(coins) => {
                let coins = filter.apply(coins);
                tracing::debug!(worker = self.id, wallet = %wallet, chain = %chain, kept = coins.len(), "Chain balance fetched");
                TaskResult::ChainBalance {
                    chain,
                    wallet,
                    coins,
                }
            }
            Err(e) => self.failed("chain_balance", wallet, Some(chain), e),
        }
    }

    async fn wallet_total(&self, wallet: Wallet) -> TaskResult {
        match self.client.latest_net_worth(&wallet).await {
            Ok(usd_value) => TaskResult::WalletTotal { wallet, usd_value },
            Err(e) => self.failed("wallet_total", wallet, None, e),
        }
    }

    fn failed(&self, task: &'static str, wallet: Wallet, chain: Option<String>, error: ApiError) -> TaskResult {
        tracing::error!(worker = self.id, task, wallet = %wallet, chain = ?chain, error = %error, "Task failed");
        TaskResult::Failed {
            task,
            wallet,
            chain,
            error: error.to_string(),
        }
    }
}
