//! Worker pool subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → queue.rs TaskQueue::push (N tasks for a phase)
//!     → worker.rs (each worker: pop → ApiClient → push TaskResult)
//!     → result channel
//!     → WorkerPool::collect (blocks until exactly N results: phase barrier)
//!
//! Shutdown:
//!     Poison → worker forwards Poison, exits → next worker ... → all exited
//!     → trailing forwarded Poison drained, queue empty
//! ```
//!
//! # Design Decisions
//! - Fixed worker count chosen by the caller
//! - Each worker builds its own client and signer from the factory
//! - Cooperative shutdown via poison rebroadcast; no preemptive cancel
//! - The pool keeps no result sender, so a dead pool closes the channel
//!   instead of hanging a barrier

pub mod queue;
pub mod worker;

use futures_util::future::join_all;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiResult};
use crate::config::{ApiConfig, RetryConfig};
use crate::model::{Task, TaskResult};
use crate::signing::SignerFactory;

pub use queue::{result_channel, ResultReceiver, ResultSender, TaskQueue};
pub use worker::{Worker, WorkerExit};

/// Errors raised by the pool itself.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Every worker is gone before the barrier was satisfied.
    #[error("result channel closed after {received} of {expected} results")]
    Closed { received: usize, expected: usize },

    /// A worker task panicked or was aborted.
    #[error("worker {id} did not exit cleanly: {reason}")]
    Join { id: usize, reason: String },
}

/// What shutdown observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub exits: Vec<WorkerExit>,
    /// Tasks still queued after every worker exited (the forwarded poison).
    pub leftover: usize,
}

/// A fixed-size set of workers sharing one task queue and one result channel.
pub struct WorkerPool {
    tasks: TaskQueue,
    results: ResultReceiver,
    handles: Vec<JoinHandle<WorkerExit>>,
}

impl WorkerPool {
    /// Start `count` workers, each with a fresh client and signer.
    pub fn spawn(
        count: usize,
        api: &ApiConfig,
        retry: &RetryConfig,
        signers: &SignerFactory,
    ) -> ApiResult<Self> {
        let mut clients = Vec::with_capacity(count);
        for _ in 0..count {
            clients.push(ApiClient::new(api.clone(), retry, signers())?);
        }
        Ok(Self::with_clients(clients))
    }

    /// Start one worker per client.
    pub fn with_clients(clients: Vec<ApiClient>) -> Self {
        let tasks = TaskQueue::new();
        let (tx, results) = result_channel();

        let handles = clients
            .into_iter()
            .enumerate()
            .map(|(id, client)| {
                let worker = Worker::new(id, client, tasks.clone(), tx.clone());
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        tracing::info!(workers = handles.len(), "Worker pool started");
        Self {
            tasks,
            results,
            handles,
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn submit(&self, task: Task) {
        self.tasks.push(task);
    }

    /// Block until exactly `expected` results arrived.
    pub async fn collect(
        &mut self,
        expected: usize,
        mut on_result: impl FnMut(&TaskResult),
    ) -> Result<Vec<TaskResult>, PoolError> {
        let mut received = Vec::with_capacity(expected);
        while received.len() < expected {
            match self.results.recv().await {
                Some(result) => {
                    on_result(&result);
                    received.push(result);
                }
                None => {
                    return Err(PoolError::Closed {
                        received: received.len(),
                        expected,
                    })
                }
            }
        }
        Ok(received)
    }

    /// Send one poison task, wait for every worker, then empty the queue.
    pub async fn shutdown(self) -> Result<ShutdownReport, PoolError> {
        self.tasks.push(Task::Poison);

        let joined = join_all(self.handles).await;
        let mut exits = Vec::with_capacity(joined.len());
        let mut failure = None;
        for (id, joined) in joined.into_iter().enumerate() {
            match joined {
                Ok(exit) => exits.push(exit),
                Err(e) => {
                    tracing::error!(worker = id, error = %e, "Worker did not exit cleanly");
                    failure.get_or_insert(PoolError::Join {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let leftover = self.tasks.drain().await;
        if leftover.iter().any(|t| *t != Task::Poison) {
            tracing::warn!(count = leftover.len(), "Unprocessed tasks left at shutdown");
        }
        tracing::info!(workers = exits.len(), "Worker pool stopped");

        match failure {
            Some(e) => Err(e),
            None => Ok(ShutdownReport {
                exits,
                leftover: leftover.len(),
            }),
        }
    }
}
