//! Task and result channels between the orchestrator and the workers.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::model::{Task, TaskResult};

/// Shared FIFO of tasks with any number of producers and consumers.
///
/// The receiving half sits behind an async mutex so exactly one waiting
/// worker takes each task.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Enqueue a task. Never fails while a `TaskQueue` handle exists.
    pub fn push(&self, task: Task) {
        // The queue holds its own receiver, so the channel cannot be closed.
        let _ = self.tx.send(task);
    }

    /// Wait for the next task.
    pub async fn pop(&self) -> Option<Task> {
        self.rx.lock().await.recv().await
    }

    /// Take a task if one is immediately available.
    pub async fn try_pop(&self) -> Option<Task> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Remove everything currently queued.
    pub async fn drain(&self) -> Vec<Task> {
        let mut rx = self.rx.lock().await;
        let mut drained = Vec::new();
        while let Ok(task) = rx.try_recv() {
            drained.push(task);
        }
        drained
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the result channel, cloned into every worker.
pub type ResultSender = mpsc::UnboundedSender<TaskResult>;

/// Consumer side of the result channel, owned by the orchestrator.
pub type ResultReceiver = mpsc::UnboundedReceiver<TaskResult>;

pub fn result_channel() -> (ResultSender, ResultReceiver) {
    mpsc::unbounded_channel()
}
