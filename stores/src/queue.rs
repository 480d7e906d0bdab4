//! In-process [`TaskQueue`]: an `mpsc` channel standing in for SQS. The
//! Dispatcher sends through the [`ChannelTaskQueue`] handle; `main.rs`
//! drains the paired [`tokio::sync::mpsc::Receiver`] into the Executor.

use async_trait::async_trait;
use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::model::TaskMessage;
use orchestrator_core::ports::TaskQueue;
use orchestrator_core::OrchestratorResult;
use tokio::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone)]
pub struct ChannelTaskQueue {
    tx: Sender<TaskMessage>,
}

impl ChannelTaskQueue {
    /// Buffered channel pair; `capacity` mirrors the SQS batch window size.
    pub fn new(capacity: usize) -> (Self, Receiver<TaskMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl TaskQueue for ChannelTaskQueue {
    async fn send(&self, message: TaskMessage) -> OrchestratorResult<()> {
        self.tx
            .send(message)
            .await
            .map_err(|e| OrchestratorError::Store(format!("queue closed: {e}")))
    }
}
