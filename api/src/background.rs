//! The two always-running loops: the queue drain (standing in for many
//! concurrent Executor Lambda invocations, §5) and the cron reconciler
//! sweep (§4.F). Neither is a long-lived "process" in the spec's sense —
//! each iteration is the same short-lived handler invocation the real
//! deployment would run per message/per schedule tick; this just loops
//! them in-process instead of having a platform re-invoke them.

use std::sync::Arc;

use orchestrator_core::model::TaskMessage;
use tokio::sync::mpsc::Receiver;
use tracing::{error, info};

use crate::state::AppState;

/// Drains the task queue, spawning one Executor invocation per message so
/// many run concurrently, matching the platform's fan-out (§5).
pub async fn run_queue_drain(state: Arc<AppState>, mut rx: Receiver<TaskMessage>) {
    while let Some(message) = rx.recv().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let encoded = match dispatcher::encode_task_message(&message) {
                Ok(e) => e,
                Err(e) => {
                    error!(error = %e, "failed to encode task message for execution");
                    return;
                }
            };
            if let Err(e) = executor::execute_task_message(
                &encoded,
                &state.executor_config,
                state.llm.as_ref(),
                state.task_store.as_ref(),
                state.blob_store.as_ref(),
                state.request_store.as_ref(),
                state.reconciler.as_ref(),
            )
            .await
            {
                error!(identity = %message.identity, error = %e, "task execution failed terminally");
            }
        });
    }
    info!("task queue closed, queue drain loop exiting");
}

/// Periodic recovery sweep over stalled requests (§4.F cron reconciler).
pub async fn run_cron_sweep(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(state.config.cron_interval_secs));
    loop {
        interval.tick().await;
        if let Err(e) = state.reconciler.cron_sweep().await {
            error!(error = %e, "cron sweep failed");
        }
    }
}
