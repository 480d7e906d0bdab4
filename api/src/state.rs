//! Shared application state wired once at startup and handed to every route
//! and background task (§5: the three stores, the queue and the notifier are
//! the only shared mutable state in the whole pipeline).

use std::sync::Arc;

use llm_client::LlmClient;
use orchestrator_core::ports::{BlobStore, RequestStore, TaskQueue, TaskStore};
use orchestrator_core::Mode;
use reconciler::Reconciler;
use source_control::SourceControlConfig;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub sc_config: SourceControlConfig,
    pub default_mode: Mode,

    pub request_store: Arc<dyn RequestStore>,
    pub task_store: Arc<dyn TaskStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub reconciler: Arc<Reconciler>,
    pub llm: Arc<dyn LlmClient>,
    pub executor_config: executor::ExecutorConfig,
}
