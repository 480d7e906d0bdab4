//! Entry point wiring (§6): builds the in-process stores, the LLM transport
//! and the Reconciler, then serves the two HTTP façades while the queue
//! drain and cron sweep run as background tasks alongside the web server.

pub mod background;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use orchestrator_core::ports::{BlobStore, Notifier, RequestStore, TaskQueue, TaskStore};
use orchestrator_core::Mode;
use reconciler::Reconciler;
use source_control::{ProviderKind, SourceControlClient, SourceControlConfig};

use crate::config::Config;
use crate::state::AppState;

pub async fn start() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let sc_config = SourceControlConfig {
        github_api: config.github_api_base.clone(),
        gitlab_api: config.gitlab_api_base.clone(),
    };

    let request_store: Arc<dyn RequestStore> = Arc::new(stores::InMemoryRequestStore::new());
    let task_store: Arc<dyn TaskStore> = Arc::new(stores::InMemoryTaskStore::new());
    let blob_store: Arc<dyn BlobStore> = Arc::new(stores::FsBlobStore::new());
    let notifier: Arc<dyn Notifier> = Arc::new(stores::LogNotifier);
    let (queue, rx) = stores::ChannelTaskQueue::new(256);
    let task_queue: Arc<dyn TaskQueue> = Arc::new(queue);

    // The Reconciler posts PR comments as itself, independent of whichever
    // token the originating request carried (§4.F: GitHub-only comment step).
    let comment_client = SourceControlClient::new(ProviderKind::GitHub, &sc_config, config.access_token.clone());
    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&request_store),
        Arc::clone(&task_store),
        Arc::clone(&blob_store),
        notifier,
        comment_client,
        reconciler::DEFAULT_TEMPLATE.to_string(),
    ));

    let llm = Arc::new(llm_client::BedrockHttpClient::new(
        config.bedrock_runtime_base(),
        config.bedrock_access_key.clone(),
        config.bedrock_secret_key.clone(),
    ));

    let executor_config = executor::ExecutorConfig {
        sqs_base_delay_secs: config.sqs_base_delay_secs,
        sqs_max_delay_secs: config.sqs_max_delay_secs,
        sqs_max_retries: config.sqs_max_retries,
        max_token_to_sample: config.max_token_to_sample,
        temperature: config.temperature,
        top_p: config.top_p,
    };

    let default_mode = Mode::parse(&config.default_mode).unwrap_or(Mode::All);
    let bind_addr = config.bind_addr.clone();

    let state = Arc::new(AppState {
        config,
        sc_config,
        default_mode,
        request_store,
        task_store,
        blob_store,
        task_queue,
        reconciler,
        llm,
        executor_config,
    });

    tokio::spawn(background::run_queue_drain(Arc::clone(&state), rx));
    tokio::spawn(background::run_cron_sweep(Arc::clone(&state)));

    let app = routes::router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "code review orchestrator listening");
    axum::serve(listener, app).await?;

    Ok(())
}
