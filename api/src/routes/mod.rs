pub mod ingress;
pub mod result_check;
pub mod trigger;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the whole entry-façade router (§6/§10.B): the webhook/web-tool
/// ingress, the result-check polling endpoint, and the shared-secret-gated
/// on-demand trigger carried over from the teacher's own `trigger_mr`/
/// `trigger_gitlab_mr` routes. CORS is permissive on all three, matching the
/// result-check endpoint's documented `Access-Control-Allow-*` headers; the
/// other two have no browser caller so this is a no-op for them in practice.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(ingress::ingress))
        .route("/result", get(result_check::result_check))
        .route("/trigger", post(trigger::trigger))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
