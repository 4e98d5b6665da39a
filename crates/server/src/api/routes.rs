use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{auth, batch, handlers, middleware::metrics_middleware, queue, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Queue
        .route(
            "/queue",
            get(queue::list_queue)
                .post(queue::enqueue)
                .delete(queue::clear_queue),
        )
        .route(
            "/queue/{id}",
            get(queue::get_item)
                .patch(queue::update_item)
                .delete(queue::remove_item),
        )
        // Batch
        .route("/batch", post(batch::start_batch))
        .route("/batch/status", get(batch::get_status))
        // Upload credential
        .route("/auth/status", get(auth::get_status))
        .route("/auth/consent", post(auth::request_consent))
        .route("/auth/callback", post(auth::consent_callback))
        .route("/auth/revoke", post(auth::revoke))
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
