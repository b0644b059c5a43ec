//! REST API routes.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::api::auth::{self, ApiKey};
use crate::api::{logs, ws};
use crate::config::Config;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let api_routes = Router::new()
        .route("/v1/logs", get(logs::list_logs).post(logs::create_log))
        .route("/v1/logs/feed", get(ws::feed_handler))
        .route(
            "/v1/logs/:id",
            get(logs::get_log)
                .patch(logs::update_log)
                .delete(logs::delete_log),
        );

    let api_routes = match config.api_key.as_deref() {
        Some(key) => api_routes.route_layer(middleware::from_fn_with_state(
            ApiKey(Arc::new(key.to_string())),
            auth::require_api_key,
        )),
        None => api_routes,
    };

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(api_routes)
}
