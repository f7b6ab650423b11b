use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/predict", post(handlers::predict))
        .route(
            "/api/users",
            post(handlers::register_user).get(handlers::list_users),
        )
        .route("/api/users/login", post(handlers::login_user))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
