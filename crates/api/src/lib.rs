//! HTTP API serving the video ratings read model.
//!
//! Exposes the two rating reads as REST endpoints, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use ratings::{RatingsReadModel, Session};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::ratings::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Session + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/videos/{video_id}/rating", get(routes::ratings::video::<S>))
        .route(
            "/videos/{video_id}/ratings/{user_id}",
            get(routes::ratings::from_user::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a session.
pub fn create_state<S: Session>(session: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        read_model: RatingsReadModel::new(session),
    })
}
