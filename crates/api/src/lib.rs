//! HTTP API server for the order lifecycle service.
//!
//! Provides the four order endpoints plus health and Prometheus metrics,
//! with structured logging (tracing) on every request.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{LifecycleConfig, OrderLifecycle};
use metrics_exporter_prometheus::PrometheusHandle;
use notifications::NotificationPublisher;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// Unknown paths, and unsupported methods on known paths, answer 404.
pub fn create_app<R, P>(state: Arc<AppState<R, P>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderRepository + 'static,
    P: NotificationPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            post(routes::orders::create::<R, P>)
                .get(routes::orders::list::<R, P>)
                .fallback(routes::not_found),
        )
        .route(
            "/orders/{order_id}",
            get(routes::orders::get::<R, P>).fallback(routes::not_found),
        )
        .route(
            "/orders/{order_id}/status",
            put(routes::orders::update_status::<R, P>).fallback(routes::not_found),
        )
        .with_state(state)
        .merge(metrics_router)
        .fallback(routes::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a repository and publisher into shared application state.
pub fn create_state<R, P>(repository: R, publisher: P, config: LifecycleConfig) -> Arc<AppState<R, P>>
where
    R: OrderRepository,
    P: NotificationPublisher,
{
    Arc::new(AppState {
        lifecycle: OrderLifecycle::with_config(repository, publisher, config),
    })
}
