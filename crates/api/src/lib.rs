//! HTTP API server for the order management service.
//!
//! Provides REST endpoints for accounts and orders, bearer-token
//! authentication, per-scope throttling, structured logging (tracing) and
//! Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod throttle;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::health::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::hello))
        .route("/health", get(routes::health::check))
        .route("/auth/signup", post(routes::accounts::signup::<S>))
        .route("/auth/login", post(routes::accounts::login::<S>))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/orders/{order_id}",
            get(routes::orders::get::<S>).delete(routes::orders::delete::<S>),
        )
        .route(
            "/orders/{order_id}/status",
            put(routes::orders::update_status::<S>),
        )
        .route("/orders/{order_id}/update", put(routes::orders::update::<S>))
        .route("/my/orders", get(routes::users::my_orders::<S>))
        .route("/my/orders/{order_id}", get(routes::users::my_order::<S>))
        .route("/user/{user_id}/orders", get(routes::users::user_orders::<S>))
        .route(
            "/user/{user_id}/orders/{order_id}",
            get(routes::users::user_order::<S>),
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

/// Creates the application state over `store`.
pub fn create_state<S: Store + Clone + 'static>(store: S, config: &Config) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, config))
}
