//! HTTP API server for warehouse inventory.
//!
//! Provides CRUD endpoints for warehouses, bin locations and stock items,
//! and the stock adjustment and stock count operations, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use inventory_store::InventoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{bin_locations, stock, stock_items, warehouses};

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: InventoryStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/stockadjustment", post(stock::adjust::<S>))
        .route(
            "/api/stockadjustment/{stock_item}",
            post(stock::adjust_item::<S>),
        )
        .route("/api/stockcount", post(stock::count::<S>))
        .route("/api/stockcount/{stock_item}", post(stock::count_item::<S>))
        .route(
            "/api/warehouses",
            get(warehouses::list::<S>)
                .post(warehouses::create::<S>)
                .put(warehouses::upsert_from_body::<S>)
                .delete(warehouses::delete_many::<S>),
        )
        .route(
            "/api/warehouses/{id}",
            get(warehouses::get::<S>)
                .post(warehouses::create_with_id::<S>)
                .put(warehouses::upsert::<S>)
                .delete(warehouses::delete::<S>),
        )
        .route(
            "/api/binlocations",
            get(bin_locations::list::<S>)
                .post(bin_locations::create::<S>)
                .put(bin_locations::upsert_from_body::<S>)
                .delete(bin_locations::delete_many::<S>),
        )
        .route(
            "/api/binlocations/{id}",
            get(bin_locations::get::<S>)
                .post(bin_locations::create_with_id::<S>)
                .put(bin_locations::upsert::<S>)
                .delete(bin_locations::delete::<S>),
        )
        .route(
            "/api/binlocations/warehouseid/{id}",
            get(bin_locations::by_warehouse::<S>),
        )
        .route(
            "/api/binlocations/stockItems/{id}",
            get(bin_locations::stock_items::<S>),
        )
        .route(
            "/api/stockitems",
            get(stock_items::list::<S>)
                .post(stock_items::create::<S>)
                .put(stock_items::upsert_from_body::<S>)
                .delete(stock_items::delete_many::<S>),
        )
        .route(
            "/api/stockitems/{id}",
            get(stock_items::get::<S>)
                .post(stock_items::create_with_id::<S>)
                .put(stock_items::upsert::<S>)
                .delete(stock_items::delete::<S>),
        )
        .route(
            "/api/stockitems/binlocationid/{id}",
            get(bin_locations::stock_items::<S>),
        )
        .route(
            "/api/stockitems/binLocations/{id}",
            get(stock_items::bin_locations::<S>),
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
