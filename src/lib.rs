//! SupplyLink API Library
//!
//! Backend for the SupplyLink marketplace: street-food vendors discover
//! nearby raw-material suppliers, place orders, and settle on credit;
//! suppliers manage inventory and work the incoming-order queue.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
#[allow(elided_lifetimes_in_paths)]
pub mod migrator;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Routes for the `/api` surface.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/users", handlers::users::routes())
        .nest("/suppliers", handlers::suppliers::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/orders", handlers::orders::routes())
        .nest("/ratings", handlers::ratings::routes())
        .nest("/credit", handlers::credit::routes())
}

/// Builds the full application router: status + health + `/api`.
///
/// CORS and compression layers are applied by the binary on top of this,
/// since they depend on runtime configuration.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "supplylink-api up" }))
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
