//! LexLedger HTTP server - ledger and trust accounting API
//!
//! Thin JSON handlers over [`accounting_service::AccountingService`]. Domain
//! errors map to statuses by category: validation 422, not found 404,
//! conflict 409, storage 503.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::*;
pub use server::LedgerServer;

use axum::{middleware::from_fn, Router};
use config_engine::ServerConfig;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
pub fn create_app(server: LedgerServer, config: &ServerConfig) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer(&config.cors_allowed_origins))
                .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
