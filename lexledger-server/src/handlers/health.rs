use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::collections::HashMap;

use crate::server::LedgerServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub checks: HashMap<String, String>,
}

/// Health check handler; 503 when the database does not answer
pub async fn health_check(State(server): State<LedgerServer>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();
    let mut healthy = true;

    match &server.database {
        Some(pool) => {
            let ok = pool.is_healthy().await;
            healthy &= ok;
            checks.insert(
                "database".to_string(),
                if ok { "healthy" } else { "unreachable" }.to_string(),
            );
        }
        None => {
            checks.insert("database".to_string(), "in-memory".to_string());
        }
    }

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
