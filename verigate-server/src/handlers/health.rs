//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "unguarded" when no method is enabled
    pub status: &'static str,
    /// Server version from Cargo.toml
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
    /// Names of the active verification methods, in registration order
    pub methods: Vec<String>,
}

/// GET /health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let methods: Vec<String> = state
        .registry
        .iter()
        .map(|m| m.name().to_string())
        .collect();

    let status = if methods.is_empty() {
        "unguarded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        service: "verigate-server",
        methods,
    })
}
