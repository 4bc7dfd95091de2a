//! Handler for health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service liveness and the configured accounting service.
///
/// # Endpoint
///
/// `GET /health`
///
/// The accounting service is not contacted: a login check would need real
/// credentials. The check only reports which company logins are sent for.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "accounting_service": {
///       "status": "ok",
///       "message": "Company: BFA"
///     }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            accounting_service: CheckStatus {
                status: "ok".to_string(),
                message: Some(format!("Company: {}", state.company)),
            },
        },
    })
}
