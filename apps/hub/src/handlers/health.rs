// [apps/hub/src/handlers/health.rs]
/*!
 * APARATO: LIVENESS GATEWAY (ESTRATO L3)
 */

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_circuit: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, db_circuit) = match state.is_operational() {
        Ok(()) => ("ok", format!("{:?}", state.db_pool.breaker_state())),
        Err(_) => ("degraded", format!("{:?}", state.db_pool.breaker_state())),
    };
    Json(HealthResponse { status, db_circuit })
}
