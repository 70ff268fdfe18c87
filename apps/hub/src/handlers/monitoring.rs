// [apps/hub/src/handlers/monitoring.rs]
/*!
 * APARATO: OBSERVABILITY GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN DE MÉTRICAS Y ESTADO DEL SUSTRATO DE CONFIABILIDAD
 */

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use hub_core_reliability::cache::CacheStats;
use hub_core_reliability::keys::KeyStatus;
use hub_core_reliability::metrics::AlertStatus;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CacheReport {
    pub context_cache: CacheStats,
}

pub async fn cache(State(state): State<AppState>) -> Json<CacheReport> {
    Json(CacheReport { context_cache: state.ai.context_cache_stats() })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReport {
    pub db_circuit_state: String,
}

pub async fn pool(State(state): State<AppState>) -> Json<PoolReport> {
    Json(PoolReport { db_circuit_state: format!("{:?}", state.db_pool.breaker_state()) })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitReport {
    pub uses_redis_primary: bool,
}

pub async fn rate_limit(State(state): State<AppState>) -> Json<RateLimitReport> {
    Json(RateLimitReport { uses_redis_primary: state.rate_limiter.uses_primary() })
}

pub async fn keys(State(state): State<AppState>) -> Json<Vec<KeyStatus>> {
    Json(state.keys.status())
}

pub async fn alerts(State(state): State<AppState>) -> Json<Vec<AlertStatus>> {
    Json(state.metrics.evaluate_alerts())
}
