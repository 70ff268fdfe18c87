// [apps/hub/src/handlers/energy.rs]
/*!
 * APARATO: ENERGY LEDGER GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN HTTP DE CAN_PERFORM / CONSUME / REFUND
 */

use crate::errors::HubApiError;
use crate::middleware::enforce_rate_limit;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use hub_domain_models::energy::{
    CanPerformRequest, CanPerformResponse, ConsumeRequest, ConsumeResponse, RefundRequest, RefundResponse,
};
use tracing::instrument;

#[instrument(skip(state, request), fields(user_id = %request.user_id, action = %request.action))]
pub async fn can_perform(
    State(state): State<AppState>,
    Json(request): Json<CanPerformRequest>,
) -> Result<Json<CanPerformResponse>, HubApiError> {
    let outcome = state.ledger.can_perform(request.user_id, &request.action).await?;
    Ok(Json(CanPerformResponse {
        allowed: outcome.allowed,
        required: outcome.required,
        current: outcome.current,
        deficit: outcome.deficit,
        is_unlimited: outcome.is_unlimited,
    }))
}

#[instrument(skip(state, request), fields(user_id = %request.user_id, action = %request.action))]
pub async fn consume(
    State(state): State<AppState>,
    Json(request): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, HubApiError> {
    enforce_rate_limit(&state, "api.energy", &request.user_id.to_string()).await?;

    let movement = state.ledger.consume(request.user_id, &request.action, &request.idempotency_key).await?;

    state
        .events
        .record(
            request.user_id,
            hub_domain_models::event::EventType::EnergyConsumed,
            serde_json::json!({ "action": request.action, "tx_id": movement.tx_id }),
            serde_json::Value::Null,
        )
        .await?;

    Ok(Json(ConsumeResponse { new_balance: movement.new_balance, tx_id: movement.tx_id }))
}

#[instrument(skip(state, request), fields(user_id = %request.user_id, action_event_id = %request.action_event_id))]
pub async fn refund(
    State(state): State<AppState>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, HubApiError> {
    let movement = state.ledger.refund(request.user_id, request.action_event_id, request.reason).await?;

    state
        .events
        .record(
            request.user_id,
            hub_domain_models::event::EventType::EnergyRefunded,
            serde_json::json!({ "action_event_id": request.action_event_id, "tx_id": movement.tx_id }),
            serde_json::Value::Null,
        )
        .await?;

    Ok(Json(RefundResponse { new_balance: movement.new_balance, tx_id: movement.tx_id }))
}
