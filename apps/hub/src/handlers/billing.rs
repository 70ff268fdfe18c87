// [apps/hub/src/handlers/billing.rs]
/*!
 * APARATO: BILLING GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN HTTP DE INTENT/CONFIRM/REFUND DE PAGOS
 */

use crate::errors::HubApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use hub_domain_billing::dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse, RefundRequestRequest,
    RefundRequestResponse,
};
use tracing::instrument;

#[instrument(skip(state, request), fields(user_id = %request.user_id, pack = ?request.pack))]
pub async fn create_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, HubApiError> {
    let response = state.billing.create_intent(request).await?;
    Ok(Json(response))
}

#[instrument(skip(state, request), fields(user_id = %request.user_id, intent_id = %request.intent_id))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, HubApiError> {
    let response = state.billing.confirm_payment(request).await?;
    Ok(Json(response))
}

#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn refund_energy(
    State(state): State<AppState>,
    Json(request): Json<RefundRequestRequest>,
) -> Result<Json<RefundRequestResponse>, HubApiError> {
    let response = state.billing.refund_energy(request).await?;
    Ok(Json(response))
}
