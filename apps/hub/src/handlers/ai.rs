// [apps/hub/src/handlers/ai.rs]
/*!
 * APARATO: AI ORCHESTRATION GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN HTTP DEL PIPELINE CLASSIFY->CONTEXT->PROMPT->IA
 */

use crate::errors::HubApiError;
use crate::middleware::{enforce_rate_limit, AuthenticatedUser};
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use hub_domain_models::context::ContextPacket;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub energy_consumed: i64,
    pub action: String,
    pub context: ContextPacket,
    pub new_balance: f64,
    pub tx_id: Uuid,
}

#[instrument(skip(state, identity, request))]
pub async fn chat(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HubApiError> {
    enforce_rate_limit(&state, "api.general", &identity.0.to_string()).await?;

    let outcome = state.ai.chat(identity.0, &request.message).await?;

    state
        .events
        .record(
            identity.0,
            hub_domain_models::event::EventType::AiResponseGenerated,
            serde_json::json!({ "action": outcome.action.as_str(), "energy_consumed": outcome.energy_consumed }),
            serde_json::Value::Null,
        )
        .await?;

    Ok(Json(ChatResponse {
        message: outcome.message,
        energy_consumed: outcome.energy_consumed,
        action: outcome.action.as_str().to_string(),
        context: outcome.context,
        new_balance: outcome.new_balance,
        tx_id: outcome.tx_id,
    }))
}
