// [apps/hub/src/handlers/auth.rs]
/*!
 * APARATO: AUTH GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO, LOGIN, ROTACIÓN DE REFRESH Y PERFIL
 */

use crate::errors::HubApiError;
use crate::middleware::{enforce_rate_limit, AuthenticatedUser};
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use hub_domain_models::user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserSummary};
use hub_infra_auth::password::{hash_password, verify_password};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, HubApiError> {
    if let Some(existing) = state.users.find_by_email(&request.email).await? {
        if existing.is_active() {
            return Err(HubApiError::Conflict(format!("email {} already registered", request.email)));
        }
    }

    let password_hash = hash_password(&request.password)?;
    let user = state.users.register(&request.email, &password_hash, request.name).await?;

    let access_token = state.tokens.issue_access_token(user.user_id)?;
    let rotation = state.sessions.issue(user.user_id, None).await?;

    state
        .events
        .record(user.user_id, hub_domain_models::event::EventType::UserRegistered, serde_json::json!({}), serde_json::Value::Null)
        .await?;

    info!("🆕 [AUTH]: user {} registered", user.user_id);

    Ok(Json(RegisterResponse {
        access_token,
        refresh_token: rotation.raw_refresh_token,
        user_id: user.user_id,
        email: user.email,
    }))
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HubApiError> {
    enforce_rate_limit(&state, "auth.login", &request.email).await?;

    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .filter(|user| user.is_active())
        .ok_or(HubApiError::Unauthorized)?;

    if !verify_password(&request.password, &user.password_hash)? {
        let _ = state
            .events
            .record(user.user_id, hub_domain_models::event::EventType::LoginFailed, serde_json::json!({}), serde_json::Value::Null)
            .await;
        warn!("🔒 [AUTH]: failed login attempt for {}", request.email);
        return Err(HubApiError::Unauthorized);
    }

    let access_token = state.tokens.issue_access_token(user.user_id)?;
    let rotation = state.sessions.issue(user.user_id, None).await?;

    state
        .events
        .record(user.user_id, hub_domain_models::event::EventType::LoginSucceeded, serde_json::json!({}), serde_json::Value::Null)
        .await?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token: rotation.raw_refresh_token,
        user_id: user.user_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[instrument(skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, HubApiError> {
    let rotation = state.sessions.rotate(&request.refresh_token).await?;
    let access_token = state.tokens.issue_access_token(rotation.session.user_id)?;
    Ok(Json(RefreshResponse { access_token, refresh_token: rotation.raw_refresh_token }))
}

#[instrument(skip(state, identity))]
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
) -> Result<Json<UserSummary>, HubApiError> {
    let user = state.users.find_by_id(identity.0).await?.ok_or(HubApiError::Unauthorized)?;
    let energy = state.ledger.balance(identity.0).await?;

    Ok(Json(UserSummary {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        is_unlimited: energy.is_unlimited(),
        current_energy: energy.current_energy,
    }))
}
