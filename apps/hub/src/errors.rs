// [apps/hub/src/errors.rs]
/*!
 * APARATO: HTTP ERROR BOUNDARY (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN DE TODO FALLO DE DOMINIO A `{error, message, details?}`
 *
 * Cada enum de error de los estratos L1/L2/L3 inferiores converge aquí
 * en un único `HubApiError`, que es la única fuente de verdad para el
 * código HTTP devuelto (vía `ErrorKind::http_status_code`).
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hub_core_reliability::errors::KeyManagerError;
use hub_domain_ai::errors::AiError;
use hub_domain_billing::errors::BillingError;
use hub_domain_events::errors::EventStoreError;
use hub_domain_ledger::errors::{LedgerError, RepositoryError};
use hub_domain_models::errors::ErrorKind;
use hub_infra_auth::errors::AuthError;
use hub_infra_db::errors::DbError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubApiError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("insufficient energy")]
    InsufficientEnergy { required: i64, current: f64, deficit: f64 },

    #[error("rate limited")]
    RateLimited { retry_after_seconds: u64 },

    #[error("upstream circuit open")]
    CircuitOpen,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HubApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            HubApiError::Validation(_) => ErrorKind::Validation,
            HubApiError::Unauthorized => ErrorKind::Unauthorized,
            HubApiError::Forbidden => ErrorKind::Forbidden,
            HubApiError::InsufficientEnergy { .. } => ErrorKind::InsufficientEnergy,
            HubApiError::RateLimited { .. } => ErrorKind::RateLimited,
            HubApiError::CircuitOpen => ErrorKind::CircuitOpen,
            HubApiError::UnknownAction(_) => ErrorKind::UnknownAction,
            HubApiError::Conflict(_) => ErrorKind::Conflict,
            HubApiError::NotFound(_) => ErrorKind::NotFound,
            HubApiError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            HubApiError::Internal(_) => ErrorKind::InternalUnavailable,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            HubApiError::InsufficientEnergy { required, current, deficit } => Some(serde_json::json!({
                "required": required,
                "current": current,
                "deficit": deficit,
            })),
            HubApiError::RateLimited { retry_after_seconds } => {
                Some(serde_json::json!({ "retry_after_seconds": retry_after_seconds }))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for HubApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind().http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope { error: self.kind(), message: self.to_string(), details: self.details() };
        (status, Json(envelope)).into_response()
    }
}

impl From<LedgerError> for HubApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownAction(action) => HubApiError::UnknownAction(action),
            LedgerError::InsufficientEnergy { required, current, deficit } => {
                HubApiError::InsufficientEnergy { required, current, deficit }
            }
            LedgerError::Conflict(reason) => HubApiError::Conflict(reason),
            LedgerError::NotFound(reason) => HubApiError::NotFound(reason),
            LedgerError::Upstream(repo_err) => repo_err.into(),
        }
    }
}

impl From<RepositoryError> for HubApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UserNotFound(id) => HubApiError::NotFound(format!("user {id}")),
            RepositoryError::TransactionNotFound(id) => HubApiError::NotFound(format!("transaction {id}")),
            RepositoryError::InsufficientBalance { current, requested } => HubApiError::InsufficientEnergy {
                required: requested as i64,
                current,
                deficit: (requested - current).max(0.0),
            },
            RepositoryError::Unavailable(reason) => HubApiError::UpstreamUnavailable(reason),
        }
    }
}

impl From<AiError> for HubApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Ledger(ledger_err) => ledger_err.into(),
            AiError::ProviderUnavailable(reason) => HubApiError::UpstreamUnavailable(reason),
        }
    }
}

impl From<BillingError> for HubApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::UnknownPack(code) => HubApiError::Validation(format!("unknown pack: {code}")),
            BillingError::ProviderUnavailable(reason) => HubApiError::UpstreamUnavailable(reason),
            BillingError::ProviderRejected(reason) => HubApiError::Validation(reason),
            BillingError::IntentNotFound(id) => HubApiError::NotFound(format!("payment intent {id}")),
            BillingError::Ledger(ledger_err) => ledger_err.into(),
        }
    }
}

impl From<AuthError> for HubApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) => HubApiError::Unauthorized,
            AuthError::InvalidCredentials => HubApiError::Unauthorized,
            AuthError::SessionReuseDetected(_) => HubApiError::Unauthorized,
            AuthError::SessionNotFound => HubApiError::Unauthorized,
            AuthError::HashFault(reason) => HubApiError::Internal(reason),
            AuthError::StoreUnavailable(reason) => HubApiError::UpstreamUnavailable(reason),
        }
    }
}

impl From<DbError> for HubApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(reason) => HubApiError::NotFound(reason),
            other => HubApiError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<EventStoreError> for HubApiError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::InvalidWindow(reason) => HubApiError::Validation(reason),
            EventStoreError::Unavailable(reason) => HubApiError::UpstreamUnavailable(reason),
        }
    }
}

impl From<KeyManagerError> for HubApiError {
    fn from(err: KeyManagerError) -> Self {
        HubApiError::Internal(err.to_string())
    }
}
