// [libs/infra/auth/src/errors.rs]
//! APARATO: AUTH ERROR CATALOG (L3)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("[L3_AUTH_TOKEN]: INVALID_OR_EXPIRED -> {0}")]
    InvalidToken(String),

    #[error("[L3_AUTH_HASH]: PASSWORD_HASH_FAULT -> {0}")]
    HashFault(String),

    #[error("[L3_AUTH_CREDENTIALS]: INVALID_CREDENTIALS")]
    InvalidCredentials,

    #[error("[L3_AUTH_SESSION]: SESSION_REUSE_DETECTED -> family {0} revoked")]
    SessionReuseDetected(uuid::Uuid),

    #[error("[L3_AUTH_SESSION]: SESSION_NOT_FOUND")]
    SessionNotFound,

    #[error("[L3_AUTH_STORE]: UNAVAILABLE -> {0}")]
    StoreUnavailable(String),
}
