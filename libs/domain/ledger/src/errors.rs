// [libs/domain/ledger/src/errors.rs]
/*!
 * APARATO: LEDGER ERROR CATALOG (L2)
 * RESPONSABILIDAD: TRADUCCIÓN DE FALLOS DE REPOSITORIO A SEMÁNTICA DE NEGOCIO
 */

use thiserror::Error;
use uuid::Uuid;

/// Surfaced by whatever implements `EnergyRepository` (today, `hub-infra-db`).
/// Kept generic over the storage layer: the ledger never inspects a SQL
/// error code directly, only this catalog.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("[L2_LEDGER_REPO]: USER_NOT_FOUND -> {0}")]
    UserNotFound(Uuid),

    #[error("[L2_LEDGER_REPO]: TRANSACTION_NOT_FOUND -> {0}")]
    TransactionNotFound(Uuid),

    #[error("[L2_LEDGER_REPO]: INSUFFICIENT_BALANCE -> current {current}, requested {requested}")]
    InsufficientBalance { current: f64, requested: f64 },

    #[error("[L2_LEDGER_REPO]: UNAVAILABLE -> {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("[L2_LEDGER]: UNKNOWN_ACTION -> {0}")]
    UnknownAction(String),

    #[error("[L2_LEDGER]: INSUFFICIENT_ENERGY -> required {required}, current {current}, deficit {deficit}")]
    InsufficientEnergy { required: i64, current: f64, deficit: f64 },

    #[error("[L2_LEDGER]: CONFLICT -> {0}")]
    Conflict(String),

    #[error("[L2_LEDGER]: NOT_FOUND -> {0}")]
    NotFound(String),

    #[error("[L2_LEDGER]: UPSTREAM -> {0}")]
    Upstream(#[from] RepositoryError),
}
