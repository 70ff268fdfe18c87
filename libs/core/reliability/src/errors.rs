// [libs/core/reliability/src/errors.rs]
/*!
 * APARATO: RELIABILITY ERROR CATALOG (L1)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL SUSTRATO
 */

use std::fmt;
use thiserror::Error;

/// Error surfaced by `ConnectionPool::execute` after retries are exhausted.
/// The cache and rate limiter never surface errors to callers; only the
/// pool does, since its whole contract is "propagate the last failure
/// unchanged".
#[derive(Error, Debug)]
pub enum PoolError<E: fmt::Display + fmt::Debug> {
    #[error("[L1_POOL_FAULT]: CIRCUIT_OPEN -> retry after breaker cool-down")]
    CircuitOpen,

    #[error("[L1_POOL_FAULT]: CALL_TIMEOUT -> operation exceeded the configured deadline")]
    Timeout,

    #[error("[L1_POOL_FAULT]: UPSTREAM_ERROR -> {0}")]
    Upstream(E),
}

#[derive(Error, Debug)]
pub enum KeyManagerError {
    #[error("[L1_KEY_FAULT]: PROVIDER_SECRET_MISSING -> {0}")]
    SecretMissing(String),

    #[error("[L1_KEY_FAULT]: UNKNOWN_PROVIDER -> {0}")]
    UnknownProvider(String),
}
