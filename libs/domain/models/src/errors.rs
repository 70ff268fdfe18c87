// [libs/domain/models/src/errors.rs]
/*!
 * APARATO: ERROR TAXONOMY (L2)
 * RESPONSABILIDAD: CATALOGACIÓN NOMINAL DE FALLOS DE DOMINIO COMPARTIDOS
 *
 * Cada estrato superior (ledger, auth, db, apps/hub) define su propio enum
 * de error via `thiserror` y lo mapea a uno de estos `ErrorKind` en la
 * frontera HTTP. Este tipo es la única fuente de verdad para el contrato
 * `{error, message, details?}` descrito en la especificación.
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    InsufficientEnergy,
    RateLimited,
    CircuitOpen,
    UnknownAction,
    Conflict,
    NotFound,
    UpstreamUnavailable,
    InternalUnavailable,
}

impl ErrorKind {
    /// Código HTTP estable asociado a la categoría de fallo.
    pub fn http_status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::InsufficientEnergy => 402,
            ErrorKind::RateLimited => 429,
            ErrorKind::CircuitOpen => 503,
            ErrorKind::UnknownAction => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::UpstreamUnavailable => 502,
            ErrorKind::InternalUnavailable => 503,
        }
    }
}
