// [libs/domain/context/src/errors.rs]
/*!
 * APARATO: CONTEXT BUILDER ERROR CATALOG (L2)
 *
 * Nunca se propaga fuera de `ContextBuilder::build`: cualquier variante
 * aquí se convierte en `ContextPacket::empty` con `confidence = 0.1`.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextSourceError {
    #[error("[L2_CONTEXT_SOURCE]: UNAVAILABLE -> {0}")]
    Unavailable(String),
}
