// [libs/domain/events/src/errors.rs]
/*!
 * APARATO: EVENT STORE ERROR CATALOG (L2)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventStoreError {
    #[error("[L2_EVENTS_REPO]: UNAVAILABLE -> {0}")]
    Unavailable(String),

    #[error("[L2_EVENTS]: INVALID_WINDOW -> {0}")]
    InvalidWindow(String),
}
