// [libs/domain/ledger/src/lib.rs]
/*!
 * APARATO: ENERGY LEDGER ROOT (L2)
 * RESPONSABILIDAD: EXPORTACIÓN DEL SERVICIO Y SU CONTRATO DE REPOSITORIO
 */

pub mod errors;
pub mod repository;
pub mod service;

pub mod prelude {
    pub use crate::errors::{LedgerError, RepositoryError};
    pub use crate::repository::EnergyRepository;
    pub use crate::service::{CanPerformOutcome, LedgerMovement, LedgerService};
}
