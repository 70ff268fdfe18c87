// [libs/domain/events/src/lib.rs]
/*!
 * APARATO: EVENT DOMAIN ROOT (L2)
 * RESPONSABILIDAD: EXPORTACIÓN DEL SERVICIO DE EVENTOS Y SU CONTRATO
 */

pub mod errors;
pub mod repository;
pub mod service;

pub mod prelude {
    pub use crate::errors::EventStoreError;
    pub use crate::repository::EventRepository;
    pub use crate::service::EventService;
}
