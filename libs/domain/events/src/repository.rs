// [libs/domain/events/src/repository.rs]
/*!
 * APARATO: EVENT STORE CONTRACT (L2)
 * RESPONSABILIDAD: FRONTERA ENTRE LA LÓGICA DE EVENTOS Y SU PERSISTENCIA
 */

use crate::errors::EventStoreError;
use async_trait::async_trait;
use hub_domain_models::event::{DomainEvent, EventQuery};
use uuid::Uuid;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Appends one already-masked event. Implementations must not mask
    /// payloads themselves; that is `EventService::record`'s job, so the
    /// repository stays a dumb append-only log.
    async fn append(&self, event: DomainEvent) -> Result<(), EventStoreError>;

    async fn query(
        &self,
        user_id: Uuid,
        query: &EventQuery,
        limit: usize,
    ) -> Result<Vec<DomainEvent>, EventStoreError>;
}
