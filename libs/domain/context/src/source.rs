// [libs/domain/context/src/source.rs]
/*!
 * APARATO: CONTEXT SOURCE CONTRACT (L2)
 * RESPONSABILIDAD: FRONTERA ENTRE EL CONSTRUCTOR Y SUS DATOS CRUDOS
 *
 * `hub-infra-db` implementa este trait combinando su repositorio de
 * eventos y de energía; `ContextBuilder` nunca sabe cuál de los dos
 * backends respondió.
 */

use crate::errors::ContextSourceError;
use async_trait::async_trait;
use chrono::Duration;
use hub_domain_models::energy::Energy;
use hub_domain_models::event::DomainEvent;
use uuid::Uuid;

#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn recent_events(&self, user_id: Uuid, window: Duration) -> Result<Vec<DomainEvent>, ContextSourceError>;

    async fn energy(&self, user_id: Uuid) -> Result<Energy, ContextSourceError>;

    async fn account_age_days(&self, user_id: Uuid) -> Result<i64, ContextSourceError>;

    async fn plan_name(&self, user_id: Uuid) -> Result<String, ContextSourceError>;
}
