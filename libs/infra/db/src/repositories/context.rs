// [libs/infra/db/src/repositories/context.rs]
/*!
 * APARATO: CONTEXT SOURCE REPOSITORY (L3)
 * RESPONSABILIDAD: COMPOSICIÓN DE EVENTOS + ENERGÍA + CUENTA PARA EL
 * CONSTRUCTOR DE CONTEXTO NARRATIVO
 *
 * `ContextBuilder` nunca sabe que esto vive detrás de tres tablas
 * distintas; solo ve el trait `ContextSource`.
 */

use crate::client::HubDbClient;
use crate::errors::DbError;
use crate::repositories::energy::EnergyRepositoryImpl;
use crate::repositories::events::EventRepositoryImpl;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hub_domain_context::errors::ContextSourceError;
use hub_domain_context::source::ContextSource;
use hub_domain_events::repository::EventRepository;
use hub_domain_ledger::repository::EnergyRepository;
use hub_domain_models::energy::Energy;
use hub_domain_models::event::{DomainEvent, EventQuery};
use libsql::params;
use uuid::Uuid;

impl From<DbError> for ContextSourceError {
    fn from(err: DbError) -> Self {
        ContextSourceError::Unavailable(err.to_string())
    }
}

pub struct ContextSourceRepository {
    client: HubDbClient,
    energy: EnergyRepositoryImpl,
    events: EventRepositoryImpl,
}

impl ContextSourceRepository {
    pub fn new(client: HubDbClient) -> Self {
        Self {
            energy: EnergyRepositoryImpl::new(client.clone()),
            events: EventRepositoryImpl::new(client.clone()),
            client,
        }
    }
}

#[async_trait]
impl ContextSource for ContextSourceRepository {
    async fn recent_events(&self, user_id: Uuid, window: Duration) -> Result<Vec<DomainEvent>, ContextSourceError> {
        let query = EventQuery { since: Some(Utc::now() - window), until: None, types: vec![] };
        self.events
            .query(user_id, &query, hub_domain_models::event::MAX_EVENTS_PER_PAGE)
            .await
            .map_err(|e| ContextSourceError::Unavailable(e.to_string()))
    }

    async fn energy(&self, user_id: Uuid) -> Result<Energy, ContextSourceError> {
        self.energy.get_energy(user_id).await.map_err(|e| ContextSourceError::Unavailable(e.to_string()))
    }

    async fn account_age_days(&self, user_id: Uuid) -> Result<i64, ContextSourceError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        let mut rows = conn
            .query("SELECT created_at FROM users WHERE user_id = ?1", params![user_id.to_string()])
            .await
            .map_err(DbError::from)?;

        let row = rows.next().await.map_err(DbError::from)?.ok_or_else(|| ContextSourceError::Unavailable(format!("user {user_id} not found")))?;
        let created_raw: String = row.get(0).map_err(DbError::from)?;
        let created_at = DateTime::parse_from_rfc3339(&created_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok((Utc::now() - created_at).num_days().max(0))
    }

    async fn plan_name(&self, user_id: Uuid) -> Result<String, ContextSourceError> {
        let energy = self.energy(user_id).await?;
        Ok(if energy.is_unlimited() { "unlimited".to_string() } else { "standard".to_string() })
    }
}
