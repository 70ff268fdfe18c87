// [libs/domain/events/src/service.rs]
/*!
 * =================================================================
 * APARATO: EVENT STORE SERVICE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: ENMASCARADO, VENTANEO Y PAGINACIÓN DE EVENTOS
 *
 * Ningún llamador fuera de este módulo debería construir un `DomainEvent`
 * listo para persistir sin pasar por `record`: es el único punto donde el
 * enmascarado PII es obligatorio antes del `INSERT`.
 * =================================================================
 */

use crate::errors::EventStoreError;
use crate::repository::EventRepository;
use chrono::{Duration, Utc};
use hub_domain_models::event::{
    mask_pii, DomainEvent, EventQuery, EventType, DEFAULT_EVENT_WINDOW_DAYS, DEFAULT_PII_KEYS,
    MAX_EVENTS_PER_PAGE,
};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct EventService<R: EventRepository> {
    repository: R,
    pii_keys: &'static [&'static str],
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository, pii_keys: DEFAULT_PII_KEYS }
    }

    #[instrument(skip(self, payload, metadata))]
    pub async fn record(
        &self,
        actor_user_id: Uuid,
        event_type: EventType,
        mut payload: Value,
        metadata: Value,
    ) -> Result<Uuid, EventStoreError> {
        mask_pii(&mut payload, self.pii_keys);
        let event = DomainEvent {
            event_id: Uuid::new_v4(),
            event_type,
            actor_user_id,
            payload,
            metadata,
            created_at: Utc::now(),
        };
        let event_id = event.event_id;
        self.repository.append(event).await?;
        Ok(event_id)
    }

    /// Applies the default 30-day window when the caller leaves `since`
    /// unset, and clamps the page size to `MAX_EVENTS_PER_PAGE`.
    #[instrument(skip(self))]
    pub async fn narrative_window(
        &self,
        user_id: Uuid,
        mut query: EventQuery,
        requested_limit: usize,
    ) -> Result<Vec<DomainEvent>, EventStoreError> {
        if query.since.is_none() {
            query.since = Some(Utc::now() - Duration::days(DEFAULT_EVENT_WINDOW_DAYS));
        }
        if let (Some(since), Some(until)) = (query.since, query.until) {
            if since > until {
                return Err(EventStoreError::InvalidWindow(format!(
                    "since ({since}) is after until ({until})"
                )));
            }
        }

        let limit = requested_limit.min(MAX_EVENTS_PER_PAGE).max(1);
        self.repository.query(user_id, &query, limit).await
    }

    /// Narrows a fetched event set to the kinds the context builder folds
    /// into its "session" usage metric.
    pub fn session_events(events: &[DomainEvent]) -> Vec<&DomainEvent> {
        events.iter().filter(|event| event.event_type.is_session_kind()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct InMemoryEventRepository {
        events: Mutex<Vec<DomainEvent>>,
    }

    impl InMemoryEventRepository {
        fn new() -> Self {
            Self { events: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl EventRepository for InMemoryEventRepository {
        async fn append(&self, event: DomainEvent) -> Result<(), EventStoreError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        async fn query(
            &self,
            user_id: Uuid,
            query: &EventQuery,
            limit: usize,
        ) -> Result<Vec<DomainEvent>, EventStoreError> {
            let guard = self.events.lock().unwrap();
            let mut matched: Vec<DomainEvent> = guard
                .iter()
                .filter(|event| event.actor_user_id == user_id)
                .filter(|event| query.since.map(|since| event.created_at >= since).unwrap_or(true))
                .filter(|event| query.until.map(|until| event.created_at <= until).unwrap_or(true))
                .filter(|event| query.types.is_empty() || query.types.contains(&event.event_type))
                .cloned()
                .collect();
            matched.truncate(limit);
            Ok(matched)
        }
    }

    #[tokio::test]
    async fn record_masks_configured_pii_keys_before_storage() {
        let service = EventService::new(InMemoryEventRepository::new());
        let user_id = Uuid::new_v4();
        service
            .record(
                user_id,
                EventType::UserRegistered,
                serde_json::json!({ "email": "carla@example.com" }),
                serde_json::json!({}),
            )
            .await
            .unwrap();

        let events = service.narrative_window(user_id, EventQuery { since: None, until: None, types: vec![] }, 10).await.unwrap();
        assert_eq!(events[0].payload["email"], serde_json::json!("ca***"));
    }

    #[tokio::test]
    async fn narrative_window_defaults_to_thirty_days() {
        let service = EventService::new(InMemoryEventRepository::new());
        let user_id = Uuid::new_v4();
        service
            .record(user_id, EventType::ActionPerformed, serde_json::json!({}), serde_json::json!({}))
            .await
            .unwrap();

        let events = service
            .narrative_window(user_id, EventQuery { since: None, until: None, types: vec![] }, 10)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let service = EventService::new(InMemoryEventRepository::new());
        let user_id = Uuid::new_v4();
        let query = EventQuery { since: Some(Utc::now()), until: Some(Utc::now() - Duration::days(1)), types: vec![] };
        let result = service.narrative_window(user_id, query, 10).await;
        assert!(matches!(result, Err(EventStoreError::InvalidWindow(_))));
    }

    #[tokio::test]
    async fn session_events_filters_to_session_kinds_only() {
        let alert = DomainEvent {
            event_id: Uuid::new_v4(),
            event_type: EventType::AlertTriggered,
            actor_user_id: Uuid::new_v4(),
            payload: Value::Null,
            metadata: Value::Null,
            created_at: Utc::now(),
        };
        let login = DomainEvent { event_type: EventType::LoginSucceeded, ..alert.clone() };
        let filtered = EventService::<InMemoryEventRepository>::session_events(&[alert, login]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].event_type, EventType::LoginSucceeded);
    }
}
