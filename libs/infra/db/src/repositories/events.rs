// [libs/infra/db/src/repositories/events.rs]
/*!
 * APARATO: EVENT STORE REPOSITORY (L3)
 * RESPONSABILIDAD: PERSISTENCIA APPEND-ONLY DE EVENTOS DE DOMINIO
 */

use crate::client::HubDbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hub_domain_events::errors::EventStoreError;
use hub_domain_events::repository::EventRepository;
use hub_domain_models::event::{DomainEvent, EventQuery, EventType};
use libsql::{params, Row};
use serde_json::Value;
use uuid::Uuid;

impl From<DbError> for EventStoreError {
    fn from(err: DbError) -> Self {
        EventStoreError::Unavailable(err.to_string())
    }
}

fn event_type_label(event_type: EventType) -> &'static str {
    event_type.as_str()
}

fn parse_event_type(raw: &str) -> EventType {
    match raw {
        "LoginSucceeded" => EventType::LoginSucceeded,
        "LoginFailed" => EventType::LoginFailed,
        "EnergyConsumed" => EventType::EnergyConsumed,
        "EnergyRefunded" => EventType::EnergyRefunded,
        "EnergyPurchased" => EventType::EnergyPurchased,
        "ActionPerformed" => EventType::ActionPerformed,
        "AIResponseGenerated" => EventType::AiResponseGenerated,
        "AIResponseFailed" => EventType::AiResponseFailed,
        "AlertTriggered" => EventType::AlertTriggered,
        _ => EventType::UserRegistered,
    }
}

fn map_row(row: &Row) -> Result<DomainEvent, DbError> {
    let payload_raw: String = row.get(2)?;
    let metadata_raw: String = row.get(3)?;
    Ok(DomainEvent {
        event_id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        event_type: parse_event_type(&row.get::<String>(1)?),
        actor_user_id: Uuid::parse_str(&row.get::<String>(4)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        payload: serde_json::from_str(&payload_raw).unwrap_or(Value::Null),
        metadata: serde_json::from_str(&metadata_raw).unwrap_or(Value::Null),
        created_at: row
            .get::<Option<String>>(5)?
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok().map(|dt| dt.with_timezone(&Utc)))
            .unwrap_or_else(Utc::now),
    })
}

pub struct EventRepositoryImpl {
    client: HubDbClient,
}

impl EventRepositoryImpl {
    pub fn new(client: HubDbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn append(&self, event: DomainEvent) -> Result<(), EventStoreError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        let payload_json = serde_json::to_string(&event.payload).unwrap_or_else(|_| "null".to_string());
        let metadata_json = serde_json::to_string(&event.metadata).unwrap_or_else(|_| "null".to_string());

        conn.execute(
            "INSERT INTO events (event_id, event_type, payload, metadata, actor_user_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.event_id.to_string(),
                event_type_label(event.event_type),
                payload_json,
                metadata_json,
                event.actor_user_id.to_string(),
                event.created_at.to_rfc3339()
            ],
        )
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    async fn query(&self, user_id: Uuid, query: &EventQuery, limit: usize) -> Result<Vec<DomainEvent>, EventStoreError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;

        let mut sql = String::from(
            "SELECT event_id, event_type, payload, metadata, actor_user_id, created_at FROM events WHERE actor_user_id = ?1",
        );
        if query.since.is_some() {
            sql.push_str(" AND created_at >= ?2");
        }
        if query.until.is_some() {
            sql.push_str(if query.since.is_some() { " AND created_at <= ?3" } else { " AND created_at <= ?2" });
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ");
        sql.push_str(&limit.to_string());

        let mut bound = vec![libsql::Value::Text(user_id.to_string())];
        if let Some(since) = query.since {
            bound.push(libsql::Value::Text(since.to_rfc3339()));
        }
        if let Some(until) = query.until {
            bound.push(libsql::Value::Text(until.to_rfc3339()));
        }

        let mut rows = conn.query(&sql, bound).await.map_err(DbError::from)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            let event = map_row(&row).map_err(EventStoreError::from)?;
            if query.types.is_empty() || query.types.contains(&event.event_type) {
                events.push(event);
            }
        }
        Ok(events)
    }
}
