// [apps/hub/src/handlers/events.rs]
/*!
 * APARATO: EVENT STREAM GATEWAY (ESTRATO L3)
 * RESPONSABILIDAD: LECTURA DE LA VENTANA NARRATIVA DE UN USUARIO
 */

use crate::errors::HubApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use hub_domain_models::event::{DomainEvent, EventQuery};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct EventsQueryParams {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[instrument(skip(state, identity))]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Vec<DomainEvent>>, HubApiError> {
    let query = EventQuery { since: params.since, until: params.until, types: Vec::new() };
    let events = state.events.narrative_window(identity.0, query, params.limit.unwrap_or(100)).await?;
    Ok(Json(events))
}
