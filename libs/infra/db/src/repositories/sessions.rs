// [libs/infra/db/src/repositories/sessions.rs]
/*!
 * APARATO: SESSION STORE REPOSITORY (L3)
 * RESPONSABILIDAD: PERSISTENCIA DE LA TABLA sessions PARA LA ROTACIÓN DE
 * REFRESH TOKENS
 */

use crate::client::HubDbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hub_infra_auth::errors::AuthError;
use hub_infra_auth::sessions::SessionStore;
use hub_domain_models::session::Session;
use libsql::{params, Row};
use uuid::Uuid;

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}

fn parse_datetime(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}

fn map_row(row: &Row) -> Result<Session, DbError> {
    Ok(Session {
        session_id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        user_id: Uuid::parse_str(&row.get::<String>(1)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        refresh_token_hash: row.get(2)?,
        device_fingerprint: row.get(3)?,
        family_id: Uuid::parse_str(&row.get::<String>(4)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        issued_at: parse_datetime(row.get(5)?),
        expires_at: parse_datetime(row.get(6)?),
        revoked: row.get::<i64>(7)? != 0,
    })
}

pub struct SessionStoreImpl {
    client: HubDbClient,
}

impl SessionStoreImpl {
    pub fn new(client: HubDbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for SessionStoreImpl {
    async fn insert(&self, session: Session) -> Result<(), AuthError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        conn.execute(
            "INSERT INTO sessions (session_id, user_id, refresh_token_hash, device_fingerprint, family_id, issued_at, expires_at, revoked) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.session_id.to_string(),
                session.user_id.to_string(),
                session.refresh_token_hash,
                session.device_fingerprint,
                session.family_id.to_string(),
                session.issued_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
                session.revoked as i64
            ],
        )
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, AuthError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        let mut rows = conn
            .query(
                "SELECT session_id, user_id, refresh_token_hash, device_fingerprint, family_id, issued_at, expires_at, revoked FROM sessions WHERE refresh_token_hash = ?1",
                params![refresh_token_hash.to_string()],
            )
            .await
            .map_err(DbError::from)?;

        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(map_row(&row).map_err(AuthError::from)?)),
            None => Ok(None),
        }
    }

    async fn revoke(&self, session_id: Uuid) -> Result<(), AuthError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        conn.execute("UPDATE sessions SET revoked = 1 WHERE session_id = ?1", params![session_id.to_string()])
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid) -> Result<(), AuthError> {
        let conn = self.client.get_connection().map_err(DbError::from)?;
        conn.execute("UPDATE sessions SET revoked = 1 WHERE family_id = ?1", params![family_id.to_string()])
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
