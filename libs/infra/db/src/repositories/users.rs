// [libs/infra/db/src/repositories/users.rs]
/*!
 * APARATO: USERS REPOSITORY (L3)
 * RESPONSABILIDAD: REGISTRO, LOOKUP Y ACTIVACIÓN DE LA FILA user_energy
 * GEMELA AL REGISTRARSE
 *
 * No hay un contrato de dominio para esto (`hub-domain-models::user` solo
 * define la forma); `apps/hub` lo consume directamente, igual que hace con
 * `ContextSourceRepository` para lecturas compuestas.
 */

use crate::client::HubDbClient;
use crate::errors::DbError;
use chrono::Utc;
use hub_domain_models::energy::Energy;
use hub_domain_models::user::User;
use libsql::{params, Row};
use tracing::instrument;
use uuid::Uuid;

fn map_row(row: &Row) -> Result<User, DbError> {
    Ok(User {
        user_id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        display_name: row.get(3)?,
        is_unlimited: row.get::<i64>(4)? != 0,
        refresh_token_family: Uuid::parse_str(&row.get::<String>(5)?).map_err(|e| DbError::MappingError(e.to_string()))?,
        created_at: row
            .get::<String>(6)
            .ok()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(&ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        deleted_at: row.get::<Option<String>>(7)?.and_then(|ts| {
            chrono::DateTime::parse_from_rfc3339(&ts).ok().map(|dt| dt.with_timezone(&Utc))
        }),
    })
}

const SELECT_COLUMNS: &str =
    "user_id, email, password_hash, display_name, is_unlimited, refresh_token_family, created_at, deleted_at";

pub struct UsersRepository {
    client: HubDbClient,
}

impl UsersRepository {
    pub fn new(client: HubDbClient) -> Self {
        Self { client }
    }

    /// Inserts the user row and its twin `user_energy` row inside one
    /// transaction, so a half-registered account (identity without a
    /// ledger row) can never be observed.
    #[instrument(skip(self, password_hash))]
    pub async fn register(&self, email: &str, password_hash: &str, display_name: Option<String>) -> Result<User, DbError> {
        let conn = self.client.begin_immediate().await?;

        let user_id = Uuid::new_v4();
        let refresh_token_family = Uuid::new_v4();
        let now = Utc::now();

        let insert_user = conn
            .execute(
                "INSERT INTO users (user_id, email, password_hash, display_name, is_unlimited, refresh_token_family, created_at) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
                params![user_id.to_string(), email.to_string(), password_hash.to_string(), display_name.clone(), refresh_token_family.to_string(), now.to_rfc3339()],
            )
            .await;
        if let Err(error) = insert_user {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(error.into());
        }

        let energy = Energy::new_for_registration(user_id);
        let insert_energy = conn
            .execute(
                "INSERT INTO user_energy (user_id, current_energy, max_energy, total_purchased, total_consumed, subscription_type, updated_at) VALUES (?1, ?2, ?3, 0.0, 0.0, 'standard', ?4)",
                params![user_id.to_string(), energy.current_energy, energy.max_energy, now.to_rfc3339()],
            )
            .await;
        if let Err(error) = insert_energy {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(error.into());
        }

        conn.execute("COMMIT", ()).await?;

        Ok(User {
            user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            display_name,
            created_at: now,
            is_unlimited: false,
            refresh_token_family,
            deleted_at: None,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let conn = self.client.get_connection()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM users WHERE email = ?1 AND deleted_at IS NULL");
        let mut rows = conn.query(&sql, params![email.to_string()]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, DbError> {
        let conn = self.client.get_connection()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM users WHERE user_id = ?1 AND deleted_at IS NULL");
        let mut rows = conn.query(&sql, params![user_id.to_string()]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }
}
