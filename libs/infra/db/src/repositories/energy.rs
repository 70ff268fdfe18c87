// [libs/infra/db/src/repositories/energy.rs]
/*!
 * =================================================================
 * APARATO: ENERGY LEDGER REPOSITORY (L3)
 * RESPONSABILIDAD: PERSISTENCIA ACID DE LA FILA user_energy
 *
 * Cada `apply_transaction` corre dentro de un `BEGIN IMMEDIATE`: la
 * lectura, la re-verificación de saldo suficiente para `Consume`, el
 * cálculo del nuevo balance y la escritura (fila + transacción de
 * auditoría) son una sola ráfaga atómica, el sustituto de
 * `SELECT ... FOR UPDATE` sobre una base de datos SQLite/libSQL sin
 * bloqueo de fila nativo. El chequeo previo en `LedgerService::consume`
 * solo evita round-trips inútiles; la verificación que cuenta es esta,
 * porque corre después de adquirir el lock.
 * =================================================================
 */

use crate::client::HubDbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hub_domain_ledger::errors::RepositoryError;
use hub_domain_ledger::repository::EnergyRepository;
use hub_domain_models::energy::{Energy, EnergyActionType, EnergyTransaction, SubscriptionType};
use libsql::{params, Row};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

impl From<DbError> for RepositoryError {
    fn from(err: DbError) -> Self {
        RepositoryError::Unavailable(err.to_string())
    }
}

pub struct EnergyRepositoryImpl {
    client: HubDbClient,
}

impl EnergyRepositoryImpl {
    pub fn new(client: HubDbClient) -> Self {
        Self { client }
    }

    fn action_type_label(action_type: EnergyActionType) -> &'static str {
        match action_type {
            EnergyActionType::Consume => "consume",
            EnergyActionType::Refund => "refund",
            EnergyActionType::Purchase => "purchase",
            EnergyActionType::Bonus => "bonus",
        }
    }

    fn parse_action_type(raw: &str) -> EnergyActionType {
        match raw {
            "refund" => EnergyActionType::Refund,
            "purchase" => EnergyActionType::Purchase,
            "bonus" => EnergyActionType::Bonus,
            _ => EnergyActionType::Consume,
        }
    }

    fn subscription_label(subscription_type: SubscriptionType) -> &'static str {
        match subscription_type {
            SubscriptionType::Standard => "standard",
            SubscriptionType::Unlimited => "unlimited",
        }
    }

    fn parse_subscription(raw: &str) -> SubscriptionType {
        match raw {
            "unlimited" => SubscriptionType::Unlimited,
            _ => SubscriptionType::Standard,
        }
    }

    fn parse_datetime(raw: Option<String>) -> Option<DateTime<Utc>> {
        raw.and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok().map(|dt| dt.with_timezone(&Utc)))
    }

    fn map_energy_row(row: &Row) -> Result<Energy, DbError> {
        Ok(Energy {
            user_id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
            current_energy: row.get(1)?,
            max_energy: row.get(2)?,
            total_purchased: row.get(3)?,
            total_consumed: row.get(4)?,
            last_recharge_at: Self::parse_datetime(row.get::<Option<String>>(5)?),
            subscription_type: Self::parse_subscription(&row.get::<String>(6)?),
            updated_at: Self::parse_datetime(row.get::<Option<String>>(7)?).unwrap_or_else(Utc::now),
        })
    }

    fn map_transaction_row(row: &Row) -> Result<EnergyTransaction, DbError> {
        let context_raw: String = row.get(7)?;
        Ok(EnergyTransaction {
            tx_id: Uuid::parse_str(&row.get::<String>(0)?).map_err(|e| DbError::MappingError(e.to_string()))?,
            user_id: Uuid::parse_str(&row.get::<String>(1)?).map_err(|e| DbError::MappingError(e.to_string()))?,
            action_type: Self::parse_action_type(&row.get::<String>(2)?),
            amount: row.get(3)?,
            reason: row.get(4)?,
            energy_before: row.get(5)?,
            energy_after: row.get(6)?,
            context: serde_json::from_str(&context_raw).unwrap_or(Value::Null),
            app_source: row.get(8)?,
            feature_used: row.get(9)?,
            idempotency_key: row.get(10)?,
            created_at: Self::parse_datetime(row.get::<Option<String>>(11)?).unwrap_or_else(Utc::now),
        })
    }

    async fn fetch_energy_row(&self, conn: &libsql::Connection, user_id: Uuid) -> Result<Option<Energy>, RepositoryError> {
        let mut rows = conn
            .query(
                "SELECT user_id, current_energy, max_energy, total_purchased, total_consumed, last_recharge_at, subscription_type, updated_at FROM user_energy WHERE user_id = ?1",
                params![user_id.to_string()],
            )
            .await
            .map_err(DbError::from)?;

        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(Self::map_energy_row(&row).map_err(RepositoryError::from)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl EnergyRepository for EnergyRepositoryImpl {
    #[instrument(skip(self))]
    async fn get_energy(&self, user_id: Uuid) -> Result<Energy, RepositoryError> {
        let conn = self.client.get_connection().map_err(RepositoryError::from)?;
        self.fetch_energy_row(&conn, user_id).await?.ok_or(RepositoryError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn find_by_idempotency_key(
        &self,
        user_id: Uuid,
        idempotency_key: &str,
    ) -> Result<Option<EnergyTransaction>, RepositoryError> {
        let conn = self.client.get_connection().map_err(RepositoryError::from)?;
        let mut rows = conn
            .query(
                "SELECT tx_id, user_id, action_type, amount, reason, energy_before, energy_after, context, app_source, feature_used, idempotency_key, created_at FROM energy_transactions WHERE user_id = ?1 AND idempotency_key = ?2 LIMIT 1",
                params![user_id.to_string(), idempotency_key.to_string()],
            )
            .await
            .map_err(DbError::from)?;

        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(Self::map_transaction_row(&row).map_err(RepositoryError::from)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_transaction(&self, tx_id: Uuid) -> Result<Option<EnergyTransaction>, RepositoryError> {
        let conn = self.client.get_connection().map_err(RepositoryError::from)?;
        let mut rows = conn
            .query(
                "SELECT tx_id, user_id, action_type, amount, reason, energy_before, energy_after, context, app_source, feature_used, idempotency_key, created_at FROM energy_transactions WHERE tx_id = ?1",
                params![tx_id.to_string()],
            )
            .await
            .map_err(DbError::from)?;

        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(Self::map_transaction_row(&row).map_err(RepositoryError::from)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, context))]
    async fn apply_transaction(
        &self,
        user_id: Uuid,
        action_type: EnergyActionType,
        amount: f64,
        reason: String,
        context: Value,
        app_source: Option<String>,
        feature_used: Option<String>,
        idempotency_key: Option<String>,
    ) -> Result<(Energy, EnergyTransaction), RepositoryError> {
        let conn = self.client.begin_immediate().await.map_err(RepositoryError::from)?;

        let current = match self.fetch_energy_row(&conn, user_id).await {
            Ok(Some(energy)) => energy,
            Ok(None) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(RepositoryError::UserNotFound(user_id));
            }
            Err(error) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(error);
            }
        };

        let is_unlimited = matches!(current.subscription_type, SubscriptionType::Unlimited);
        if action_type == EnergyActionType::Consume && !is_unlimited && current.current_energy < amount {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(RepositoryError::InsufficientBalance { current: current.current_energy, requested: amount });
        }

        let signed = match action_type {
            EnergyActionType::Consume => -amount,
            EnergyActionType::Refund | EnergyActionType::Purchase | EnergyActionType::Bonus => amount,
        };
        let new_balance = (current.current_energy + signed).clamp(0.0, current.max_energy);
        let new_total_purchased = if matches!(action_type, EnergyActionType::Purchase | EnergyActionType::Bonus) {
            current.total_purchased + amount
        } else {
            current.total_purchased
        };
        let new_total_consumed = if matches!(action_type, EnergyActionType::Consume) {
            current.total_consumed + amount
        } else {
            current.total_consumed
        };
        let now = Utc::now();
        let last_recharge_at = if matches!(action_type, EnergyActionType::Purchase) {
            Some(now)
        } else {
            current.last_recharge_at
        };

        let update_result = conn
            .execute(
                "UPDATE user_energy SET current_energy = ?1, total_purchased = ?2, total_consumed = ?3, last_recharge_at = ?4, updated_at = ?5 WHERE user_id = ?6",
                params![
                    new_balance,
                    new_total_purchased,
                    new_total_consumed,
                    last_recharge_at.map(|dt| dt.to_rfc3339()),
                    now.to_rfc3339(),
                    user_id.to_string()
                ],
            )
            .await;
        if let Err(error) = update_result {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(DbError::from(error).into());
        }

        let tx_id = Uuid::new_v4();
        let context_json = serde_json::to_string(&context).unwrap_or_else(|_| "null".to_string());
        let insert_result = conn
            .execute(
                "INSERT INTO energy_transactions (tx_id, user_id, action_type, amount, reason, energy_before, energy_after, context, app_source, feature_used, idempotency_key, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    tx_id.to_string(),
                    user_id.to_string(),
                    Self::action_type_label(action_type),
                    amount,
                    reason.clone(),
                    current.current_energy,
                    new_balance,
                    context_json,
                    app_source.clone(),
                    feature_used.clone(),
                    idempotency_key.clone(),
                    now.to_rfc3339()
                ],
            )
            .await;
        if let Err(error) = insert_result {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(DbError::from(error).into());
        }

        conn.execute("COMMIT", ()).await.map_err(DbError::from)?;

        let updated = Energy {
            user_id,
            current_energy: new_balance,
            max_energy: current.max_energy,
            total_purchased: new_total_purchased,
            total_consumed: new_total_consumed,
            last_recharge_at,
            subscription_type: current.subscription_type,
            updated_at: now,
        };
        let transaction = EnergyTransaction {
            tx_id,
            user_id,
            action_type,
            amount,
            reason,
            energy_before: current.current_energy,
            energy_after: new_balance,
            context,
            app_source,
            feature_used,
            idempotency_key,
            created_at: now,
        };

        Ok((updated, transaction))
    }

    #[instrument(skip(self))]
    async fn set_subscription(&self, user_id: Uuid, subscription_type: SubscriptionType) -> Result<Energy, RepositoryError> {
        let conn = self.client.get_connection().map_err(RepositoryError::from)?;
        let now = Utc::now();
        let rows_affected = conn
            .execute(
                "UPDATE user_energy SET subscription_type = ?1, updated_at = ?2 WHERE user_id = ?3",
                params![Self::subscription_label(subscription_type), now.to_rfc3339(), user_id.to_string()],
            )
            .await
            .map_err(DbError::from)?;

        if rows_affected == 0 {
            return Err(RepositoryError::UserNotFound(user_id));
        }

        self.fetch_energy_row(&conn, user_id).await?.ok_or(RepositoryError::UserNotFound(user_id))
    }
}
