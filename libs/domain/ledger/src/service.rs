// [libs/domain/ledger/src/service.rs]
/*!
 * =================================================================
 * APARATO: ENERGY LEDGER SERVICE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: CAN_PERFORM / CONSUME / REFUND / PURCHASE
 *
 * # Mathematical Proof (Idempotent Consume):
 * `consume` primero busca `idempotency_key` en el repositorio. Si existe,
 * retorna la transacción ya comprometida sin tocar el balance de nuevo;
 * el invariante `0 <= current_energy <= max_energy` nunca se evalúa dos
 * veces para la misma llamada lógica, sin importar cuántas veces el
 * cliente reintente la petición HTTP.
 *
 * Los usuarios `Unlimited` registran movimientos de monto 0 en vez de
 * ser excluidos del ledger (ver DESIGN.md, Open Question "unlimited
 * zero-amount transactions"): la tabla de auditoría debe poder
 * reconstruir el historial de uso sin importar el plan de suscripción.
 *
 * `refund` y `purchase` reutilizan el mismo mecanismo de
 * `idempotency_key` que `consume`: un `action_event_id` o `intent_id`
 * repetido nunca acredita ni reembolsa energía dos veces.
 * =================================================================
 */

use crate::errors::{LedgerError, RepositoryError};
use crate::repository::EnergyRepository;
use hub_domain_models::action_costs::{action_cost, Action};
use hub_domain_models::energy::{Energy, EnergyActionType, EnergyTransaction};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CanPerformOutcome {
    pub allowed: bool,
    pub required: i64,
    pub current: f64,
    pub deficit: f64,
    pub is_unlimited: bool,
}

#[derive(Debug, Clone)]
pub struct LedgerMovement {
    pub new_balance: f64,
    pub tx_id: Uuid,
}

pub struct LedgerService<R: EnergyRepository> {
    repository: R,
}

impl<R: EnergyRepository> LedgerService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn resolve_action(action_name: &str) -> Result<Action, LedgerError> {
        Action::from_str(action_name).ok_or_else(|| LedgerError::UnknownAction(action_name.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn can_perform(&self, user_id: Uuid, action_name: &str) -> Result<CanPerformOutcome, LedgerError> {
        let action = Self::resolve_action(action_name)?;
        let cost = action_cost(action);
        let energy = self.repository.get_energy(user_id).await?;

        let allowed = energy.has_sufficient_energy(cost as f64);
        let deficit = if energy.is_unlimited() || allowed {
            0.0
        } else {
            (cost as f64 - energy.current_energy).max(0.0)
        };

        Ok(CanPerformOutcome {
            allowed,
            required: cost,
            current: energy.current_energy,
            deficit,
            is_unlimited: energy.is_unlimited(),
        })
    }

    #[instrument(skip(self))]
    pub async fn consume(
        &self,
        user_id: Uuid,
        action_name: &str,
        idempotency_key: &str,
    ) -> Result<LedgerMovement, LedgerError> {
        if let Some(existing) = self
            .repository
            .find_by_idempotency_key(user_id, idempotency_key)
            .await?
        {
            let energy = self.repository.get_energy(user_id).await?;
            return Ok(LedgerMovement { new_balance: energy.current_energy, tx_id: existing.tx_id });
        }

        let action = Self::resolve_action(action_name)?;
        let cost = action_cost(action);
        let energy = self.repository.get_energy(user_id).await?;

        if !energy.has_sufficient_energy(cost as f64) {
            let deficit = (cost as f64 - energy.current_energy).max(0.0);
            return Err(LedgerError::InsufficientEnergy { required: cost, current: energy.current_energy, deficit });
        }

        let amount = if energy.is_unlimited() { 0.0 } else { cost as f64 };
        let applied = self
            .repository
            .apply_transaction(
                user_id,
                EnergyActionType::Consume,
                amount,
                format!("action:{}", action.as_str()),
                Value::Null,
                None,
                Some(action.as_str().to_string()),
                Some(idempotency_key.to_string()),
            )
            .await;

        let (updated, transaction) = match applied {
            Ok(result) => result,
            // The pre-check above reads balance before the row lock; under
            // concurrent consumes it can pass while the repository's
            // re-verification inside `BEGIN IMMEDIATE` is the one that
            // actually serializes against the real balance.
            Err(RepositoryError::InsufficientBalance { current, requested }) => {
                return Err(LedgerError::InsufficientEnergy {
                    required: requested as i64,
                    current,
                    deficit: (requested - current).max(0.0),
                });
            }
            Err(other) => return Err(other.into()),
        };

        Ok(LedgerMovement { new_balance: updated.current_energy, tx_id: transaction.tx_id })
    }

    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        user_id: Uuid,
        action_event_id: Uuid,
        reason: Option<String>,
    ) -> Result<LedgerMovement, LedgerError> {
        let original = self
            .repository
            .find_transaction(action_event_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {action_event_id}")))?;

        if original.user_id != user_id {
            return Err(LedgerError::NotFound(format!("transaction {action_event_id}")));
        }
        if !matches!(original.action_type, EnergyActionType::Consume) {
            return Err(LedgerError::Conflict(format!(
                "transaction {action_event_id} is not a consume and cannot be refunded"
            )));
        }

        // Refunds are idempotent per original tx_id: a retried
        // `/energy/refund` call for the same `action_event_id` must return
        // the existing refund instead of crediting the balance twice.
        let refund_idempotency_key = format!("refund:{action_event_id}");
        if let Some(existing) = self
            .repository
            .find_by_idempotency_key(user_id, &refund_idempotency_key)
            .await?
        {
            let energy = self.repository.get_energy(user_id).await?;
            return Ok(LedgerMovement { new_balance: energy.current_energy, tx_id: existing.tx_id });
        }

        let (updated, transaction) = self
            .repository
            .apply_transaction(
                user_id,
                EnergyActionType::Refund,
                original.amount,
                reason.unwrap_or_else(|| format!("refund:{action_event_id}")),
                Value::Null,
                None,
                original.feature_used.clone(),
                Some(refund_idempotency_key),
            )
            .await?;

        Ok(LedgerMovement { new_balance: updated.current_energy, tx_id: transaction.tx_id })
    }

    #[instrument(skip(self))]
    pub async fn purchase(
        &self,
        user_id: Uuid,
        amount: f64,
        reason: String,
        context: Value,
        idempotency_key: Option<&str>,
    ) -> Result<LedgerMovement, LedgerError> {
        if let Some(key) = idempotency_key {
            if let Some(existing) = self.repository.find_by_idempotency_key(user_id, key).await? {
                let energy = self.repository.get_energy(user_id).await?;
                return Ok(LedgerMovement { new_balance: energy.current_energy, tx_id: existing.tx_id });
            }
        }

        let (updated, transaction) = self
            .repository
            .apply_transaction(
                user_id,
                EnergyActionType::Purchase,
                amount,
                reason,
                context,
                None,
                None,
                idempotency_key.map(str::to_string),
            )
            .await?;

        Ok(LedgerMovement { new_balance: updated.current_energy, tx_id: transaction.tx_id })
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<Energy, LedgerError> {
        Ok(self.repository.get_energy(user_id).await?)
    }

    /// Switches a user's plan without moving energy; see
    /// `EnergyRepository::set_subscription`.
    #[instrument(skip(self))]
    pub async fn set_subscription(
        &self,
        user_id: Uuid,
        subscription_type: hub_domain_models::energy::SubscriptionType,
    ) -> Result<Energy, LedgerError> {
        Ok(self.repository.set_subscription(user_id, subscription_type).await?)
    }
}
