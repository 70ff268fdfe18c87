// [libs/domain/ledger/src/repository.rs]
/*!
 * APARATO: ENERGY REPOSITORY CONTRACT (L2)
 * RESPONSABILIDAD: FRONTERA ENTRE LA LÓGICA DE LEDGER Y LA PERSISTENCIA
 *
 * `hub-domain-ledger` no sabe que existe SQLite/libSQL; solo conoce este
 * trait. `hub-infra-db` lo implementa envolviendo cada `apply_transaction`
 * en una transacción `BEGIN IMMEDIATE`, el sustituto de `SELECT ... FOR
 * UPDATE` para la fila `user_energy`.
 */

use crate::errors::RepositoryError;
use async_trait::async_trait;
use hub_domain_models::energy::{Energy, EnergyActionType, EnergyTransaction, SubscriptionType};
use serde_json::Value;
use uuid::Uuid;

#[async_trait]
pub trait EnergyRepository: Send + Sync {
    async fn get_energy(&self, user_id: Uuid) -> Result<Energy, RepositoryError>;

    /// Looks up a transaction previously committed under `idempotency_key`,
    /// for exactly-once replay of `consume`.
    async fn find_by_idempotency_key(
        &self,
        user_id: Uuid,
        idempotency_key: &str,
    ) -> Result<Option<EnergyTransaction>, RepositoryError>;

    async fn find_transaction(&self, tx_id: Uuid) -> Result<Option<EnergyTransaction>, RepositoryError>;

    /// Applies one ledger movement atomically: reads the current balance,
    /// for `Consume` re-verifies it covers `amount` (returning
    /// `RepositoryError::InsufficientBalance` instead of writing anything
    /// if it doesn't, unless the account is `Unlimited`), computes the new
    /// balance (clamped to `[0, max_energy]`), appends the
    /// `EnergyTransaction` row and returns both the updated snapshot and
    /// the row. `amount` is always non-negative; the sign of the movement
    /// is implied by `action_type`.
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<(Energy, EnergyTransaction), RepositoryError>;

    /// Switches a user's plan without moving the energy balance; used by
    /// the unlimited subscription pack, which grants unmetered access
    /// rather than a fixed top-up.
    async fn set_subscription(
        &self,
        user_id: Uuid,
        subscription_type: SubscriptionType,
    ) -> Result<Energy, RepositoryError>;
}
