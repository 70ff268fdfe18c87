// [libs/domain/models/src/energy.rs]
/*!
 * APARATO: ENERGY LEDGER MODELS (L2)
 * RESPONSABILIDAD: GOBERNANZA FINANCIERA Y GESTIÓN DE CUOTAS DE ENERGÍA
 *
 * # Mathematical Proof (Quota Allocation):
 * `0 <= current_energy <= max_energy` es un invariante protegido por el
 * bloqueo de fila en la escritura (ver `hub-infra-db::repositories::energy`);
 * este módulo solo define la forma de los datos, nunca ejecuta I/O.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

pub const DEFAULT_MAX_ENERGY: f64 = 100.0;
pub const DEFAULT_STARTING_ENERGY: f64 = 85.0;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    Standard,
    Unlimited,
}

/// Snapshot materializado del balance de un operador. Reconstruible en
/// cualquier momento desde la suma de `EnergyTransaction` para ese usuario.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Energy {
    pub user_id: Uuid,
    pub current_energy: f64,
    pub max_energy: f64,
    pub total_purchased: f64,
    pub total_consumed: f64,
    pub last_recharge_at: Option<DateTime<Utc>>,
    pub subscription_type: SubscriptionType,
    pub updated_at: DateTime<Utc>,
}

impl Energy {
    pub fn new_for_registration(user_id: Uuid) -> Self {
        Self {
            user_id,
            current_energy: DEFAULT_STARTING_ENERGY,
            max_energy: DEFAULT_MAX_ENERGY,
            total_purchased: 0.0,
            total_consumed: 0.0,
            last_recharge_at: None,
            subscription_type: SubscriptionType::Standard,
            updated_at: Utc::now(),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self.subscription_type, SubscriptionType::Unlimited)
    }

    pub fn has_sufficient_energy(&self, cost: f64) -> bool {
        self.is_unlimited() || self.current_energy >= cost
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyActionType {
    Consume,
    Refund,
    Purchase,
    Bonus,
}

/// Fila de auditoría inmutable. `energy_before`/`energy_after` deben coincidir
/// con el valor materializado de `Energy` en el instante del commit.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTransaction {
    pub tx_id: Uuid,
    pub user_id: Uuid,
    pub action_type: EnergyActionType,
    pub amount: f64,
    pub reason: String,
    pub energy_before: f64,
    pub energy_after: f64,
    pub context: serde_json::Value,
    pub app_source: Option<String>,
    pub feature_used: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanPerformResponse {
    pub allowed: bool,
    pub required: i64,
    pub current: f64,
    pub deficit: f64,
    pub is_unlimited: bool,
}

#[typeshare]
#[derive(Debug, Deserialize)]
pub struct CanPerformRequest {
    pub user_id: Uuid,
    pub action: String,
}

#[typeshare]
#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub user_id: Uuid,
    pub action: String,
    pub idempotency_key: String,
}

#[typeshare]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub new_balance: f64,
    pub tx_id: Uuid,
}

#[typeshare]
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub user_id: Uuid,
    pub action_event_id: Uuid,
    pub reason: Option<String>,
}

#[typeshare]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub new_balance: f64,
    pub tx_id: Uuid,
}

#[typeshare]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientEnergyDetails {
    pub required: i64,
    pub current: f64,
    pub deficit: f64,
}
