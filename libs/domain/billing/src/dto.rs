// [libs/domain/billing/src/dto.rs]
/*!
 * APARATO: BILLING WIRE CONTRACTS (L2)
 * RESPONSABILIDAD: DTOS DE INTENCIÓN / CONFIRMACIÓN / REEMBOLSO
 *
 * Forma 1:1 con el ciclo create-intent / confirm-payment / refund-request
 * del proveedor de pagos.
 */

use crate::packs::PackCode;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    pub user_id: Uuid,
    pub pack: PackCode,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "eur".to_string()
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    pub success: bool,
    pub intent_id: String,
    pub client_secret: String,
    pub amount: u32,
    pub currency: String,
    pub pack: PackCode,
    pub energy_units: u32,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub user_id: Uuid,
    pub intent_id: String,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub status: String,
    pub energy_added: u32,
    pub bonus_applied: bool,
    pub bonus_units: u32,
    pub new_energy_balance: f64,
    pub event_id: Uuid,
    pub transaction_id: Option<Uuid>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequestRequest {
    pub user_id: Uuid,
    pub action_event_id: Uuid,
    pub reason: Option<String>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequestResponse {
    pub success: bool,
    pub status: String,
    pub refunded_units: f64,
    pub new_energy_balance: f64,
    pub refund_event_id: Uuid,
}
