// [libs/domain/billing/src/provider.rs]
/*!
 * APARATO: PAYMENT PROVIDER CONTRACT (L2)
 * RESPONSABILIDAD: FRONTERA HACIA EL PROCESADOR DE PAGOS EXTERNO
 *
 * `hub-domain-billing` no conoce Stripe ni ningún otro procesador
 * concreto, solo este trait — el mismo patrón de frontera que
 * `EnergyRepository` traza entre `hub-domain-ledger` y la persistencia.
 * `hub-infra-providers` lo implementa con un cliente `reqwest`, en el
 * estilo del uplink de la teacher en `worker-client`.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("[L3_PROVIDER_NETWORK] payment provider network fault: {0}")]
    NetworkFault(String),

    #[error("[L3_PROVIDER_REJECTED] payment provider rejected the request: {0}")]
    Rejected(String),

    #[error("[L3_PROVIDER_DECODE] could not decode payment provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresConfirmation,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
    pub amount_minor_units: u32,
    pub currency: String,
    pub status: IntentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRecord {
    pub refund_id: String,
    pub amount_minor_units: u32,
}

/// Abstracción opaca sobre el procesador de cobro; ni el nombre del
/// proveedor ni su SDK cruzan esta línea.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_intent(
        &self,
        amount_minor_units: u32,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<PaymentIntent, ProviderError>;

    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, ProviderError>;

    async fn refund(
        &self,
        intent_id: &str,
        amount_minor_units: u32,
    ) -> Result<RefundRecord, ProviderError>;
}
