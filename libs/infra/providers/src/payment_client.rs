// [libs/infra/providers/src/payment_client.rs]
/*!
 * APARATO: PAYMENT PROVIDER UPLINK (L3)
 * RESPONSABILIDAD: CLIENTE HTTP OPACO HACIA EL PROCESADOR DE PAGOS
 *
 * Forma de cliente calcada de `WorkerClient`: `reqwest::Client` con
 * cabeceras por defecto, timeout fijo y user-agent propio. El nombre del
 * proveedor concreto nunca aparece aquí — solo rutas y cabeceras genéricas.
 */

use hub_domain_billing::provider::{IntentStatus, PaymentIntent, PaymentProvider, ProviderError, RefundRecord};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Serialize)]
struct CreateIntentPayload<'a> {
    amount_minor_units: u32,
    currency: &'a str,
    idempotency_key: &'a str,
}

#[derive(Serialize)]
struct ConfirmIntentPayload<'a> {
    intent_id: &'a str,
}

#[derive(Serialize)]
struct RefundPayload<'a> {
    intent_id: &'a str,
    amount_minor_units: u32,
}

#[derive(Deserialize)]
struct IntentWire {
    intent_id: String,
    client_secret: String,
    amount_minor_units: u32,
    currency: String,
    status: IntentStatus,
}

#[derive(Deserialize)]
struct RefundWire {
    refund_id: String,
    amount_minor_units: u32,
}

pub struct PaymentProviderClient {
    client: Client,
    base_url: String,
}

impl PaymentProviderClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {api_key}")).expect("invalid payment provider key"),
        );

        Self {
            client: Client::builder()
                .default_headers(headers)
                .user_agent("phoenix-hub-payment-client/0.1")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build payment provider http client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PaymentProvider for PaymentProviderClient {
    #[instrument(skip(self))]
    async fn create_intent(
        &self,
        amount_minor_units: u32,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<PaymentIntent, ProviderError> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateIntentPayload { amount_minor_units, currency, idempotency_key })
            .send()
            .await
            .map_err(|err| ProviderError::NetworkFault(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ProviderError::Rejected(format!("HTTP {}", response.status())));
        }

        let wire: IntentWire = response.json().await.map_err(|err| ProviderError::Rejected(err.to_string()))?;
        Ok(PaymentIntent {
            intent_id: wire.intent_id,
            client_secret: wire.client_secret,
            amount_minor_units: wire.amount_minor_units,
            currency: wire.currency,
            status: wire.status,
        })
    }

    #[instrument(skip(self))]
    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, ProviderError> {
        let url = format!("{}/v1/payment_intents/confirm", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ConfirmIntentPayload { intent_id })
            .send()
            .await
            .map_err(|err| ProviderError::NetworkFault(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ProviderError::Rejected(format!("HTTP {}", response.status())));
        }

        let wire: IntentWire = response.json().await.map_err(|err| ProviderError::Rejected(err.to_string()))?;
        Ok(PaymentIntent {
            intent_id: wire.intent_id,
            client_secret: wire.client_secret,
            amount_minor_units: wire.amount_minor_units,
            currency: wire.currency,
            status: wire.status,
        })
    }

    #[instrument(skip(self))]
    async fn refund(&self, intent_id: &str, amount_minor_units: u32) -> Result<RefundRecord, ProviderError> {
        let url = format!("{}/v1/refunds", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RefundPayload { intent_id, amount_minor_units })
            .send()
            .await
            .map_err(|err| ProviderError::NetworkFault(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ProviderError::Rejected(format!("HTTP {}", response.status())));
        }

        let wire: RefundWire = response.json().await.map_err(|err| ProviderError::Rejected(err.to_string()))?;
        Ok(RefundRecord { refund_id: wire.refund_id, amount_minor_units: wire.amount_minor_units })
    }
}
