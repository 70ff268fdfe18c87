// [libs/domain/billing/src/service.rs]
/*!
 * =================================================================
 * APARATO: BILLING SERVICE (L2)
 * CLASIFICACIÓN: DOMAIN SERVICE
 * RESPONSABILIDAD: INTENT -> CONFIRM -> CREDIT, Y REEMBOLSO DE ENERGÍA
 *
 * `LunaUnlimited` no suma energía: conmuta `subscription_type` vía
 * `EnergyRepository::set_subscription`. Los demás packs acreditan
 * `energy_amount` (más el bono de primera compra si aplica) mediante
 * `LedgerService::purchase`, pasando `intent_id` como idempotency key:
 * un reintento de webhook o de cliente para la misma confirmación nunca
 * acredita energía dos veces. El bono de primera compra se decide
 * mirando `Energy::total_purchased` antes de esta operación: un saldo
 * de compras acumuladas en cero es, por definición, la primera compra.
 * =================================================================
 */

use crate::dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse,
    RefundRequestRequest, RefundRequestResponse,
};
use crate::errors::BillingError;
use crate::packs::{first_purchase_bonus_units, pack_by_code, ENERGY_PACKS};
use crate::provider::PaymentProvider;
use hub_domain_ledger::prelude::{EnergyRepository, LedgerService};
use hub_domain_models::energy::SubscriptionType;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

pub struct BillingService<P: PaymentProvider, R: EnergyRepository> {
    provider: P,
    ledger: LedgerService<R>,
}

impl<P: PaymentProvider, R: EnergyRepository> BillingService<P, R> {
    pub fn new(provider: P, ledger: LedgerService<R>) -> Self {
        Self { provider, ledger }
    }

    #[instrument(skip(self))]
    pub async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<CreateIntentResponse, BillingError> {
        let pack = pack_by_code(request.pack);
        let idempotency_key = format!("intent:{}:{}", request.user_id, Uuid::new_v4());
        let intent = self
            .provider
            .create_intent(pack.price_minor_units, &request.currency, &idempotency_key)
            .await
            .map_err(|err| BillingError::ProviderUnavailable(err.to_string()))?;

        Ok(CreateIntentResponse {
            success: true,
            intent_id: intent.intent_id,
            client_secret: intent.client_secret,
            amount: pack.price_minor_units,
            currency: request.currency,
            pack: pack.code,
            energy_units: pack.energy_amount.unwrap_or(0.0) as u32,
        })
    }

    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        request: ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, BillingError> {
        let intent = self
            .provider
            .confirm_intent(&request.intent_id)
            .await
            .map_err(|err| BillingError::ProviderRejected(err.to_string()))?;

        let pack = ENERGY_PACKS
            .iter()
            .find(|candidate| candidate.price_minor_units == intent.amount_minor_units)
            .ok_or_else(|| BillingError::UnknownPack(format!("amount {}", intent.amount_minor_units)))?;

        let balance_before = self.ledger.balance(request.user_id).await?;
        let is_first_purchase = balance_before.total_purchased == 0.0;

        let event_id = Uuid::new_v4();

        if pack.is_subscription {
            let updated = self
                .ledger
                .set_subscription(request.user_id, SubscriptionType::Unlimited)
                .await?;
            return Ok(ConfirmPaymentResponse {
                success: true,
                status: "succeeded".to_string(),
                energy_added: 0,
                bonus_applied: false,
                bonus_units: 0,
                new_energy_balance: updated.current_energy,
                event_id,
                transaction_id: None,
            });
        }

        let base_units = pack.energy_amount.unwrap_or(0.0);
        let bonus_units = if is_first_purchase {
            first_purchase_bonus_units(pack, base_units)
        } else {
            0.0
        };
        let total_units = base_units + bonus_units;

        let idempotency_key = format!("intent:{}", intent.intent_id);
        let movement = self
            .ledger
            .purchase(
                request.user_id,
                total_units,
                format!("pack:{}", pack.code.as_str()),
                json!({"pack": pack.code.as_str(), "intent_id": intent.intent_id, "bonus_units": bonus_units}),
                Some(&idempotency_key),
            )
            .await?;

        Ok(ConfirmPaymentResponse {
            success: true,
            status: "succeeded".to_string(),
            energy_added: total_units as u32,
            bonus_applied: bonus_units > 0.0,
            bonus_units: bonus_units as u32,
            new_energy_balance: movement.new_balance,
            event_id,
            transaction_id: Some(movement.tx_id),
        })
    }

    #[instrument(skip(self))]
    pub async fn refund_energy(
        &self,
        request: RefundRequestRequest,
    ) -> Result<RefundRequestResponse, BillingError> {
        let balance_before = self.ledger.balance(request.user_id).await?;
        let movement = self
            .ledger
            .refund(request.user_id, request.action_event_id, request.reason)
            .await?;
        let refunded_units = (movement.new_balance - balance_before.current_energy).max(0.0);

        Ok(RefundRequestResponse {
            success: true,
            status: "refunded".to_string(),
            refunded_units,
            new_energy_balance: movement.new_balance,
            refund_event_id: Uuid::new_v4(),
        })
    }
}
