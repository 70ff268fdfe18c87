// [libs/domain/billing/src/lib.rs]
/*!
 * APARATO: BILLING ROOT (L2)
 * RESPONSABILIDAD: EXPORTACIÓN DEL CATÁLOGO, LA FRONTERA DE PAGO Y EL SERVICIO
 */

pub mod dto;
pub mod errors;
pub mod packs;
pub mod provider;
pub mod service;

pub mod prelude {
    pub use crate::dto::{
        ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse,
        RefundRequestRequest, RefundRequestResponse,
    };
    pub use crate::errors::BillingError;
    pub use crate::packs::{pack_by_code, EnergyPack, PackCode, ENERGY_PACKS};
    pub use crate::provider::{IntentStatus, PaymentIntent, PaymentProvider, ProviderError, RefundRecord};
    pub use crate::service::BillingService;
}

#[cfg(test)]
mod tests {
    use crate::dto::{ConfirmPaymentRequest, CreateIntentRequest};
    use crate::packs::PackCode;
    use crate::provider::{IntentStatus, PaymentIntent, PaymentProvider, ProviderError, RefundRecord};
    use crate::service::BillingService;
    use async_trait::async_trait;
    use chrono::Utc;
    use hub_domain_ledger::errors::RepositoryError;
    use hub_domain_ledger::prelude::{EnergyRepository, LedgerService};
    use hub_domain_models::energy::{
        Energy, EnergyActionType, EnergyTransaction, SubscriptionType, DEFAULT_MAX_ENERGY,
    };
    use serde_json::Value;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct StubProvider;

    #[async_trait]
    impl PaymentProvider for StubProvider {
        async fn create_intent(
            &self,
            amount_minor_units: u32,
            currency: &str,
            _idempotency_key: &str,
        ) -> Result<PaymentIntent, ProviderError> {
            Ok(PaymentIntent {
                intent_id: "pi_stub".to_string(),
                client_secret: "secret_stub".to_string(),
                amount_minor_units,
                currency: currency.to_string(),
                status: IntentStatus::RequiresConfirmation,
            })
        }

        async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, ProviderError> {
            Ok(PaymentIntent {
                intent_id: intent_id.to_string(),
                client_secret: "secret_stub".to_string(),
                amount_minor_units: 299,
                currency: "eur".to_string(),
                status: IntentStatus::Succeeded,
            })
        }

        async fn refund(
            &self,
            intent_id: &str,
            amount_minor_units: u32,
        ) -> Result<RefundRecord, ProviderError> {
            Ok(RefundRecord { refund_id: format!("re_{intent_id}"), amount_minor_units })
        }
    }

    struct InMemoryRepository {
        energy: Mutex<Energy>,
        transactions: Mutex<Vec<EnergyTransaction>>,
    }

    impl InMemoryRepository {
        fn new(energy: Energy) -> Self {
            Self { energy: Mutex::new(energy), transactions: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl EnergyRepository for InMemoryRepository {
        async fn get_energy(&self, _user_id: Uuid) -> Result<Energy, RepositoryError> {
            Ok(self.energy.lock().unwrap().clone())
        }

        async fn find_by_idempotency_key(
            &self,
            _user_id: Uuid,
            _idempotency_key: &str,
        ) -> Result<Option<EnergyTransaction>, RepositoryError> {
            Ok(None)
        }

        async fn find_transaction(&self, tx_id: Uuid) -> Result<Option<EnergyTransaction>, RepositoryError> {
            Ok(self.transactions.lock().unwrap().iter().find(|tx| tx.tx_id == tx_id).cloned())
        }

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
            let mut energy = self.energy.lock().unwrap();
            let before = energy.current_energy;
            let signed = match action_type {
                EnergyActionType::Consume => -amount,
                EnergyActionType::Refund | EnergyActionType::Purchase | EnergyActionType::Bonus => amount,
            };
            energy.current_energy = (before + signed).clamp(0.0, energy.max_energy);
            if matches!(action_type, EnergyActionType::Purchase) {
                energy.total_purchased += amount;
            }
            energy.updated_at = Utc::now();

            let transaction = EnergyTransaction {
                tx_id: Uuid::new_v4(),
                user_id,
                action_type,
                amount,
                reason,
                energy_before: before,
                energy_after: energy.current_energy,
                context,
                app_source,
                feature_used,
                idempotency_key,
                created_at: Utc::now(),
            };
            self.transactions.lock().unwrap().push(transaction.clone());
            Ok((energy.clone(), transaction))
        }

        async fn set_subscription(
            &self,
            _user_id: Uuid,
            subscription_type: SubscriptionType,
        ) -> Result<Energy, RepositoryError> {
            let mut energy = self.energy.lock().unwrap();
            energy.subscription_type = subscription_type;
            energy.updated_at = Utc::now();
            Ok(energy.clone())
        }
    }

    fn fresh_user() -> Energy {
        Energy {
            user_id: Uuid::new_v4(),
            current_energy: 10.0,
            max_energy: DEFAULT_MAX_ENERGY,
            total_purchased: 0.0,
            total_consumed: 0.0,
            last_recharge_at: None,
            subscription_type: SubscriptionType::Standard,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_intent_reports_the_pack_price() {
        let repo = InMemoryRepository::new(fresh_user());
        let service = BillingService::new(StubProvider, LedgerService::new(repo));

        let response = service
            .create_intent(CreateIntentRequest {
                user_id: Uuid::new_v4(),
                pack: PackCode::CafeLuna,
                currency: "eur".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.amount, 299);
        assert_eq!(response.energy_units, 100);
    }

    #[tokio::test]
    async fn confirm_payment_grants_the_first_purchase_bonus() {
        let repo = InMemoryRepository::new(fresh_user());
        let service = BillingService::new(StubProvider, LedgerService::new(repo));
        let user_id = Uuid::new_v4();

        let response = service
            .confirm_payment(ConfirmPaymentRequest { user_id, intent_id: "pi_stub".to_string() })
            .await
            .unwrap();

        assert!(response.bonus_applied);
        assert_eq!(response.bonus_units, 10);
        assert_eq!(response.energy_added, 110);
    }

    #[tokio::test]
    async fn confirm_payment_switches_plan_for_the_unlimited_pack() {
        struct UnlimitedProvider;
        #[async_trait]
        impl PaymentProvider for UnlimitedProvider {
            async fn create_intent(
                &self,
                amount_minor_units: u32,
                currency: &str,
                _idempotency_key: &str,
            ) -> Result<PaymentIntent, ProviderError> {
                Ok(PaymentIntent {
                    intent_id: "pi_unlimited".to_string(),
                    client_secret: "secret".to_string(),
                    amount_minor_units,
                    currency: currency.to_string(),
                    status: IntentStatus::RequiresConfirmation,
                })
            }
            async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, ProviderError> {
                Ok(PaymentIntent {
                    intent_id: intent_id.to_string(),
                    client_secret: "secret".to_string(),
                    amount_minor_units: 2999,
                    currency: "eur".to_string(),
                    status: IntentStatus::Succeeded,
                })
            }
            async fn refund(
                &self,
                intent_id: &str,
                amount_minor_units: u32,
            ) -> Result<RefundRecord, ProviderError> {
                Ok(RefundRecord { refund_id: format!("re_{intent_id}"), amount_minor_units })
            }
        }

        let repo = InMemoryRepository::new(fresh_user());
        let service = BillingService::new(UnlimitedProvider, LedgerService::new(repo));

        let response = service
            .confirm_payment(ConfirmPaymentRequest {
                user_id: Uuid::new_v4(),
                intent_id: "pi_unlimited".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.energy_added, 0);
        assert!(!response.bonus_applied);
    }
}
