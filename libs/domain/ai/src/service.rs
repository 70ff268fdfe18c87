// [libs/domain/ai/src/service.rs]
/*!
 * =================================================================
 * APARATO: AI ORCHESTRATOR (L2)
 * CLASIFICACIÓN: DOMAIN SERVICE
 * RESPONSABILIDAD: CLASSIFY -> GATE -> CONTEXT -> PROMPT -> RPC -> CONSUME
 *
 * Sigue una secuencia estricta classify -> gate -> context -> prompt ->
 * rpc -> consume: el RPC de IA nunca se invoca si el paso de gate
 * (`can_perform`) rechaza, y la energía
 * nunca se consume si el RPC falla tras sus reintentos internos (delegados
 * a quien implemente `AiProvider`, típicamente envuelto en el
 * `ConnectionPool` de `hub-core-reliability`).
 * =================================================================
 */

use crate::classifier::classify;
use crate::errors::AiError;
use crate::prompt::assemble;
use crate::provider::AiProvider;
use hub_domain_context::prelude::ContextBuilder;
use hub_domain_context::source::ContextSource;
use hub_domain_ledger::prelude::{EnergyRepository, LedgerService};
use hub_domain_models::action_costs::Action;
use hub_domain_models::context::ContextPacket;
use tracing::instrument;
use uuid::Uuid;

pub struct ChatOutcome {
    pub message: String,
    pub energy_consumed: i64,
    pub action: Action,
    pub context: ContextPacket,
    pub new_balance: f64,
    pub tx_id: Uuid,
}

pub struct AiOrchestrator<P: AiProvider, R: EnergyRepository, S: ContextSource> {
    provider: P,
    ledger: LedgerService<R>,
    context: ContextBuilder<S>,
}

impl<P: AiProvider, R: EnergyRepository, S: ContextSource> AiOrchestrator<P, R, S> {
    pub fn new(provider: P, ledger: LedgerService<R>, context: ContextBuilder<S>) -> Self {
        Self { provider, ledger, context }
    }

    /// Stats of the narrative context cache, exposed for the monitoring surface.
    pub fn context_cache_stats(&self) -> hub_core_reliability::cache::CacheStats {
        self.context.cache_stats()
    }

    #[instrument(skip(self, message))]
    pub async fn chat(&self, user_id: Uuid, message: &str) -> Result<ChatOutcome, AiError> {
        let action = classify(message);

        let outcome = self.ledger.can_perform(user_id, action.as_str()).await?;
        if !outcome.allowed {
            return Err(AiError::Ledger(hub_domain_ledger::errors::LedgerError::InsufficientEnergy {
                required: outcome.required,
                current: outcome.current,
                deficit: outcome.deficit,
            }));
        }

        let packet = self.context.build(user_id).await;
        let prompt = assemble(&packet, message);

        let reply = self
            .provider
            .generate(&prompt)
            .await
            .map_err(|err| AiError::ProviderUnavailable(err.to_string()))?;

        let idempotency_key = format!("chat:{}:{}", user_id, Uuid::new_v4());
        let movement = self.ledger.consume(user_id, action.as_str(), &idempotency_key).await?;

        Ok(ChatOutcome {
            message: reply,
            energy_consumed: outcome.required,
            action,
            context: packet,
            new_balance: movement.new_balance,
            tx_id: movement.tx_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use hub_domain_context::errors::ContextSourceError;
    use hub_domain_ledger::errors::RepositoryError;
    use hub_domain_ledger::service::LedgerService;
    use hub_domain_models::energy::{
        Energy, EnergyActionType, EnergyTransaction, SubscriptionType, DEFAULT_MAX_ENERGY, DEFAULT_STARTING_ENERGY,
    };
    use hub_domain_models::event::DomainEvent;
    use hub_core_reliability::cache::CacheTier;
    use serde_json::Value;
    use std::sync::Mutex;

    struct StubProvider {
        should_fail: bool,
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, crate::provider::AiProviderError> {
            if self.should_fail {
                Err(crate::provider::AiProviderError::NetworkFault("down".to_string()))
            } else {
                Ok("reponse generee".to_string())
            }
        }
    }

    struct InMemoryRepository {
        energy: Mutex<Energy>,
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
        async fn find_transaction(&self, _tx_id: Uuid) -> Result<Option<EnergyTransaction>, RepositoryError> {
            Ok(None)
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
            energy.current_energy = (before - amount).clamp(0.0, energy.max_energy);
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
            Ok((energy.clone(), transaction))
        }
        async fn set_subscription(
            &self,
            _user_id: Uuid,
            subscription_type: SubscriptionType,
        ) -> Result<Energy, RepositoryError> {
            let mut energy = self.energy.lock().unwrap();
            energy.subscription_type = subscription_type;
            Ok(energy.clone())
        }
    }

    struct StubSource;

    #[async_trait]
    impl ContextSource for StubSource {
        async fn recent_events(&self, _user_id: Uuid, _window: Duration) -> Result<Vec<DomainEvent>, ContextSourceError> {
            Ok(Vec::new())
        }
        async fn energy(&self, _user_id: Uuid) -> Result<Energy, ContextSourceError> {
            Ok(Energy {
                user_id: Uuid::new_v4(),
                current_energy: DEFAULT_STARTING_ENERGY,
                max_energy: DEFAULT_MAX_ENERGY,
                total_purchased: 0.0,
                total_consumed: 0.0,
                last_recharge_at: None,
                subscription_type: SubscriptionType::Standard,
                updated_at: Utc::now(),
            })
        }
        async fn account_age_days(&self, _user_id: Uuid) -> Result<i64, ContextSourceError> {
            Ok(10)
        }
        async fn plan_name(&self, _user_id: Uuid) -> Result<String, ContextSourceError> {
            Ok("standard".to_string())
        }
    }

    fn orchestrator(should_fail: bool, balance: f64) -> AiOrchestrator<StubProvider, InMemoryRepository, StubSource> {
        let energy = Energy {
            user_id: Uuid::new_v4(),
            current_energy: balance,
            max_energy: DEFAULT_MAX_ENERGY,
            total_purchased: 0.0,
            total_consumed: 0.0,
            last_recharge_at: None,
            subscription_type: SubscriptionType::Standard,
            updated_at: Utc::now(),
        };
        let ledger = LedgerService::new(InMemoryRepository { energy: Mutex::new(energy) });
        let context = ContextBuilder::new(StubSource, CacheTier::new(None, 16));
        AiOrchestrator::new(StubProvider { should_fail }, ledger, context)
    }

    #[tokio::test]
    async fn free_conversation_never_debits_energy() {
        let orchestrator = orchestrator(false, DEFAULT_STARTING_ENERGY);
        let outcome = orchestrator.chat(Uuid::new_v4(), "bonjour").await.unwrap();
        assert_eq!(outcome.energy_consumed, 0);
        assert_eq!(outcome.action, Action::Conversation);
    }

    #[tokio::test]
    async fn provider_failure_never_consumes_energy() {
        let orchestrator = orchestrator(true, DEFAULT_STARTING_ENERGY);
        let result = orchestrator.chat(Uuid::new_v4(), "optimise mon cv").await;
        assert!(matches!(result, Err(AiError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn insufficient_energy_is_rejected_before_calling_the_provider() {
        let orchestrator = orchestrator(false, 1.0);
        let result = orchestrator.chat(Uuid::new_v4(), "optimise mon cv").await;
        assert!(matches!(result, Err(AiError::Ledger(_))));
    }
}
