// [libs/domain/ai/src/provider.rs]
/*!
 * APARATO: AI PROVIDER CONTRACT (L2)
 * RESPONSABILIDAD: FRONTERA HACIA EL RPC DE GENERACIÓN DE TEXTO OPACO
 *
 * `hub-domain-ai` nunca enlaza contra un SDK de modelo concreto — el mismo
 * patrón de frontera que `PaymentProvider` traza en `hub-domain-billing`.
 * `hub-infra-providers` lo implementa con un cliente `reqwest`.
 */

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiProviderError {
    #[error("[L3_AI_PROVIDER_NETWORK] AI provider network fault: {0}")]
    NetworkFault(String),

    #[error("[L3_AI_PROVIDER_REJECTED] AI provider rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiProviderError>;
}
