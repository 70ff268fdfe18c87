// [libs/domain/ai/src/errors.rs]
//! APARATO: AI ORCHESTRATOR ERROR CATALOG (L2)

use hub_domain_ledger::errors::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("[L2_AI_ENERGY] {0}")]
    Ledger(#[from] LedgerError),

    #[error("[L2_AI_PROVIDER] AI provider unavailable after retries: {0}")]
    ProviderUnavailable(String),
}
