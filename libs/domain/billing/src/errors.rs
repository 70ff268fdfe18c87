// [libs/domain/billing/src/errors.rs]
//! APARATO: BILLING ERROR CATALOG (L2)

use hub_domain_ledger::errors::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("[L2_BILLING_PACK] unknown pack code: {0}")]
    UnknownPack(String),

    #[error("[L2_BILLING_PROVIDER] payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("[L2_BILLING_PROVIDER] provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("[L2_BILLING_INTENT] payment intent {0} was not found or already settled")]
    IntentNotFound(String),

    #[error("[L2_BILLING_LEDGER] failed to credit energy after payment capture: {0}")]
    Ledger(#[from] LedgerError),
}
