// [libs/infra/providers/src/lib.rs]
/*!
 * APARATO: EXTERNAL PROVIDER UPLINKS ROOT (L3)
 */

pub mod ai_client;
pub mod payment_client;

pub mod prelude {
    pub use crate::ai_client::AiProviderClient;
    pub use crate::payment_client::PaymentProviderClient;
}
