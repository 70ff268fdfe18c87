// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HUB DOMAIN MODELS ROOT (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE ENTIDADES
 *
 * VISION HIPER-HOLÍSTICA:
 * Single Source of Truth para toda entidad que cruza una frontera de
 * proceso (HTTP, cache, persistencia). Ningún estrato superior debe
 * redefinir estas formas; solo importarlas.
 * =================================================================
 */

pub mod user;
pub mod energy;
pub mod event;
pub mod session;
pub mod action_costs;
pub mod ratelimit;
pub mod context;
pub mod errors;

pub mod prelude {
    pub use crate::action_costs::{action_cost, Action};
    pub use crate::context::ContextPacket;
    pub use crate::energy::{Energy, EnergyActionType, EnergyTransaction, SubscriptionType};
    pub use crate::errors::ErrorKind;
    pub use crate::event::{DomainEvent, EventType};
    pub use crate::ratelimit::{RateLimitDecision, RateLimitRule};
    pub use crate::session::Session;
    pub use crate::user::User;
}
