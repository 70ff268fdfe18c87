// [apps/hub/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PHOENIX HUB APPLICATION ROOT (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: COMPOSICIÓN DEL ESTADO, RUTEO Y BOOTSTRAP DEL HUB
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * El Hub es el único punto de entrada HTTP para autenticación, ledger
 * de energía, orquestación de IA y facturación. Todo lo táctico vive
 * en `hub-domain-*`; este estrato solo adapta HTTP <-> dominio.
 * =================================================================
 */

pub mod config;
pub mod errors;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod state;

pub mod prelude {
    pub use crate::config::HubConfig;
    pub use crate::errors::HubApiError;
    pub use crate::kernel::HubKernel;
    pub use crate::state::AppState;
}
