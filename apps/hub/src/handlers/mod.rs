// [apps/hub/src/handlers/mod.rs]
/*!
 * APARATO: HTTP ADAPTER REGISTRY (ESTRATO L3)
 * RESPONSABILIDAD: DECLARACIÓN DE LOS GATEWAYS HTTP POR DOMINIO
 */

pub mod ai;
pub mod auth;
pub mod billing;
pub mod energy;
pub mod events;
pub mod health;
pub mod monitoring;
