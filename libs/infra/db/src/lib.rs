// [libs/infra/db/src/lib.rs]
/*!
 * APARATO: HUB PERSISTENCE ROOT (L3)
 * RESPONSABILIDAD: EXPORTACIÓN DEL CLIENTE Y LOS REPOSITORIOS CONCRETOS
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub mod prelude {
    pub use crate::client::HubDbClient;
    pub use crate::errors::DbError;
    pub use crate::repositories::prelude::*;
}
