// [libs/infra/db/src/repositories/mod.rs]
/*!
 * APARATO: REPOSITORY ROOT (L3)
 * RESPONSABILIDAD: IMPLEMENTACIONES CONCRETAS DE LOS CONTRATOS DE DOMINIO
 */

pub mod context;
pub mod energy;
pub mod events;
pub mod sessions;
pub mod users;

pub mod prelude {
    pub use crate::repositories::context::ContextSourceRepository;
    pub use crate::repositories::energy::EnergyRepositoryImpl;
    pub use crate::repositories::events::EventRepositoryImpl;
    pub use crate::repositories::sessions::SessionStoreImpl;
    pub use crate::repositories::users::UsersRepository;
}
