// [libs/infra/auth/src/lib.rs]
/*!
 * APARATO: SESSION / AUTH ROOT (L3)
 * RESPONSABILIDAD: EXPORTACIÓN DE TOKENS, HASHING Y ROTACIÓN DE SESIÓN
 */

pub mod errors;
pub mod password;
pub mod sessions;
pub mod tokens;

pub mod prelude {
    pub use crate::errors::AuthError;
    pub use crate::password::{hash_password, verify_password};
    pub use crate::sessions::{RotationOutcome, SessionRotator, SessionStore};
    pub use crate::tokens::TokenIssuer;
}
