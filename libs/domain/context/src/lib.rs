// [libs/domain/context/src/lib.rs]
/*!
 * APARATO: NARRATIVE CONTEXT ROOT (L2)
 * RESPONSABILIDAD: EXPORTACIÓN DEL CONSTRUCTOR Y SU CONTRATO DE FUENTE
 */

pub mod builder;
pub mod errors;
pub mod sentiment;
pub mod source;

pub mod prelude {
    pub use crate::builder::ContextBuilder;
    pub use crate::errors::ContextSourceError;
    pub use crate::source::ContextSource;
}
