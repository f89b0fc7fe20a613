pub mod status;
pub mod encounter;
pub mod service;

pub use status::*;
pub use encounter::*;
pub use service::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::fields::FieldError;
use crate::interpret::InterpretError;
use crate::models::InvariantViolation;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Illegal {entity} transition: {from} -> {to}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Validation failed: {}", format_violations(.0))]
    Validation(Vec<InvariantViolation>),

    #[error("A SOAP note already exists for examination {0}")]
    NoteAlreadyExists(uuid::Uuid),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Interpretation failed: {0}")]
    Interpretation(#[from] InterpretError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

fn format_violations(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
