pub mod catalog;
pub mod path;
pub mod template;
pub mod resolve;
pub mod reconcile;

pub use catalog::*;
pub use path::*;
pub use template::*;
pub use resolve::*;
pub use reconcile::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Catalog shape mismatch: original has {original} fields, candidate has {candidate}")]
    CatalogMismatch { original: usize, candidate: usize },

    #[error("Catalog order mismatch at index {index}: expected id '{expected}', got '{actual}'")]
    CatalogOrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Record serialization failed: {0}")]
    Serialization(String),
}
