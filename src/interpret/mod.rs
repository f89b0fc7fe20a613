//! Free-text interpretation capability.
//!
//! The core never parses clinical language itself: it hands the raw text,
//! the field catalog of interest, and an optional context hint to a
//! [`FieldInterpreter`] and gets back a catalog of the same length and
//! ordering with values filled in where the text implied one. The shipped
//! implementation drives a local Ollama instance; tests use mocks.

pub mod prompt;
pub mod parser;
pub mod ollama;

pub use prompt::*;
pub use parser::*;
pub use ollama::*;

use thiserror::Error;

use crate::fields::{FieldCatalog, FieldDescriptor};

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Interpretation backend is not reachable at {0}")]
    Connection(String),

    #[error("Interpretation backend returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed interpretation response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Input text too short to interpret (< 10 characters)")]
    InputTooShort,
}

/// Converts a free-form description into structured field values.
///
/// Contract: the returned catalog has the same length and descriptor order
/// as the input catalog; values are set only where the text implied one.
pub trait FieldInterpreter {
    fn interpret(
        &self,
        raw_text: &str,
        catalog: &[FieldDescriptor],
        context: Option<&str>,
    ) -> Result<FieldCatalog, InterpretError>;
}
