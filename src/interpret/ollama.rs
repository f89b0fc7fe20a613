//! Ollama-backed field interpreter for local LLM inference.

use serde::{Deserialize, Serialize};

use super::parser::parse_interpretation_response;
use super::prompt::build_interpretation_prompt;
use super::{FieldInterpreter, InterpretError};
use crate::fields::{FieldCatalog, FieldDescriptor};

/// Minimum dictation length worth sending to the backend.
const MIN_INPUT_CHARS: usize = 10;

/// HTTP client for a local Ollama instance.
pub struct OllamaInterpreter {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaInterpreter {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, InterpretError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| InterpretError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with a 2-minute timeout.
    pub fn default_local(model: &str) -> Result<Self, InterpretError> {
        Self::new("http://localhost:11434", model, 120)
    }

    fn generate(&self, prompt: &str, system: &str) -> Result<String, InterpretError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                InterpretError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                InterpretError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                InterpretError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InterpretError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| InterpretError::MalformedResponse(e.to_string()))?;
        Ok(parsed.response)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl FieldInterpreter for OllamaInterpreter {
    fn interpret(
        &self,
        raw_text: &str,
        catalog: &[FieldDescriptor],
        context: Option<&str>,
    ) -> Result<FieldCatalog, InterpretError> {
        if raw_text.trim().chars().count() < MIN_INPUT_CHARS {
            return Err(InterpretError::InputTooShort);
        }

        let (system, user) = build_interpretation_prompt(catalog, raw_text, context);
        let response = self.generate(&user, &system)?;
        tracing::debug!(chars = response.len(), "Interpretation response received");

        parse_interpretation_response(&response, catalog)
    }
}
