//! Ollama backend implementation
//!
//! HTTP client for the Ollama API. Prompts ask for a single JSON object and
//! replies go through the shared extraction parser, since local models like
//! to wrap their JSON in prose.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{SampleRow, CANONICAL_FIELDS};

use super::parsing::parse_classification_reply;
use super::types::{RawClassification, SourceHint};
use super::CompletionBackend;

/// How many sample rows to include in the classification prompt. More adds
/// latency without adding signal.
const MAX_PROMPT_ROWS: usize = 3;

/// Ollama backend
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl Clone for OllamaBackend {
    fn clone(&self) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables (`OLLAMA_HOST`, `OLLAMA_MODEL`)
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!("Ollama response: {}", ollama_response.response);

        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Build the classification prompt from headers, sample rows, and the
/// optional heuristic hint.
fn classification_prompt(
    headers: &[String],
    sample_rows: &[SampleRow],
    hint: Option<&SourceHint>,
) -> String {
    let mut prompt = String::from(
        "You are identifying the source of a tabular trade ledger export from a \
         crypto exchange or broker.\n\n",
    );

    prompt.push_str(&format!("Column headers: {}\n", headers.join(", ")));

    if !sample_rows.is_empty() {
        prompt.push_str("Sample rows:\n");
        for row in sample_rows.iter().take(MAX_PROMPT_ROWS) {
            prompt.push_str(&format!(
                "{}\n",
                serde_json::Value::Object(row.clone())
            ));
        }
    }

    if let Some(hint) = hint {
        prompt.push_str(&format!(
            "\nA signature match already identified this as a {} {} ledger; \
             treat that as given and focus on the column mapping.\n",
            hint.source_system,
            hint.ledger_type.as_str()
        ));
    }

    prompt.push_str(&format!(
        "\nRespond with exactly one JSON object and no other text:\n\
         {{\"source_system\": \"<exchange name, lowercase>\", \
         \"ledger_type\": \"spot\" or \"derivatives\", \
         \"confidence\": <0.0-1.0>, \
         \"column_mapping\": {{<canonical field>: <source header>}}}}\n\
         Canonical fields to map where present: {}.\n\
         Only map fields that actually appear in the headers.",
        CANONICAL_FIELDS.join(", ")
    ));

    prompt
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn classify_export(
        &self,
        headers: &[String],
        sample_rows: &[SampleRow],
        hint: Option<&SourceHint>,
    ) -> Result<RawClassification> {
        let prompt = classification_prompt(headers, sample_rows, hint);
        let response = self.generate(prompt).await?;
        parse_classification_reply(&response)
    }

    async fn summarize(&self, prompt: &str) -> Result<String> {
        let response = self.generate(prompt.to_string()).await?;
        Ok(response.trim().to_string())
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedgerType;

    #[test]
    fn test_prompt_includes_headers_and_hint() {
        let headers = vec!["Date".to_string(), "Pair".to_string()];
        let hint = SourceHint {
            source_system: "binance".to_string(),
            ledger_type: LedgerType::Spot,
        };
        let prompt = classification_prompt(&headers, &[], Some(&hint));
        assert!(prompt.contains("Date, Pair"));
        assert!(prompt.contains("binance spot"));
        assert!(prompt.contains("column_mapping"));
    }

    #[test]
    fn test_prompt_caps_sample_rows() {
        let headers = vec!["a".to_string()];
        let rows: Vec<SampleRow> = (0..10)
            .map(|i| {
                let mut row = SampleRow::new();
                row.insert("a".to_string(), serde_json::json!(format!("row-{}", i)));
                row
            })
            .collect();
        let prompt = classification_prompt(&headers, &rows, None);
        assert!(prompt.contains("row-2"));
        assert!(!prompt.contains("row-3"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
    }
}
