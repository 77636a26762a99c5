//! Pluggable local AI backend abstraction
//!
//! Backend-agnostic interface for the structured-completion service the
//! fallback classifier and the insight pipelines call. All backends run
//! locally — Ollama or a mock for tests.
//!
//! # Architecture
//!
//! - `CompletionBackend` trait: defines the interface for completion calls
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MockReply};
pub use ollama::OllamaBackend;
pub use types::{RawClassification, SourceHint};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SampleRow;

/// Trait defining the interface for all completion backends
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Ask the completion service to classify an export from its headers and
    /// sample rows. The reply is raw; shape validation belongs to the caller.
    async fn classify_export(
        &self,
        headers: &[String],
        sample_rows: &[SampleRow],
        hint: Option<&SourceHint>,
    ) -> Result<RawClassification>;

    /// Free-form completion used by the insight pipelines
    async fn summarize(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set —
    /// the fallback classifier is then unavailable.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement CompletionBackend for AIClient by delegating to the inner backend
#[async_trait]
impl CompletionBackend for AIClient {
    async fn classify_export(
        &self,
        headers: &[String],
        sample_rows: &[SampleRow],
        hint: Option<&SourceHint>,
    ) -> Result<RawClassification> {
        match self {
            AIClient::Ollama(b) => b.classify_export(headers, sample_rows, hint).await,
            AIClient::Mock(b) => b.classify_export(headers, sample_rows, hint).await,
        }
    }

    async fn summarize(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.summarize(prompt).await,
            AIClient::Mock(b) => b.summarize(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }
}
