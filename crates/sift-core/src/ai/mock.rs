//! Mock backend for testing
//!
//! Returns predictable classifications without a running LLM server, and can
//! be loaded with scripted replies to exercise retry and malformed-result
//! paths.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{SampleRow, CANONICAL_FIELDS};

use super::types::{RawClassification, SourceHint};
use super::CompletionBackend;

/// A scripted reply for one `classify_export` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw classification
    Classification(RawClassification),
    /// Fail the call as if the HTTP request had errored
    Failure(String),
}

/// Mock AI backend for testing
///
/// Scripted replies (if any) are consumed in order; once the queue is empty,
/// calls fall back to a deterministic default classification derived from the
/// headers.
#[derive(Clone, Default)]
pub struct MockBackend {
    healthy: bool,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            replies: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            replies: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Queue a scripted classification reply
    pub fn push_classification(&self, raw: RawClassification) {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .push_back(MockReply::Classification(raw));
    }

    /// Queue a scripted transport failure
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .push_back(MockReply::Failure(message.to_string()));
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .pop_front()
    }

    /// Deterministic default: identity-map canonical fields onto headers that
    /// mention them, and guess spot unless a pnl-ish column is present.
    fn default_classification(headers: &[String]) -> RawClassification {
        let mut mapping = BTreeMap::new();
        for header in headers {
            let folded = header.trim().to_lowercase();
            for &field in CANONICAL_FIELDS {
                let stem = field.split('_').next().unwrap_or(field);
                if folded.contains(stem) && !mapping.contains_key(field) {
                    mapping.insert(field.to_string(), header.trim().to_string());
                }
            }
        }

        let derivatives = headers
            .iter()
            .any(|h| h.to_lowercase().contains("pnl") || h.to_lowercase().contains("profit"));

        RawClassification {
            source_system: Some("generic-exchange".to_string()),
            ledger_type: Some(if derivatives { "derivatives" } else { "spot" }.to_string()),
            confidence: Some(0.60),
            column_mapping: Some(mapping),
        }
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn classify_export(
        &self,
        headers: &[String],
        _sample_rows: &[SampleRow],
        _hint: Option<&SourceHint>,
    ) -> Result<RawClassification> {
        match self.next_reply() {
            Some(MockReply::Classification(raw)) => Ok(raw),
            Some(MockReply::Failure(message)) => Err(Error::ServiceError(message)),
            None => Ok(Self::default_classification(headers)),
        }
    }

    async fn summarize(&self, prompt: &str) -> Result<String> {
        Ok(format!(
            "Mock summary ({} chars of context).",
            prompt.len()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_default_classification_maps_columns() {
        let mock = MockBackend::new();
        let raw = mock
            .classify_export(&headers(&["Price", "Fee", "Quantity"]), &[], None)
            .await
            .unwrap();
        let mapping = raw.column_mapping.unwrap();
        assert_eq!(mapping.get("price").map(String::as_str), Some("Price"));
        assert_eq!(mapping.get("fee").map(String::as_str), Some("Fee"));
        assert_eq!(raw.ledger_type.as_deref(), Some("spot"));
    }

    #[tokio::test]
    async fn test_default_classification_detects_derivatives() {
        let mock = MockBackend::new();
        let raw = mock
            .classify_export(&headers(&["Symbol", "Realized PnL"]), &[], None)
            .await
            .unwrap();
        assert_eq!(raw.ledger_type.as_deref(), Some("derivatives"));
    }

    #[tokio::test]
    async fn test_scripted_replies_consumed_in_order() {
        let mock = MockBackend::new();
        mock.push_failure("connection refused");
        mock.push_classification(RawClassification {
            source_system: Some("kraken".to_string()),
            ..Default::default()
        });

        let first = mock.classify_export(&[], &[], None).await;
        assert!(first.is_err());

        let second = mock.classify_export(&[], &[], None).await.unwrap();
        assert_eq!(second.source_system.as_deref(), Some("kraken"));
    }
}
