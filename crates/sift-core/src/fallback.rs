//! Fallback classifier: bounded retries plus a strict result-shape contract
//!
//! Wraps the completion backend. A reply only counts when it carries a
//! non-empty source system, a parseable ledger type, a confidence in [0, 1],
//! and a non-empty column mapping; anything less is retried and, once the
//! attempt budget is spent, surfaced as `MalformedResult` rather than
//! coerced. Transport failures surface as `ServiceError`.

use std::collections::BTreeMap;

use tracing::{error, warn};

use crate::ai::{AIClient, CompletionBackend, RawClassification, SourceHint};
use crate::error::{Error, Result};
use crate::models::{LedgerType, SampleRow};

/// Total call budget: one call plus two retries.
pub const DEFAULT_FALLBACK_ATTEMPTS: u32 = 3;

/// A validated fallback decision.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDecision {
    pub source_system: String,
    pub ledger_type: LedgerType,
    pub confidence: f64,
    pub column_mapping: BTreeMap<String, String>,
}

/// The fallback classification path.
pub struct FallbackClassifier {
    client: AIClient,
    attempts: u32,
}

impl FallbackClassifier {
    pub fn new(client: AIClient) -> Self {
        Self::with_attempts(client, attempts_from_env())
    }

    pub fn with_attempts(client: AIClient, attempts: u32) -> Self {
        Self {
            client,
            attempts: attempts.max(1),
        }
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    /// Classify via the completion service, retrying within the attempt
    /// budget. The heuristic hint is advisory only; a full column mapping is
    /// requested either way.
    pub async fn classify(
        &self,
        headers: &[String],
        sample_rows: &[SampleRow],
        hint: Option<&SourceHint>,
    ) -> Result<FallbackDecision> {
        let mut last_err = Error::ServiceError("no attempts made".to_string());

        for attempt in 1..=self.attempts {
            let outcome = self
                .client
                .classify_export(headers, sample_rows, hint)
                .await
                .and_then(validate_reply);

            match outcome {
                Ok(decision) => return Ok(decision),
                Err(err) => {
                    let err = match err {
                        Error::MalformedResult(msg) => Error::MalformedResult(msg),
                        Error::ServiceError(msg) => Error::ServiceError(msg),
                        other => Error::ServiceError(other.to_string()),
                    };
                    warn!(
                        attempt,
                        attempts = self.attempts,
                        error = %err,
                        "Fallback classification attempt failed"
                    );
                    last_err = err;
                }
            }
        }

        // A malformed result after all retries means the completion service's
        // contract has drifted from ours; log it louder than a flaky call.
        match &last_err {
            Error::MalformedResult(msg) => {
                error!(error = %msg, "Fallback classifier exhausted retries on malformed results")
            }
            err => warn!(error = %err, "Fallback classifier exhausted retries"),
        }

        Err(last_err)
    }
}

/// Check a raw reply against the expected shape.
fn validate_reply(raw: RawClassification) -> Result<FallbackDecision> {
    let source_system = raw
        .source_system
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MalformedResult("missing source_system".to_string()))?;

    let ledger_raw = raw
        .ledger_type
        .ok_or_else(|| Error::MalformedResult("missing ledger_type".to_string()))?;
    let ledger_type = LedgerType::parse(&ledger_raw).ok_or_else(|| {
        Error::MalformedResult(format!("unrecognized ledger_type: {:?}", ledger_raw))
    })?;

    let confidence = raw
        .confidence
        .ok_or_else(|| Error::MalformedResult("missing confidence".to_string()))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(Error::MalformedResult(format!(
            "confidence out of range: {}",
            confidence
        )));
    }

    let column_mapping = raw
        .column_mapping
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::MalformedResult("missing column_mapping".to_string()))?;

    Ok(FallbackDecision {
        source_system,
        ledger_type,
        confidence,
        column_mapping,
    })
}

/// Attempt budget from `SIFT_FALLBACK_ATTEMPTS`, defaulting to
/// [`DEFAULT_FALLBACK_ATTEMPTS`]. Zero is clamped to one.
fn attempts_from_env() -> u32 {
    std::env::var("SIFT_FALLBACK_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FALLBACK_ATTEMPTS)
}
