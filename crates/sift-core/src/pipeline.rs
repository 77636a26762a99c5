//! The hybrid classification pipeline
//!
//! Control flow per request: validate input, check the response cache, run
//! the heuristic, run the fallback (always, to obtain the column mapping),
//! reconcile, store, return. The heuristic always runs before the fallback —
//! the fallback's hint depends on it — and failures propagate without ever
//! being cached, so a failing header set retries the full pipeline on every
//! call until it succeeds.

use std::sync::Arc;

use tracing::debug;

use crate::ai::{AIClient, SourceHint};
use crate::cache::{CacheKey, ResponseCache};
use crate::error::{Error, Result};
use crate::fallback::FallbackClassifier;
use crate::heuristics::classify_headers;
use crate::models::{ClassificationOutcome, ClassificationRequest, ClassificationResult};
use crate::reconcile::{heuristic_only, reconcile};

/// The classification pipeline, shared across requests.
pub struct ExportClassifier {
    cache: Arc<ResponseCache>,
    fallback: Option<FallbackClassifier>,
}

impl ExportClassifier {
    /// Create a classifier without a fallback backend. Header sets the
    /// heuristic does not recognize will fail with `ServiceUnavailable`.
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self {
            cache,
            fallback: None,
        }
    }

    /// Create a classifier backed by a completion service.
    pub fn with_ai(cache: Arc<ResponseCache>, client: AIClient) -> Self {
        Self {
            cache,
            fallback: Some(FallbackClassifier::new(client)),
        }
    }

    /// Create with an explicit fallback classifier (custom attempt budget).
    pub fn with_fallback(cache: Arc<ResponseCache>, fallback: FallbackClassifier) -> Self {
        Self {
            cache,
            fallback: Some(fallback),
        }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Classify one export request.
    pub async fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationOutcome> {
        validate(request)?;

        // Validation guarantees at least one non-blank header, so the
        // fingerprint is non-empty and the key exists.
        let key = CacheKey::classification(&request.headers)
            .ok_or_else(|| Error::InvalidRequest("headers carry no usable signal".to_string()))?;

        if let Some(result) = self.cache.get::<ClassificationResult>(&key) {
            return Ok(ClassificationOutcome {
                result,
                cached: true,
            });
        }

        let heuristic = classify_headers(&request.headers);

        let Some(fallback) = &self.fallback else {
            // No completion backend. A heuristic match still yields the
            // degenerate mapping-less result; it is not cached so a
            // later-configured backend will be asked for the mapping.
            return match &heuristic {
                Some(decision) => {
                    debug!(
                        source_system = decision.source_system,
                        "Fallback unconfigured, returning heuristic-only result"
                    );
                    Ok(ClassificationOutcome {
                        result: heuristic_only(decision),
                        cached: false,
                    })
                }
                None => Err(Error::ServiceUnavailable),
            };
        };

        let hint = heuristic.as_ref().map(|h| SourceHint {
            source_system: h.source_system.to_string(),
            ledger_type: h.ledger_type,
        });

        let decision = fallback
            .classify(&request.headers, &request.sample_rows, hint.as_ref())
            .await?;

        let result = reconcile(heuristic.as_ref(), decision);
        self.cache.set(key, &result);

        Ok(ClassificationOutcome {
            result,
            cached: false,
        })
    }
}

/// Reject malformed requests before any classifier runs.
fn validate(request: &ClassificationRequest) -> Result<()> {
    if request.headers.is_empty() {
        return Err(Error::InvalidRequest(
            "headers must be a non-empty list".to_string(),
        ));
    }
    if request.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(Error::InvalidRequest(
            "headers contain no usable column names".to_string(),
        ));
    }
    Ok(())
}
