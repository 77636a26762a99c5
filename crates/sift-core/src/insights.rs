//! Cacheable insight pipelines sharing the response cache
//!
//! Independent of the classification pipeline but built on the same cache
//! mechanism: daily activity digests (owner+day keys), report summaries
//! (content-hash keys), and free-form exploration answers, which route
//! through a declared no-cache strategy and recompute every time.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{AIClient, CompletionBackend};
use crate::cache::{CacheKey, ResponseCache};
use crate::error::{Error, Result};
use crate::models::SampleRow;

/// Columns that identify the traded market in common export formats.
const MARKET_COLUMNS: &[&str] = &["market", "pair", "symbol"];

/// Request for a per-day activity digest.
#[derive(Debug, Clone, Deserialize)]
pub struct DigestRequest {
    /// Owner the digest belongs to (account identifier)
    pub owner: String,
    pub day: NaiveDate,
    /// The day's trade rows, keyed by source column names
    #[serde(default)]
    pub rows: Vec<SampleRow>,
}

/// One day's digest for one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDigest {
    pub owner: String,
    pub day: NaiveDate,
    pub trade_count: usize,
    pub markets: Vec<String>,
    pub summary: String,
    pub model: String,
}

/// AI-written summary of a structured report payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub summary: String,
    pub model: String,
}

/// Insight generation over the shared cache.
pub struct InsightEngine {
    cache: Arc<ResponseCache>,
    ai: Option<AIClient>,
}

impl InsightEngine {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache, ai: None }
    }

    pub fn with_ai(cache: Arc<ResponseCache>, client: AIClient) -> Self {
        Self {
            cache,
            ai: Some(client),
        }
    }

    fn client(&self) -> Result<&AIClient> {
        self.ai.as_ref().ok_or(Error::ServiceUnavailable)
    }

    /// Build (or serve from cache) the digest for one owner and day.
    pub async fn daily_digest(&self, request: &DigestRequest) -> Result<ActivityDigest> {
        if request.owner.trim().is_empty() {
            return Err(Error::InvalidRequest("owner must not be empty".to_string()));
        }

        let key = CacheKey::daily_digest(&request.owner, request.day);
        if let Some(digest) = self.cache.get::<ActivityDigest>(&key) {
            return Ok(digest);
        }

        let client = self.client()?;
        let trade_count = request.rows.len();
        let markets = distinct_markets(&request.rows);

        let prompt = format!(
            "Write a two-sentence plain-language digest of one day of trading \
             activity. Day: {}. Trades: {}. Markets: {}. Do not invent numbers \
             beyond these.",
            request.day,
            trade_count,
            if markets.is_empty() {
                "none".to_string()
            } else {
                markets.join(", ")
            }
        );

        let summary = client
            .summarize(&prompt)
            .await
            .map_err(into_service_error)?;

        let digest = ActivityDigest {
            owner: request.owner.clone(),
            day: request.day,
            trade_count,
            markets,
            summary,
            model: client.model().to_string(),
        };

        self.cache.set(key, &digest);
        Ok(digest)
    }

    /// Summarize an arbitrary structured report, cached by content hash.
    pub async fn summarize_report(&self, payload: &serde_json::Value) -> Result<ReportSummary> {
        if payload.is_null() {
            return Err(Error::InvalidRequest(
                "report payload must not be null".to_string(),
            ));
        }

        let key = CacheKey::report_summary(payload);
        if let Some(summary) = self.cache.get::<ReportSummary>(&key) {
            return Ok(summary);
        }

        let client = self.client()?;
        let prompt = format!(
            "Summarize this trading report in at most three sentences for a \
             non-technical reader. Report JSON:\n{}",
            payload
        );

        let summary = ReportSummary {
            summary: client
                .summarize(&prompt)
                .await
                .map_err(into_service_error)?,
            model: client.model().to_string(),
        };

        self.cache.set(key, &summary);
        Ok(summary)
    }

    /// Answer a free-form question. Routed through the disabled
    /// explore-answer strategy, so every call recomputes.
    pub async fn explore(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }

        let key = CacheKey::explore_answer(question);
        if let Some(answer) = self.cache.get::<String>(&key) {
            return Ok(answer);
        }

        let client = self.client()?;
        let answer = client
            .summarize(question)
            .await
            .map_err(into_service_error)?;
        debug!("Explore answer computed (strategy declared no-cache)");

        self.cache.set(key, &answer);
        Ok(answer)
    }
}

/// Distinct market identifiers across the rows, in sorted order.
fn distinct_markets(rows: &[SampleRow]) -> Vec<String> {
    let mut markets = BTreeSet::new();
    for row in rows {
        for (column, value) in row {
            if MARKET_COLUMNS.contains(&column.trim().to_lowercase().as_str()) {
                if let Some(s) = value.as_str() {
                    if !s.trim().is_empty() {
                        markets.insert(s.trim().to_string());
                    }
                }
            }
        }
    }
    markets.into_iter().collect()
}

/// Completion-call failures surface as `ServiceError`.
fn into_service_error(err: Error) -> Error {
    match err {
        Error::ServiceError(msg) => Error::ServiceError(msg),
        Error::ServiceUnavailable => Error::ServiceUnavailable,
        other => Error::ServiceError(other.to_string()),
    }
}
